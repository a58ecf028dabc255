//! Process exit codes.
//!
//! | Code | Meaning                                         |
//! |------|-------------------------------------------------|
//! | 0    | Success                                         |
//! | 1    | General error                                   |
//! | 2    | Usage error (clap exits with this itself)       |
//! | 3    | Database could not be opened or queried         |
//! | 4    | Required configuration missing or invalid       |
//! | 5    | One or more input files could not be read       |
//! | 6    | Publish client could not be created             |

pub const EXIT_SUCCESS: u8 = 0;

pub const EXIT_ERROR: u8 = 1;

pub const EXIT_STORE: u8 = 3;

pub const EXIT_CONFIG: u8 = 4;

/// Import and rename still process the remaining files before exiting with this.
pub const EXIT_FILE: u8 = 5;

pub const EXIT_SINK: u8 = 6;
