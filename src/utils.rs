use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{BufWriter, Write};

/// Progress bar over the data rows of one statement during import.
pub fn progress_bar_for_count(count: usize) -> ProgressBar {
    let style = ProgressStyle::with_template(
        "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {human_pos}/{human_len} ({per_sec}, {eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::new(count as u64).with_style(style)
}

/// Writes `data` as indented JSON followed by a newline.
pub fn write_json_pretty<T: Serialize, W: Write>(writer: W, data: &T) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, data)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
