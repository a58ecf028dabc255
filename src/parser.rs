use chrono::NaiveDate;

use super::error::RowError;
use super::journey::Journey;

/// Number of columns in an Oyster statement export:
/// Date, Start Time, End Time, Journey/Action, Charge, Credit, Balance, Note
pub const FIELD_COUNT: usize = 8;

/// Dates arrive as e.g. `15-Jan-2025`.
pub const STATEMENT_DATE_FORMAT: &str = "%d-%b-%Y";
pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// Turns one raw CSV record into a journey. `index` is the 0-based position of the
/// row in its file and only used for diagnostics.
pub fn parse_row<S: AsRef<str>>(fields: &[S], index: usize) -> Result<Journey, RowError> {
    if fields.len() < FIELD_COUNT {
        return Err(RowError::MalformedRow {
            index,
            found: fields.len(),
        });
    }
    let field = |i: usize| fields[i].as_ref();

    let date = parse_statement_date(field(0)).ok_or_else(|| RowError::InvalidDate {
        index,
        value: field(0).to_string(),
    })?;

    Ok(Journey {
        date: date.format(CANONICAL_DATE_FORMAT).to_string(),
        start_time: field(1).to_string(),
        end_time: field(2).to_string(),
        journey_action: field(3).to_string(),
        charge: parse_currency(field(4)),
        credit: parse_currency(field(5)),
        balance: parse_currency(field(6)),
        note: field(7).to_string(),
    })
}

/// Surrounding whitespace is not part of the format, so ` 15-Jan-2025` is rejected.
pub fn parse_statement_date(s: &str) -> Option<NaiveDate> {
    if s.trim() != s {
        return None;
    }
    NaiveDate::parse_from_str(s, STATEMENT_DATE_FORMAT).ok()
}

/// Empty or unreadable amounts count as zero rather than rejecting the row.
/// `NaN` and infinities are unreadable too: SQLite would store NaN as NULL.
pub fn parse_currency(s: &str) -> f64 {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_parse_complete_row() {
        let fields = row(&[
            "15-Jan-2025",
            "08:12",
            "08:47",
            "Walthamstow Central to Oxford Circus",
            "2.80",
            "",
            "17.45",
            "",
        ]);
        let journey = parse_row(&fields, 3).unwrap();
        assert_eq!(journey.date, "2025-01-15");
        assert_eq!(journey.start_time, "08:12");
        assert_eq!(journey.end_time, "08:47");
        assert_eq!(journey.journey_action, "Walthamstow Central to Oxford Circus");
        assert_eq!(journey.charge, 2.80);
        assert_eq!(journey.credit, 0.0);
        assert_eq!(journey.balance, 17.45);
        assert_eq!(journey.note, "");
    }

    #[test]
    fn test_parse_keeps_fields_verbatim() {
        let fields = row(&[
            "02-Mar-2025",
            "23:58",
            "",
            "Bus journey, route 38",
            "1.75",
            "0",
            "4.20",
            "Capped",
            "extra column",
        ]);
        let journey = parse_row(&fields, 1).unwrap();
        assert_eq!(journey.date, "2025-03-02");
        assert_eq!(journey.end_time, "");
        assert_eq!(journey.note, "Capped");
    }

    #[test]
    fn test_whitespace_fields_are_not_trimmed() {
        let fields = row(&["14-Jan-2025", "08:30", " ", "a", " 1.50 ", "", "1", " note "]);
        let journey = parse_row(&fields, 1).unwrap();
        assert_eq!(journey.end_time, " ");
        assert_eq!(journey.note, " note ");
        assert_eq!(journey.charge, 1.5);
    }

    #[test]
    fn test_too_few_fields_is_malformed() {
        let fields = row(&["15-Jan-2025", "08:12", "08:47", "Topped up", "", "20.00", "25.00"]);
        assert_eq!(
            parse_row(&fields, 4),
            Err(RowError::MalformedRow { index: 4, found: 7 })
        );
        let empty: Vec<String> = Vec::new();
        assert!(matches!(
            parse_row(&empty, 0),
            Err(RowError::MalformedRow { found: 0, .. })
        ));
    }

    #[test]
    fn test_invalid_date() {
        for bad in [
            "2025-01-15",
            "Date",
            "32-Jan-2025",
            "15/01/2025",
            "",
            " 15-Jan-2025",
            "15-Jan-2025 ",
        ] {
            let fields = row(&[bad, "08:12", "08:47", "x", "1", "0", "1", ""]);
            assert_eq!(
                parse_row(&fields, 2),
                Err(RowError::InvalidDate {
                    index: 2,
                    value: bad.to_string()
                })
            );
        }
    }

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency(""), 0.0);
        assert_eq!(parse_currency("n/a"), 0.0);
        assert_eq!(parse_currency("NaN"), 0.0);
        assert_eq!(parse_currency("inf"), 0.0);
        assert_eq!(parse_currency("-infinity"), 0.0);
        assert_eq!(parse_currency("2.80"), 2.8);
        assert_eq!(parse_currency(" 10 "), 10.0);
        assert_eq!(parse_currency("-1.50"), -1.5);
    }
}
