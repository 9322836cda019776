use chrono::NaiveDateTime;

use crate::error::ParseError;

/// "Monday, January 1, 2024 at 10:00:00 AM"
const DATE_LAYOUT: &str = "%A, %B %d, %Y at %I:%M:%S %p";
const DATE_FORMAT: &str = "%A, %B %-d, %Y at %-I:%M:%S %p";

/// Parse a bridge timestamp, with or without a `date "..."` wrapper.
///
/// The bridge reports local wall-clock time without a zone, so the result
/// is a naive timestamp.
pub fn parse_date(value: &str) -> Result<NaiveDateTime, ParseError> {
    let trimmed = value.trim();
    let unwrapped = trimmed
        .strip_prefix("date")
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix('"'))
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim();

    NaiveDateTime::parse_from_str(unwrapped, DATE_LAYOUT).map_err(|_| ParseError::InvalidDate {
        input: value.to_string(),
    })
}

/// Format a timestamp in the layout the bridge accepts in `date "..."`.
pub fn format_date(value: NaiveDateTime) -> String {
    value.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn parses_plain_layout() {
        let parsed = parse_date("Monday, January 1, 2024 at 10:00:00 AM").unwrap();
        assert_eq!(parsed, at(2024, 1, 1, 10, 0, 0));
    }

    #[test]
    fn wrapped_form_is_identical() {
        let plain = parse_date("Monday, January 1, 2024 at 10:00:00 AM").unwrap();
        let wrapped = parse_date("date \"Monday, January 1, 2024 at 10:00:00 AM\"").unwrap();
        assert_eq!(plain, wrapped);
    }

    #[test]
    fn afternoon_and_two_digit_day() {
        let parsed = parse_date("Friday, March 15, 2024 at 3:04:05 PM").unwrap();
        assert_eq!(parsed, at(2024, 3, 15, 15, 4, 5));
    }

    #[test]
    fn midnight_is_twelve_am() {
        let parsed = parse_date("Tuesday, January 2, 2024 at 12:30:00 AM").unwrap();
        assert_eq!(parsed, at(2024, 1, 2, 0, 30, 0));
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_date("not a date").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidDate {
                input: "not a date".to_string()
            }
        );
        assert!(parse_date("").is_err());
        assert!(parse_date("2024-01-01 10:00:00").is_err());
    }

    #[test]
    fn format_then_parse_is_stable() {
        let when = at(2023, 12, 9, 18, 7, 1);
        let text = format_date(when);
        assert_eq!(text, "Saturday, December 9, 2023 at 6:07:01 PM");
        assert_eq!(parse_date(&text).unwrap(), when);
    }
}
