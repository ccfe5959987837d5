use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y%m%d"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y.%m.%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parses a ledger date cell. Returns `None` for anything that is not a recognised date.
pub fn parse_ledger_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parses a numeric cell, ignoring `,` thousands separators.
/// Non-finite results (`inf`, `NaN`) are treated as unparseable.
pub fn parse_ledger_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Start of the trailing window: `now` moved back by `months` calendar months.
/// Day-of-month is clamped (e.g. 2024-03-31 minus one month is 2024-02-29).
pub fn window_cutoff(now: NaiveDateTime, months: u32) -> NaiveDateTime {
    now.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDateTime::MIN)
}

/// A calendar month used as the chronological sort key of a period label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Parses `YYYY-MM` by pinning it to the first day of the month.
    pub fn parse(period: &str) -> Option<Self> {
        let date = NaiveDate::parse_from_str(&format!("{}-01", period.trim()), "%Y-%m-%d").ok()?;
        Some(Self::from_date(date))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Chronological ordering key for a period label.
/// Labels that do not parse sort before every valid month, then by raw text.
pub fn period_sort_key(period: &str) -> (Option<YearMonth>, &str) {
    (YearMonth::parse(period), period)
}

/// Formats a number rounded to `decimals` places with `,` thousands separators.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    let mut out = String::new();
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ledger_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(parse_ledger_date("2024-05-01"), Some(expected));
        assert_eq!(parse_ledger_date(" 2024/05/01 "), Some(expected));
        assert_eq!(parse_ledger_date("2024.05.01"), Some(expected));
        assert_eq!(parse_ledger_date("20240501"), Some(expected));
        assert_eq!(parse_ledger_date("2024-05-01 13:45:00"), Some(expected));
        assert_eq!(parse_ledger_date("not a date"), None);
        assert_eq!(parse_ledger_date("2024-02-30"), None);
        assert_eq!(parse_ledger_date(""), None);
    }

    #[test]
    fn test_parse_ledger_number() {
        assert_eq!(parse_ledger_number("1,000"), Some(1000.0));
        assert_eq!(parse_ledger_number(" 12,345.5 "), Some(12345.5));
        assert_eq!(parse_ledger_number("-2,500"), Some(-2500.0));
        assert_eq!(parse_ledger_number("abc"), None);
        assert_eq!(parse_ledger_number(""), None);
        assert_eq!(parse_ledger_number("inf"), None);
        assert_eq!(parse_ledger_number("NaN"), None);
    }

    #[test]
    fn test_window_cutoff_clamps_month_end() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            window_cutoff(now, 12),
            NaiveDate::from_ymd_opt(2023, 6, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );

        let leap = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(
            window_cutoff(leap, 12).date(),
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );
    }

    #[test]
    fn test_year_month_ordering() {
        let a = YearMonth::parse("2023-12").unwrap();
        let b = YearMonth::parse("2024-01").unwrap();
        assert!(a < b);
        assert_eq!(a.to_string(), "2023-12");
        assert_eq!(YearMonth::parse("2024-13"), None);
        assert_eq!(YearMonth::parse("May 2024"), None);
    }

    #[test]
    fn test_period_sort_key_puts_garbage_first() {
        let mut periods = vec!["2024-02", "unknown", "2023-11", "2024-01"];
        periods.sort_by(|a, b| period_sort_key(a).cmp(&period_sort_key(b)));
        assert_eq!(periods, vec!["unknown", "2023-11", "2024-01", "2024-02"]);
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0, 0), "0");
        assert_eq!(format_thousands(999.0, 0), "999");
        assert_eq!(format_thousands(1500.0, 0), "1,500");
        assert_eq!(format_thousands(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_thousands(-98765.4, 0), "-98,765");
        assert_eq!(format_thousands(-0.001, 2), "0.00");
    }
}
