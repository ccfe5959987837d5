use crate::aggregate::Aggregate;
use crate::utils::{period_sort_key, YearMonth};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Revenue is charted in units of 억 (one hundred million).
pub const EOK: f64 = 100_000_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub period: String,
    /// First day of the month, `None` if the period label is not a valid `YYYY-MM`.
    pub month_start: Option<NaiveDate>,
    pub revenue: f64,
    pub revenue_eok: f64,
}

/// Monthly revenue in chronological order. The order comes from the parsed month,
/// not from the label text.
pub fn monthly_trend(monthly_revenue: &Aggregate) -> Vec<TrendPoint> {
    let mut entries: Vec<(&String, &f64)> = monthly_revenue.iter().collect();
    entries.sort_by(|(a, _), (b, _)| period_sort_key(a).cmp(&period_sort_key(b)));

    entries
        .into_iter()
        .map(|(period, revenue)| TrendPoint {
            period: period.clone(),
            month_start: YearMonth::parse(period).and_then(|ym| ym.first_day()),
            revenue: *revenue,
            revenue_eok: *revenue / EOK,
        })
        .collect()
}

/// Percentage change between the two most recent periods present.
///
/// Months missing from the data are skipped rather than treated as zero. With fewer than
/// two periods, or a previous period summing to exactly zero, the change is reported as 0.
pub fn month_over_month(monthly_revenue: &Aggregate) -> f64 {
    let trend = monthly_trend(monthly_revenue);
    match trend.as_slice() {
        [.., previous, latest] if previous.revenue != 0.0 => {
            (latest.revenue - previous.revenue) / previous.revenue * 100.0
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monthly(entries: &[(&str, f64)]) -> Aggregate {
        entries
            .iter()
            .map(|(period, value)| (period.to_string(), *value))
            .collect()
    }

    #[test]
    fn test_single_period_reports_zero() {
        assert_eq!(month_over_month(&monthly(&[("2024-05", 1500.0)])), 0.0);
        assert_eq!(month_over_month(&Aggregate::new()), 0.0);
    }

    #[test]
    fn test_zero_previous_reports_zero() {
        let mom = month_over_month(&monthly(&[("2024-01", 0.0), ("2024-02", 100.0)]));
        assert_eq!(mom, 0.0);
    }

    #[test]
    fn test_gap_month_is_skipped() {
        let mom = month_over_month(&monthly(&[("2024-04", 200.0), ("2024-06", 250.0)]));
        assert!((mom - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_uses_chronological_not_lexical_order() {
        let mom = month_over_month(&monthly(&[
            ("2023-12", 400.0),
            ("2024-01", 300.0),
            ("999-12", 1.0),
        ]));
        assert!((mom - (-25.0)).abs() < 1e-9);
    }

    #[test]
    fn test_negative_change() {
        let mom = month_over_month(&monthly(&[("2024-03", 1000.0), ("2024-04", 800.0), ("2024-05", 200.0)]));
        assert!((mom - (-75.0)).abs() < 1e-9);
    }

    #[test]
    fn test_trend_points() {
        let trend = monthly_trend(&monthly(&[("2024-02", 250_000_000.0), ("2023-11", 50_000_000.0)]));
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].period, "2023-11");
        assert_eq!(trend[0].month_start, NaiveDate::from_ymd_opt(2023, 11, 1));
        assert_eq!(trend[1].revenue_eok, 2.5);
    }
}
