use crate::services::format::format_fixed;
use crate::value_objects::period::Period;
use crate::value_objects::summary_record::SummaryRecord;
use serde::Serialize;
use std::collections::HashSet;

pub const COMPARISON_HEADERS: [&str; 6] = [
    "Period",
    "Return (%)",
    "Sharpe",
    "Max DD (%)",
    "Win Rate (%)",
    "Trades/Year",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRow {
    pub period: Period,
    pub label: String,
    pub return_pct: String,
    pub sharpe: String,
    pub max_drawdown_pct: String,
    pub win_rate_pct: String,
    pub trades_per_year: String,
}

impl ComparisonRow {
    pub fn cells(&self) -> [&str; 6] {
        [
            &self.label,
            &self.return_pct,
            &self.sharpe,
            &self.max_drawdown_pct,
            &self.win_rate_pct,
            &self.trades_per_year,
        ]
    }
}

/// One row per distinct period, in summary order; the first row of a
/// repeated period wins.
pub fn comparison_rows(summaries: &[SummaryRecord]) -> Vec<ComparisonRow> {
    let mut seen: HashSet<Period> = HashSet::new();
    summaries
        .iter()
        .filter(|s| seen.insert(s.period))
        .map(|s| ComparisonRow {
            period: s.period,
            label: s.period.label().to_string(),
            return_pct: format_fixed(s.total_return_pct, 2),
            sharpe: format_fixed(s.sharpe_ratio, 3),
            max_drawdown_pct: format_fixed(s.max_drawdown_pct, 2),
            win_rate_pct: format_fixed(s.win_rate_pct, 1),
            trades_per_year: format_fixed(s.trades_per_year, 0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::comparison_rows;
    use crate::value_objects::period::Period;
    use crate::value_objects::summary_record::SummaryRecord;
    use chrono::{TimeZone, Utc};

    fn summary(period: Period, total_return_pct: f64) -> SummaryRecord {
        SummaryRecord {
            period,
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap(),
            rows: 100,
            initial_capital: 10_000.0,
            net_pnl: 12.5,
            total_return_pct,
            sharpe_ratio: 1.23456,
            max_drawdown_pct: -3.14159,
            win_rate_pct: 51.24,
            trades_per_year: 1234.6,
            avg_hold_hours: 2.0,
            total_volume_usd: 1.0,
            avg_daily_volume: 1.0,
            avg_hourly_volume: 1.0,
            actual_trades: 10,
            signal_flips: 20,
        }
    }

    #[test]
    fn formats_each_column() {
        let rows = comparison_rows(&[summary(Period::Full3Mo, 4.567)]);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(
            row.cells(),
            ["Full 3 Months", "4.57", "1.235", "-3.14", "51.2", "1235"]
        );
    }

    #[test]
    fn one_row_per_distinct_period_in_summary_order() {
        let rows = comparison_rows(&[
            summary(Period::Prior2Mo, 1.0),
            summary(Period::LastMonth, 2.0),
            summary(Period::Prior2Mo, 3.0),
        ]);
        let periods: Vec<Period> = rows.iter().map(|r| r.period).collect();
        assert_eq!(periods, vec![Period::Prior2Mo, Period::LastMonth]);
        assert_eq!(rows[0].return_pct, "1.00");
    }
}
