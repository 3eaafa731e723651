use crate::value_objects::period::Period;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One row of `performance_summary.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRecord {
    pub period: Period,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub rows: u64,
    pub initial_capital: f64,
    pub net_pnl: f64,
    pub total_return_pct: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown_pct: f64,
    pub win_rate_pct: f64,
    pub trades_per_year: f64,
    pub avg_hold_hours: f64,
    pub total_volume_usd: f64,
    pub avg_daily_volume: f64,
    pub avg_hourly_volume: f64,
    pub actual_trades: u64,
    pub signal_flips: u64,
}
