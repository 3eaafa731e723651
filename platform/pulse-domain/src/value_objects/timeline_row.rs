use crate::value_objects::signal::Signal;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One bar of a `timeline_*.csv` file. Numeric cells the engine left empty
/// are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineRow {
    pub timestamp: DateTime<Utc>,
    pub equity: Option<f64>,
    pub volume_usd: Option<f64>,
    pub signal: Option<Signal>,
    pub price: Option<f64>,
    pub qty: Option<f64>,
    pub pnl: Option<f64>,
    pub is_entry: bool,
    pub is_exit: bool,
}

impl TimelineRow {
    pub fn is_trade_event(&self) -> bool {
        self.is_entry || self.is_exit
    }

    pub fn has_positive_equity(&self) -> bool {
        self.equity.is_some_and(|e| e > 0.0)
    }
}
