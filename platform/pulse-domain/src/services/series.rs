use crate::value_objects::timeline_row::TimelineRow;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

pub fn forward_fill(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last: Option<f64> = None;
    values
        .iter()
        .map(|v| {
            if v.is_some() {
                last = *v;
            }
            last
        })
        .collect()
}

pub fn cumulative_pnl(equity: &[Option<f64>], initial_capital: f64) -> Vec<Option<f64>> {
    equity
        .iter()
        .map(|e| e.map(|e| e - initial_capital))
        .collect()
}

/// Bar-over-bar relative change. The first bar, gaps and non-finite ratios
/// (previous equity of zero) read as no change. pandas would keep `inf` for
/// a step up from zero equity; here it is 0 so chart bounds stay finite.
pub fn pct_change(equity: &[Option<f64>]) -> Vec<f64> {
    let mut out = Vec::with_capacity(equity.len());
    let mut prev: Option<f64> = None;
    for value in equity {
        let change = match (prev, *value) {
            (Some(p), Some(v)) => {
                let c = v / p - 1.0;
                if c.is_finite() {
                    c
                } else {
                    0.0
                }
            }
            _ => 0.0,
        };
        out.push(change);
        prev = *value;
    }
    out
}

/// Trailing sample standard deviation (n - 1 denominator).
#[derive(Debug, Clone)]
pub struct RollingStd {
    window: usize,
    buf: VecDeque<f64>,
    sum: f64,
    sum_sq: f64,
}

impl RollingStd {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            buf: VecDeque::new(),
            sum: 0.0,
            sum_sq: 0.0,
        }
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        if self.window < 2 {
            return None;
        }

        self.buf.push_back(value);
        self.sum += value;
        self.sum_sq += value * value;
        while self.buf.len() > self.window {
            if let Some(front) = self.buf.pop_front() {
                self.sum -= front;
                self.sum_sq -= front * front;
            }
        }

        if self.buf.len() == self.window {
            let n = self.window as f64;
            let var = (self.sum_sq - self.sum * self.sum / n) / (n - 1.0);
            Some(var.max(0.0).sqrt())
        } else {
            None
        }
    }
}

pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut roll = RollingStd::new(window);
    values.iter().map(|v| roll.update(*v)).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyVolume {
    pub date: NaiveDate,
    pub volume_usd: f64,
}

/// Sums `volume_usd` per UTC calendar date, ascending.
pub fn daily_volume(rows: &[TimelineRow]) -> Vec<DailyVolume> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in rows {
        let entry = by_date.entry(row.timestamp.date_naive()).or_insert(0.0);
        if let Some(v) = row.volume_usd {
            *entry += v;
        }
    }
    by_date
        .into_iter()
        .map(|(date, volume_usd)| DailyVolume { date, volume_usd })
        .collect()
}

/// Pairs x values with present y values, skipping gaps.
pub fn zip_points(xs: &[i64], ys: &[Option<f64>]) -> Vec<(f64, f64)> {
    xs.iter()
        .zip(ys)
        .filter_map(|(x, y)| y.map(|y| (*x as f64, y)))
        .collect()
}

/// Evenly strided subset of at most `max` points keeping both ends.
pub fn downsample<T: Copy>(points: &[T], max: usize) -> Vec<T> {
    if points.len() <= max {
        return points.to_vec();
    }
    match max {
        0 => Vec::new(),
        1 => points.last().copied().into_iter().collect(),
        _ => {
            let step = (points.len() - 1) as f64 / (max - 1) as f64;
            (0..max)
                .map(|i| points[((i as f64) * step).round() as usize])
                .collect()
        }
    }
}
