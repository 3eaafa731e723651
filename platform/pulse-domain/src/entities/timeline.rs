use crate::value_objects::period::Period;
use crate::value_objects::timeline_row::TimelineRow;

/// Time-indexed timeline for one period, validated and warm-up trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodTimeline {
    period: Period,
    rows: Vec<TimelineRow>,
    trimmed_rows: usize,
}

impl PeriodTimeline {
    /// Rejects timestamps that are not strictly increasing, then drops every
    /// row before the first one with positive equity. A timeline without any
    /// positive equity is kept whole.
    pub fn new(period: Period, rows: Vec<TimelineRow>) -> Result<Self, String> {
        ensure_strictly_increasing(period, &rows)?;
        let (rows, trimmed_rows) = trim_warmup(rows);
        Ok(Self {
            period,
            rows,
            trimmed_rows,
        })
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn rows(&self) -> &[TimelineRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn trimmed_rows(&self) -> usize {
        self.trimmed_rows
    }

    pub fn has_positive_equity(&self) -> bool {
        self.rows.first().is_some_and(TimelineRow::has_positive_equity)
    }

    pub fn equity(&self) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.equity).collect()
    }

    pub fn timestamps(&self) -> Vec<i64> {
        self.rows.iter().map(|r| r.timestamp.timestamp()).collect()
    }
}

fn ensure_strictly_increasing(period: Period, rows: &[TimelineRow]) -> Result<(), String> {
    for (idx, pair) in rows.windows(2).enumerate() {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(format!(
                "timeline {} is not strictly increasing at row {}: {} follows {}",
                period.id(),
                idx + 1,
                pair[1].timestamp.to_rfc3339(),
                pair[0].timestamp.to_rfc3339()
            ));
        }
    }
    Ok(())
}

pub fn trim_warmup(mut rows: Vec<TimelineRow>) -> (Vec<TimelineRow>, usize) {
    match rows.iter().position(TimelineRow::has_positive_equity) {
        Some(first) if first > 0 => {
            rows.drain(..first);
            (rows, first)
        }
        _ => (rows, 0),
    }
}
