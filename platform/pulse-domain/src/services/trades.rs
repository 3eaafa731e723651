use crate::value_objects::signal::Signal;
use crate::value_objects::timeline_row::TimelineRow;
use serde::Serialize;

/// Rows flagged as entry, exit or both, in timeline order.
pub fn trade_events(rows: &[TimelineRow]) -> Vec<TimelineRow> {
    rows.iter().filter(|r| r.is_trade_event()).cloned().collect()
}

pub fn entry_markers(rows: &[TimelineRow]) -> Vec<(f64, f64)> {
    markers(rows, |r| r.is_entry)
}

pub fn exit_markers(rows: &[TimelineRow]) -> Vec<(f64, f64)> {
    markers(rows, |r| r.is_exit)
}

fn markers(rows: &[TimelineRow], keep: impl Fn(&TimelineRow) -> bool) -> Vec<(f64, f64)> {
    rows.iter()
        .filter(|r| keep(r))
        .filter_map(|r| r.equity.map(|e| (r.timestamp.timestamp() as f64, e)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalCount {
    pub signal: Signal,
    pub label: &'static str,
    pub count: usize,
}

/// Signal counts over trade events, most frequent first. Rows without a
/// signal are not counted; signals that never occur are omitted.
pub fn signal_distribution(events: &[TimelineRow]) -> Vec<SignalCount> {
    let mut counts: Vec<SignalCount> = [Signal::Long, Signal::Short, Signal::Neutral]
        .into_iter()
        .map(|signal| SignalCount {
            signal,
            label: signal.distribution_label(),
            count: events.iter().filter(|r| r.signal == Some(signal)).count(),
        })
        .filter(|c| c.count > 0)
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
