//! Display artefacts for one period, computed once per load or period switch
//! so the renderer only walks prepared vectors.

use crate::config::DisplaySettings;
use crate::loading::DashboardData;
use pulse_domain::services::format::{format_count, format_fixed, format_thousands};
use pulse_domain::services::series::{
    cumulative_pnl, daily_volume, downsample, forward_fill, pct_change, rolling_std, zip_points,
    DailyVolume,
};
use pulse_domain::services::trades::{
    entry_markers, exit_markers, signal_distribution, trade_events, SignalCount,
};
use pulse_domain::value_objects::period::Period;
use pulse_domain::value_objects::summary_record::SummaryRecord;
use pulse_domain::value_objects::timeline_row::TimelineRow;
use serde::Serialize;

pub const TRADE_LOG_HEADERS: [&str; 9] = [
    "timestamp",
    "signal",
    "price",
    "qty",
    "pnl",
    "equity",
    "volume_usd",
    "is_entry",
    "is_exit",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub metric: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodHeader {
    pub range: String,
    pub data_points: String,
    pub initial_capital: String,
}

impl PeriodHeader {
    pub fn lines(&self) -> [&str; 3] {
        [&self.range, &self.data_points, &self.initial_capital]
    }
}

/// Chart series as `(epoch seconds, value)` pairs, already capped to the
/// configured point budget.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub equity: Vec<(f64, f64)>,
    pub cumulative_pnl: Vec<(f64, f64)>,
    pub pct_change: Vec<(f64, f64)>,
    pub rolling_volatility: Vec<(f64, f64)>,
    pub signal: Vec<(f64, f64)>,
    pub entries: Vec<(f64, f64)>,
    pub exits: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodView {
    pub period: Period,
    pub header: PeriodHeader,
    pub metrics: Vec<MetricRow>,
    pub series: ChartSeries,
    pub rolling_window: usize,
    pub daily_volume: Vec<DailyVolume>,
    pub trade_log: Vec<TimelineRow>,
    pub signal_distribution: Vec<SignalCount>,
    pub rows: usize,
    pub trimmed_rows: usize,
}

impl PeriodView {
    pub fn build(
        data: &DashboardData,
        period: Period,
        settings: &DisplaySettings,
    ) -> Result<Self, String> {
        let summary = data.period_summary(period)?;
        let timeline = data.timeline(period);
        let rows = timeline.rows();
        let xs = timeline.timestamps();
        let max_points = settings.max_chart_points;

        let equity = forward_fill(&timeline.equity());
        let pnl = cumulative_pnl(&equity, summary.initial_capital);
        let changes = pct_change(&equity);
        let volatility = rolling_std(&changes, settings.rolling_window);

        let pct_points: Vec<(f64, f64)> = xs
            .iter()
            .zip(&changes)
            .map(|(x, c)| (*x as f64, c * 100.0))
            .collect();
        let vol_points = zip_points(
            &xs,
            &volatility
                .iter()
                .map(|v| v.map(|v| v * 100.0))
                .collect::<Vec<_>>(),
        );
        let signal_points: Vec<(f64, f64)> = rows
            .iter()
            .map(|r| {
                let value = r.signal.map(|s| f64::from(s.value())).unwrap_or(0.0);
                (r.timestamp.timestamp() as f64, value)
            })
            .collect();

        let events = trade_events(rows);
        let series = ChartSeries {
            equity: downsample(&zip_points(&xs, &equity), max_points),
            cumulative_pnl: downsample(&zip_points(&xs, &pnl), max_points),
            pct_change: downsample(&pct_points, max_points),
            rolling_volatility: downsample(&vol_points, max_points),
            signal: downsample(&signal_points, max_points),
            entries: entry_markers(rows),
            exits: exit_markers(rows),
        };

        Ok(Self {
            period,
            header: header(summary),
            metrics: metric_rows(summary),
            series,
            rolling_window: settings.rolling_window,
            daily_volume: daily_volume(rows),
            signal_distribution: signal_distribution(&events),
            trade_log: events,
            rows: timeline.len(),
            trimmed_rows: timeline.trimmed_rows(),
        })
    }

    pub fn has_trades(&self) -> bool {
        !self.trade_log.is_empty()
    }
}

fn header(summary: &SummaryRecord) -> PeriodHeader {
    PeriodHeader {
        range: format!(
            "Period: {} to {}",
            summary.start_date.format("%Y-%m-%d"),
            summary.end_date.format("%Y-%m-%d")
        ),
        data_points: format!("Data Points: {} bars", summary.rows),
        initial_capital: format!(
            "Initial Capital (USD): {}",
            format_fixed(summary.initial_capital, 2)
        ),
    }
}

pub fn metric_rows(summary: &SummaryRecord) -> Vec<MetricRow> {
    let row = |metric: &'static str, value: String| MetricRow { metric, value };
    vec![
        row("Net PnL (USD)", format_fixed(summary.net_pnl, 2)),
        row("Total Return (%)", format_fixed(summary.total_return_pct, 2)),
        row("Sharpe Ratio", format_fixed(summary.sharpe_ratio, 3)),
        row("Max Drawdown (%)", format_fixed(summary.max_drawdown_pct, 2)),
        row("Win Rate (%)", format_fixed(summary.win_rate_pct, 1)),
        row("Trades Per Year", format_fixed(summary.trades_per_year, 0)),
        row("Avg Hold Time (hrs)", format_fixed(summary.avg_hold_hours, 2)),
        row("Total Volume (USD)", format_thousands(summary.total_volume_usd, 0)),
        row("Daily Volume (USD)", format_thousands(summary.avg_daily_volume, 0)),
        row("Hourly Volume (USD)", format_thousands(summary.avg_hourly_volume, 0)),
        row("Actual Trades", format_count(summary.actual_trades)),
        row("Signal Flips", format_count(summary.signal_flips)),
    ]
}

/// Trade log cells in `TRADE_LOG_HEADERS` order; missing values render empty.
pub fn trade_log_cells(row: &TimelineRow) -> [String; 9] {
    let opt = |v: Option<f64>, decimals: usize| {
        v.map(|v| format_fixed(v, decimals)).unwrap_or_default()
    };
    [
        row.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        row.signal.map(|s| s.value().to_string()).unwrap_or_default(),
        opt(row.price, 2),
        opt(row.qty, 6),
        opt(row.pnl, 2),
        opt(row.equity, 2),
        opt(row.volume_usd, 2),
        bool_cell(row.is_entry).to_string(),
        bool_cell(row.is_exit).to_string(),
    ]
}

fn bool_cell(flag: bool) -> &'static str {
    if flag {
        "True"
    } else {
        "False"
    }
}
