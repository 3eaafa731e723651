use crate::bootstrap::Startup;
use pulse_application::loading::{load_backtest_data, DashboardData, LoadError};
use pulse_application::views::PeriodView;
use pulse_domain::value_objects::period::Period;
use pulse_infrastructure::results::CsvResultsRepository;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadlessMode {
    Summary,
    Compare,
    Validate,
}

impl HeadlessMode {
    pub fn id(self) -> &'static str {
        match self {
            HeadlessMode::Summary => "summary",
            HeadlessMode::Compare => "compare",
            HeadlessMode::Validate => "validate",
        }
    }
}

pub struct HeadlessArgs {
    pub mode: HeadlessMode,
    pub startup: Startup,
    pub period: Option<Period>,
}

#[derive(Debug)]
pub enum HeadlessError {
    Load(LoadError),
    Other(String),
}

impl HeadlessError {
    /// 2 when an input file is missing, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            HeadlessError::Load(LoadError::NotFound(_)) => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for HeadlessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeadlessError::Load(err) => write!(f, "{err}"),
            HeadlessError::Other(msg) => f.write_str(msg),
        }
    }
}

impl From<LoadError> for HeadlessError {
    fn from(err: LoadError) -> Self {
        HeadlessError::Load(err)
    }
}

pub fn run_headless(args: HeadlessArgs) -> Result<serde_json::Value, HeadlessError> {
    let results_dir = args.startup.results_dir();
    let span = tracing::info_span!("headless", mode = args.mode.id());
    let _enter = span.enter();

    let data = load_backtest_data(&results_dir, &CsvResultsRepository::new())?;
    match args.mode {
        HeadlessMode::Summary => {
            let period = args.period.unwrap_or(args.startup.settings.default_period);
            run_summary(&data, period, &args.startup)
        }
        HeadlessMode::Compare => Ok(run_compare(&data)),
        HeadlessMode::Validate => Ok(run_validate(&data)),
    }
}

fn run_summary(
    data: &DashboardData,
    period: Period,
    startup: &Startup,
) -> Result<serde_json::Value, HeadlessError> {
    let view =
        PeriodView::build(data, period, &startup.settings).map_err(HeadlessError::Other)?;
    let metrics: Vec<serde_json::Value> = view
        .metrics
        .iter()
        .map(|m| serde_json::json!({ "metric": m.metric, "value": m.value }))
        .collect();
    Ok(serde_json::json!({
        "mode": "summary",
        "results_dir": data.results_dir().display().to_string(),
        "period": period.id(),
        "label": period.label(),
        "header": view.header.lines(),
        "metrics": metrics,
        "rows": view.rows,
        "trimmed_rows": view.trimmed_rows,
        "trade_events": view.trade_log.len(),
        "signal_distribution": view.signal_distribution,
        "daily_volume": view.daily_volume,
    }))
}

fn run_compare(data: &DashboardData) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = data
        .comparison()
        .iter()
        .map(|row| {
            serde_json::json!({
                "period": row.period.id(),
                "label": row.label,
                "return_pct": row.return_pct,
                "sharpe": row.sharpe,
                "max_drawdown_pct": row.max_drawdown_pct,
                "win_rate_pct": row.win_rate_pct,
                "trades_per_year": row.trades_per_year,
            })
        })
        .collect();
    serde_json::json!({
        "mode": "compare",
        "results_dir": data.results_dir().display().to_string(),
        "rows": rows,
    })
}

fn run_validate(data: &DashboardData) -> serde_json::Value {
    let periods: Vec<serde_json::Value> = data
        .timelines()
        .iter()
        .map(|timeline| {
            let period = timeline.period();
            serde_json::json!({
                "period": period.id(),
                "rows": timeline.len(),
                "trimmed_rows": timeline.trimmed_rows(),
                "positive_equity": timeline.has_positive_equity(),
                "has_summary": data.period_summary(period).is_ok(),
                "first_timestamp": timeline.rows().first().map(|r| r.timestamp.to_rfc3339()),
                "last_timestamp": timeline.rows().last().map(|r| r.timestamp.to_rfc3339()),
            })
        })
        .collect();
    let ok = data.timelines().iter().all(|t| t.has_positive_equity())
        && Period::ALL.iter().all(|p| data.period_summary(*p).is_ok());
    serde_json::json!({
        "mode": "validate",
        "status": if ok { "ok" } else { "warn" },
        "results_dir": data.results_dir().display().to_string(),
        "summary_rows": data.summaries().len(),
        "periods": periods,
    })
}
