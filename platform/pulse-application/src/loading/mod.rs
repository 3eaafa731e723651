use pulse_domain::entities::timeline::PeriodTimeline;
use pulse_domain::repositories::results::{expected_files, ResultsRepository, SUMMARY_FILE};
use pulse_domain::services::comparison::{comparison_rows, ComparisonRow};
use pulse_domain::value_objects::period::Period;
use pulse_domain::value_objects::summary_record::SummaryRecord;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    NotFound(PathBuf),
    Invalid(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::NotFound(path) => write!(f, "results file not found: {}", path.display()),
            LoadError::Invalid(message) => write!(f, "invalid results data: {message}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl LoadError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound(_))
    }
}

/// Everything the dashboard renders, loaded once per (re)load.
#[derive(Debug, Clone)]
pub struct DashboardData {
    results_dir: PathBuf,
    summaries: Vec<SummaryRecord>,
    // One per period, in `Period::ALL` order.
    timelines: Vec<PeriodTimeline>,
}

impl DashboardData {
    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    pub fn summaries(&self) -> &[SummaryRecord] {
        &self.summaries
    }

    pub fn timeline(&self, period: Period) -> &PeriodTimeline {
        &self.timelines[period.index()]
    }

    pub fn timelines(&self) -> &[PeriodTimeline] {
        &self.timelines
    }

    pub fn period_summary(&self, period: Period) -> Result<&SummaryRecord, String> {
        self.summaries
            .iter()
            .find(|s| s.period == period)
            .ok_or_else(|| format!("no summary row for period {}", period.id()))
    }

    pub fn comparison(&self) -> Vec<ComparisonRow> {
        comparison_rows(&self.summaries)
    }
}

pub fn load_backtest_data(
    results_dir: &Path,
    repo: &dyn ResultsRepository,
) -> Result<DashboardData, LoadError> {
    let span = tracing::info_span!(
        "load_backtest_data",
        results_dir = %results_dir.display()
    );
    let _enter = span.enter();
    let start = Instant::now();

    let result = load_all(results_dir, repo);
    let outcome = if result.is_ok() { "ok" } else { "err" };
    metrics::histogram!("pulse.load.duration_ms", "result" => outcome)
        .record(start.elapsed().as_secs_f64() * 1000.0);

    match &result {
        Ok(data) => tracing::info!(
            summaries = data.summaries.len(),
            rows = data.timelines.iter().map(|t| t.len()).sum::<usize>(),
            "loaded backtest results"
        ),
        Err(err) => tracing::error!(error = %err, "failed to load backtest results"),
    }
    result
}

fn load_all(results_dir: &Path, repo: &dyn ResultsRepository) -> Result<DashboardData, LoadError> {
    for path in expected_files(results_dir) {
        if !repo.exists(&path) {
            return Err(LoadError::NotFound(path));
        }
    }

    let summaries = repo
        .load_summary(&results_dir.join(SUMMARY_FILE))
        .map_err(LoadError::Invalid)?;

    let mut timelines = Vec::with_capacity(Period::ALL.len());
    for period in Period::ALL {
        let path = results_dir.join(period.timeline_file());
        let rows = repo.load_timeline(&path).map_err(LoadError::Invalid)?;
        let timeline = PeriodTimeline::new(period, rows).map_err(LoadError::Invalid)?;

        if !timeline.has_positive_equity() {
            tracing::warn!(
                period = period.id(),
                rows = timeline.len(),
                "timeline has no positive equity; warm-up trim skipped"
            );
        }
        metrics::gauge!("pulse.load.rows", "period" => period.id()).set(timeline.len() as f64);
        metrics::gauge!("pulse.load.trimmed_rows", "period" => period.id())
            .set(timeline.trimmed_rows() as f64);
        tracing::debug!(
            period = period.id(),
            rows = timeline.len(),
            trimmed = timeline.trimmed_rows(),
            "timeline ready"
        );
        timelines.push(timeline);
    }

    Ok(DashboardData {
        results_dir: results_dir.to_path_buf(),
        summaries,
        timelines,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use pulse_domain::repositories::results::ResultsRepository;
    use pulse_domain::value_objects::period::Period;
    use pulse_domain::value_objects::signal::Signal;
    use pulse_domain::value_objects::summary_record::SummaryRecord;
    use pulse_domain::value_objects::timeline_row::TimelineRow;
    use chrono::{TimeZone, Utc};
    use std::collections::{HashMap, HashSet};
    use std::path::{Path, PathBuf};

    #[derive(Default)]
    pub struct InMemoryResults {
        pub missing: HashSet<PathBuf>,
        pub summaries: Vec<SummaryRecord>,
        pub timelines: HashMap<PathBuf, Vec<TimelineRow>>,
        pub timeline_error: Option<String>,
    }

    impl ResultsRepository for InMemoryResults {
        fn exists(&self, path: &Path) -> bool {
            !self.missing.contains(path)
        }

        fn load_summary(&self, _path: &Path) -> Result<Vec<SummaryRecord>, String> {
            Ok(self.summaries.clone())
        }

        fn load_timeline(&self, path: &Path) -> Result<Vec<TimelineRow>, String> {
            if let Some(err) = &self.timeline_error {
                return Err(err.clone());
            }
            Ok(self.timelines.get(path).cloned().unwrap_or_default())
        }
    }

    pub fn summary(period: Period) -> SummaryRecord {
        SummaryRecord {
            period,
            start_date: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 0).unwrap(),
            rows: 44_640,
            initial_capital: 10_000.0,
            net_pnl: 1_234.567,
            total_return_pct: 12.34567,
            sharpe_ratio: 1.23456,
            max_drawdown_pct: -4.321,
            win_rate_pct: 55.54,
            trades_per_year: 1_234.4,
            avg_hold_hours: 3.14159,
            total_volume_usd: 1_234_567.4,
            avg_daily_volume: 41_152.2,
            avg_hourly_volume: 1_714.7,
            actual_trades: 1_523,
            signal_flips: 2_048,
        }
    }

    /// Minute bars starting 2024-03-01T23:55Z: two warm-up rows, then equity
    /// climbing from 10_000 with an entry on bar 3 and an exit on bar 5.
    pub fn rows() -> Vec<TimelineRow> {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 23, 55, 0).unwrap();
        (0..8)
            .map(|i| {
                let equity = if i < 2 { 0.0 } else { 10_000.0 + (i as f64 - 2.0) * 10.0 };
                TimelineRow {
                    timestamp: start + chrono::Duration::minutes(i),
                    equity: Some(equity),
                    volume_usd: Some(100.0),
                    signal: Some(if i < 4 { Signal::Neutral } else { Signal::Long }),
                    price: Some(62_000.0 + i as f64),
                    qty: Some(0.1),
                    pnl: if i == 5 { Some(25.0) } else { None },
                    is_entry: i == 3,
                    is_exit: i == 5,
                }
            })
            .collect()
    }

    pub fn full_results(dir: &Path) -> InMemoryResults {
        let mut repo = InMemoryResults {
            summaries: Period::ALL.iter().map(|p| summary(*p)).collect(),
            ..InMemoryResults::default()
        };
        for period in Period::ALL {
            repo.timelines.insert(dir.join(period.timeline_file()), rows());
        }
        repo
    }
}
