mod timestamps;

pub use timestamps::parse_timestamp;

use pulse_domain::repositories::results::ResultsRepository;
use pulse_domain::value_objects::period::Period;
use pulse_domain::value_objects::signal::Signal;
use pulse_domain::value_objects::summary_record::SummaryRecord;
use pulse_domain::value_objects::timeline_row::TimelineRow;
use std::path::Path;
use std::time::Instant;

const REQUIRED_TIMELINE_COLUMNS: [&str; 5] =
    ["equity", "volume_usd", "signal", "is_entry", "is_exit"];

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvResultsRepository;

impl CsvResultsRepository {
    pub fn new() -> Self {
        Self
    }
}

fn record_read_metrics<T>(
    kind: &'static str,
    path: &Path,
    start: Instant,
    result: &Result<Vec<T>, String>,
) {
    let result_label = if result.is_ok() { "ok" } else { "err" };
    match result {
        Ok(records) => tracing::debug!(
            kind,
            path = %path.display(),
            records = records.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "results file read"
        ),
        Err(err) => tracing::warn!(
            kind,
            path = %path.display(),
            error = %err,
            "results file read failed"
        ),
    }
    metrics::counter!(
        "pulse.infra.results.read.calls_total",
        "kind" => kind,
        "result" => result_label
    )
    .increment(1);
    metrics::histogram!("pulse.infra.results.read_ms", "kind" => kind, "result" => result_label)
        .record(start.elapsed().as_millis() as f64);
}

impl ResultsRepository for CsvResultsRepository {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn load_summary(&self, path: &Path) -> Result<Vec<SummaryRecord>, String> {
        let start = Instant::now();
        let result = read_summary_csv(path);
        record_read_metrics("summary_csv", path, start, &result);
        result
    }

    fn load_timeline(&self, path: &Path) -> Result<Vec<TimelineRow>, String> {
        let start = Instant::now();
        let result = read_timeline_csv(path);
        record_read_metrics("timeline_csv", path, start, &result);
        result
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
struct SummaryCsvRecord {
    period: String,
    start_date: String,
    end_date: String,
    rows: f64,
    initial_capital: f64,
    // pandas writes NaN metrics as empty cells
    net_pnl: Option<f64>,
    total_return_pct: Option<f64>,
    sharpe_ratio: Option<f64>,
    max_drawdown_pct: Option<f64>,
    win_rate_pct: Option<f64>,
    trades_per_year: Option<f64>,
    avg_hold_hours: Option<f64>,
    total_volume_usd: Option<f64>,
    avg_daily_volume: Option<f64>,
    avg_hourly_volume: Option<f64>,
    actual_trades: f64,
    signal_flips: f64,
}

pub fn read_summary_csv(path: &Path) -> Result<Vec<SummaryRecord>, String> {
    let mut rdr = csv::Reader::from_path(path)
        .map_err(|err| format!("failed to open summary csv {}: {}", path.display(), err))?;
    let mut records = Vec::new();
    for (idx, result) in rdr.deserialize::<SummaryCsvRecord>().enumerate() {
        let record = result.map_err(|err| {
            format!(
                "failed to parse summary record {} in {}: {}",
                idx + 1,
                path.display(),
                err
            )
        })?;
        records.push(summary_from_record(record).map_err(|err| {
            format!(
                "invalid summary record {} in {}: {}",
                idx + 1,
                path.display(),
                err
            )
        })?);
    }
    Ok(records)
}

fn summary_from_record(record: SummaryCsvRecord) -> Result<SummaryRecord, String> {
    Ok(SummaryRecord {
        period: Period::parse(&record.period)?,
        start_date: parse_timestamp(&record.start_date)?,
        end_date: parse_timestamp(&record.end_date)?,
        rows: to_count("rows", record.rows)?,
        initial_capital: record.initial_capital,
        net_pnl: record.net_pnl.unwrap_or(f64::NAN),
        total_return_pct: record.total_return_pct.unwrap_or(f64::NAN),
        sharpe_ratio: record.sharpe_ratio.unwrap_or(f64::NAN),
        max_drawdown_pct: record.max_drawdown_pct.unwrap_or(f64::NAN),
        win_rate_pct: record.win_rate_pct.unwrap_or(f64::NAN),
        trades_per_year: record.trades_per_year.unwrap_or(f64::NAN),
        avg_hold_hours: record.avg_hold_hours.unwrap_or(f64::NAN),
        total_volume_usd: record.total_volume_usd.unwrap_or(f64::NAN),
        avg_daily_volume: record.avg_daily_volume.unwrap_or(f64::NAN),
        avg_hourly_volume: record.avg_hourly_volume.unwrap_or(f64::NAN),
        actual_trades: to_count("actual_trades", record.actual_trades)?,
        signal_flips: to_count("signal_flips", record.signal_flips)?,
    })
}

fn to_count(field: &str, value: f64) -> Result<u64, String> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(format!("{field} must be a non-negative integer, got {value}"));
    }
    Ok(value as u64)
}

struct TimelineColumns {
    equity: usize,
    volume_usd: usize,
    signal: usize,
    is_entry: usize,
    is_exit: usize,
    price: Option<usize>,
    qty: Option<usize>,
    pnl: Option<usize>,
}

impl TimelineColumns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, String> {
        if headers.is_empty() {
            return Err("missing header row".to_string());
        }
        // column 0 is the index, never a named field
        let find = |name: &str| {
            headers
                .iter()
                .skip(1)
                .position(|h| h.trim() == name)
                .map(|i| i + 1)
        };
        let missing: Vec<&str> = REQUIRED_TIMELINE_COLUMNS
            .into_iter()
            .filter(|name| find(*name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(format!("missing column(s): {}", missing.join(", ")));
        }
        let required = |name: &str| find(name).ok_or_else(|| format!("missing column '{name}'"));
        Ok(Self {
            equity: required("equity")?,
            volume_usd: required("volume_usd")?,
            signal: required("signal")?,
            is_entry: required("is_entry")?,
            is_exit: required("is_exit")?,
            price: find("price"),
            qty: find("qty"),
            pnl: find("pnl"),
        })
    }
}

/// Reads a timeline file. The first column is the timestamp index whatever
/// its header; `price`, `qty` and `pnl` are optional columns.
pub fn read_timeline_csv(path: &Path) -> Result<Vec<TimelineRow>, String> {
    let mut rdr = csv::Reader::from_path(path)
        .map_err(|err| format!("failed to open timeline csv {}: {}", path.display(), err))?;
    let headers = rdr
        .headers()
        .map_err(|err| format!("failed to read timeline header {}: {}", path.display(), err))?
        .clone();
    let columns = TimelineColumns::from_headers(&headers)
        .map_err(|err| format!("invalid timeline csv {}: {}", path.display(), err))?;

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(|err| {
            format!(
                "failed to read timeline record {} in {}: {}",
                idx + 1,
                path.display(),
                err
            )
        })?;
        let row = timeline_row(&record, &columns).map_err(|err| {
            format!(
                "invalid timeline record {} in {}: {}",
                idx + 1,
                path.display(),
                err
            )
        })?;
        rows.push(row);
    }
    Ok(rows)
}

fn timeline_row(
    record: &csv::StringRecord,
    columns: &TimelineColumns,
) -> Result<TimelineRow, String> {
    let cell = |idx: usize| record.get(idx).unwrap_or("");
    let optional = |idx: Option<usize>, name: &str| match idx {
        Some(idx) => parse_optional_f64(name, cell(idx)),
        None => Ok(None),
    };

    let raw_signal = cell(columns.signal).trim();
    let signal = if raw_signal.is_empty() || raw_signal.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(Signal::parse(raw_signal)?)
    };

    Ok(TimelineRow {
        timestamp: parse_timestamp(cell(0))?,
        equity: parse_optional_f64("equity", cell(columns.equity))?,
        volume_usd: parse_optional_f64("volume_usd", cell(columns.volume_usd))?,
        signal,
        price: optional(columns.price, "price")?,
        qty: optional(columns.qty, "qty")?,
        pnl: optional(columns.pnl, "pnl")?,
        is_entry: parse_flag("is_entry", cell(columns.is_entry))?,
        is_exit: parse_flag("is_exit", cell(columns.is_exit))?,
    })
}

fn parse_optional_f64(name: &str, raw: &str) -> Result<Option<f64>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| format!("invalid {name} value '{raw}'"))?;
    Ok(if value.is_nan() { None } else { Some(value) })
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, String> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "1.0" => Ok(true),
        "false" | "0" | "0.0" | "" => Ok(false),
        other => Err(format!("invalid {name} flag '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::{read_summary_csv, read_timeline_csv, CsvResultsRepository};
    use pulse_domain::repositories::results::ResultsRepository;
    use pulse_domain::value_objects::period::Period;
    use pulse_domain::value_objects::signal::Signal;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_tmp_dir(prefix: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let dir =
            std::env::temp_dir().join(format!("pulse_{prefix}_{}_{}", std::process::id(), now));
        let _ = fs::create_dir_all(&dir);
        dir
    }

    const SUMMARY_HEADER: &str = "period,start_date,end_date,rows,initial_capital,net_pnl,total_return_pct,sharpe_ratio,max_drawdown_pct,win_rate_pct,trades_per_year,avg_hold_hours,total_volume_usd,avg_daily_volume,avg_hourly_volume,actual_trades,signal_flips";

    #[test]
    fn reads_summary_rows() {
        let dir = unique_tmp_dir("summary_read");
        let path = dir.join("performance_summary.csv");
        fs::write(
            &path,
            format!(
                "{SUMMARY_HEADER}\n\
                 last_month,2024-03-01 00:00:00,2024-03-31 23:59:00,44640,10000.0,152.3,1.523,2.1,-0.8,54.5,3100.0,1.75,1234567.8,41152.2,1714.6,269,1200\n\
                 full_3mo,2024-01-01,2024-03-31,131040.0,10000,400,4.0,1.9,-2.2,52.0,2900,2.0,3000000,33000,1375,700.0,3500\n"
            ),
        )
        .expect("write");

        let summaries = read_summary_csv(&path).expect("read");
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].period, Period::LastMonth);
        assert_eq!(summaries[0].rows, 44_640);
        assert_eq!(summaries[0].actual_trades, 269);
        assert_eq!(summaries[1].period, Period::Full3Mo);
        assert_eq!(summaries[1].rows, 131_040);
        assert_eq!(
            summaries[1].end_date.format("%Y-%m-%d").to_string(),
            "2024-03-31"
        );
    }

    #[test]
    fn summary_reads_empty_metric_cells_as_nan() {
        let dir = unique_tmp_dir("summary_nan");
        let path = dir.join("performance_summary.csv");
        fs::write(
            &path,
            format!(
                "{SUMMARY_HEADER}\n\
                 prior_2mo,2024-01-01,2024-02-29,86400,10000,0.0,0.0,,0.0,,0.0,,0,0,0,0,0\n"
            ),
        )
        .expect("write");

        let summaries = read_summary_csv(&path).expect("empty metrics are nan");
        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].sharpe_ratio.is_nan());
        assert!(summaries[0].win_rate_pct.is_nan());
        assert!(summaries[0].avg_hold_hours.is_nan());
        assert_eq!(summaries[0].net_pnl, 0.0);
        assert_eq!(summaries[0].actual_trades, 0);
    }

    #[test]
    fn summary_counts_stay_required() {
        let dir = unique_tmp_dir("summary_empty_count");
        let path = dir.join("performance_summary.csv");
        fs::write(
            &path,
            format!("{SUMMARY_HEADER}\nlast_month,2024-01-01,2024-01-31,1,1,0,0,0,0,0,0,0,0,0,0,,0\n"),
        )
        .expect("write");
        let err = read_summary_csv(&path).expect_err("empty actual_trades");
        assert!(err.contains("record 1"));
    }

    #[test]
    fn summary_rejects_unknown_period_and_fractional_counts() {
        let dir = unique_tmp_dir("summary_invalid");
        let path = dir.join("performance_summary.csv");
        fs::write(
            &path,
            format!("{SUMMARY_HEADER}\nlast_year,2024-01-01,2024-01-31,1,1,0,0,0,0,0,0,0,0,0,0,0,0\n"),
        )
        .expect("write");
        let err = read_summary_csv(&path).expect_err("unknown period");
        assert!(err.contains("unknown period"));

        fs::write(
            &path,
            format!("{SUMMARY_HEADER}\nlast_month,2024-01-01,2024-01-31,1.5,1,0,0,0,0,0,0,0,0,0,0,0,0\n"),
        )
        .expect("write");
        let err = read_summary_csv(&path).expect_err("fractional rows");
        assert!(err.contains("rows"));
    }

    #[test]
    fn reads_timeline_with_pandas_index_and_booleans() {
        let dir = unique_tmp_dir("timeline_read");
        let path = dir.join("timeline_last_month.csv");
        fs::write(
            &path,
            ",equity,volume_usd,signal,price,qty,pnl,is_entry,is_exit\n\
             2024-03-01 00:00:00,0.0,0.0,,,,,False,False\n\
             2024-03-01 00:01:00,10000.0,1260.0,1.0,42000.0,0.03,,True,False\n\
             2024-03-01 00:02:00,,0.0,0,42010.0,0.0,0.3,False,True\n",
        )
        .expect("write");

        let rows = read_timeline_csv(&path).expect("read");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].signal, None);
        assert_eq!(rows[1].equity, Some(10_000.0));
        assert_eq!(rows[1].signal, Some(Signal::Long));
        assert!(rows[1].is_entry && !rows[1].is_exit);
        assert_eq!(rows[2].equity, None);
        assert_eq!(rows[2].pnl, Some(0.3));
        assert!(rows[2].is_exit);
    }

    #[test]
    fn timeline_price_qty_pnl_are_optional_columns() {
        let dir = unique_tmp_dir("timeline_optional");
        let path = dir.join("timeline_full_3mo.csv");
        fs::write(
            &path,
            "timestamp,equity,volume_usd,signal,is_entry,is_exit\n\
             2024-01-01T00:00:00Z,10000,0,-1,true,false\n",
        )
        .expect("write");

        let rows = read_timeline_csv(&path).expect("read");
        assert_eq!(rows[0].signal, Some(Signal::Short));
        assert_eq!(rows[0].price, None);
        assert!(rows[0].is_entry);
    }

    #[test]
    fn timeline_missing_required_column_fails() {
        let dir = unique_tmp_dir("timeline_missing_col");
        let path = dir.join("timeline_prior_2mo.csv");
        fs::write(
            &path,
            ",equity,signal,is_entry,is_exit\n2024-01-01 00:00:00,1,0,False,False\n",
        )
        .expect("write");

        let err = read_timeline_csv(&path).expect_err("missing volume_usd");
        assert!(err.contains("volume_usd"));
    }

    #[test]
    fn timeline_rejects_invalid_signal() {
        let dir = unique_tmp_dir("timeline_bad_signal");
        let path = dir.join("timeline_last_month.csv");
        fs::write(
            &path,
            ",equity,volume_usd,signal,is_entry,is_exit\n2024-01-01 00:00:00,1,0,2,False,False\n",
        )
        .expect("write");

        let err = read_timeline_csv(&path).expect_err("signal 2");
        assert!(err.contains("record 1"));
        assert!(err.contains("signal"));
    }

    #[test]
    fn timeline_nan_signal_is_missing() {
        let dir = unique_tmp_dir("timeline_nan_signal");
        let path = dir.join("timeline_last_month.csv");
        fs::write(
            &path,
            ",equity,volume_usd,signal,is_entry,is_exit\n\
             2024-01-01 00:00:00,1,0,NaN,False,False\n\
             2024-01-01 00:01:00,1,0,-1.0,False,False\n",
        )
        .expect("write");

        let rows = read_timeline_csv(&path).expect("read");
        assert_eq!(rows[0].signal, None);
        assert_eq!(rows[1].signal, Some(Signal::Short));
    }

    #[test]
    fn repository_reports_existence() {
        let dir = unique_tmp_dir("repo_exists");
        let repo = CsvResultsRepository::new();
        assert!(!repo.exists(&dir.join("performance_summary.csv")));
        assert!(!repo.exists(&dir));
        fs::write(dir.join("performance_summary.csv"), SUMMARY_HEADER).expect("write");
        assert!(repo.exists(&dir.join("performance_summary.csv")));
        assert!(repo
            .load_summary(&dir.join("performance_summary.csv"))
            .expect("header only")
            .is_empty());
    }
}
