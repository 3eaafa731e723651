use pulse_application::config::DisplaySettings;
use pulse_application::loading::{load_backtest_data, LoadError};
use pulse_application::views::PeriodView;
use pulse_domain::value_objects::period::Period;
use pulse_infrastructure::results::CsvResultsRepository;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_tmp_dir(prefix: &str) -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let dir = std::env::temp_dir().join(format!("pulse_{prefix}_{}_{}", std::process::id(), now));
    fs::create_dir_all(&dir).expect("create tmp dir");
    dir
}

const SUMMARY: &str = "\
period,start_date,end_date,rows,initial_capital,net_pnl,total_return_pct,sharpe_ratio,max_drawdown_pct,win_rate_pct,trades_per_year,avg_hold_hours,total_volume_usd,avg_daily_volume,avg_hourly_volume,actual_trades,signal_flips
last_month,2024-03-01,2024-03-31,5,1000.0,30.0,3.0,1.8,-1.2,50.0,1200.0,1.5,500.0,100.0,4.2,2,3
full_3mo,2024-01-01,2024-03-31,5,1000.0,60.0,6.0,1.6,-2.4,48.2,1100.0,1.7,900.0,90.0,3.9,4,7
prior_2mo,2024-01-01,2024-02-29,5,1000.0,30.0,3.0,1.4,-2.4,46.4,1000.0,1.9,400.0,80.0,3.5,2,4
full_3mo,2024-01-01,2024-03-31,5,1000.0,60.0,6.0,1.6,-2.4,48.2,1100.0,1.7,900.0,90.0,3.9,4,7
";

const TIMELINE: &str = "\
,equity,volume_usd,signal,price,qty,pnl,is_entry,is_exit
2024-03-01 00:00:00,0.0,,0,,,,False,False
2024-03-01 00:01:00,1000.0,100.0,1,62000.0,0.01,,True,False
2024-03-01 00:02:00,1010.0,,1,62100.0,0.01,,False,False
2024-03-02 00:00:00,1020.0,250.0,-1,62200.0,0.01,10.0,True,True
2024-03-02 00:01:00,1030.0,150.0,0,62300.0,0.01,10.0,False,True
";

fn write_results(dir: &Path) {
    fs::write(dir.join("performance_summary.csv"), SUMMARY).expect("write summary");
    for period in Period::ALL {
        fs::write(dir.join(period.timeline_file()), TIMELINE).expect("write timeline");
    }
}

#[test]
fn missing_timeline_is_reported_by_name() {
    let dir = unique_tmp_dir("load_missing");
    fs::write(dir.join("performance_summary.csv"), SUMMARY).expect("write summary");
    fs::write(dir.join("timeline_last_month.csv"), TIMELINE).expect("write timeline");

    let err = load_backtest_data(&dir, &CsvResultsRepository::new()).expect_err("missing");
    match &err {
        LoadError::NotFound(path) => assert_eq!(path, &dir.join("timeline_full_3mo.csv")),
        other => panic!("expected not found, got {other:?}"),
    }
    assert!(err.to_string().contains("timeline_full_3mo.csv"));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn loads_trims_and_derives_views_from_csv() {
    let dir = unique_tmp_dir("load_full");
    write_results(&dir);

    let data = load_backtest_data(&dir, &CsvResultsRepository::new()).expect("load");
    let timeline = data.timeline(Period::LastMonth);
    assert_eq!(timeline.trimmed_rows(), 1);
    assert_eq!(timeline.len(), 4);
    assert_eq!(timeline.rows()[0].equity, Some(1000.0));

    let settings = DisplaySettings {
        rolling_window: 2,
        ..DisplaySettings::default()
    };
    let view = PeriodView::build(&data, Period::LastMonth, &settings).expect("view");
    let equity: Vec<f64> = view.series.equity.iter().map(|p| p.1).collect();
    let pnl: Vec<f64> = view.series.cumulative_pnl.iter().map(|p| p.1).collect();
    for (e, p) in equity.iter().zip(&pnl) {
        assert!((e - 1000.0 - p).abs() < 1e-9);
    }
    assert_eq!(view.series.rolling_volatility.len(), 3);

    let volumes: Vec<f64> = view.daily_volume.iter().map(|d| d.volume_usd).collect();
    assert_eq!(volumes, vec![100.0, 400.0]);

    assert_eq!(view.trade_log.len(), 3);
    assert_eq!(view.series.entries.len(), 2);
    assert_eq!(view.series.exits.len(), 2);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn comparison_has_one_row_per_distinct_period() {
    let dir = unique_tmp_dir("load_compare");
    write_results(&dir);

    let data = load_backtest_data(&dir, &CsvResultsRepository::new()).expect("load");
    let rows = data.comparison();
    let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["Last Month", "Full 3 Months", "Prior 2 Months"]);
    assert_eq!(rows[1].sharpe, "1.600");
    assert_eq!(rows[2].win_rate_pct, "46.4");
    let _ = fs::remove_dir_all(&dir);
}
