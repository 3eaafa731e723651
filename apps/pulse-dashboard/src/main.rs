use clap::{Parser, ValueEnum};
use pulse_dashboard::bootstrap::prepare_startup;
use pulse_dashboard::headless::{HeadlessArgs, HeadlessMode};
use pulse_dashboard::{logging, TuiOpts};
use pulse_domain::value_objects::period::Period;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pulse-dashboard")]
#[command(about = "Backtest results dashboard (TUI) with an optional headless JSON mode.", version)]
struct Cli {
    /// Print one JSON document and exit instead of starting the TUI.
    #[arg(long)]
    headless: bool,

    /// Headless mode: summary | compare | validate
    #[arg(long)]
    mode: Option<Mode>,

    /// Config file path (TOML). If omitted, uses env PULSE_CONFIG.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Results directory; overrides results.dir from the config.
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Period for summary mode and the initial TUI tab: last_month | full_3mo | prior_2mo
    #[arg(long, value_parser = Period::parse)]
    period: Option<Period>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Mode {
    Summary,
    Compare,
    Validate,
}

fn main() {
    let cli = Cli::parse();

    let log_store = logging::LogStore::shared(logging::DEFAULT_LOG_CAPACITY);
    if let Err(err) = init_tracing(cli.headless, log_store.clone()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
    if let Err(err) = init_metrics() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    let mut startup = match prepare_startup(cli.config, cli.results_dir.as_deref()) {
        Ok(startup) => startup,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    if cli.headless {
        let mode = match cli.mode {
            Some(Mode::Summary) => HeadlessMode::Summary,
            Some(Mode::Compare) => HeadlessMode::Compare,
            Some(Mode::Validate) => HeadlessMode::Validate,
            None => {
                eprintln!("error: --mode is required with --headless");
                std::process::exit(1);
            }
        };

        let result = pulse_dashboard::headless::run_headless(HeadlessArgs {
            mode,
            startup,
            period: cli.period,
        });
        match result {
            Ok(json) => {
                println!(
                    "{}",
                    serde_json::to_string(&json)
                        .unwrap_or_else(|_| "{\"status\":\"error\",\"error\":\"json\"}".to_string())
                );
                std::process::exit(0);
            }
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(err.exit_code());
            }
        }
    }

    if let Some(period) = cli.period {
        startup.settings.default_period = period;
    }
    let opts = TuiOpts {
        results_dir: startup.results_dir(),
        settings: startup.settings,
        log_store,
    };
    if let Err(err) = pulse_dashboard::run(opts) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(headless: bool, log_store: logging::SharedLogStore) -> Result<(), String> {
    let filter = std::env::var("PULSE_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| format!("invalid log filter: {err}"))?;

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);
    if headless {
        builder.with_writer(std::io::stderr).init();
    } else {
        builder
            .with_ansi(false)
            .with_writer(logging::LogMakeWriter::new(log_store))
            .init();
    }
    Ok(())
}

#[cfg(feature = "prometheus")]
fn init_metrics() -> Result<Option<SocketAddr>, String> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let Some(raw) = std::env::var("PULSE_METRICS_ADDR").ok() else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }

    let addr: SocketAddr = raw
        .parse()
        .map_err(|err| format!("invalid PULSE_METRICS_ADDR (expected host:port): {err}"))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|err| format!("failed to install prometheus exporter: {err}"))?;

    tracing::info!(metrics_addr = %addr, "prometheus metrics exporter enabled");
    Ok(Some(addr))
}

#[cfg(not(feature = "prometheus"))]
fn init_metrics() -> Result<Option<SocketAddr>, String> {
    Ok(None)
}
