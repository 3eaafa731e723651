use pulse_domain::value_objects::period::Period;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_RESULTS_DIR: &str = "./results";
pub const DEFAULT_ROLLING_WINDOW: usize = 30;
pub const DEFAULT_MAX_CHART_POINTS: usize = 2000;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub results: ResultsConfig,
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ResultsConfig {
    pub dir: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    pub default_period: Option<String>,
    pub rolling_window: Option<usize>,
    pub max_chart_points: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            results: ResultsConfig {
                dir: DEFAULT_RESULTS_DIR.to_string(),
            },
            display: None,
        }
    }
}

/// Display knobs with defaults applied and bounds checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySettings {
    pub default_period: Period,
    pub rolling_window: usize,
    pub max_chart_points: usize,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            default_period: Period::LastMonth,
            rolling_window: DEFAULT_ROLLING_WINDOW,
            max_chart_points: DEFAULT_MAX_CHART_POINTS,
        }
    }
}

impl Config {
    pub fn results_dir(&self) -> PathBuf {
        PathBuf::from(&self.results.dir)
    }

    pub fn display_settings(&self) -> Result<DisplaySettings, String> {
        let display = self.display.clone().unwrap_or_default();
        let default_period = match display.default_period.as_deref() {
            Some(raw) => {
                Period::parse(raw).map_err(|err| format!("display.default_period: {err}"))?
            }
            None => Period::LastMonth,
        };
        let rolling_window = display.rolling_window.unwrap_or(DEFAULT_ROLLING_WINDOW);
        if rolling_window < 2 {
            return Err(format!(
                "display.rolling_window must be >= 2, got {rolling_window}"
            ));
        }
        let max_chart_points = display.max_chart_points.unwrap_or(DEFAULT_MAX_CHART_POINTS);
        if max_chart_points < 2 {
            return Err(format!(
                "display.max_chart_points must be >= 2, got {max_chart_points}"
            ));
        }
        Ok(DisplaySettings {
            default_period,
            rolling_window,
            max_chart_points,
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.results.dir.trim().is_empty() {
            return Err("results.dir cannot be empty".to_string());
        }
        self.display_settings().map(|_| ())
    }
}

pub fn load_config(path: &Path) -> Result<Config, String> {
    let (config, _source) = load_config_with_source(path)?;
    Ok(config)
}

pub fn load_config_with_source(path: &Path) -> Result<(Config, String), String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read config {}: {}", path.display(), err))?;
    let config: Config = toml::from_str(&contents)
        .map_err(|err| format!("failed to parse TOML {}: {}", path.display(), err))?;
    config
        .validate()
        .map_err(|err| format!("invalid config {}: {}", path.display(), err))?;
    Ok((config, contents))
}
