use pulse_application::config::{self, Config, DisplaySettings};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "PULSE_CONFIG";

/// Config and display settings shared by the TUI and headless runs.
#[derive(Debug, Clone)]
pub struct Startup {
    pub config: Config,
    pub config_path: Option<PathBuf>,
    pub settings: DisplaySettings,
}

impl Startup {
    pub fn results_dir(&self) -> PathBuf {
        self.config.results_dir()
    }
}

/// `--config` wins over `PULSE_CONFIG`; blank values count as unset.
pub fn resolve_config_path(cli_path: Option<PathBuf>, env_value: Option<String>) -> Option<PathBuf> {
    cli_path.or_else(|| {
        env_value
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    })
}

pub fn prepare_startup(
    cli_config: Option<PathBuf>,
    results_dir_override: Option<&Path>,
) -> Result<Startup, String> {
    let config_path = resolve_config_path(cli_config, std::env::var(CONFIG_ENV).ok());
    build_startup(config_path, results_dir_override)
}

fn build_startup(
    config_path: Option<PathBuf>,
    results_dir_override: Option<&Path>,
) -> Result<Startup, String> {
    let mut config = match config_path.as_deref() {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };
    if let Some(dir) = results_dir_override {
        config.results.dir = dir.display().to_string();
    }
    config.validate()?;
    let settings = config.display_settings()?;

    tracing::debug!(
        config = ?config_path.as_ref().map(|p| p.display().to_string()),
        results_dir = %config.results.dir,
        rolling_window = settings.rolling_window,
        "startup resolved"
    );
    Ok(Startup {
        config,
        config_path,
        settings,
    })
}

#[cfg(test)]
mod tests {
    use super::{build_startup, resolve_config_path};
    use pulse_domain::value_objects::period::Period;
    use std::fs;
    use std::path::{Path, PathBuf};
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

    #[test]
    fn config_path_prefers_cli_then_env() {
        assert_eq!(
            resolve_config_path(Some(PathBuf::from("a.toml")), Some("b.toml".to_string())),
            Some(PathBuf::from("a.toml"))
        );
        assert_eq!(
            resolve_config_path(None, Some("b.toml".to_string())),
            Some(PathBuf::from("b.toml"))
        );
        assert_eq!(resolve_config_path(None, Some("  ".to_string())), None);
        assert_eq!(resolve_config_path(None, None), None);
    }

    #[test]
    fn startup_without_config_uses_defaults() {
        let startup = build_startup(None, None).expect("defaults");
        assert_eq!(startup.results_dir(), PathBuf::from("./results"));
        assert_eq!(startup.settings.default_period, Period::LastMonth);
        assert!(startup.config_path.is_none());
    }

    #[test]
    fn results_dir_flag_overrides_config_file() {
        let dir = unique_tmp_dir("startup_override");
        let path = dir.join("pulse.toml");
        fs::write(
            &path,
            "[results]\ndir = \"from_file\"\n\n[display]\ndefault_period = \"full_3mo\"\n",
        )
        .expect("write config");

        let startup = build_startup(Some(path.clone()), None).expect("file");
        assert_eq!(startup.results_dir(), PathBuf::from("from_file"));
        assert_eq!(startup.settings.default_period, Period::Full3Mo);

        let startup =
            build_startup(Some(path), Some(Path::new("/data/override"))).expect("override");
        assert_eq!(startup.results_dir(), PathBuf::from("/data/override"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn startup_reports_invalid_config() {
        let dir = unique_tmp_dir("startup_invalid");
        let path = dir.join("pulse.toml");
        fs::write(&path, "[results]\ndir = \"r\"\n\n[display]\nmax_chart_points = 1\n")
            .expect("write config");
        let err = build_startup(Some(path), None).expect_err("invalid");
        assert!(err.contains("max_chart_points"));
        let _ = fs::remove_dir_all(&dir);
    }
}
