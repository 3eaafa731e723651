use crate::logging::SharedLogStore;
use crate::tasks::{TaskEvent, TaskRunner};
use crossterm::event::{Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use pulse_application::config::DisplaySettings;
use pulse_application::loading::{DashboardData, LoadError};
use pulse_application::views::PeriodView;
use pulse_domain::services::comparison::ComparisonRow;
use pulse_domain::value_objects::period::Period;
use std::path::PathBuf;
use std::time::{Duration, Instant};

const PAGE: usize = 10;
const INFO_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Overview,
    Summary,
    EquityPnl,
    Volume,
    Volatility,
    Signals,
    Trades,
    Comparison,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Overview,
        Section::Summary,
        Section::EquityPnl,
        Section::Volume,
        Section::Volatility,
        Section::Signals,
        Section::Trades,
        Section::Comparison,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::Overview => "Overview",
            Section::Summary => "Summary",
            Section::EquityPnl => "Equity & PnL",
            Section::Volume => "Volume",
            Section::Volatility => "Volatility",
            Section::Signals => "Signals",
            Section::Trades => "Trades",
            Section::Comparison => "Comparison",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

pub struct App {
    pub results_dir: PathBuf,
    pub settings: DisplaySettings,
    pub period: Period,
    pub section: Section,

    pub data: Option<DashboardData>,
    pub view: Option<Result<PeriodView, String>>,
    pub comparison: Vec<ComparisonRow>,

    pub logs: SharedLogStore,
    pub log_scroll: usize,
    seen_log_lines: u64,
    pub trade_scroll: usize,

    pub task_runner: TaskRunner,
    pub loading: bool,
    pub dirty: bool,
    spinner: usize,
    pub last_error: Option<String>,
    pub info_message: Option<String>,
    info_expires_at: Option<Instant>,
}

impl App {
    pub fn new(
        results_dir: PathBuf,
        settings: DisplaySettings,
        logs: SharedLogStore,
        task_runner: TaskRunner,
    ) -> Self {
        Self {
            results_dir,
            settings,
            period: settings.default_period,
            section: Section::Overview,
            data: None,
            view: None,
            comparison: Vec::new(),
            logs,
            log_scroll: 0,
            seen_log_lines: 0,
            trade_scroll: 0,
            task_runner,
            loading: false,
            dirty: true,
            spinner: 0,
            last_error: None,
            info_message: None,
            info_expires_at: None,
        }
    }

    pub fn spawn_input_reader(&self, tx: tokio::sync::mpsc::UnboundedSender<TaskEvent>) {
        std::thread::spawn(move || {
            while let Ok(event) = crossterm::event::read() {
                if tx.send(TaskEvent::Input(event)).is_err() {
                    break;
                }
            }
        });
    }

    pub fn request_reload(&mut self) {
        if self.loading || self.task_runner.is_loading() {
            self.set_info("reload already in progress");
            return;
        }
        if self.task_runner.start_load(self.results_dir.clone()) {
            self.loading = true;
            tracing::info!(results_dir = %self.results_dir.display(), "loading backtest results");
        } else {
            self.set_info("reload already in progress");
        }
        self.dirty = true;
    }

    pub fn on_tick(&mut self) {
        if self.loading {
            self.spinner = (self.spinner + 1) % 4;
            self.dirty = true;
        }
        if let Some(until) = self.info_expires_at {
            if Instant::now() >= until {
                self.info_message = None;
                self.info_expires_at = None;
                self.dirty = true;
            }
        }
        let pushed = self.logs.lock().pushed();
        if pushed != self.seen_log_lines {
            self.seen_log_lines = pushed;
            self.dirty = true;
        }
    }

    pub fn on_event(&mut self, event: TaskEvent) -> Result<bool, String> {
        match event {
            TaskEvent::Input(ct) => self.on_input(ct),
            TaskEvent::DataLoaded(result) => {
                self.on_data_loaded(result);
                Ok(false)
            }
        }
    }

    fn on_data_loaded(&mut self, result: Result<DashboardData, LoadError>) {
        self.loading = false;
        self.dirty = true;
        match result {
            Ok(data) => {
                self.comparison = data.comparison();
                self.data = Some(data);
                self.trade_scroll = 0;
                self.rebuild_view();
                self.last_error = None;
                self.set_info(&format!("loaded results from {}", self.results_dir.display()));
            }
            Err(err) => {
                // Keep whatever was loaded before on screen.
                self.last_error = Some(err.to_string());
                self.info_message = None;
                self.info_expires_at = None;
            }
        }
    }

    fn rebuild_view(&mut self) {
        let Some(data) = self.data.as_ref() else {
            self.view = None;
            return;
        };
        let view = PeriodView::build(data, self.period, &self.settings);
        if let Err(err) = &view {
            tracing::warn!(period = self.period.id(), error = %err, "period view unavailable");
        }
        self.view = Some(view);
    }

    pub fn select_period(&mut self, period: Period) {
        if period == self.period {
            return;
        }
        self.period = period;
        self.trade_scroll = 0;
        self.rebuild_view();
        self.dirty = true;
    }

    fn select_section(&mut self, section: Section) {
        self.section = section;
        self.dirty = true;
    }

    fn on_input(&mut self, event: CtEvent) -> Result<bool, String> {
        match event {
            CtEvent::Key(key) if key.kind != KeyEventKind::Release => self.on_key(key),
            CtEvent::Resize(_, _) => {
                self.dirty = true;
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Result<bool, String> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }

        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Left => self.select_period(self.period.prev()),
            KeyCode::Right => self.select_period(self.period.next()),
            KeyCode::Char(ch @ '1'..='3') => {
                let idx = (ch as usize) - ('1' as usize);
                self.select_period(Period::ALL[idx]);
            }
            KeyCode::Up | KeyCode::BackTab => self.select_section(self.section.prev()),
            KeyCode::Down | KeyCode::Tab => self.select_section(self.section.next()),
            KeyCode::Char('g') | KeyCode::F(5) => self.request_reload(),
            KeyCode::PageDown => self.scroll_down(),
            KeyCode::PageUp => self.scroll_up(),
            KeyCode::Home => {
                self.trade_scroll = 0;
                self.log_scroll = 0;
                self.dirty = true;
            }
            _ => {}
        }
        Ok(false)
    }

    fn scroll_down(&mut self) {
        if self.section == Section::Trades {
            let max = self.trade_count().saturating_sub(1);
            self.trade_scroll = (self.trade_scroll + PAGE).min(max);
        } else {
            self.log_scroll = self.log_scroll.saturating_sub(PAGE);
        }
        self.dirty = true;
    }

    fn scroll_up(&mut self) {
        if self.section == Section::Trades {
            self.trade_scroll = self.trade_scroll.saturating_sub(PAGE);
        } else {
            let max = self.logs.lock().len().saturating_sub(1);
            self.log_scroll = (self.log_scroll + PAGE).min(max);
        }
        self.dirty = true;
    }

    fn trade_count(&self) -> usize {
        match &self.view {
            Some(Ok(view)) => view.trade_log.len(),
            _ => 0,
        }
    }

    fn set_info(&mut self, msg: &str) {
        self.info_message = Some(msg.to_string());
        self.info_expires_at = Some(Instant::now() + INFO_TTL);
        self.dirty = true;
    }

    pub fn spinner_char(&self) -> char {
        match self.spinner {
            0 => '|',
            1 => '/',
            2 => '-',
            _ => '\\',
        }
    }
}
