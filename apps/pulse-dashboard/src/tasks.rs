use pulse_application::loading::{load_backtest_data, DashboardData, LoadError};
use pulse_infrastructure::results::CsvResultsRepository;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub enum TaskEvent {
    Input(crossterm::event::Event),
    DataLoaded(Result<DashboardData, LoadError>),
}

/// Runs result loads off the event loop, one at a time.
#[derive(Clone)]
pub struct TaskRunner {
    inner: Arc<TaskRunnerInner>,
}

struct TaskRunnerInner {
    tx: tokio::sync::mpsc::UnboundedSender<TaskEvent>,
    loading: AtomicBool,
    repo: CsvResultsRepository,
}

impl TaskRunner {
    pub fn new(tx: tokio::sync::mpsc::UnboundedSender<TaskEvent>) -> Self {
        Self {
            inner: Arc::new(TaskRunnerInner {
                tx,
                loading: AtomicBool::new(false),
                repo: CsvResultsRepository::new(),
            }),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.inner.loading.load(Ordering::Acquire)
    }

    /// Starts a background load; returns false when one is already running.
    pub fn start_load(&self, results_dir: PathBuf) -> bool {
        if self.inner.loading.swap(true, Ordering::AcqRel) {
            tracing::debug!("load already in flight; request ignored");
            return false;
        }
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let result = load_backtest_data(&results_dir, &inner.repo);
            inner.loading.store(false, Ordering::Release);
            let _ = inner.tx.send(TaskEvent::DataLoaded(result));
        });
        true
    }
}
