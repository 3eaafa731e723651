//! In-memory log sink for the TUI log pane. The tracing subscriber writes
//! formatted lines through `LogMakeWriter`; the renderer reads the tail.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

pub const DEFAULT_LOG_CAPACITY: usize = 5000;

pub type SharedLogStore = Arc<Mutex<LogStore>>;

pub struct LogStore {
    lines: VecDeque<String>,
    capacity: usize,
    pushed: u64,
}

impl LogStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity: capacity.max(1),
            pushed: 0,
        }
    }

    pub fn shared(capacity: usize) -> SharedLogStore {
        Arc::new(Mutex::new(Self::new(capacity)))
    }

    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        if line.trim().is_empty() {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
        self.pushed += 1;
    }

    /// Lines accepted since creation, including evicted ones.
    pub fn pushed(&self) -> u64 {
        self.pushed
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Up to `max` lines ending `skip_from_end` lines before the newest,
    /// oldest first.
    pub fn tail(&self, max: usize, skip_from_end: usize) -> Vec<String> {
        let end = self.lines.len().saturating_sub(skip_from_end);
        let start = end.saturating_sub(max);
        self.lines.range(start..end).cloned().collect()
    }
}

#[derive(Clone)]
pub struct LogMakeWriter {
    store: SharedLogStore,
}

impl LogMakeWriter {
    pub fn new(store: SharedLogStore) -> Self {
        Self { store }
    }
}

impl<'a> MakeWriter<'a> for LogMakeWriter {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            store: self.store.clone(),
            pending: String::new(),
        }
    }
}

/// Buffers partial writes and commits one store line per newline.
pub struct LogWriter {
    store: SharedLogStore,
    pending: String,
}

impl LogWriter {
    fn commit_complete_lines(&mut self) {
        while let Some(idx) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=idx).collect();
            self.store.lock().push(line.trim_end_matches(['\r', '\n']));
        }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.push_str(&String::from_utf8_lossy(buf));
        self.commit_complete_lines();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let rest = std::mem::take(&mut self.pending);
        self.store.lock().push(rest.trim_end());
    }
}
