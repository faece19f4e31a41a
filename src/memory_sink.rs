use crate::level::Level;
use crate::record::LogRecord;
use crate::sink::{LogSink, SinkError};
use parking_lot::Mutex;
use std::sync::Arc;

/// Keeps every rendered line in memory.
///
/// Clones share the same buffer, so one handle can be given to a backend
/// and another kept for inspection.
#[derive(Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<(Level, String)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    /// Lines written so far, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.entries.lock().iter().map(|(_, line)| line.clone()).collect()
    }

    /// Lines written so far together with their level.
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.lock().clone()
    }

    /// Remove and return everything written so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.entries.lock())
            .into_iter()
            .map(|(_, line)| line)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl LogSink for MemorySink {
    fn write(&self, record: &LogRecord, line: &str) -> Result<(), SinkError> {
        self.entries.lock().push((record.level, line.to_string()));
        Ok(())
    }
}
