use std::sync::Arc;

use crate::config::LogConfig;
use crate::console_sink::ConsoleSink;
use crate::level::Level;
use crate::record::LogRecord;
use crate::sink::{LogSink, SinkError};
use crate::value::Object;

/// Error type returned by a [`Backend`].
#[derive(thiserror::Error, Debug)]
pub enum BackendError {
    #[error("sink failed: {0}")]
    Sink(#[from] SinkError),

    #[error("backend is unavailable: {0}")]
    Unavailable(String),
}

/// Leveled emission engine behind the facade.
///
/// The facade renders each record and hands it over together with the
/// rendered line; everything about where the line ends up (and whether it
/// is dropped for being below the configured level) is up to the backend.
pub trait Backend: Send + Sync {
    /// Emit one record.
    ///
    /// **Returns**
    /// - `Ok(())` if the record was written or filtered out.
    /// - `Err(..)` if a destination failed. The facade drops the record in
    ///   that case; logging never fails the caller.
    fn log(&self, record: &LogRecord, line: &str) -> Result<(), BackendError>;

    /// Backend for a child facade carrying `meta` as default metadata.
    ///
    /// The metadata itself is merged by the facade; backends that tag their
    /// output per child can use it.
    fn child(&self, meta: &Object) -> Arc<dyn Backend>;

    /// Drain and release destinations. Called by `flush`.
    fn close(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Builds the backend for a configuration; called on construction and on
/// every `init`.
pub type BackendFactory = Arc<dyn Fn(&LogConfig) -> Arc<dyn Backend> + Send + Sync>;

/// Default [`Backend`]: drops records below a threshold and writes the rest
/// to every configured sink.
#[derive(Clone)]
pub struct LeveledBackend {
    level: Level,
    sinks: Vec<Arc<dyn LogSink>>,
}

impl LeveledBackend {
    pub fn new(level: Level) -> Self {
        LeveledBackend {
            level,
            sinks: Vec::new(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl Backend for LeveledBackend {
    fn log(&self, record: &LogRecord, line: &str) -> Result<(), BackendError> {
        if !record.level.enabled_at(self.level) {
            return Ok(());
        }

        // Every sink gets the line even if an earlier one failed.
        let mut first_err = None;
        for sink in &self.sinks {
            if let Err(e) = sink.write(record, line) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    fn child(&self, _meta: &Object) -> Arc<dyn Backend> {
        Arc::new(self.clone())
    }

    fn close(&self) -> Result<(), BackendError> {
        let mut first_err = None;
        for sink in &self.sinks {
            if let Err(e) = sink.flush() {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

/// Create the default backend for `cfg`: console output at
/// `cfg.log_level`.
///
/// `cfg.log_dir` is accepted for compatibility but no file sink is
/// attached by default.
pub fn make_backend_from_config(cfg: &LogConfig) -> Arc<dyn Backend> {
    let backend = LeveledBackend::new(cfg.log_level).with_sink(Arc::new(ConsoleSink));
    Arc::new(backend)
}
