use crate::backend::{make_backend_from_config, BackendFactory};
use crate::config::{LogConfig, PartialConfig};
use crate::emit::{emit, EmitContext, RenderMode};
use crate::level::Level;
use crate::normalize::normalize;
use crate::value::{Object, Value};
use arc_swap::ArcSwap;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

/// How long [`Logger::flush`] waits after asking the backend to close.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_millis(2000);

/// Logging facade.
///
/// Accepts loosely-typed argument lists at any level, normalizes them into
/// a message plus metadata and forwards the rendered record to a backend.
/// Logging calls never fail and never panic; at worst a record is degraded
/// or dropped.
///
/// The configuration, render mode, default metadata and backend live in one
/// immutable [`EmitContext`] behind an [`ArcSwap`]. [`Logger::init`] builds
/// a complete new context before swapping it in, so a concurrent call sees
/// either the old or the new one.
pub struct Logger {
    state: ArcSwap<EmitContext>,
    factory: BackendFactory,
    // Defaults every `init` merges over; read from the environment once.
    base_config: LogConfig,
}

impl Logger {
    /// Facade with the environment-derived defaults and a console backend.
    pub fn new() -> Self {
        Self::with_factory(Arc::new(make_backend_from_config))
    }

    /// Facade whose backend is built by `factory`, now and on every
    /// [`Logger::init`].
    ///
    /// The environment is read here, once; later changes to it are not
    /// seen by [`Logger::init`].
    pub fn with_factory(factory: BackendFactory) -> Self {
        Self::with_config(LogConfig::from_env(), factory)
    }

    /// Facade starting from `base`, which every [`Logger::init`] merges
    /// over.
    pub fn with_config(base: LogConfig, factory: BackendFactory) -> Self {
        let backend = factory(&base);
        Logger {
            state: ArcSwap::from_pointee(EmitContext::new(base.clone(), Object::new(), backend)),
            factory,
            base_config: base,
        }
    }

    /// Apply `partial` over the default configuration and rebuild the
    /// backend.
    ///
    /// Fields are merged one by one over the configuration this facade was
    /// constructed with, never over the previous one, so repeated calls do
    /// not accumulate. Default metadata of a child facade survives
    /// re-initialization and is handed to the new backend again.
    pub fn init(&self, partial: PartialConfig) {
        let config = self.base_config.clone().merged(partial);
        let defaults = self.state.load().defaults.clone();
        let backend = (self.factory)(&config);
        let backend = if defaults.is_empty() {
            backend
        } else {
            backend.child(&defaults)
        };
        let next = EmitContext::new(config, defaults, backend);

        tracing::debug!(
            app_name = %next.config.app_name,
            env = %next.config.env,
            level = %next.config.log_level,
            mode = ?next.mode,
            "logger initialized"
        );
        self.state.store(Arc::new(next));
    }

    /// Current configuration.
    pub fn config(&self) -> LogConfig {
        self.state.load().config.clone()
    }

    pub fn is_pretty(&self) -> bool {
        self.state.load().mode == RenderMode::Pretty
    }

    /// Copy of the default metadata attached to every record.
    pub fn defaults(&self) -> Object {
        self.state.load().defaults.shallow_copy()
    }

    /// Normalize `args` and emit them at `level`.
    pub fn log(&self, level: Level, args: &[Value]) {
        let input = normalize(args);
        let state = self.state.load();
        emit(level, input, &state);
    }

    pub fn error(&self, args: &[Value]) {
        self.log(Level::Error, args);
    }

    pub fn warn(&self, args: &[Value]) {
        self.log(Level::Warn, args);
    }

    pub fn info(&self, args: &[Value]) {
        self.log(Level::Info, args);
    }

    pub fn http(&self, args: &[Value]) {
        self.log(Level::Http, args);
    }

    pub fn verbose(&self, args: &[Value]) {
        self.log(Level::Verbose, args);
    }

    pub fn debug(&self, args: &[Value]) {
        self.log(Level::Debug, args);
    }

    pub fn silly(&self, args: &[Value]) {
        self.log(Level::Silly, args);
    }

    /// Derive a facade whose records always carry `defaults`, layered over
    /// this facade's own defaults (keys in `defaults` win).
    ///
    /// The child takes a snapshot: later changes to `defaults`, or a later
    /// [`Logger::init`] on the parent, do not reach it.
    pub fn child(&self, defaults: Object) -> Logger {
        let parent = self.state.load();
        let merged = parent.defaults.shallow_copy();
        merged.extend_from(&defaults);
        let backend = parent.backend.child(&merged);

        Logger {
            state: ArcSwap::from_pointee(EmitContext::new(parent.config.clone(), merged, backend)),
            factory: Arc::clone(&self.factory),
            base_config: self.base_config.clone(),
        }
    }

    /// [`Logger::flush_with_timeout`] with [`DEFAULT_FLUSH_TIMEOUT`].
    pub async fn flush(&self) {
        self.flush_with_timeout(DEFAULT_FLUSH_TIMEOUT).await
    }

    /// Ask the backend to close, then wait for `timeout`.
    ///
    /// The wait always runs to completion, whether or not the backend
    /// finished earlier; delivery is best-effort. Close failures are
    /// ignored.
    pub async fn flush_with_timeout(&self, timeout: Duration) {
        let backend = Arc::clone(&self.state.load().backend);
        if let Err(e) = backend.close() {
            tracing::debug!(error = %e, "ignoring backend close failure during flush");
        }
        sleep(timeout).await;
    }
}

impl Default for Logger {
    fn default() -> Self {
        Logger::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, BackendError, LeveledBackend};
    use crate::config::{DEFAULT_APP_NAME, DEFAULT_ENV};
    use crate::memory_sink::MemorySink;
    use crate::record::LogRecord;
    use crate::value::ErrorValue;
    use crate::{args, info};
    use parking_lot::Mutex;
    use serial_test::serial;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    fn base() -> LogConfig {
        LogConfig {
            app_name: DEFAULT_APP_NAME.to_string(),
            env: DEFAULT_ENV.to_string(),
            log_level: Level::Info,
            pretty: true,
            log_dir: None,
        }
    }

    fn memory_logger() -> (Logger, MemorySink) {
        let sink = MemorySink::new();
        let shared = sink.clone();
        let factory: BackendFactory = Arc::new(move |cfg: &LogConfig| {
            Arc::new(LeveledBackend::new(cfg.log_level).with_sink(Arc::new(shared.clone())))
                as Arc<dyn Backend>
        });
        let logger = Logger::with_config(base(), factory);
        logger.init(
            PartialConfig::new()
                .app_name("orders")
                .env("production")
                .log_level(Level::Silly),
        );
        (logger, sink)
    }

    #[test]
    fn level_methods_emit_at_their_level() {
        let (logger, sink) = memory_logger();
        logger.error(&args!["e"]);
        logger.warn(&args!["w"]);
        logger.info(&args!["i"]);
        logger.http(&args!["h"]);
        logger.verbose(&args!["v"]);
        logger.debug(&args!["d"]);
        logger.silly(&args!["s"]);

        let levels: Vec<Level> = sink.entries().into_iter().map(|(level, _)| level).collect();
        assert_eq!(levels, Level::ALL.to_vec());
        assert!(sink.lines()[2].ends_with("[info] orders - i"));
    }

    #[test]
    fn init_rebuilds_backend_with_new_threshold() {
        let (logger, sink) = memory_logger();
        logger.init(PartialConfig::new().app_name("orders").env("production").log_level(Level::Warn));

        logger.info(&args!["dropped"]);
        logger.warn(&args!["kept"]);
        assert_eq!(sink.len(), 1);
        assert!(sink.lines()[0].ends_with("[warn] orders - kept"));
    }

    #[test]
    fn init_merges_over_defaults_not_previous_config() {
        let (logger, _sink) = memory_logger();
        assert_eq!(logger.config().app_name, "orders");

        logger.init(PartialConfig::new().env("production"));
        let config = logger.config();
        assert_eq!(config.app_name, DEFAULT_APP_NAME);
        assert_eq!(config.env, "production");
        assert!(!logger.is_pretty());
    }

    #[test]
    #[serial(env)]
    fn init_does_not_reread_environment() {
        std::env::remove_var(crate::env::APP_NAME_ENV);
        let logger = Logger::with_factory(Arc::new(make_backend_from_config));
        std::env::set_var(crate::env::APP_NAME_ENV, "changed-later");

        logger.init(PartialConfig::new());
        std::env::remove_var(crate::env::APP_NAME_ENV);
        assert_eq!(logger.config().app_name, DEFAULT_APP_NAME);
    }

    /// Records the metadata each backend instance was derived with.
    struct TaggingBackend {
        tags: Object,
        seen: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl Backend for TaggingBackend {
        fn log(&self, _record: &LogRecord, _line: &str) -> Result<(), BackendError> {
            self.seen.lock().push(self.tags.keys());
            Ok(())
        }

        fn child(&self, meta: &Object) -> Arc<dyn Backend> {
            let tags = self.tags.shallow_copy();
            tags.extend_from(meta);
            Arc::new(TaggingBackend {
                tags,
                seen: Arc::clone(&self.seen),
            })
        }
    }

    #[test]
    fn init_on_child_keeps_backend_tags() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let shared = Arc::clone(&seen);
        let factory: BackendFactory = Arc::new(move |_cfg: &LogConfig| {
            Arc::new(TaggingBackend {
                tags: Object::new(),
                seen: Arc::clone(&shared),
            }) as Arc<dyn Backend>
        });
        let logger = Logger::with_config(base(), factory);
        let child = logger.child(Object::new().with("tenant", "t1"));

        child.info(&args!["before"]);
        child.init(PartialConfig::new().log_level(Level::Debug));
        child.info(&args!["after"]);
        logger.info(&args!["parent"]);

        let seen = seen.lock();
        assert_eq!(seen[0], vec!["tenant".to_string()]);
        assert_eq!(seen[1], vec!["tenant".to_string()]);
        assert!(seen[2].is_empty());
    }

    #[test]
    fn pretty_mode_selected_outside_production() {
        let (logger, sink) = memory_logger();
        logger.init(PartialConfig::new().env("staging").pretty(true).log_level(Level::Info));
        assert!(logger.is_pretty());

        logger.info(&args!["colored"]);
        assert!(sink.lines()[0].contains("\x1b[32minfo\x1b[0m"));
    }

    #[test]
    fn error_call_carries_snapshot() {
        let (logger, sink) = memory_logger();
        let err = ErrorValue::from_parts("Error", "Test error", Some("Error: Test error\n    at main".into()));
        logger.error(&args!["Caught an error", err]);

        let line = &sink.lines()[0];
        assert!(line.contains("[error] orders - Caught an error\nError: Test error\n    at main"));
        assert!(!line.contains("meta:"));
    }

    #[test]
    fn child_merges_defaults_and_overrides_service() {
        let (logger, sink) = memory_logger();
        let child = logger.child(Object::new().with("service", "payments").with("tenant", "t1"));
        let grandchild = child.child(Object::new().with("requestId", "r-9"));

        grandchild.error(&args!["declined", Object::new().with("amount", 12)]);
        let line = &sink.lines()[0];
        assert!(line.contains("[error] payments - declined"));
        assert!(line.contains("\"tenant\": \"t1\""));
        assert!(line.contains("\"requestId\": \"r-9\""));
        assert!(line.contains("\"amount\": 12"));
        assert!(!logger.defaults().contains_key("tenant"));
    }

    #[test]
    fn child_is_isolated_from_later_changes() {
        let (logger, sink) = memory_logger();
        let defaults = Object::new().with("tenant", "t1");
        let child = logger.child(defaults.clone());
        defaults.set("tenant", "t2");

        logger.init(PartialConfig::new().app_name("renamed").env("production").log_level(Level::Error));
        child.info(&args!["still here"]);
        logger.info(&args!["filtered by parent"]);

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("[info] orders - still here"));
        assert_eq!(child.defaults().to_json(), serde_json::json!({"tenant": "t1"}));
    }

    #[test]
    fn macros_forward_to_explicit_logger() {
        let (logger, sink) = memory_logger();
        info!(logger => "Retry", 3, "of", 5);
        assert!(sink.lines()[0].ends_with("- Retry 3 of 5"));
    }

    struct CountingBackend {
        closes: Arc<AtomicUsize>,
    }

    impl Backend for CountingBackend {
        fn log(&self, _record: &LogRecord, _line: &str) -> Result<(), BackendError> {
            Err(BackendError::Unavailable("not accepting".to_string()))
        }

        fn child(&self, _meta: &Object) -> Arc<dyn Backend> {
            Arc::new(CountingBackend {
                closes: Arc::clone(&self.closes),
            })
        }

        fn close(&self) -> Result<(), BackendError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Err(BackendError::Unavailable("already closed".to_string()))
        }
    }

    #[tokio::test]
    async fn flush_closes_and_waits_full_timeout() {
        let closes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&closes);
        let logger = Logger::with_factory(Arc::new(move |_cfg: &LogConfig| {
            Arc::new(CountingBackend {
                closes: Arc::clone(&counter),
            }) as Arc<dyn Backend>
        }));

        logger.error(&args!["backend refuses this"]);

        let started = Instant::now();
        logger.flush_with_timeout(Duration::from_millis(50)).await;
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_logging_during_init() {
        let (logger, sink) = memory_logger();
        let logger = Arc::new(logger);

        let writers: Vec<_> = (0..4)
            .map(|i| {
                let logger = Arc::clone(&logger);
                std::thread::spawn(move || {
                    for n in 0..50 {
                        logger.info(&args!["worker", i, "line", n]);
                    }
                })
            })
            .collect();
        for _ in 0..10 {
            logger.init(PartialConfig::new().env("production").log_level(Level::Info));
        }
        for writer in writers {
            writer.join().unwrap();
        }

        assert_eq!(sink.len(), 200);
    }
}
