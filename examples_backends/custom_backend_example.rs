use std::sync::Arc;

use rs_logger::backend::{Backend, BackendError, BackendFactory};
use rs_logger::{error, info, ErrorValue, Level, LogConfig, LogRecord, Logger, Object, PartialConfig};

/// Example of integrating a completely custom backend by implementing
/// the `Backend` trait directly. Imagine this talks to some proprietary
/// store for which this crate does not provide a sink; here it prints the
/// record as JSON instead of the rendered line.
struct JsonLinesBackend {
    level: Level,
    tags: Object,
}

impl Backend for JsonLinesBackend {
    fn log(&self, record: &LogRecord, _line: &str) -> Result<(), BackendError> {
        if !record.level.enabled_at(self.level) {
            return Ok(());
        }
        let json = serde_json::to_string(record).map_err(|e| BackendError::Unavailable(e.to_string()))?;
        println!("[json-lines] tags={} {}", rs_logger::serialize(&self.tags.clone().into()), json);
        Ok(())
    }

    fn child(&self, meta: &Object) -> Arc<dyn Backend> {
        Arc::new(JsonLinesBackend {
            level: self.level,
            tags: meta.shallow_copy(),
        })
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let factory: BackendFactory = Arc::new(|cfg: &LogConfig| {
        Arc::new(JsonLinesBackend {
            level: cfg.log_level,
            tags: Object::new(),
        }) as Arc<dyn Backend>
    });
    let logger = Logger::with_factory(factory);
    logger.init(PartialConfig::new().app_name("custom-backend").env("production"));

    info!(logger => "custom backend example started");
    let requests = logger.child(Object::new().with("requestId", "req-1"));
    error!(requests => ErrorValue::new("simulated error"), Object::new().with("db", "my-custom-db"));

    logger.flush_with_timeout(std::time::Duration::from_millis(100)).await;
}
