use std::sync::Arc;
use std::time::Instant;
use tokio::time::Duration;

use rs_logger::backend::{Backend, BackendFactory, LeveledBackend};
use rs_logger::noop_sink::NoopSink;
use rs_logger::{args, ErrorValue, Level, LogConfig, Logger, Object, PartialConfig};

/// Same loop as `default_load`, but with pretty rendering, a child logger
/// carrying default metadata and error arguments that need a snapshot.
#[tokio::main]
async fn main() {
    let factory: BackendFactory = Arc::new(|cfg: &LogConfig| {
        Arc::new(LeveledBackend::new(cfg.log_level).with_sink(Arc::new(NoopSink))) as Arc<dyn Backend>
    });
    let logger = Logger::with_factory(factory);
    logger.init(
        PartialConfig::new()
            .app_name("custom-load")
            .env("staging")
            .pretty(true)
            .log_level(Level::Debug),
    );
    let child = logger.child(Object::new().with("service", "load-worker").with("shard", 3));

    let err = ErrorValue::from_parts("LoadError", "synthetic failure", None);
    err.set("code", "E_LOAD");

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        child.error(&args![err.clone(), Object::new().with("iteration", i)]);
    }

    let elapsed = start.elapsed();
    println!("custom config: sent {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    logger.flush_with_timeout(Duration::from_millis(200)).await;
}
