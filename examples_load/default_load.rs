use std::sync::Arc;
use std::time::Instant;

use rs_logger::backend::{Backend, BackendFactory, LeveledBackend};
use rs_logger::noop_sink::NoopSink;
use rs_logger::{args, LogConfig, Logger, Object, PartialConfig};

#[tokio::main]
async fn main() {
    let factory: BackendFactory = Arc::new(|cfg: &LogConfig| {
        Arc::new(LeveledBackend::new(cfg.log_level).with_sink(Arc::new(NoopSink))) as Arc<dyn Backend>
    });
    let logger = Logger::with_factory(factory);
    logger.init(PartialConfig::new().app_name("default-load").env("production"));

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        logger.error(&args!["default load test error", Object::new().with("iteration", i)]);
    }

    let elapsed = start.elapsed();
    println!("default config: sent {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    logger.flush_with_timeout(std::time::Duration::from_millis(100)).await;
}
