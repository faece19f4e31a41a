//! Logging facade that accepts loosely-typed call arguments (strings,
//! errors, structured objects or any mix) and turns them into one structured
//! record per call.
//!
//! ```no_run
//! use rs_logger::{info, error, ErrorValue, Object, PartialConfig};
//!
//! rs_logger::logger().init(PartialConfig::new().app_name("billing"));
//!
//! info!("User logged in", Object::new().with("userId", 42));
//! info!("Retry", 3, "of", 5);
//! error!(ErrorValue::new("boom"), Object::new().with("orderId", 7));
//! ```

pub mod backend;
pub mod capture;
pub mod config;
pub mod console_sink;
pub mod emit;
pub mod env;
pub mod level;
pub mod logger;
pub mod macros;
pub mod memory_sink;
pub mod noop_sink;
pub mod normalize;
pub mod record;
pub mod serialize;
pub mod sink;
pub mod value;

pub use crate::backend::{Backend, BackendError, BackendFactory, LeveledBackend};
pub use crate::capture::{capture, ErrorSnapshot};
pub use crate::config::{LogConfig, PartialConfig};
pub use crate::level::Level;
pub use crate::logger::Logger;
pub use crate::normalize::{normalize, Message, NormalizedInput};
pub use crate::record::LogRecord;
pub use crate::serialize::serialize;
pub use crate::value::{AccessError, Array, ErrorValue, Object, Value};

use once_cell::sync::Lazy;

static DEFAULT_LOGGER: Lazy<Logger> = Lazy::new(Logger::new);

/// The process-wide default logger, configured from the environment until
/// [`Logger::init`] is called on it.
pub fn logger() -> &'static Logger {
    &DEFAULT_LOGGER
}
