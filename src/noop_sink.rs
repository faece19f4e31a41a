use crate::record::LogRecord;
use crate::sink::{LogSink, SinkError};

/// A sink that simply drops all records.
///
/// Useful for measuring the overhead of normalization and rendering without
/// any I/O, and for tests that don't care about output.
#[derive(Clone, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn write(&self, _record: &LogRecord, _line: &str) -> Result<(), SinkError> {
        Ok(())
    }
}
