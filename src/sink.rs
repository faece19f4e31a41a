use crate::record::LogRecord;

/// Error reported by a [`LogSink`].
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("sink I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("sink rejected record: {0}")]
    Rejected(String),
}

/// Destination for rendered log lines (console, memory, ...).
///
/// Sinks receive both the rendered line and the record it came from, so a
/// structured destination can ignore the text and serialize the record.
pub trait LogSink: Send + Sync {
    /// Write a single rendered line.
    ///
    /// **Parameters**
    /// - `record`: the record the line was rendered from.
    /// - `line`: the final text, possibly spanning several lines (stack
    ///   trace, `meta:` trailer) and possibly containing ANSI colors.
    fn write(&self, record: &LogRecord, line: &str) -> Result<(), SinkError>;

    /// Flush buffered output, if the sink buffers.
    ///
    /// Default implementation is a no-op.
    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}
