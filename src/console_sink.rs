use crate::record::LogRecord;
use crate::sink::{LogSink, SinkError};
use std::io::Write;

/// Writes every line to standard output.
#[derive(Clone, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write(&self, _record: &LogRecord, line: &str) -> Result<(), SinkError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", line)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        std::io::stdout().flush()?;
        Ok(())
    }
}
