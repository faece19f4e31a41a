use crate::level::Level;
use crate::value::Object;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// One fully-built log entry, handed to the backend exactly once.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Object>,
    pub service: String,
}

impl LogRecord {
    /// RFC 3339 UTC timestamp with millisecond precision, e.g.
    /// `2024-05-01T12:00:00.000Z`.
    pub fn timestamp_text(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn serializes_meta_through_safe_path() {
        let meta = Object::new().with("userId", 42);
        meta.set("me", meta.clone());
        let record = LogRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            level: Level::Info,
            message: "hello".to_string(),
            meta: Some(meta),
            service: "api".to_string(),
        };

        assert_eq!(record.timestamp_text(), "2024-05-01T12:00:00.000Z");
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "timestamp": "2024-05-01T12:00:00Z",
                "level": "info",
                "message": "hello",
                "meta": {"userId": 42, "me": "[Circular]"},
                "service": "api"
            })
        );
    }
}
