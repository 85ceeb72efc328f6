//! Where pipeline failures go.
//!
//! Failures never reach the user directly; they are handed to a
//! [`DiagnosticSink`] so the caller decides whether they land in the log or
//! somewhere a test can inspect.

use parking_lot::Mutex;

use crate::types::WeatherError;

pub trait DiagnosticSink: Send + Sync {
    /// Record one failed step.
    fn record_failure(&self, error: &WeatherError);
}

/// Sends failures to the `tracing` error channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record_failure(&self, error: &WeatherError) {
        tracing::error!("Error fetching weather data: {}", error);
    }
}

/// Keeps rendered failures in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl DiagnosticSink for MemorySink {
    fn record_failure(&self, error: &WeatherError) {
        self.entries.lock().push(error.to_string());
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::types::{LocationError, Stage};

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.record_failure(&WeatherError::Location(LocationError::Unsupported));
        sink.record_failure(&WeatherError::Parse {
            stage: Stage::Forecast,
            message: "missing field `periods`".into(),
        });

        let entries = sink.entries();
        assert_eq!(sink.len(), 2);
        assert!(entries[0].contains("not supported"));
        assert!(entries[1].contains("Malformed forecast response"));
    }
}
