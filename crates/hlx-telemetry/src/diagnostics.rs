//! Injected diagnostics sink.
//!
//! Components take a `&dyn Diagnostics` rather than logging through a
//! process-wide logger. Production wires [`TracingDiagnostics`]; tests use
//! [`MemoryDiagnostics`] to assert on what was emitted.
//!
//! Never pass secret material to a sink. Addresses go through
//! [`mask_address`] first.

use parking_lot::Mutex;
use std::fmt;

const ADDRESS_PREFIX_LEN: usize = 6;
const ADDRESS_SUFFIX_LEN: usize = 4;
const MIN_ADDRESS_LEN: usize = 10;

/// Severity of a diagnostic record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// One diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub level: Level,
    /// Stable event name, e.g. `identity_resolved`.
    pub event: &'static str,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl DiagnosticRecord {
    pub fn new(level: Level, event: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            event,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.fields.push((key, value.to_string()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    fn fields_display(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Sink for diagnostic records.
pub trait Diagnostics: Send + Sync {
    fn record(&self, record: DiagnosticRecord);
}

/// Forwards records to `tracing` (stderr subscriber in the binary).
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn record(&self, record: DiagnosticRecord) {
        let fields = record.fields_display();
        match record.level {
            Level::Debug => {
                tracing::debug!(event = record.event, %fields, "{}", record.message)
            }
            Level::Info => tracing::info!(event = record.event, %fields, "{}", record.message),
            Level::Warn => tracing::warn!(event = record.event, %fields, "{}", record.message),
            Level::Error => {
                tracing::error!(event = record.event, %fields, "{}", record.message)
            }
        }
    }
}

/// Recording sink for tests.
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    records: Mutex<Vec<DiagnosticRecord>>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get recorded events.
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records.lock().clone()
    }

    /// Records with the given event name.
    pub fn events(&self, event: &str) -> Vec<DiagnosticRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.event == event)
            .cloned()
            .collect()
    }

    /// Whether `needle` appears anywhere in any message or field value.
    pub fn mentions(&self, needle: &str) -> bool {
        self.records.lock().iter().any(|r| {
            r.message.contains(needle) || r.fields.iter().any(|(_, v)| v.contains(needle))
        })
    }
}

impl Diagnostics for MemoryDiagnostics {
    fn record(&self, record: DiagnosticRecord) {
        self.records.lock().push(record);
    }
}

/// Mask an address for display: `0x1234...abcd`.
pub fn mask_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() < MIN_ADDRESS_LEN {
        return "****".to_string();
    }
    let prefix: String = chars[..ADDRESS_PREFIX_LEN].iter().collect();
    let suffix: String = chars[chars.len() - ADDRESS_SUFFIX_LEN..].iter().collect();
    format!("{prefix}...{suffix}")
}
