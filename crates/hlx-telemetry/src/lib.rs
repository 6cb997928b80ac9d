//! Structured logging and diagnostics for hlx.
//!
//! - stderr-only `tracing` subscriber (stdout carries the result document)
//! - [`Diagnostics`]: sink injected into core components instead of a global logger
//! - Address masking for anything written to a sink

pub mod diagnostics;
pub mod error;
pub mod logging;

pub use diagnostics::{
    mask_address, DiagnosticRecord, Diagnostics, Level, MemoryDiagnostics, TracingDiagnostics,
};
pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
