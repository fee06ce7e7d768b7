//! Structured logging: tracing subscriber setup and NDJSON audit lines.

mod format;

pub use format::{AlertLogLine, StructuredLogger};
