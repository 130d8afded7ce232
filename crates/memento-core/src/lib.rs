//! Memento Core Library
//!
//! Persisted command and session telemetry for Claude Code projects:
//! bounded JSON logs, command logging and session start/stop reconciliation.

pub mod command;
pub mod config;
pub mod error;
pub mod session;
pub mod telemetry;
pub mod timestamp;

pub use command::model::CommandLogEntry;
pub use command::CommandLogger;
pub use config::{AnalysisSettings, CommandSettings, SessionSettings, Settings, StoragePaths};
pub use error::{MementoError, MementoResult};
pub use session::baseline::{AnalyzerBaseline, BaselineProvider, SubprocessBaseline};
pub use session::model::{SessionRecord, StopOutcome};
pub use session::SessionReconciler;
pub use telemetry::{LoadOutcome, LogRecord, TelemetryLog, TelemetryStore};
