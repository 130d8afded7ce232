//! Session lifecycle tracking.
//!
//! A start event appends an open record with a baseline token snapshot. A
//! stop event closes the most recently started open record for the same
//! canonical project path. Closing estimates the final token count from the
//! elapsed time at a fixed growth rate; this is an approximation, not a
//! measurement.

pub mod baseline;
pub mod model;

use chrono::{DateTime, Local};
use std::path::Path;
use uuid::Uuid;

use crate::command::project_name;
use crate::config::{SessionSettings, StoragePaths, DEFAULT_TOKENS_PER_MINUTE};
use crate::error::MementoResult;
use crate::telemetry::TelemetryStore;
use baseline::BaselineProvider;
use model::{SessionRecord, StopOutcome};

/// Correlates session start and stop events per project.
pub struct SessionReconciler {
    store: TelemetryStore<SessionRecord>,
    baseline: Box<dyn BaselineProvider>,
    tokens_per_minute: u64,
}

impl SessionReconciler {
    pub fn new(store: TelemetryStore<SessionRecord>, baseline: Box<dyn BaselineProvider>) -> Self {
        Self {
            store,
            baseline,
            tokens_per_minute: DEFAULT_TOKENS_PER_MINUTE,
        }
    }

    /// Reconciler over the configured session history location and rate.
    pub fn at(
        paths: &StoragePaths,
        settings: &SessionSettings,
        baseline: Box<dyn BaselineProvider>,
    ) -> Self {
        Self::new(
            TelemetryStore::new(paths.sessions_file.clone(), settings.retention),
            baseline,
        )
        .with_tokens_per_minute(settings.tokens_per_minute)
    }

    /// Override the assumed conversational growth rate.
    pub fn with_tokens_per_minute(mut self, rate: u64) -> Self {
        self.tokens_per_minute = rate;
        self
    }

    pub fn store(&self) -> &TelemetryStore<SessionRecord> {
        &self.store
    }

    /// Open a new session for a project.
    pub fn start(&self, project: &Path) -> MementoResult<SessionRecord> {
        self.start_at(project, Local::now())
    }

    pub fn start_at(&self, project: &Path, now: DateTime<Local>) -> MementoResult<SessionRecord> {
        let project_path = canonical_project_path(project);

        // A failed snapshot must not prevent the session from being recorded
        let baseline_tokens = match self.baseline.baseline_tokens(Path::new(&project_path)) {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!(project = %project_path, error = %e, "Baseline estimate failed, using 0");
                0
            }
        };

        let record = SessionRecord {
            id: new_session_id(),
            project: project_name(project),
            project_path,
            started_at: now,
            ended_at: None,
            baseline_tokens,
            final_tokens: None,
            duration_minutes: None,
        };

        self.store.append(record.clone())?;
        tracing::info!(id = %record.id, project = %record.project, baseline_tokens, "Session started");
        Ok(record)
    }

    /// Close the most recently started open session for a project.
    pub fn stop(&self, project: &Path) -> MementoResult<StopOutcome> {
        self.stop_at(project, Local::now())
    }

    pub fn stop_at(&self, project: &Path, now: DateTime<Local>) -> MementoResult<StopOutcome> {
        let project_path = canonical_project_path(project);
        let mut log = self.store.load().into_log();

        let Some(record) = log
            .records
            .iter_mut()
            .rev()
            .find(|r| r.project_path == project_path && r.is_open())
        else {
            tracing::debug!(project = %project_path, "No open session to stop");
            return Ok(StopOutcome::NoOpenSession);
        };

        let elapsed_ms = (now - record.started_at).num_milliseconds().max(0);
        let duration_minutes = round1(elapsed_ms as f64 / 60_000.0);
        let conversation = (duration_minutes * self.tokens_per_minute as f64).round() as u64;

        record.ended_at = Some(now);
        record.duration_minutes = Some(duration_minutes);
        record.final_tokens = Some(record.baseline_tokens + conversation);
        let closed = record.clone();

        self.store.save(&log)?;
        tracing::info!(id = %closed.id, duration_minutes, "Session stopped");
        Ok(StopOutcome::Stopped(closed))
    }
}

/// Canonical absolute form of a project path, used as the correlation key.
///
/// Paths that cannot be canonicalized (for example, already deleted) are
/// made absolute without resolving symlinks.
pub fn canonical_project_path(project: &Path) -> String {
    project
        .canonicalize()
        .or_else(|_| std::path::absolute(project))
        .unwrap_or_else(|_| project.to_path_buf())
        .display()
        .to_string()
}

/// Short random session identifier.
pub fn new_session_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
