//! Command execution state and log-signal scanning.
//!
//! A [`CommandExecution`] is the ephemeral, in-memory record of one
//! (container, dispatch) pair. Completion is signaled out-of-band: the
//! remote side writes a fixed sentinel line to its log stream on success
//! and an `Exception`-prefixed line on failure. The scanning helpers here
//! are pure so the watcher loop stays focused on timing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel prefix written to the log stream on success, followed by the
/// completion token.
pub const COMPLETION_MARKER: &str = "command: ";

/// Marker substring indicating remote failure.
pub const FAILURE_MARKER: &str = "Exception";

/// Error string reported when a watcher exhausts its wait budget.
pub const TIMEOUT_REACHED: &str = "TIMEOUT REACHED";

/// Lifecycle of one dispatched command. Transitions are monotonic and
/// terminal once reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    Pending,
    Running,
    Done { token: String },
    Failed { reason: String },
    TimedOut,
}

impl ExecutionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Failed { .. } | Self::TimedOut)
    }
}

/// Ephemeral record per (container, dispatch) pair. Discarded after its
/// output is collected; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandExecution {
    pub container: String,
    pub state: ExecutionState,
    pub dispatched_at: DateTime<Utc>,
}

impl CommandExecution {
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            state: ExecutionState::Pending,
            dispatched_at: Utc::now(),
        }
    }

    /// Advance the state. Terminal states are sticky; a transition attempt
    /// on a terminal execution is ignored.
    pub fn transition(&mut self, next: ExecutionState) {
        if !self.state.is_terminal() {
            self.state = next;
        }
    }
}

/// A signal extracted from a log tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSignal {
    /// Sentinel with a parseable token.
    Completed { token: String },
    /// Sentinel present but the token could not be extracted.
    MalformedMarker,
    /// Failure marker with surrounding excerpt.
    Failure { excerpt: String },
}

/// Scan a log tail for the completion sentinel or the failure marker.
///
/// The sentinel takes precedence over the failure marker: a task that
/// logged an exception earlier but still reported completion is complete.
pub fn scan_log_tail(tail: &str) -> Option<LogSignal> {
    for line in tail.lines() {
        if let Some(rest) = line.split_once(COMPLETION_MARKER).map(|(_, r)| r) {
            let token = rest.split_whitespace().next().unwrap_or("").to_string();
            if token.is_empty() {
                return Some(LogSignal::MalformedMarker);
            }
            return Some(LogSignal::Completed { token });
        }
    }
    if tail.contains(FAILURE_MARKER) {
        let excerpt = failure_excerpt(tail);
        return Some(LogSignal::Failure { excerpt });
    }
    None
}

/// Pull the line carrying the failure marker plus everything after it,
/// bounded so log storms do not balloon the report.
fn failure_excerpt(tail: &str) -> String {
    const EXCERPT_LIMIT: usize = 1024;
    let start = tail.find(FAILURE_MARKER).unwrap_or(0);
    let line_start = tail[..start].rfind('\n').map_or(0, |i| i + 1);
    let mut excerpt: String = tail[line_start..].chars().take(EXCERPT_LIMIT).collect();
    excerpt.truncate(excerpt.trim_end().len());
    excerpt
}

/// Terminal outcome of one watcher run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    Done { token: String },
    Failed { reason: String },
    TimedOut,
}

/// The (container, token, error) triple handed back to the controller.
/// Exactly one of `token` / `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchReport {
    pub container: String,
    pub token: Option<String>,
    pub error: Option<String>,
}

impl WatchReport {
    pub fn from_outcome(container: impl Into<String>, outcome: WatchOutcome) -> Self {
        let container = container.into();
        match outcome {
            WatchOutcome::Done { token } => Self { container, token: Some(token), error: None },
            WatchOutcome::Failed { reason } => Self { container, token: None, error: Some(reason) },
            WatchOutcome::TimedOut => {
                Self { container, token: None, error: Some(TIMEOUT_REACHED.to_string()) }
            }
        }
    }
}
