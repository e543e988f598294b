//! Completion watcher.
//!
//! Per-container polling state machine that determines DONE / FAILED /
//! TIMEOUT by combining periodic health queries with log-text scanning.
//! Exactly one terminal outcome is produced per (container, dispatch);
//! the watcher never mutates container lifecycle and never retries a
//! provider call, except that transient health-probe errors are swallowed
//! and the loop continues.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::domain::errors::FleetError;
use crate::domain::models::{
    scan_log_tail, CommandExecution, ExecutionState, LogSignal, WatchOutcome, WatchReport,
    WatcherConfig,
};
use crate::domain::ports::ComputeProvider;

/// Watcher timing knobs, resolved from [`WatcherConfig`].
#[derive(Debug, Clone)]
pub struct WatcherSettings {
    /// Poll tick; elapsed time advances by this much per loop turn.
    pub poll_interval: Duration,
    /// Seconds between group health probes.
    pub health_interval_secs: f64,
    /// Bounded log-tail read size.
    pub log_tail_lines: u32,
}

impl From<&WatcherConfig> for WatcherSettings {
    fn from(config: &WatcherConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            health_interval_secs: config.health_interval_secs as f64,
            log_tail_lines: config.log_tail_lines,
        }
    }
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self::from(&WatcherConfig::default())
    }
}

/// Polls one container until a terminal outcome is reached.
pub struct CompletionWatcher {
    provider: Arc<dyn ComputeProvider>,
    settings: WatcherSettings,
}

impl CompletionWatcher {
    pub fn new(provider: Arc<dyn ComputeProvider>, settings: WatcherSettings) -> Self {
        Self { provider, settings }
    }

    /// Watch `container` in `group` until done, failed, or out of budget.
    ///
    /// `wait_budget_secs` of `None` means wait indefinitely for a log
    /// signal; health-probe failures still terminate the watch.
    #[instrument(skip(self))]
    pub async fn watch(
        &self,
        group: &str,
        container: &str,
        wait_budget_secs: Option<u64>,
    ) -> WatchReport {
        let outcome = self.run(group, container, wait_budget_secs).await;
        match &outcome {
            WatchOutcome::Done { token } => {
                info!(token = %token, "Command completed");
            }
            WatchOutcome::Failed { reason } => {
                warn!(reason = %reason, "Command failed");
            }
            WatchOutcome::TimedOut => {
                warn!(budget_secs = wait_budget_secs, "Wait budget exhausted");
            }
        }
        WatchReport::from_outcome(container, outcome)
    }

    async fn run(
        &self,
        group: &str,
        container: &str,
        wait_budget_secs: Option<u64>,
    ) -> WatchOutcome {
        // The ephemeral per-(container, dispatch) record. Transitions are
        // monotonic; exactly one terminal state comes out of the loop.
        let mut execution = CommandExecution::new(container);
        let mut elapsed_secs = 0.0_f64;
        let mut last_health_check = 0.0_f64;

        while !execution.state.is_terminal() {
            // 1. Bounded log tail. Without logs no further signal is
            // possible, so a fetch error is terminal.
            let tail = match self
                .provider
                .get_logs(group, container, self.settings.log_tail_lines)
                .await
            {
                Ok(tail) => tail,
                Err(err) => {
                    execution.transition(ExecutionState::Failed {
                        reason: format!("log fetch failed: {err}"),
                    });
                    break;
                }
            };
            execution.transition(ExecutionState::Running);

            // 2. Periodic health probe. A provider-reported failure ends
            // the watch immediately, bypassing any remaining wait budget.
            // Probe errors are transient by assumption and swallowed.
            if elapsed_secs - last_health_check >= self.settings.health_interval_secs {
                last_health_check = elapsed_secs;
                match self.provider.get_group(group).await {
                    Ok(status) => {
                        if let Some(reason) = status.failure_reason(container) {
                            let failure = FleetError::RemoteFailure {
                                container: container.to_string(),
                                reason,
                            };
                            execution.transition(ExecutionState::Failed {
                                reason: failure.to_string(),
                            });
                            continue;
                        }
                    }
                    Err(err) => {
                        debug!(error = %err, "Health probe error, continuing");
                    }
                }
            }

            // 3./4. Log-signal scan.
            match scan_log_tail(&tail) {
                Some(LogSignal::Completed { token }) => {
                    execution.transition(ExecutionState::Done { token });
                    continue;
                }
                Some(LogSignal::MalformedMarker) => {
                    let parse = FleetError::Parse("sentinel line carried no token".to_string());
                    execution.transition(ExecutionState::Failed { reason: parse.to_string() });
                    continue;
                }
                Some(LogSignal::Failure { excerpt }) => {
                    let failure = FleetError::RemoteFailure {
                        container: container.to_string(),
                        reason: excerpt,
                    };
                    execution.transition(ExecutionState::Failed {
                        reason: failure.to_string(),
                    });
                    continue;
                }
                None => {}
            }

            // 5. Wait budget.
            if let Some(budget) = wait_budget_secs {
                if elapsed_secs > budget as f64 {
                    execution.transition(ExecutionState::TimedOut);
                    continue;
                }
            }

            // 6. Sleep one tick and go around.
            tokio::time::sleep(self.settings.poll_interval).await;
            elapsed_secs += self.settings.poll_interval.as_secs_f64();
        }

        match execution.state {
            ExecutionState::Done { token } => WatchOutcome::Done { token },
            ExecutionState::TimedOut => WatchOutcome::TimedOut,
            ExecutionState::Failed { reason } => WatchOutcome::Failed { reason },
            // Unreachable: the loop only exits on a terminal state.
            ExecutionState::Pending | ExecutionState::Running => WatchOutcome::Failed {
                reason: "watcher stopped without a terminal state".to_string(),
            },
        }
    }
}
