//! Command dispatcher.
//!
//! Two mutually exclusive strategies start a command on a container,
//! selected by whether the target already exists and is running:
//!
//! - [`EmbeddedAtBoot`] bakes the wrapped command into the container's
//!   entrypoint before the group is submitted.
//! - [`InjectedInteractive`] opens a remote session on a running container
//!   and backgrounds the command there.
//!
//! Neither strategy produces a synchronous acknowledgment: the only
//! observable side effect is the eventual appearance of a completion
//! sentinel or failure marker in the container's log stream.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::errors::FleetResult;
use crate::domain::models::{ShardRef, COMPLETION_MARKER};
use crate::domain::ports::RemoteShell;

/// Capture file used by the interactive strategy inside the session.
const CAPTURE_FILE: &str = "/tmp/flotilla-capture.log";

/// The container a dispatch is aimed at.
#[derive(Debug, Clone)]
pub struct DispatchTarget {
    pub group: String,
    pub container: String,
    /// Assigned input shard, passed by reference only.
    pub input: Option<ShardRef>,
}

/// What a dispatch produced.
///
/// For the at-boot strategy the entrypoint and environment must be baked
/// into the container spec before submission; for the interactive strategy
/// the command is already running and both are empty.
#[derive(Debug, Clone)]
pub struct DispatchTicket {
    /// Completion token the remote side will echo behind the sentinel.
    pub token: String,
    pub entrypoint: Vec<String>,
    pub environment: HashMap<String, String>,
}

/// A strategy for starting one command on one container.
#[async_trait]
pub trait DispatchStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn dispatch(&self, target: &DispatchTarget, command: &str) -> FleetResult<DispatchTicket>;
}

/// Bake the command into the container entrypoint at provisioning time.
///
/// The remote wrapper runs the task, writes `command: <token>` to the log
/// stream on success, and an `Exception`-prefixed line on failure. The
/// task is expected to upload its result payload under the token taken
/// from `FLOTILLA_RESULT_TOKEN`.
pub struct EmbeddedAtBoot;

#[async_trait]
impl DispatchStrategy for EmbeddedAtBoot {
    fn name(&self) -> &'static str {
        "embedded-at-boot"
    }

    async fn dispatch(&self, target: &DispatchTarget, command: &str) -> FleetResult<DispatchTicket> {
        let token = mint_token();
        let mut environment = HashMap::new();
        environment.insert("FLOTILLA_RESULT_TOKEN".to_string(), token.clone());
        if let Some(shard) = &target.input {
            environment.insert("FLOTILLA_SHARD_REF".to_string(), shard.key.clone());
        }

        // The token reaches the wrapper via environment, so the command
        // string itself never varies per container and never embeds
        // shard content.
        let script = format!(
            "{command} && echo \"{COMPLETION_MARKER}$FLOTILLA_RESULT_TOKEN\" \
             || echo \"Exception: task exited non-zero\""
        );
        debug!(container = %target.container, token = %token, "Prepared boot entrypoint");

        Ok(DispatchTicket {
            token,
            entrypoint: vec!["/bin/sh".to_string(), "-c".to_string(), script],
            environment,
        })
    }
}

/// Inject the command into an already-running container through a remote
/// session.
pub struct InjectedInteractive {
    shell: Arc<dyn RemoteShell>,
}

impl InjectedInteractive {
    pub fn new(shell: Arc<dyn RemoteShell>) -> Self {
        Self { shell }
    }
}

#[async_trait]
impl DispatchStrategy for InjectedInteractive {
    fn name(&self) -> &'static str {
        "injected-interactive"
    }

    #[instrument(skip(self, command), fields(group = %target.group, container = %target.container))]
    async fn dispatch(&self, target: &DispatchTarget, command: &str) -> FleetResult<DispatchTicket> {
        let token = mint_token();

        // Retrieve the assigned input first, then background the command
        // with output redirected to a capture file in the session. The
        // sentinel goes to the entrypoint's stdout so it lands in the
        // container log stream the watcher scrapes.
        let fetch = target.input.as_ref().map_or_else(String::new, |shard| {
            format!(
                "FLOTILLA_SHARD_REF='{}' flotilla-fetch-shard > /tmp/flotilla-input.txt; ",
                shard.key
            )
        });
        let script = format!(
            "{fetch}( {command} > {CAPTURE_FILE} 2>&1 \
             && echo \"{COMPLETION_MARKER}{token}\" > /proc/1/fd/1 \
             || echo \"Exception: injected task failed\" > /proc/1/fd/1 ) &"
        );

        self.shell
            .inject(&target.group, &target.container, &script)
            .await?;
        debug!(token = %token, "Injected command into running container");

        Ok(DispatchTicket {
            token,
            entrypoint: Vec::new(),
            environment: HashMap::new(),
        })
    }
}

/// Selects between the two strategies by container lifecycle state.
pub struct CommandDispatcher {
    at_boot: Arc<dyn DispatchStrategy>,
    interactive: Arc<dyn DispatchStrategy>,
}

impl CommandDispatcher {
    pub fn new(shell: Arc<dyn RemoteShell>) -> Self {
        Self {
            at_boot: Arc::new(EmbeddedAtBoot),
            interactive: Arc::new(InjectedInteractive::new(shell)),
        }
    }

    /// Pick the strategy for a container: a target that is already running
    /// gets session injection, anything else gets its command at boot.
    pub fn for_state(&self, running: bool) -> Arc<dyn DispatchStrategy> {
        if running {
            Arc::clone(&self.interactive)
        } else {
            Arc::clone(&self.at_boot)
        }
    }
}

fn mint_token() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockRemoteShell;

    fn target(input: Option<ShardRef>) -> DispatchTarget {
        DispatchTarget {
            group: "scan-01".to_string(),
            container: "scan-03".to_string(),
            input,
        }
    }

    #[tokio::test]
    async fn boot_ticket_carries_entrypoint_and_token_env() {
        let ticket = EmbeddedAtBoot
            .dispatch(&target(None), "nmap -iL /tmp/flotilla-input.txt")
            .await
            .unwrap();

        assert_eq!(ticket.entrypoint[0], "/bin/sh");
        assert!(ticket.entrypoint[2].contains("command: $FLOTILLA_RESULT_TOKEN"));
        assert!(ticket.entrypoint[2].contains("Exception"));
        assert_eq!(
            ticket.environment.get("FLOTILLA_RESULT_TOKEN"),
            Some(&ticket.token)
        );
    }

    #[tokio::test]
    async fn boot_ticket_passes_shard_by_reference_only() {
        let shard = ShardRef::new("shard-abc", 40);
        let ticket = EmbeddedAtBoot
            .dispatch(&target(Some(shard)), "run-scan")
            .await
            .unwrap();

        assert_eq!(
            ticket.environment.get("FLOTILLA_SHARD_REF").map(String::as_str),
            Some("shard-abc")
        );
        // Shard key must not leak into the command string.
        assert!(!ticket.entrypoint[2].contains("shard-abc"));
    }

    #[tokio::test]
    async fn interactive_dispatch_injects_backgrounded_script() {
        let shell = Arc::new(MockRemoteShell::new());
        let strategy = InjectedInteractive::new(shell.clone());

        let ticket = strategy
            .dispatch(&target(Some(ShardRef::new("shard-xyz", 10))), "run-scan")
            .await
            .unwrap();

        let injected = shell.injected().await;
        assert_eq!(injected.len(), 1);
        let (group, container, script) = &injected[0];
        assert_eq!(group, "scan-01");
        assert_eq!(container, "scan-03");
        assert!(script.contains("shard-xyz"));
        assert!(script.contains(&ticket.token));
        assert!(script.ends_with('&'));
        assert!(ticket.entrypoint.is_empty());
    }

    #[tokio::test]
    async fn selection_follows_lifecycle_state() {
        let shell = Arc::new(MockRemoteShell::new());
        let dispatcher = CommandDispatcher::new(shell);

        assert_eq!(dispatcher.for_state(true).name(), "injected-interactive");
        assert_eq!(dispatcher.for_state(false).name(), "embedded-at-boot");
    }
}
