//! Flotilla - Ephemeral Container-Fleet Orchestrator
//!
//! Flotilla provisions ephemeral compute instances in bounded-size groups
//! ("fleets"), dispatches one command to every instance, and detects
//! completion or failure through an unreliable, text-based signaling
//! channel (log scraping, remote-shell injection).
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, port traits, and the error taxonomy
//! - **Application Layer** (`application`): Provisioner, dispatcher, watcher,
//!   collector, and the fleet controller composing them
//! - **Adapters** (`adapters`): REST and mock implementations of the ports
//! - **Infrastructure Layer** (`infrastructure`): Configuration loading
//! - **API** (`api`): Transport-neutral request/response surface
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use flotilla::application::{FleetController, FleetRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Wire a controller and create a fleet
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod api;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use application::{
    CommandDispatcher, CompletionWatcher, ContainerGroupProvisioner, ExecOutcome,
    FleetController, FleetOutcome, FleetRequest, InputDistributor, OutputCollector,
    WatcherSettings,
};
pub use domain::errors::{FleetError, FleetResult};
pub use domain::models::{
    Config, ContainerGroupSpec, ContainerSpec, Fleet, GroupStatus, GroupSummary,
    ResourceBudget, WatchReport, MAX_GROUP_SIZE,
};
pub use domain::ports::{ComputeProvider, CredentialSource, ObjectStore, RemoteShell};
pub use infrastructure::{ConfigError, ConfigLoader};
