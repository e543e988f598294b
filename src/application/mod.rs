//! Application layer: the use-case components composed by the controller.

pub mod collector;
pub mod controller;
pub mod dispatcher;
pub mod distributor;
pub mod provisioner;
pub mod watcher;

pub use collector::OutputCollector;
pub use controller::{ExecOutcome, FleetController, FleetOutcome, FleetRequest};
pub use dispatcher::{
    CommandDispatcher, DispatchStrategy, DispatchTarget, DispatchTicket, EmbeddedAtBoot,
    InjectedInteractive,
};
pub use distributor::InputDistributor;
pub use provisioner::{ContainerGroupProvisioner, ProvisionReport, ProvisionRequest};
pub use watcher::{CompletionWatcher, WatcherSettings};
