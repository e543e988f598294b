//! REST adapters for the compute API, object store, and remote shell.

pub mod compute;
pub mod models;
pub mod retry;
pub mod shell;
pub mod store;

pub use compute::{RateLimiter, RestComputeProvider};
pub use retry::{RestError, RetryPolicy};
pub use shell::RestRemoteShell;
pub use store::RestObjectStore;
