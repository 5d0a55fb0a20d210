//! Process supervision for the devstack pipeline.
//!
//! A single control flow starts the tracing sink, the optional proxy, the
//! MCP server, and the foreground client in strict order, gating each
//! stage on a bounded readiness probe. Shutdown terminates everything in
//! reverse start order with a grace period before force-kill.

mod error;
pub mod probe;
mod shutdown;
mod signal;
mod supervisor;
mod types;

pub use error::SupervisorError;
pub use probe::{ProbePolicy, probe_once, wait_port};
pub use shutdown::{SHUTDOWN_GRACE, shutdown_all};
pub use signal::wait_for_signal;
pub use supervisor::{ProbeSettings, Supervisor};
pub use types::{ProcessHandle, Stage};
