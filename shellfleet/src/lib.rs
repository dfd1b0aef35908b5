//! # Shellfleet
//!
//! Run a fixed command sequence over interactive SSH shells across a fleet
//! of routers, wireless controllers and hosts, one target at a time.
//!
//! Interactive shells have no in-band framing, so every exchange is an
//! explicit "send, settle, drain" step. Vendor differences live in
//! [`DeviceKind`], which dispatches the login, escalation and logout
//! dialogues.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shellfleet::{Activity, Credential, DeviceKind, Orchestrator, SshOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), shellfleet::Error> {
//!     let activity = Activity::new("nightly", Credential::new("admin", "secret"))
//!         .with_kind(DeviceKind::CiscoIos)
//!         .with_targets(["10.0.0.1", "10.0.0.2"])
//!         .with_commands(["show version"]);
//!
//!     let report = Orchestrator::new(SshOptions::default()).run(&activity).await?;
//!     println!("{} of {} targets succeeded", report.succeeded(), report.targets.len());
//!     Ok(())
//! }
//! ```

pub mod activity;
pub mod channel;
pub mod driver;
pub mod error;
pub mod platform;
pub mod sink;
pub mod task;
pub mod transport;

// Re-export main types for convenience
pub use activity::{Activity, Orchestrator, Outcome, RunReport};
pub use channel::{ShellChannel, ShellFactory};
pub use driver::{DeviceSession, SessionState, SessionTiming};
pub use error::{Error, Result};
pub use platform::{DeviceKind, PromptSet};
pub use task::TaskFile;
pub use transport::{Credential, HostKeyVerification, SshOptions};
