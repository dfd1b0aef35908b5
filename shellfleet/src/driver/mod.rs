//! Device session layer.
//!
//! A [`DeviceSession`] walks one target through connect, login, optional
//! escalation, the command sequence and logout, dispatching each
//! vendor-specific step through its [`DeviceKind`](crate::platform::DeviceKind).

mod runner;
mod session;

pub use runner::run_commands;
pub use session::{DeviceSession, SessionState, SessionTiming};
