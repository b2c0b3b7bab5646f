//! Mentor Session Client
//!
//! The session/state reconciliation layer of the mentor chat client. It sends
//! learner messages to the backend expert, keeps a local snapshot of the
//! learner consistent with the backend after command-bearing replies, and
//! exposes a read model (transcript, progress, active expert, connection
//! health) for whatever presentation layer embeds it.

pub mod applier;
pub mod backend;
pub mod config;
pub mod error;
pub mod monitor;
pub mod session;
pub mod store;
pub mod telemetry;

pub use backend::{ChatReply, ContentKind, HttpBackend, MentorBackend};
pub use config::{ClientConfig, ConfigError};
pub use error::BackendError;
pub use session::{IgnoreReason, SendOutcome, SessionController};
