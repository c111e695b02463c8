//! Operator console core for a multi-provider model gateway.
//!
//! The gateway exposes a small admin control API; this crate models its
//! configuration aggregate, stages provider edits as drafts, persists the
//! whole aggregate through [`store::ConfigStore`], and runs connectivity,
//! model-listing and model-call probes through [`verify::VerificationService`].

pub mod api;
pub mod config;
pub mod draft;
pub mod error;
pub mod logging;
pub mod model;
pub mod modelmap;
pub mod session;
pub mod store;
pub mod verify;

pub use error::{ConsoleError, Result};
