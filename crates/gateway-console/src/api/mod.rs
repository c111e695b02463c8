//! Client side of the gateway's admin control API.
//!
//! [`ControlApi`] is the seam the store, verification and session layers talk
//! to; [`HttpControlClient`] is the reqwest implementation. Every HTTP 401 is
//! turned into [`ConsoleError::Unauthenticated`](crate::error::ConsoleError)
//! here, before any caller looks at a response body.

pub mod client;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::*;
pub use types::*;
