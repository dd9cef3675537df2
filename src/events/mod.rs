//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and payload metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: container workers, the one-off lane, control calls.
//! - **Consumers**: the scheduler's subscriber listener, plus any receiver
//!   obtained through [`Bus::subscribe`] (tests observe lifecycle this way).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
