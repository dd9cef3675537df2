//! # Event subscribers.
//!
//! This module provides the [`Subscriber`] trait, the hook for observing
//! the firing lifecycle (logging, metrics, custom handlers), and the
//! built-in [`LogWriter`] behind the `logging` feature.

#[cfg(feature = "logging")]
mod log;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscriber::Subscriber;
