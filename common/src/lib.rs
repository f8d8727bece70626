//! Shared models for the `vitals` workspace: probe configuration, port sets,
//! scan targets and the logging macros every crate reports through.

pub mod config;
pub mod log;
pub mod network;
pub mod ports;

#[doc(hidden)]
pub use tracing as __tracing;
