//! # Vitals Core
//!
//! Host liveness probing that runs ahead of a port scan.
//!
//! * **[`probe`]**: the probe runner. Synchronous evaluators, asynchronous
//!   dispatchers and the rate limited orchestrator that fans out over a target set.
//! * **[`engine`]**: the seams towards the packet layer ([`engine::SendEngine`],
//!   [`engine::Prober`]) and their raw socket implementations.
//! * **[`error`]**: probe errors tagged by the stage they happened in.
//! * **[`network`]**: transport channel plumbing shared by the engines.

pub mod engine;
pub mod error;
pub mod network;
pub mod probe;
