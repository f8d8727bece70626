//! Packet construction and parsing for the discovery probes.
//!
//! Builders return owned byte buffers ready for a layer 4 transport channel;
//! the kernel prepends the IP header.

pub mod icmp;
pub mod tcp;
