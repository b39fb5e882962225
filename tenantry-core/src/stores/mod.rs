//! Store variants: in-memory, configuration-backed, cache-backed, remote.

pub mod cache;
pub mod config;
pub mod memory;
pub mod remote;
