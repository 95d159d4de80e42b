//! Worker-side membership lifecycle against a single, statically configured
//! ring leader.
//!
//! The agent registers with a fixed retry delay, then drives a persistent
//! heartbeat stream. Stream setup failures back off exponentially; a failed
//! send on an open stream triggers re-registration instead.

pub mod agent;
pub mod backoff;

pub use agent::{LeaderInfo, WorkerAgent};
pub use backoff::ExponentialBackoff;
