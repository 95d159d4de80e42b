//! Ring-leader coordinator: worker registration, heartbeat-stream tracking,
//! and periodic liveness sweeps over the registry.

pub mod server;
pub mod service;
pub mod sweep;

pub use server::LeaderServer;
pub use service::RingLeaderService;
pub use sweep::LivenessSweep;
