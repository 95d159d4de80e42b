//! Probabilistic set-membership service: a bloom filter over a fixed-width
//! bitset and a family of SHA digest functions, exposed over gRPC.
//!
//! Independent of the coordinator; shares no state with it.

pub mod bitset;
pub mod filter;
pub mod hash;
pub mod server;
pub mod service;

pub use bitset::Bitset;
pub use filter::Bloom;
pub use hash::PositionHasher;
pub use server::BloomServer;
pub use service::BloomFilterService;
