pub mod bloom;
pub mod config;
pub mod error;
pub mod leader;
pub mod registry;
pub mod shutdown;
pub mod worker;

// Re-export generated protobuf types
pub mod proto {
    tonic::include_proto!("delta");
}
