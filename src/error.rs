use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeltaError {
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(#[from] chrono::ParseError),

    #[error("Bit position {pos} out of range for bitset of size {size}")]
    BitOutOfRange { pos: u64, size: u64 },

    #[error("Invalid filter parameters: {0}")]
    InvalidFilterConfig(String),

    #[error("Invalid listen address: {0}")]
    InvalidAddr(#[from] std::net::AddrParseError),

    #[error("gRPC error: {0}")]
    Grpc(#[from] tonic::Status),

    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("Failed to read config file: {0}")]
    ConfigRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, DeltaError>;
