use thiserror::Error;

use crate::types::Version;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Incompatible peer version {peer}, minimum accepted is {minimum}")]
    IncompatibleVersion { peer: Version, minimum: Version },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Logging error: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;

impl DiscoveryError {
    pub fn config(msg: impl Into<String>) -> Self {
        DiscoveryError::Config(msg.into())
    }

    pub fn logging(msg: impl Into<String>) -> Self {
        DiscoveryError::Logging(msg.into())
    }

    /// Whether this error stems from invalid configuration or attribute values.
    pub fn is_config(&self) -> bool {
        matches!(self, DiscoveryError::Config(_))
    }
}

/// Failures while reading a node off the wire.
///
/// A decode failure never yields a partially built value; the connection attempt
/// that produced the bytes is expected to be abandoned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("variable-length integer exceeds 32 bits")]
    VarIntOverflow,

    #[error("invalid length prefix {0}")]
    InvalidLength(u32),

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("unknown address family {0}")]
    UnknownAddressFamily(i16),

    #[error("invalid ip address length {0}")]
    InvalidAddressLength(u8),

    #[error("invalid port {0}")]
    InvalidPort(i32),

    #[error("node id is empty")]
    EmptyNodeId,

    #[error("duplicate attribute [{0}]")]
    DuplicateAttribute(String),

    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
}
