use std::io;
use thiserror::Error;

/// SRV discovery failures. Both variants send the caller to the fallback.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("SRV query for {name} failed: {reason}")]
    QueryFailed { name: String, reason: String },

    #[error("SRV query for {name} returned no records")]
    NoRecords { name: String },
}

/// Invalid fallback endpoint setting.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("malformed endpoint {input:?}: {reason}")]
    Malformed { input: String, reason: &'static str },

    #[error("port {port:?} in {input:?} does not fit in 16 bits")]
    PortOutOfRange { input: String, port: String },

    #[error("empty host in endpoint {input:?}")]
    EmptyHost { input: String },
}

/// Failures while inspecting or reconfiguring the tunnel interface.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("WireGuard control unavailable: {0}")]
    ClientUnavailable(#[source] io::Error),

    #[error("WireGuard device {0} not found")]
    DeviceNotFound(String),

    #[error("cannot reconfigure device {interface} with {count} configured peers")]
    UnexpectedPeerCount { interface: String, count: usize },

    #[error("failed to resolve UDP address {endpoint}")]
    AddressResolutionFailed {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to reconfigure peer on {interface}")]
    ApplyFailed {
        interface: String,
        #[source]
        source: io::Error,
    },
}
