use std::fmt;
use std::net::SocketAddr;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;

/// A candidate endpoint advertised by one DNS SRV record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    /// Lower is more preferred
    pub priority: u16,

    /// Higher is more preferred among records of equal priority
    pub weight: u16,

    /// Target hostname as found in the record, possibly with a trailing root dot
    pub target: String,

    pub port: u16,
}

/// A host (name or IP literal) and UDP port to point the peer at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // IPv6 literals need brackets to survive a later host:port split
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// WireGuard peer identity (Curve25519 public key).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let array: [u8; 32] = bytes.try_into().ok()?;
        Some(Self(array))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_base64())
    }
}

/// Live state of one configured peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerState {
    pub public_key: PublicKey,

    /// Unset until the peer has been given (or has roamed to) an endpoint
    pub endpoint: Option<SocketAddr>,
}

/// Read-only snapshot of a tunnel interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceState {
    pub name: String,
    pub peers: Vec<PeerState>,
}

/// Request to move an existing peer to a new endpoint.
///
/// Consumers must never create or remove peers when applying it: the key
/// names a peer that is already configured and only its endpoint changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerUpdate {
    pub public_key: PublicKey,
    pub endpoint: SocketAddr,
    update_only: bool,
}

impl PeerUpdate {
    pub fn endpoint_only(public_key: PublicKey, endpoint: SocketAddr) -> Self {
        Self { public_key, endpoint, update_only: true }
    }

    pub fn update_only(&self) -> bool {
        self.update_only
    }
}
