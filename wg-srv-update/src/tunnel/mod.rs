pub mod reconcile;
pub mod wireguard;

use std::io;
use shared::types::{InterfaceState, PeerUpdate};
use crate::error::ReconcileError;

pub use reconcile::{reconcile, Outcome};
pub use wireguard::WgControl;

/// Read and write access to live tunnel interface configuration.
pub trait TunnelControl {
    /// Snapshot of the named interface and its peers
    fn device(&self, interface: &str) -> Result<InterfaceState, ReconcileError>;

    /// Apply an endpoint change to one existing peer. Must not add, remove,
    /// or otherwise alter peers.
    fn apply(&self, interface: &str, update: &PeerUpdate) -> io::Result<()>;
}
