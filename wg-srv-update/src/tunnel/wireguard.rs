use std::io;
use wireguard_control::{Backend, Device, DeviceUpdate, InterfaceName, Key, PeerConfigBuilder};
use shared::types::{InterfaceState, PeerState, PeerUpdate, PublicKey};
use crate::config::BackendKind;
use crate::error::ReconcileError;
use super::TunnelControl;

/// Handle on the WireGuard configuration interface of one backend.
pub struct WgControl {
    backend: BackendKind,
    interfaces: Vec<InterfaceName>,
}

impl WgControl {
    /// Listing devices proves the backend is present and that we are
    /// allowed to talk to it.
    pub fn connect(backend: BackendKind) -> Result<Self, ReconcileError> {
        let interfaces = Device::list(wg_backend(backend)).map_err(ReconcileError::ClientUnavailable)?;
        tracing::debug!("WireGuard {:?} backend has {} interface(s)", backend, interfaces.len());
        Ok(Self { backend, interfaces })
    }

    fn interface_name(&self, interface: &str) -> Result<InterfaceName, ReconcileError> {
        let not_found = || ReconcileError::DeviceNotFound(interface.to_string());
        let name: InterfaceName = interface.parse().map_err(|_| not_found())?;
        if !self.interfaces.contains(&name) {
            return Err(not_found());
        }
        Ok(name)
    }
}

impl TunnelControl for WgControl {
    fn device(&self, interface: &str) -> Result<InterfaceState, ReconcileError> {
        let name = self.interface_name(interface)?;
        let device = Device::get(&name, wg_backend(self.backend)).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ReconcileError::DeviceNotFound(interface.to_string()),
            _ => ReconcileError::ClientUnavailable(e),
        })?;

        let peers = device
            .peers
            .iter()
            .map(|info| {
                let public_key = PublicKey::from_bytes(info.config.public_key.as_bytes())
                    .ok_or_else(|| {
                        ReconcileError::ClientUnavailable(io::Error::new(
                            io::ErrorKind::InvalidData,
                            "peer public key is not 32 bytes",
                        ))
                    })?;
                Ok(PeerState { public_key, endpoint: info.config.endpoint })
            })
            .collect::<Result<Vec<_>, ReconcileError>>()?;

        Ok(InterfaceState { name: device.name.to_string(), peers })
    }

    fn apply(&self, interface: &str, update: &PeerUpdate) -> io::Result<()> {
        let name: InterfaceName = interface
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{}", e)))?;
        let key = Key::from_base64(&update.public_key.to_base64())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "invalid peer public key"))?;

        // Peers not named in the update are left alone as long as
        // replace_peers() is never set.
        DeviceUpdate::new()
            .add_peer(PeerConfigBuilder::new(&key).set_endpoint(update.endpoint))
            .apply(&name, wg_backend(self.backend))
    }
}

#[cfg(target_os = "linux")]
fn wg_backend(kind: BackendKind) -> Backend {
    match kind {
        BackendKind::Kernel => Backend::Kernel,
        BackendKind::Userspace => Backend::Userspace,
    }
}

#[cfg(not(target_os = "linux"))]
fn wg_backend(_kind: BackendKind) -> Backend {
    Backend::Userspace
}
