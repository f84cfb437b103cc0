use std::io;
use std::net::{IpAddr, SocketAddr};
use shared::types::{Endpoint, PeerUpdate};
use crate::error::ReconcileError;
use super::TunnelControl;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The peer already points at the target address
    NoChange,
    Updated {
        from: Option<SocketAddr>,
        to: SocketAddr,
    },
}

/// Point the single peer of `interface` at `target` if it isn't already.
///
/// The control handle returned by `connect` lives for this call only and is
/// dropped on every return path.
pub async fn reconcile<C, F>(
    connect: F,
    interface: &str,
    target: &Endpoint,
) -> Result<Outcome, ReconcileError>
where
    C: TunnelControl,
    F: FnOnce() -> Result<C, ReconcileError>,
{
    let control = connect()?;
    reconcile_with(&control, interface, target).await
}

pub async fn reconcile_with<C: TunnelControl>(
    control: &C,
    interface: &str,
    target: &Endpoint,
) -> Result<Outcome, ReconcileError> {
    let device = control.device(interface)?;

    let peer = match device.peers.as_slice() {
        [peer] => peer,
        peers => {
            return Err(ReconcileError::UnexpectedPeerCount {
                interface: device.name.clone(),
                count: peers.len(),
            })
        }
    };
    tracing::debug!("Reconfiguring peer with pubkey {}...", peer.public_key);

    let addr = resolve_udp_addr(target).await?;
    tracing::debug!("Resolved UDP address: {}", addr);

    if peer.endpoint.is_some_and(|current| same_address(current, addr)) {
        tracing::debug!("Nothing to do!");
        return Ok(Outcome::NoChange);
    }

    let update = PeerUpdate::endpoint_only(peer.public_key, addr);
    control
        .apply(&device.name, &update)
        .map_err(|source| ReconcileError::ApplyFailed {
            interface: device.name.clone(),
            source,
        })?;

    tracing::debug!("Peer successfully reconfigured.");
    Ok(Outcome::Updated { from: peer.endpoint, to: addr })
}

/// Resolve a host to one UDP address, preferring IPv4 when both families
/// are returned.
pub async fn resolve_udp_addr(target: &Endpoint) -> Result<SocketAddr, ReconcileError> {
    let failed = |source: io::Error| ReconcileError::AddressResolutionFailed {
        endpoint: target.to_string(),
        source,
    };

    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((target.host.as_str(), target.port))
        .await
        .map_err(failed)?
        .collect();

    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| failed(io::Error::new(io::ErrorKind::NotFound, "no addresses found")))
}

/// IP bytes and port match. IPv4-mapped IPv6 equals the plain IPv4 form.
fn same_address(a: SocketAddr, b: SocketAddr) -> bool {
    canonical_ip(a.ip()) == canonical_ip(b.ip()) && a.port() == b.port()
}

fn canonical_ip(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(ip),
        v4 => v4,
    }
}
