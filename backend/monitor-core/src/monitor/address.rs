//! Resolution of the endpoints the listener binds and the client connects to.
//!
//! Both sides first try the machine's own hostname and fall back to
//! [`LOOPBACK_HOSTNAME`] when that address is unusable.

use crate::LOOPBACK_HOSTNAME;
use crate::error::monitor::MonitorError;

use common::ErrorLocation;

use std::net::SocketAddr;
use std::panic::Location;

use log::trace;
use sysinfo::System;
use tokio::net::lookup_host;

/// Resolve the local machine's hostname to a socket address on `port`.
pub(crate) async fn resolve_local_host(port: u16) -> Result<SocketAddr, MonitorError> {
    let hostname = System::host_name().ok_or_else(|| MonitorError::Resolve {
        message: String::from("Local hostname is unavailable"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    resolve(&hostname, port).await
}

pub(crate) async fn resolve_loopback(port: u16) -> Result<SocketAddr, MonitorError> {
    resolve(LOOPBACK_HOSTNAME, port).await
}

/// IPv4 addresses win when a host resolves to both families.
async fn resolve(host: &str, port: u16) -> Result<SocketAddr, MonitorError> {
    let addresses: Vec<SocketAddr> = lookup_host((host, port))
        .await
        .map_err(|e| MonitorError::Resolve {
            message: format!("Failed to resolve {host}: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?
        .collect();

    let address = addresses
        .iter()
        .find(|address| address.is_ipv4())
        .or_else(|| addresses.first())
        .copied()
        .ok_or_else(|| MonitorError::Resolve {
            message: format!("{host} resolved to no addresses"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    trace!("Resolved {host} to {address}");
    Ok(address)
}
