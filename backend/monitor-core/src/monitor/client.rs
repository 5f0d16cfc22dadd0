//! The sender's side of the control channel.

use crate::error::monitor::MonitorError;
use crate::monitor::address::{resolve_local_host, resolve_loopback};
use crate::monitor::listener::disable_linger;
use crate::protocol::encode;

use common::{ErrorLocation, MonitorKey};

use std::net::SocketAddr;
use std::panic::Location;

use log::{debug, trace};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// Connect, write the key and command lines, flush and close.
///
/// There is no acknowledgement: success means the bytes were handed to the
/// transport, not that the monitor acted on them.
pub(crate) async fn deliver(
    key: &MonitorKey,
    port: u16,
    command: &str,
) -> Result<(), MonitorError> {
    if command.contains(['\n', '\r']) {
        return Err(MonitorError::Write {
            message: String::from("Command must be a single line"),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let mut stream = connect_monitor(port).await?;
    disable_linger(&stream)?;

    let payload = encode(key, command);
    stream
        .write_all(payload.as_bytes())
        .await
        .map_err(|e| MonitorError::Write {
            message: format!("Failed to write command: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    stream.flush().await.map_err(|e| MonitorError::Write {
        message: format!("Failed to flush command: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // The monitor may already have closed its end after reading both lines.
    if let Err(e) = stream.shutdown().await {
        trace!("Ignoring error closing monitor connection: {e}");
    }

    Ok(())
}

async fn connect_monitor(port: u16) -> Result<TcpStream, MonitorError> {
    let primary = match resolve_local_host(port).await {
        Ok(address) => connect_address(address).await,
        Err(e) => Err(e),
    };

    match primary {
        Ok(stream) => Ok(stream),
        Err(e) if e.is_address_specific() => {
            debug!("Connecting to resolved local host failed, retrying on loopback: {e}");
            let address = resolve_loopback(port).await?;
            connect_address(address).await
        }
        Err(e) => Err(e),
    }
}

async fn connect_address(address: SocketAddr) -> Result<TcpStream, MonitorError> {
    TcpStream::connect(address)
        .await
        .map_err(|e| MonitorError::Connect {
            message: format!("Failed to connect to monitor at {address}: {e}"),
            location: ErrorLocation::from(Location::caller()),
            source: e,
        })
}
