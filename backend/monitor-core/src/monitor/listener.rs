//! The monitor's side of the control channel.
//!
//! The listener owns the bound socket and processes sessions strictly one at
//! a time: accept, authenticate, decode, dispatch, close. Only a decoded
//! `stop` or an external shutdown ends the loop; every per-session failure is
//! logged and the loop carries on.

use crate::MONITOR_BACKLOG;
use crate::error::monitor::MonitorError;
use crate::logger::{
    INVALID_MONITOR_KEY, MONITOR_SESSION_ERROR, MonitorLogger, RECEIVING_COMMAND,
    WAITING_FOR_COMMAND,
};
use crate::monitor::address::{resolve_local_host, resolve_loopback};
use crate::monitor::shutdown::ShutdownSignal;
use crate::protocol::{AuthFailure, Command, decode};
use crate::resource::ControlledResource;

use common::{ErrorLocation, MonitorKey};

use std::net::SocketAddr;
use std::panic::Location;

use log::{debug, trace};
use socket2::SockRef;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpSocket, TcpStream};

/// Whether the accept loop keeps going after a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Stop,
}

/// Why the accept loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopExit {
    StopRequested,
    Shutdown,
}

enum SessionOutcome {
    Dispatched(Flow),
    Rejected(AuthFailure),
}

/// Bind the monitor port on the resolved local host, falling back to the
/// loopback host when that address is in use or unavailable.
pub(crate) async fn bind_monitor(port: u16) -> Result<TcpListener, MonitorError> {
    let primary = match resolve_local_host(port).await {
        Ok(address) => bind_address(address),
        Err(e) => Err(e),
    };

    match primary {
        Ok(listener) => Ok(listener),
        Err(e) if e.is_address_specific() => {
            debug!("Binding resolved local host failed, retrying on loopback: {e}");
            let address = resolve_loopback(port).await?;
            bind_address(address)
        }
        Err(e) => Err(e),
    }
}

fn bind_address(address: SocketAddr) -> Result<TcpListener, MonitorError> {
    let socket = if address.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;

    socket.bind(address).map_err(|e| MonitorError::Bind {
        message: format!("Failed to bind monitor to {address}: {e}"),
        location: ErrorLocation::from(Location::caller()),
        source: e,
    })?;

    let listener = socket
        .listen(MONITOR_BACKLOG)
        .map_err(|e| MonitorError::Bind {
            message: format!("Failed to listen on {address}: {e}"),
            location: ErrorLocation::from(Location::caller()),
            source: e,
        })?;

    debug!("Monitor listening on {address}");
    Ok(listener)
}

/// Accept and process sessions until `stop` is dispatched or shutdown is
/// requested.
pub(crate) async fn run_accept_loop(
    listener: &TcpListener,
    key: &MonitorKey,
    resource: &dyn ControlledResource,
    logger: &dyn MonitorLogger,
    shutdown: &mut ShutdownSignal,
) -> LoopExit {
    loop {
        logger.log_info(WAITING_FOR_COMMAND);

        let accepted = tokio::select! {
            accepted = listener.accept() => accepted,
            () = shutdown.requested() => {
                debug!("Monitor shutdown requested, closing listener");
                return LoopExit::Shutdown;
            }
        };

        let (stream, peer) = match accepted {
            Ok(connection) => connection,
            Err(e) => {
                logger.log_error_with_cause(MONITOR_SESSION_ERROR, &e);
                continue;
            }
        };

        logger.log_info(RECEIVING_COMMAND);
        trace!("Session opened by {peer}");

        match handle_session(stream, key, resource).await {
            Ok(SessionOutcome::Dispatched(Flow::Stop)) => return LoopExit::StopRequested,
            Ok(SessionOutcome::Dispatched(Flow::Continue)) => {}
            Ok(SessionOutcome::Rejected(failure)) => {
                trace!("Session from {peer} rejected: {failure}");
                logger.log_error(INVALID_MONITOR_KEY);
            }
            Err(e) => logger.log_error_with_cause(MONITOR_SESSION_ERROR, &e),
        }
    }
}

/// One session. The stream is owned here so it is closed on every return path.
async fn handle_session(
    stream: TcpStream,
    key: &MonitorKey,
    resource: &dyn ControlledResource,
) -> Result<SessionOutcome, MonitorError> {
    disable_linger(&stream)?;

    let mut reader = BufReader::new(stream);
    let key_line = read_line(&mut reader).await?;

    let command_line = match key_line.as_deref() {
        Some(candidate) if key.matches(candidate) => read_line(&mut reader).await?,
        _ => None,
    };

    match decode(key_line.as_deref(), command_line.as_deref(), key) {
        Ok(command) => Ok(SessionOutcome::Dispatched(dispatch(resource, command))),
        Err(failure) => Ok(SessionOutcome::Rejected(failure)),
    }
}

/// Read one line. `None` means the peer closed before sending anything.
async fn read_line(reader: &mut BufReader<TcpStream>) -> Result<Option<String>, MonitorError> {
    let mut raw = Vec::new();
    let read = reader
        .read_until(b'\n', &mut raw)
        .await
        .map_err(|e| MonitorError::Read {
            message: format!("Failed to read command line: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    if read == 0 {
        return Ok(None);
    }
    Ok(Some(decode_line(&raw)))
}

/// Strip the line terminator and decode leniently: bytes that are not UTF-8
/// become replacement characters, so they can never match a key.
pub(crate) fn decode_line(raw: &[u8]) -> String {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

/// Apply one command to the controlled resource.
pub(crate) fn dispatch(resource: &dyn ControlledResource, command: Command) -> Flow {
    debug!("Dispatching command: {command:?}");

    let flow = if command.terminates_loop() {
        Flow::Stop
    } else {
        Flow::Continue
    };

    match command {
        Command::Configure { name, value } => resource.configure(&name, &value),
        Command::Pause => resource.pause(),
        Command::Resume => resource.resume(),
        Command::Stop => resource.stop(),
        Command::Continue => trace!("Ignoring unrecognized command"),
    }

    flow
}

/// Close must not block waiting for unsent data.
pub(crate) fn disable_linger(stream: &TcpStream) -> Result<(), MonitorError> {
    SockRef::from(stream).set_linger(None)?;
    Ok(())
}
