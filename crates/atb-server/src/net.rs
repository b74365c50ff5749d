//! Listener binding with fallback to nearby ports.

use std::io;
use thiserror::Error;
use tokio::net::TcpListener;

/// How many ports after the default are tried when it is taken.
pub const FALLBACK_ATTEMPTS: u16 = 10;

/// Where the port to listen on came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortRequest {
    /// The user asked for this port; it is used or startup fails.
    Explicit(u16),
    /// Built-in default; the next free port is used if it is taken.
    Default(u16),
}

impl PortRequest {
    pub fn port(self) -> u16 {
        match self {
            Self::Explicit(port) | Self::Default(port) => port,
        }
    }
}

/// Errors that can occur while binding the HTTP listener.
#[derive(Debug, Error)]
pub enum BindError {
    /// An explicitly requested port is taken.
    #[error("port {port} on {host} is already in use")]
    PortInUse { host: String, port: u16 },

    /// The default port and all fallback candidates are taken.
    #[error("no free port on {host} between {first} and {last}")]
    NoFreePort { host: String, first: u16, last: u16 },

    /// Binding failed for a reason other than the port being taken.
    #[error("failed to bind {host}:{port}: {source}")]
    Io {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
}

/// Binds a TCP listener on `host` according to `request`.
///
/// For [`PortRequest::Default`], a taken port is followed by up to
/// [`FALLBACK_ATTEMPTS`] consecutive candidates, and the first free one
/// wins.
///
/// # Errors
///
/// Returns [`BindError::PortInUse`] when an explicit port is taken,
/// [`BindError::NoFreePort`] when every candidate is taken, and
/// [`BindError::Io`] for any other bind failure.
pub async fn bind_listener(host: &str, request: PortRequest) -> Result<TcpListener, BindError> {
    let port = request.port();
    match try_bind(host, port).await? {
        Some(listener) => return Ok(listener),
        None => {
            if let PortRequest::Explicit(port) = request {
                return Err(BindError::PortInUse {
                    host: host.to_string(),
                    port,
                });
            }
        }
    }

    let first = port.saturating_add(1);
    let last = port.saturating_add(FALLBACK_ATTEMPTS);
    tracing::info!(port, first, last, "default port is in use, searching for a free one");

    for candidate in first..=last {
        if candidate == port {
            break;
        }
        if let Some(listener) = try_bind(host, candidate).await? {
            return Ok(listener);
        }
        tracing::debug!(port = candidate, "port is in use");
    }

    Err(BindError::NoFreePort {
        host: host.to_string(),
        first,
        last,
    })
}

/// Returns `Ok(None)` when the port is already taken.
async fn try_bind(host: &str, port: u16) -> Result<Option<TcpListener>, BindError> {
    match TcpListener::bind((host, port)).await {
        Ok(listener) => Ok(Some(listener)),
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => Ok(None),
        Err(source) => Err(BindError::Io {
            host: host.to_string(),
            port,
            source,
        }),
    }
}
