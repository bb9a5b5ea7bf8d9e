//! IPC client for daemon communication
//!
//! One connection per request: connect, write the request line, read the
//! reply until the daemon closes the connection.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;
use tracing::{debug, trace};

/// Bound on establishing the connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(200);

/// Bound on the full reply round trip once connected.
pub const IO_TIMEOUT: Duration = Duration::from_secs(2);

/// Failure categories a caller can branch on.
///
/// A daemon that is not running and a daemon that is running but silent
/// are different conditions; collapsing them would make "no history"
/// (the successful `EMPTY` reply) ambiguous with "no daemon".
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The socket is absent or nothing is accepting on it.
    #[error("daemon not reachable at {}: {source}", path.display())]
    NotRunning {
        path: PathBuf,
        source: std::io::Error,
    },

    /// No reply arrived within the I/O window, or the connection closed
    /// without carrying one.
    #[error("timed out waiting for the daemon")]
    Timeout,

    #[error("i/o error talking to the daemon: {0}")]
    Io(#[from] std::io::Error),
}

/// Client for the daemon socket.
///
/// Carries no history knowledge - it ships one request line and returns
/// the raw reply text. Each call opens a fresh connection (connection-per-
/// request model), so there is no connection state to manage.
#[derive(Debug, Clone)]
pub struct Client {
    socket_path: PathBuf,
    connect_timeout: Duration,
    io_timeout: Duration,
}

impl Client {
    /// Create a client for the given socket path with the default bounds.
    pub fn new(socket_path: impl AsRef<Path>) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
            connect_timeout: CONNECT_TIMEOUT,
            io_timeout: IO_TIMEOUT,
        }
    }

    /// Override both timeout bounds (tests use short ones).
    pub fn with_timeouts(mut self, connect: Duration, io: Duration) -> Self {
        self.connect_timeout = connect;
        self.io_timeout = io;
        self
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Send one request line and return the full reply text.
    ///
    /// The reply is everything the daemon writes before closing the
    /// connection, decoded as UTF-8 (lossily). A connection that closes
    /// without any reply bytes reports [`ClientError::Timeout`], never an
    /// empty string: on this protocol an empty history is the literal
    /// `EMPTY` line, so an empty payload is always a transport failure.
    pub async fn send(&self, line: &str) -> Result<String, ClientError> {
        let started = Instant::now();

        let stream = match timeout(self.connect_timeout, UnixStream::connect(&self.socket_path)).await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(ClientError::NotRunning {
                    path: self.socket_path.clone(),
                    source,
                })
            }
            Err(_) => return Err(ClientError::Timeout),
        };

        let (mut reader, mut writer) = stream.into_split();

        let mut request = line.to_string();
        request.push('\n');
        writer.write_all(request.as_bytes()).await?;
        writer.flush().await?;

        trace!("request sent, waiting for reply");

        let mut reply = Vec::new();
        match timeout(self.io_timeout, reader.read_to_end(&mut reply)).await {
            Ok(Ok(_)) => {}
            // A peer that closes with the request still unread shows up as
            // a reset; with zero reply bytes in hand that is the same
            // no-reply outcome as a connection that closes silently.
            Ok(Err(source))
                if source.kind() == std::io::ErrorKind::ConnectionReset && reply.is_empty() =>
            {
                return Err(ClientError::Timeout)
            }
            Ok(Err(source)) => return Err(ClientError::Io(source)),
            Err(_) => return Err(ClientError::Timeout),
        }
        if reply.is_empty() {
            return Err(ClientError::Timeout);
        }

        debug!(
            elapsed_ms = started.elapsed().as_micros() as f64 / 1000.0,
            reply_bytes = reply.len(),
            "round trip complete"
        );

        Ok(String::from_utf8_lossy(&reply).into_owned())
    }
}
