//! Unix socket server
//!
//! One connection carries one request line and one reply, then closes.
//! QUIT is intercepted here rather than in the router: it is acknowledged
//! on the wire first and only then reported to the host over the quit
//! channel, so the client always sees the OK.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use history::MAX_TEXT_BYTES;
use ipc::Command;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::router::CommandRouter;

/// Longest buffered request line. A maximal ADD payload fits with room to
/// spare; a line still running at this bound is answered with
/// `ERR oversize` and the remainder is discarded unbuffered.
const MAX_REQUEST_BYTES: u64 = 2 * MAX_TEXT_BYTES as u64;

/// Listening half of the daemon.
pub struct IpcServer {
    socket_path: PathBuf,
    listener: UnixListener,
}

impl IpcServer {
    /// Bind the socket, replacing any stale file, and restrict it to the
    /// owning user.
    pub fn bind(socket_path: impl AsRef<Path>) -> Result<Self> {
        let socket_path = socket_path.as_ref().to_path_buf();
        if socket_path.exists() {
            fs::remove_file(&socket_path).with_context(|| {
                format!("Failed to remove stale socket: {}", socket_path.display())
            })?;
        }
        let listener = UnixListener::bind(&socket_path)
            .with_context(|| format!("Failed to bind socket: {}", socket_path.display()))?;
        fs::set_permissions(&socket_path, fs::Permissions::from_mode(0o600)).with_context(
            || format!("Failed to restrict socket permissions: {}", socket_path.display()),
        )?;
        info!("Daemon listening on {}", socket_path.display());
        Ok(Self {
            socket_path,
            listener,
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Accept connections until the host signals shutdown, then remove the
    /// socket file. In-flight connections are left to finish on their own.
    ///
    /// `quit_tx` carries a QUIT request out to the host; `shutdown_rx`
    /// carries the host's stop decision back in.
    pub async fn run(
        self,
        router: Arc<CommandRouter>,
        quit_tx: mpsc::Sender<()>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, _addr)) => {
                            let router = Arc::clone(&router);
                            let quit_tx = quit_tx.clone();
                            tokio::spawn(async move {
                                if let Err(err) = handle_connection(stream, router, quit_tx).await {
                                    warn!("Connection error: {}", err);
                                }
                            });
                        }
                        Err(err) => {
                            error!("Accept error: {}", err);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Server shutting down");
                    break;
                }
            }
        }
        if self.socket_path.exists() {
            if let Err(err) = fs::remove_file(&self.socket_path) {
                error!("Failed to remove socket file: {}", err);
            }
        }
    }
}

/// Serve one connection: read one line, resolve, reply, close.
async fn handle_connection(
    stream: UnixStream,
    router: Arc<CommandRouter>,
    quit_tx: mpsc::Sender<()>,
) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader).take(MAX_REQUEST_BYTES);

    let mut buf = Vec::new();
    reader.read_until(b'\n', &mut buf).await?;

    if !buf.ends_with(b"\n") {
        // The line is still running at the bound: discard the remainder
        // up to its terminator, then answer oversize.
        if buf.len() as u64 == MAX_REQUEST_BYTES {
            warn!("Request line exceeded {} bytes", MAX_REQUEST_BYTES);
            let mut inner = reader.into_inner();
            drain_line(&mut inner).await?;
            writer.write_all(b"ERR oversize\n").await?;
            writer.flush().await?;
            return Ok(());
        }
        // Peer closed before a terminator arrived: process nothing.
        return Ok(());
    }

    let line = String::from_utf8_lossy(&buf);
    let reply = match ipc::parse_line(&line) {
        Command::Quit => {
            writer.write_all(b"OK\n").await?;
            writer.flush().await?;
            let _ = quit_tx.try_send(());
            return Ok(());
        }
        command => router.handle(command).await,
    };

    writer.write_all(reply.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Discard input up to and including the next newline, or to EOF.
async fn drain_line<R>(reader: &mut R) -> std::io::Result<()>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    loop {
        let chunk = reader.fill_buf().await?;
        if chunk.is_empty() {
            return Ok(());
        }
        match chunk.iter().position(|&byte| byte == b'\n') {
            Some(at) => {
                reader.consume(at + 1);
                return Ok(());
            }
            None => {
                let len = chunk.len();
                reader.consume(len);
            }
        }
    }
}
