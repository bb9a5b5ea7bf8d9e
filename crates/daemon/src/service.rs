//! Daemon composition
//!
//! Wires one store, one clipboard watcher and one socket server together,
//! and owns the shutdown order: stop the poller, close the server, let it
//! remove the socket file.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clipboard::{Clipboard, ClipboardWatcher, DEFAULT_POLL_INTERVAL};
use history::{HistoryStore, DEFAULT_CAPACITY};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::router::CommandRouter;
use crate::server::IpcServer;

/// Tunables for one daemon instance.
#[derive(Debug, Clone)]
pub struct Config {
    pub socket_path: PathBuf,
    pub capacity: usize,
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket_path: ipc::default_socket_path(),
            capacity: DEFAULT_CAPACITY,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// A running daemon: the server and the watcher over one shared store.
pub struct Daemon {
    store: Arc<HistoryStore>,
    watcher_task: JoinHandle<()>,
    server_task: JoinHandle<()>,
    quit_rx: mpsc::Receiver<()>,
    shutdown_tx: mpsc::Sender<()>,
}

impl Daemon {
    /// Bind the socket and start the server and watcher tasks.
    pub fn start(config: Config, clipboard: Arc<dyn Clipboard>) -> Result<Self> {
        let store = Arc::new(HistoryStore::new(config.capacity));
        let router = Arc::new(CommandRouter::new(store.clone(), clipboard.clone()));

        let server = IpcServer::bind(&config.socket_path)?;
        let (quit_tx, quit_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let server_task = tokio::spawn(server.run(router, quit_tx, shutdown_rx));

        let watcher = ClipboardWatcher::new(clipboard, store.clone())
            .with_interval(config.poll_interval);
        let watcher_task = tokio::spawn(watcher.run());

        Ok(Self {
            store,
            watcher_task,
            server_task,
            quit_rx,
            shutdown_tx,
        })
    }

    pub fn store(&self) -> &Arc<HistoryStore> {
        &self.store
    }

    /// Resolves when a client asks the daemon to quit over the socket.
    pub async fn quit_requested(&mut self) {
        self.quit_rx.recv().await;
        info!("Quit requested over the socket");
    }

    /// Stop the poller, close the server, wait for both tasks.
    pub async fn shutdown(self) {
        self.watcher_task.abort();
        let _ = self.shutdown_tx.send(()).await;
        let _ = self.server_task.await;
        let _ = self.watcher_task.await;
        info!("Daemon stopped");
    }
}
