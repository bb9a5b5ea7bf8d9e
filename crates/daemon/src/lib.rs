//! The clipring daemon
//!
//! Hosts the command router (the single source of truth for command
//! semantics), the Unix socket server that carries it, and the service
//! composition that wires both to the history store and the clipboard
//! watcher.

mod router;
mod server;
mod service;

pub use router::CommandRouter;
pub use server::IpcServer;
pub use service::{Config, Daemon};
