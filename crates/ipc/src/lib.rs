//! Wire protocol and client for clipring daemon communication
//!
//! This crate has no history knowledge - it parses request lines into
//! commands, resolves the per-user socket path, and carries lines to the
//! daemon over a Unix socket, one connection per request.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ipc::Client;
//!
//! let client = Client::new(ipc::default_socket_path());
//! let reply = client.send("LIST").await?;
//! print!("{reply}");
//! ```

mod client;
mod protocol;
mod socket;

pub use client::{Client, ClientError, CONNECT_TIMEOUT, IO_TIMEOUT};
pub use protocol::{parse_line, Command};
pub use socket::{default_socket_path, SOCKET_ENV};
