//! Command handlers behind the clap surface.
//!
//! Client commands open one connection per request and print whatever the
//! daemon says; the daemon stays the single authority on argument
//! validation. `watch` is the odd one out: it runs the daemon in this
//! process until told to stop.

use std::collections::BTreeSet;
use std::sync::Arc;

use clipboard::{Clipboard, SystemClipboard};
use daemon::Daemon;
use ipc::{Client, ClientError};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

use crate::config::{self, Config};

pub const EXIT_OK: u8 = 0;
pub const EXIT_GENERIC: u8 = 1;
pub const EXIT_BAD_ARGS: u8 = 2;
pub const EXIT_NOT_RUNNING: u8 = 3;
pub const EXIT_TIMEOUT: u8 = 4;

/// Send one request line against the configured socket.
pub async fn forward(config: &Config, line: &str) -> u8 {
    let client = Client::new(config::get_socket_path(config));
    talk(&client, line).await
}

/// Ship one line and render the reply.
///
/// `ERR` replies go to stderr. Only `ERR no-such-index` maps to the
/// bad-arguments exit code; every other `ERR` is the generic failure.
/// Scripts branch on these codes.
async fn talk(client: &Client, line: &str) -> u8 {
    match client.send(line).await {
        Ok(reply) => {
            if reply.starts_with("ERR") {
                eprint!("clipring: {reply}");
                if reply.contains("no-such-index") {
                    EXIT_BAD_ARGS
                } else {
                    EXIT_GENERIC
                }
            } else {
                print!("{reply}");
                EXIT_OK
            }
        }
        Err(ClientError::NotRunning { .. }) => {
            eprintln!("clipring: daemon is not running (start it with: clipring watch)");
            EXIT_NOT_RUNNING
        }
        Err(ClientError::Timeout) => {
            eprintln!("clipring: timed out waiting for the daemon");
            EXIT_TIMEOUT
        }
        Err(err) => {
            eprintln!("clipring: {err}");
            EXIT_GENERIC
        }
    }
}

/// Request line for an index-taking command. An absent argument forwards
/// the bare verb so the daemon's own error vocabulary answers.
pub fn index_line(verb: &str, index: Option<&str>) -> String {
    match index {
        Some(index) => format!("{verb} {index}"),
        None => verb.to_string(),
    }
}

pub async fn find(config: &Config, query: &[String]) -> u8 {
    let query = query.join(" ");
    if query.trim().is_empty() {
        eprintln!("clipring: find needs a query");
        return EXIT_BAD_ARGS;
    }
    forward(config, &format!("FIND {query}")).await
}

pub async fn add(config: &Config, text: &[String]) -> u8 {
    let text = text.join(" ");
    if text.is_empty() {
        return forward(config, "ADD").await;
    }
    forward(config, &format!("ADD {text}")).await
}

/// Delete one entry per resolved target, highest index first so earlier
/// deletions do not shift the remaining ones. The sweep finishes even when
/// a request fails; the last failing code becomes the exit code.
pub async fn del(config: &Config, targets: &[String]) -> u8 {
    let Some(indices) = parse_targets(targets) else {
        eprintln!("clipring: del expects indices, comma lists, or ranges (3 or 1,4 or 0-2)");
        return EXIT_BAD_ARGS;
    };
    let mut code = EXIT_OK;
    for index in indices {
        let result = forward(config, &format!("DEL {index}")).await;
        if result != EXIT_OK {
            code = result;
        }
    }
    code
}

/// Expand `del` targets into a deduplicated, descending index list.
///
/// Accepts plain indices, comma lists, and inclusive ranges (either end
/// may come first), in any mix across arguments. Returns `None` when an
/// item fails to parse or no index remains.
pub fn parse_targets(args: &[String]) -> Option<Vec<usize>> {
    let mut indices = BTreeSet::new();
    for arg in args {
        for part in arg.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if let Some((start, end)) = part.split_once('-') {
                let start: usize = start.trim().parse().ok()?;
                let end: usize = end.trim().parse().ok()?;
                indices.extend(start.min(end)..=start.max(end));
            } else {
                indices.insert(part.parse::<usize>().ok()?);
            }
        }
    }
    if indices.is_empty() {
        return None;
    }
    Some(indices.into_iter().rev().collect())
}

/// Print the CLI version, then whatever the daemon reports.
pub async fn version(config: &Config) -> u8 {
    println!("clipring {}", env!("CARGO_PKG_VERSION"));
    let client = Client::new(config::get_socket_path(config));
    match client.send("VERSION").await {
        Ok(reply) => print!("daemon: {reply}"),
        Err(_) => println!("daemon: not running"),
    }
    EXIT_OK
}

/// Whether something is alive behind an existing socket file. A daemon
/// that answers, or one that accepts and sits on the request, counts as
/// running; only a refused connection marks the file stale.
async fn socket_in_use(client: &Client) -> bool {
    !matches!(client.send("PING").await, Err(ClientError::NotRunning { .. }))
}

/// Run the daemon in the foreground until QUIT, SIGINT, or SIGTERM.
pub async fn watch(config: &Config) -> u8 {
    let runtime_config = config::daemon_config(config);
    let socket_path = runtime_config.socket_path.clone();

    if socket_path.exists() {
        let client = Client::new(&socket_path);
        if socket_in_use(&client).await {
            eprintln!(
                "clipring: a daemon is already running on {}",
                socket_path.display()
            );
            return EXIT_GENERIC;
        }
        warn!("Removing stale socket {}", socket_path.display());
        if let Err(err) = std::fs::remove_file(&socket_path) {
            eprintln!("clipring: could not remove stale socket: {err}");
            return EXIT_GENERIC;
        }
    }

    let clipboard: Arc<dyn Clipboard> = match SystemClipboard::new() {
        Ok(clipboard) => Arc::new(clipboard),
        Err(err) => {
            eprintln!("clipring: clipboard unavailable: {err}");
            return EXIT_GENERIC;
        }
    };

    let mut daemon = match Daemon::start(runtime_config, clipboard) {
        Ok(daemon) => daemon,
        Err(err) => {
            eprintln!("clipring: {err:#}");
            return EXIT_GENERIC;
        }
    };

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(err) => {
            eprintln!("clipring: could not install signal handler: {err}");
            daemon.shutdown().await;
            return EXIT_GENERIC;
        }
    };

    tokio::select! {
        _ = daemon.quit_requested() => {}
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
        _ = sigterm.recv() => info!("Terminated"),
    }

    daemon.shutdown().await;
    EXIT_OK
}
