//! Well-known per-user socket path

use std::env;
use std::path::PathBuf;

use nix::unistd::getuid;

/// Environment variable overriding the socket path.
pub const SOCKET_ENV: &str = "CLIPRING_SOCKET";

const SOCKET_DIR: &str = "/tmp";
const SOCKET_PREFIX: &str = "clipring-";

/// Socket path for this user: `/tmp/clipring-<uid>.sock`, unless
/// `CLIPRING_SOCKET` points somewhere else.
pub fn default_socket_path() -> PathBuf {
    if let Ok(path) = env::var(SOCKET_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }
    PathBuf::from(SOCKET_DIR).join(format!("{SOCKET_PREFIX}{}.sock", getuid()))
}
