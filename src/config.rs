//! Explicit configuration for the install and authentication flows.
//!
//! Everything that would otherwise be read from ambient process state (the
//! credentials file variable, the cache root, the search path) is captured
//! here once and threaded through the components, so tests can construct a
//! [`Config`] pointing at temporary directories without touching the real
//! environment.

use std::env;
use std::path::{Path, PathBuf};

use crate::log_warn;

/// Environment variable naming the file that holds credential JSON. Written
/// by the companion auth step; consulted when no key is supplied explicitly.
pub const CREDS_PATH_ENV: &str = "GOOGLE_GHA_CREDS_PATH";

/// Settings shared by the installer and the `gcloud` wrapper.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to a file containing credential JSON, if one was provided through
    /// the environment.
    pub credential_path: Option<PathBuf>,
    /// Root of the on-disk tool cache. Installed SDK versions live under
    /// `<cache_root>/<tool>/<version>/<arch>/`.
    pub cache_root: PathBuf,
    /// Parent directory for per-install staging directories.
    pub temp_root: PathBuf,
}

impl Config {
    /// Builds a configuration from the process environment: credential path
    /// from [`CREDS_PATH_ENV`], cache root under the user cache directory,
    /// staging under the system temp directory.
    pub fn from_env() -> Self {
        let credential_path = env::var_os(CREDS_PATH_ENV).map(PathBuf::from);
        let cache_root = dirs::cache_dir()
            .unwrap_or_else(env::temp_dir)
            .join("setup-cloud-sdk");
        Config {
            credential_path,
            cache_root,
            temp_root: env::temp_dir(),
        }
    }
}

/// Where newly installed executable directories get registered so later
/// invocations (and subprocesses) can find the tool.
pub trait PathRegistrar {
    /// Puts `dir` at the front of the executable search path.
    fn prepend(&self, dir: &Path);
}

/// The default registrar: prepends to the process `PATH` variable, which is
/// inherited by every subprocess we spawn.
pub struct EnvPathRegistrar;

impl PathRegistrar for EnvPathRegistrar {
    fn prepend(&self, dir: &Path) {
        let current = env::var_os("PATH").unwrap_or_default();
        let mut parts = vec![dir.to_path_buf()];
        parts.extend(env::split_paths(&current));
        match env::join_paths(parts) {
            Ok(joined) => {
                // SAFETY: single-threaded setup phase; nothing else reads or
                // writes the environment concurrently.
                unsafe { env::set_var("PATH", &joined) };
                crate::log_debug!("[Config] Prepended {} to PATH", dir.display());
            }
            Err(e) => {
                log_warn!(
                    "[Config] Could not register {} on PATH: {}",
                    dir.display(),
                    e
                );
            }
        }
    }
}
