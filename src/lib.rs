//! # setup-cloud-sdk
//!
//! Downloads, installs, caches and authenticates the Google Cloud SDK
//! (`gcloud`) inside automated environments.
//!
//! The crate is organized around a handful of small components:
//!
//! - [`libs::version_resolver`] turns a version specification (an exact
//!   version, `"latest"`, or a semver range such as `"> 400.0.0"`) into a
//!   concrete release version using the published version metadata.
//! - [`libs::release_url`] builds the download URL for a release from the
//!   operating system, architecture and resolved version.
//! - [`libs::installer`] orchestrates download, extraction and placement into
//!   the on-disk tool cache, then registers the SDK's `bin` directory on the
//!   search path.
//! - [`libs::credentials`] classifies credential material as a service
//!   account key or a workload identity federation configuration.
//! - [`libs::gcloud`] wraps every `gcloud` invocation: authentication,
//!   project configuration, component installation and arbitrary commands
//!   with optional JSON decoding.
//!
//! All fallible operations return [`errors::Result`]; nothing in this crate
//! exits the process or swallows an error. The thin CLI in `main.rs` is the
//! only place errors are turned into exit codes.

pub mod config;
pub mod errors;
pub mod libs;
pub mod logger;

pub use config::Config;
pub use errors::{Error, Result};
pub use libs::credentials::{Credential, classify};
pub use libs::gcloud::Gcloud;
pub use libs::installer::Installer;
pub use libs::release_url::build_release_url;
pub use libs::version_resolver::{best_version, compute_best_version, get_latest_gcloud_sdk_version};

/// The `User-Agent` sent with every HTTP request this crate makes. Pulls the
/// version from the crate metadata so releases are distinguishable in server
/// logs.
pub fn user_agent() -> String {
    format!("setup-cloud-sdk/{}", env!("CARGO_PKG_VERSION"))
}
