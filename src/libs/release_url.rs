//! Builds the download address for a Cloud SDK release.
//!
//! The address is a pure function of (platform, architecture, version). The
//! three recognized platforms differ only in the filename token and archive
//! extension: `linux` and `darwin` releases ship as `.tar.gz`, `win32`
//! releases ship as `.zip`. That distinction is what selects the extraction
//! strategy downstream, so it must be preserved exactly.

use crate::errors::{Error, Result};

/// Base URL under which release archives are published.
const DOWNLOAD_BASE_URL: &str = "https://dl.google.com/dl/cloudsdk/channels/rapid/downloads";

/// Builds the release URL for the given platform, architecture and version.
///
/// The architecture token is normalized to the release naming convention
/// first: `x64` becomes `x86_64`, `arm64` becomes `arm`, anything else is
/// embedded unchanged. An unrecognized platform is a fatal input error naming
/// the offending value.
pub fn build_release_url(os: &str, arch: &str, version: &str) -> Result<String> {
    // Massage the arch to match the Cloud SDK release conventions.
    let arch = map_release_arch(arch);

    let object_name = match os {
        "linux" => format!("google-cloud-sdk-{version}-linux-{arch}.tar.gz"),
        "darwin" => format!("google-cloud-sdk-{version}-darwin-{arch}.tar.gz"),
        "win32" => format!("google-cloud-sdk-{version}-windows-{arch}.zip"),
        other => return Err(Error::UnexpectedOs(other.to_string())),
    };

    Ok(format!("{DOWNLOAD_BASE_URL}/{object_name}"))
}

/// Maps a detected architecture token onto the token used in release
/// filenames. Unmapped values pass through unchanged.
fn map_release_arch(arch: &str) -> &str {
    match arch {
        "x64" => "x86_64",
        "arm64" => "arm",
        other => other,
    }
}
