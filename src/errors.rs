//! The crate-wide error type.
//!
//! Every failure in this crate falls into one of a few buckets: bad input
//! (unrecognized OS, malformed version spec, malformed credential JSON),
//! failed version resolution, transport failures while fetching metadata or
//! archives, non-zero exits from `gcloud`, and JSON parse failures on tool
//! output. Each variant carries enough context to diagnose the failure
//! without re-running anything; lower-level errors are wrapped, never
//! replaced.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The operating system is not one the Cloud SDK publishes releases for.
    #[error("Unexpected OS '{0}'")]
    UnexpectedOs(String),

    /// No available release satisfied the requested version constraint.
    #[error("failed to find any versions matching '{constraint}'")]
    NoMatchingVersion { constraint: String },

    /// The version specification is neither an exact version nor a parseable
    /// semver range.
    #[error("invalid version constraint '{spec}': {source}")]
    InvalidVersionSpec {
        spec: String,
        #[source]
        source: semver::Error,
    },

    /// The version metadata endpoint could not be reached or returned a
    /// malformed document. Distinct from [`Error::NoMatchingVersion`]: this
    /// means we never got a usable candidate list at all.
    #[error("failed to retrieve Cloud SDK version metadata from {url}: {detail}")]
    VersionFetch { url: String, detail: String },

    /// The download destination already exists. Downloads always go to a
    /// fresh location; an existing file means a previous partial download
    /// and is never silently overwritten.
    #[error("download destination already exists: {0}")]
    DownloadCollision(PathBuf),

    /// The release archive could not be downloaded.
    #[error("failed to download {url}: {detail}")]
    Download { url: String, detail: String },

    /// The release address did not match any supported archive format
    /// (`.zip`, `.tar.gz`, `.7z`).
    #[error("unexpected download archive type for '{0}'")]
    UnexpectedArchiveType(String),

    /// Archive extraction failed.
    #[error("failed to extract archive {path}: {detail}")]
    Extract { path: PathBuf, detail: String },

    /// No credential material was supplied and the well-known environment
    /// variable is not set.
    #[error(
        "Error authenticating the Cloud SDK. Supply a service account key or set \
         GOOGLE_GHA_CREDS_PATH to a credentials file."
    )]
    CredentialsMissing,

    /// The credential material is not valid JSON. Carries the parser detail.
    #[error("Failed to parse credentials as JSON: {0}")]
    CredentialsParse(String),

    /// The credential record parsed but lacks a field the authentication
    /// flow needs.
    #[error("credential record is missing required field '{0}'")]
    CredentialField(&'static str),

    /// A workload identity federation configuration was supplied inline.
    /// `gcloud auth login --cred-file` takes a file path, so federated
    /// credentials must arrive through the credentials file.
    #[error(
        "federated credentials must be supplied through the credentials file path, \
         not as an inline key"
    )]
    FederatedInline,

    /// `gcloud` exited non-zero. Carries the full command line and either the
    /// captured stderr or a synthetic note when stderr was empty.
    #[error("command failed: `{command}`: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// The spawned process exited but its output streams did not close in
    /// time. Kept as its own variant so callers and tests can tell it apart
    /// from an ordinary failure; the rendered message keeps the same
    /// `command failed` shape.
    #[error("command failed: `{command}`: timed out waiting for output streams to close")]
    CommandTimeout { command: String },

    /// Tool output could not be decoded as JSON. Carries the verbatim stdout
    /// and stderr so diagnosing malformed output never requires a re-run.
    #[error("failed to parse command output as JSON: {detail}\nstdout: {stdout}\nstderr: {stderr}")]
    JsonOutput {
        detail: String,
        stdout: String,
        stderr: String,
    },

    /// An I/O failure, annotated with the operation being attempted.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// A lower-level error wrapped with the operation being attempted.
    #[error("{context}: {source}")]
    Wrapped {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Annotates an I/O error with the operation that produced it.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    /// Wraps this error with added context, preserving the original as the
    /// source.
    pub fn wrap(self, context: impl Into<String>) -> Self {
        Error::Wrapped {
            context: context.into(),
            source: Box::new(self),
        }
    }
}
