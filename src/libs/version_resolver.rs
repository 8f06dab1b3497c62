//! Version resolution.
//!
//! A caller asks for a version using a specification: an exact version
//! (`"416.0.0"`), the sentinel `"latest"`, or a semver range (`"> 400.0.0"`).
//! An exact version is returned as-is without any metadata fetch. Everything
//! else is matched against the published candidate list and the maximum
//! satisfying version wins, under standard semver precedence.
//!
//! Two metadata documents back this up:
//! - the components manifest, whose `version` field names the latest stable
//!   release, and
//! - the compiled versions list, a JSON array of every published release.
//!
//! Failure to fetch or decode either document is a fetch error; an empty
//! match against a healthy candidate list is a distinct "no matching
//! version" error naming the constraint.

use std::thread;
use std::time::Duration;

use colored::Colorize;
use semver::{Version, VersionReq};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::errors::{Error, Result};
use crate::log_debug;

/// URL of the JSON document that names the latest Cloud SDK version.
const COMPONENTS_URL: &str =
    "https://dl.google.com/dl/cloudsdk/channels/rapid/components-2.json";

/// URL of the compiled list of all published Cloud SDK versions.
const VERSIONS_URL: &str =
    "https://raw.githubusercontent.com/google-github-actions/setup-cloud-sdk/main/data/versions.json";

/// Bounded retry policy for metadata fetches: 3 attempts, 200 ms base delay,
/// doubling between attempts. This is the only place in the crate where
/// anything is retried.
const FETCH_MAX_ATTEMPTS: u32 = 3;
const FETCH_BASE_DELAY_MS: u64 = 200;

/// Source of version metadata. The HTTP implementation is the real one;
/// tests substitute fixed lists.
pub trait VersionMetadata {
    /// The latest stable release version.
    fn latest_version(&self) -> Result<String>;
    /// Every published release version, in no particular order.
    fn available_versions(&self) -> Result<Vec<String>>;
}

/// The components manifest; only the `version` field matters here.
#[derive(Debug, Deserialize)]
struct ComponentsManifest {
    version: String,
}

/// Fetches version metadata over HTTP with bounded retries.
pub struct HttpVersionMetadata {
    components_url: String,
    versions_url: String,
}

impl Default for HttpVersionMetadata {
    fn default() -> Self {
        HttpVersionMetadata {
            components_url: COMPONENTS_URL.to_string(),
            versions_url: VERSIONS_URL.to_string(),
        }
    }
}

impl HttpVersionMetadata {
    /// Overrides the metadata endpoints; exists for tests against local
    /// fixtures.
    pub fn with_urls(components_url: impl Into<String>, versions_url: impl Into<String>) -> Self {
        HttpVersionMetadata {
            components_url: components_url.into(),
            versions_url: versions_url.into(),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut delay = Duration::from_millis(FETCH_BASE_DELAY_MS);
        let mut last_err = None;

        for attempt in 1..=FETCH_MAX_ATTEMPTS {
            log_debug!(
                "[VersionResolver] Fetching {} (attempt {attempt}/{FETCH_MAX_ATTEMPTS})",
                url.blue()
            );
            let outcome = ureq::get(url)
                .set("User-Agent", &crate::user_agent())
                .call()
                .map_err(|e| e.to_string())
                .and_then(|response| {
                    response.into_json::<T>().map_err(|e| {
                        format!("invalid response body: {e}")
                    })
                });

            match outcome {
                Ok(value) => return Ok(value),
                Err(detail) => {
                    last_err = Some(detail);
                    if attempt < FETCH_MAX_ATTEMPTS {
                        thread::sleep(delay);
                        delay *= 2;
                    }
                }
            }
        }

        Err(Error::VersionFetch {
            url: url.to_string(),
            detail: last_err.unwrap_or_else(|| "no attempts were made".to_string()),
        })
    }
}

impl VersionMetadata for HttpVersionMetadata {
    fn latest_version(&self) -> Result<String> {
        let manifest: ComponentsManifest = self.get_json(&self.components_url)?;
        Ok(manifest.version)
    }

    fn available_versions(&self) -> Result<Vec<String>> {
        self.get_json(&self.versions_url)
    }
}

/// Fetches the latest stable Cloud SDK version from the components manifest.
pub fn get_latest_gcloud_sdk_version() -> Result<String> {
    HttpVersionMetadata::default().latest_version()
}

/// Strips a leading `v`/`V` and surrounding whitespace from a version string
/// so `v416.0.0` and `416.0.0` address the same cache entry.
pub fn clean_version(version: &str) -> String {
    let trimmed = version.trim();
    trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed)
        .to_string()
}

/// Resolves `spec` to a concrete version.
///
/// An exact, parseable version short-circuits without consulting metadata.
/// Anything else fetches the candidate list and picks the best match via
/// [`compute_best_version`].
pub fn best_version(spec: &str, metadata: &dyn VersionMetadata) -> Result<String> {
    let spec = spec.trim();
    if let Ok(exact) = Version::parse(&clean_version(spec)) {
        log_debug!(
            "[VersionResolver] '{}' is an exact version, skipping resolution",
            spec.cyan()
        );
        return Ok(exact.to_string());
    }

    let candidates = metadata.available_versions()?;
    compute_best_version(spec, &candidates)
}

/// Picks the maximum candidate satisfying `spec`.
///
/// `"latest"` and the empty string are treated as the unconstrained range.
/// Resolving the same spec against the same candidates always yields the same
/// version; candidate order is irrelevant. Candidates that do not parse as
/// semver are skipped. If nothing satisfies the constraint the error names
/// the constraint verbatim.
pub fn compute_best_version(spec: &str, candidates: &[String]) -> Result<String> {
    let spec = spec.trim();
    if let Ok(exact) = Version::parse(&clean_version(spec)) {
        return Ok(exact.to_string());
    }

    let constraint = match spec {
        "" | "latest" => "*",
        other => other,
    };
    let req = VersionReq::parse(constraint).map_err(|e| Error::InvalidVersionSpec {
        spec: spec.to_string(),
        source: e,
    })?;

    let mut best: Option<Version> = None;
    for candidate in candidates {
        let Ok(version) = Version::parse(&clean_version(candidate)) else {
            continue;
        };
        if req.matches(&version) && best.as_ref().map_or(true, |b| version > *b) {
            best = Some(version);
        }
    }

    match best {
        Some(version) => {
            log_debug!(
                "[VersionResolver] Resolved '{}' to {}",
                spec.cyan(),
                version.to_string().green()
            );
            Ok(version.to_string())
        }
        None => Err(Error::NoMatchingVersion {
            constraint: spec.to_string(),
        }),
    }
}

/// Computes the gcloud version for possibly-empty user input: the empty
/// string and `"latest"` mean the latest known version, anything else is
/// passed through unvalidated. Kept for older callers; new code should use
/// [`best_version`] with a range.
pub fn compute_gcloud_version(spec: Option<&str>, metadata: &dyn VersionMetadata) -> Result<String> {
    match spec.map(str::trim) {
        None | Some("") | Some("latest") => metadata.latest_version(),
        Some(other) => Ok(other.to_string()),
    }
}
