//! The install pipeline.
//!
//! `install` drives the whole sequence for one version specification:
//!
//! 1. detect platform and architecture;
//! 2. resolve the specification to a concrete version (exact versions skip
//!    the metadata fetch entirely);
//! 3. short-circuit if the cache already holds a complete entry for
//!    (tool, version, arch) — no download happens in that case;
//! 4. build the release address and decide the extraction strategy from its
//!    suffix;
//! 5. download into a unique staging directory (an existing destination file
//!    is a hard error, never overwritten);
//! 6. extract and hand the tree to the cache, which destroys any stale entry
//!    and writes the completion marker last;
//! 7. register the SDK's `bin` directory on the search path and return it.
//!
//! Any step failing aborts the pipeline. Because the marker is written last,
//! an aborted install can never be mistaken for a complete one on retry.
//! There is no internal parallelism and no locking: concurrent installs of
//! the same key are out of scope.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::Colorize;

use crate::config::{Config, EnvPathRegistrar, PathRegistrar};
use crate::errors::{Error, Result};
use crate::libs::tool_cache::ToolCache;
use crate::libs::utilities::compression::{ArchiveKind, extract_archive};
use crate::libs::utilities::{download, platform};
use crate::libs::release_url::build_release_url;
use crate::libs::version_resolver::{HttpVersionMetadata, VersionMetadata, best_version};
use crate::{log_debug, log_info};

/// The tool name under which the SDK is cached.
pub const TOOL_NAME: &str = "gcloud";

/// Top-level directory inside every release archive.
const SDK_ROOT_DIR: &str = "google-cloud-sdk";

/// Fetches a release archive to a local path. The HTTP implementation is the
/// real one; tests substitute a recorder.
pub trait ArtifactFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Downloads release archives over HTTP.
pub struct HttpFetcher;

impl ArtifactFetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        download::download_file(url, dest)
    }
}

/// Orchestrates download, extraction, caching and path registration.
pub struct Installer {
    config: Config,
    cache: ToolCache,
    metadata: Arc<dyn VersionMetadata>,
    fetcher: Arc<dyn ArtifactFetcher>,
    registrar: Arc<dyn PathRegistrar>,
}

impl Installer {
    /// An installer wired to the production collaborators.
    pub fn new(config: Config) -> Self {
        Installer::with_collaborators(
            config,
            Arc::new(HttpVersionMetadata::default()),
            Arc::new(HttpFetcher),
            Arc::new(EnvPathRegistrar),
        )
    }

    /// An installer with explicit collaborators; the seam tests use.
    pub fn with_collaborators(
        config: Config,
        metadata: Arc<dyn VersionMetadata>,
        fetcher: Arc<dyn ArtifactFetcher>,
        registrar: Arc<dyn PathRegistrar>,
    ) -> Self {
        let cache = ToolCache::new(config.cache_root.clone());
        Installer {
            config,
            cache,
            metadata,
            fetcher,
            registrar,
        }
    }

    /// Whether the SDK is already installed: a specific version when given,
    /// or any complete version otherwise.
    pub fn is_installed(&self, version: Option<&str>) -> bool {
        let arch = platform::detect_arch();
        match version {
            Some(version) => self.cache.find(TOOL_NAME, version, &arch).is_some(),
            None => !self.cache.find_all_versions(TOOL_NAME, &arch).is_empty(),
        }
    }

    /// Installs the SDK version matching `spec` and returns the executable
    /// directory, which is also registered on the search path.
    pub fn install(&self, spec: &str) -> Result<PathBuf> {
        let os = platform::detect_os();
        let arch = platform::detect_arch();
        self.install_for(&os, &arch, spec)
    }

    /// The platform-explicit pipeline behind [`Installer::install`].
    pub fn install_for(&self, os: &str, arch: &str, spec: &str) -> Result<PathBuf> {
        let version = best_version(spec, self.metadata.as_ref())?;
        log_info!(
            "[Installer] Installing Cloud SDK {} for {}-{}",
            version.cyan(),
            os,
            arch
        );

        // Cache short-circuit: a complete entry means no download at all.
        if let Some(cached) = self.cache.find(TOOL_NAME, &version, arch) {
            log_info!(
                "[Installer] Found {} {} in the tool cache, skipping download",
                TOOL_NAME.bold(),
                version.cyan()
            );
            let bin_dir = executable_dir(&cached);
            self.registrar.prepend(&bin_dir);
            return Ok(bin_dir);
        }

        let url = build_release_url(os, arch, &version)?;
        // Decide the extraction strategy up front so an address we cannot
        // handle fails before any bytes move.
        let kind = ArchiveKind::from_url(&url)?;
        log_debug!("[Installer] Release address: {}", url.blue());

        // A unique staging directory per install; dropped (and deleted) on
        // every exit path of this function.
        let staging = tempfile::Builder::new()
            .prefix("setup-cloud-sdk-")
            .tempdir_in(&self.config.temp_root)
            .map_err(|e| Error::io("failed to create staging directory".to_string(), e))?;

        let file_name = url.rsplit('/').next().unwrap_or("release-archive");
        let archive_path = staging.path().join(file_name);
        self.fetcher
            .fetch(&url, &archive_path)
            .map_err(|e| e.wrap(format!("failed to download release, url: {url}")))?;

        let extracted = extract_archive(kind, &archive_path, staging.path())?;

        let tool_root = self
            .cache
            .cache_dir(&extracted, TOOL_NAME, &version, arch)
            .map_err(|e| e.wrap(format!("failed to cache Cloud SDK {version}")))?;

        let bin_dir = executable_dir(&tool_root);
        self.registrar.prepend(&bin_dir);

        log_info!(
            "[Installer] Cloud SDK {} installed at {}",
            version.cyan(),
            tool_root.display().to_string().green()
        );
        Ok(bin_dir)
    }
}

/// The directory holding the `gcloud` executable inside a cache entry.
fn executable_dir(tool_root: &Path) -> PathBuf {
    tool_root.join(SDK_ROOT_DIR).join("bin")
}
