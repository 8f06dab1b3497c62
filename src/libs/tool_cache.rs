//! The on-disk content cache for installed tools.
//!
//! Layout mirrors the familiar runner tool cache:
//!
//! ```text
//! <root>/<tool>/<version>/<arch>/          the installed tree
//! <root>/<tool>/<version>/<arch>.complete  the completion marker
//! ```
//!
//! An entry only counts as installed when *both* the directory and the
//! marker exist. The marker is written last, after the copy finishes, so an
//! aborted install leaves a directory without a marker and is treated as
//! absent on the next attempt. Entries are never mutated in place: caching a
//! directory first destroys any existing entry under the same key, then
//! rebuilds it, then writes the marker.

use std::fs;
use std::path::{Path, PathBuf};

use colored::Colorize;
use walkdir::WalkDir;

use crate::errors::{Error, Result};
use crate::libs::version_resolver::clean_version;
use crate::log_debug;

/// A cache of installed tool versions rooted at a single directory.
#[derive(Debug, Clone)]
pub struct ToolCache {
    root: PathBuf,
}

impl ToolCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ToolCache { root: root.into() }
    }

    fn entry_dir(&self, tool: &str, version: &str, arch: &str) -> PathBuf {
        self.root.join(tool).join(version).join(arch)
    }

    fn marker_path(&self, tool: &str, version: &str, arch: &str) -> PathBuf {
        self.root
            .join(tool)
            .join(version)
            .join(format!("{arch}.complete"))
    }

    /// Looks up an exact installed version. Returns the entry directory only
    /// if both the directory and its completion marker exist.
    pub fn find(&self, tool: &str, version: &str, arch: &str) -> Option<PathBuf> {
        let version = clean_version(version);
        let dir = self.entry_dir(tool, &version, arch);
        let marker = self.marker_path(tool, &version, arch);
        if dir.is_dir() && marker.is_file() {
            Some(dir)
        } else {
            None
        }
    }

    /// Lists every completely installed version of `tool` for `arch`,
    /// sorted lexicographically.
    pub fn find_all_versions(&self, tool: &str, arch: &str) -> Vec<String> {
        let tool_dir = self.root.join(tool);
        let Ok(entries) = fs::read_dir(&tool_dir) else {
            return Vec::new();
        };

        let mut versions: Vec<String> = entries
            .flatten()
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|version| self.find(tool, version, arch).is_some())
            .collect();
        versions.sort();
        versions
    }

    /// Installs `source`'s top-level children as the cache entry for
    /// (`tool`, `version`, `arch`) and returns the entry directory.
    ///
    /// Any existing entry under the same key is removed first, directory and
    /// marker both, so a half-replaced entry can never present as complete.
    pub fn cache_dir(
        &self,
        source: &Path,
        tool: &str,
        version: &str,
        arch: &str,
    ) -> Result<PathBuf> {
        let version = clean_version(version);
        let dir = self.entry_dir(tool, &version, arch);
        let marker = self.marker_path(tool, &version, arch);

        log_debug!(
            "[ToolCache] Caching {} as {} {} ({})",
            source.display(),
            tool.bold(),
            version.cyan(),
            arch
        );

        // Destroy before rebuild: marker first, then the directory, so no
        // window exists where a stale directory carries a valid marker.
        if marker.exists() {
            fs::remove_file(&marker)
                .map_err(|e| Error::io(format!("failed to remove {}", marker.display()), e))?;
        }
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .map_err(|e| Error::io(format!("failed to remove {}", dir.display()), e))?;
        }

        fs::create_dir_all(&dir)
            .map_err(|e| Error::io(format!("failed to create {}", dir.display()), e))?;

        let children = fs::read_dir(source)
            .map_err(|e| Error::io(format!("failed to read {}", source.display()), e))?;
        for child in children {
            let child =
                child.map_err(|e| Error::io(format!("failed to read {}", source.display()), e))?;
            copy_tree(&child.path(), &dir.join(child.file_name()))?;
        }

        // The marker is the last write; its presence proves the copy above
        // ran to completion.
        fs::write(&marker, b"")
            .map_err(|e| Error::io(format!("failed to write {}", marker.display()), e))?;

        log_debug!("[ToolCache] Entry complete at {}", dir.display().to_string().green());
        Ok(dir)
    }
}

/// Recursively copies `src` (file or directory) to `dst`, preserving file
/// permissions via `fs::copy`.
fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    if src.is_file() {
        fs::copy(src, dst).map_err(|e| {
            Error::io(
                format!("failed to copy {} to {}", src.display(), dst.display()),
                e,
            )
        })?;
        return Ok(());
    }

    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| Error::Io {
            context: format!("failed to walk {}", src.display()),
            source: e.into(),
        })?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .unwrap_or_else(|_| Path::new(""));
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| Error::io(format!("failed to create {}", target.display()), e))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| {
                Error::io(
                    format!(
                        "failed to copy {} to {}",
                        entry.path().display(),
                        target.display()
                    ),
                    e,
                )
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_source(dir: &Path) -> PathBuf {
        let source = dir.join("source");
        fs::create_dir_all(source.join("google-cloud-sdk").join("bin")).unwrap();
        fs::write(
            source.join("google-cloud-sdk").join("bin").join("gcloud"),
            b"#!/bin/sh\n",
        )
        .unwrap();
        source
    }

    #[test]
    fn cached_entry_has_directory_and_marker() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ToolCache::new(tmp.path().join("cache"));
        let source = seed_source(tmp.path());

        let entry = cache.cache_dir(&source, "gcloud", "1.2.3", "x64").unwrap();
        assert!(entry.join("google-cloud-sdk").join("bin").join("gcloud").is_file());
        assert!(cache.marker_path("gcloud", "1.2.3", "x64").is_file());
        assert_eq!(cache.find("gcloud", "1.2.3", "x64"), Some(entry));
    }

    #[test]
    fn missing_marker_means_not_installed() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ToolCache::new(tmp.path().join("cache"));
        let source = seed_source(tmp.path());

        cache.cache_dir(&source, "gcloud", "1.2.3", "x64").unwrap();
        fs::remove_file(cache.marker_path("gcloud", "1.2.3", "x64")).unwrap();
        assert_eq!(cache.find("gcloud", "1.2.3", "x64"), None);
        assert!(cache.find_all_versions("gcloud", "x64").is_empty());
    }

    #[test]
    fn recache_destroys_the_previous_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ToolCache::new(tmp.path().join("cache"));
        let source = seed_source(tmp.path());

        let entry = cache.cache_dir(&source, "gcloud", "1.2.3", "x64").unwrap();
        fs::write(entry.join("stale-file"), b"old").unwrap();

        let entry = cache.cache_dir(&source, "gcloud", "1.2.3", "x64").unwrap();
        assert!(!entry.join("stale-file").exists());
        assert!(entry.join("google-cloud-sdk").is_dir());
    }

    #[test]
    fn version_is_cleaned_for_the_key() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ToolCache::new(tmp.path().join("cache"));
        let source = seed_source(tmp.path());

        cache.cache_dir(&source, "gcloud", "v1.2.3", "x64").unwrap();
        assert!(cache.find("gcloud", "1.2.3", "x64").is_some());
        assert_eq!(cache.find_all_versions("gcloud", "x64"), vec!["1.2.3"]);
    }
}
