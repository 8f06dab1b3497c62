// This is the main module file for the `libs` directory.
// It declares the components that make up the install-and-authenticate
// pipeline, roughly leaf-first: process execution at the bottom, the
// `gcloud` wrapper and installer at the top.

// Process execution: runs external commands, captures streams, returns the
// exit code.
pub mod exec_runner;

// Version resolution: turns a version specification into a concrete release
// version using the published metadata.
pub mod version_resolver;

// Release addressing: builds the download URL for a (os, arch, version)
// triple.
pub mod release_url;

// The on-disk content cache for installed SDK versions.
pub mod tool_cache;

// Credential classification: service account key vs. workload identity
// federation configuration.
pub mod credentials;

// The `gcloud` invocation wrapper: authentication, project config,
// components, arbitrary commands with optional JSON decoding.
pub mod gcloud;

// The install pipeline: download, extract, cache, register on PATH.
pub mod installer;

// Shared helpers: platform detection, HTTP download, archive extraction.
pub mod utilities;
