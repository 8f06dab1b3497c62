// This module is the central hub for the CLI subcommands. Each submodule is
// a thin wrapper over the library: it wires up configuration, calls into the
// relevant component, and adds context to errors on the way out.

/// `setup-cloud-sdk install`: resolve, download, cache and register a
/// Cloud SDK version.
pub mod install;

/// `setup-cloud-sdk auth`: authenticate the installed SDK.
pub mod auth;

/// `setup-cloud-sdk run`: pass a command through to `gcloud`, optionally
/// decoding JSON output.
pub mod run;
