// This file contains the logic for the `setup-cloud-sdk auth` command.
// It authenticates the installed Cloud SDK, either from an explicitly
// supplied key file or from the well-known credentials path in the
// environment.

use std::fs;

use anyhow::Context;

use setup_cloud_sdk::{Config, Gcloud, log_info};

/// Authenticates `gcloud`. When `key_file` is given its contents are used as
/// the credential material; otherwise the well-known environment-provided
/// path is consulted.
pub fn run(key_file: Option<String>) -> anyhow::Result<()> {
    let explicit_key = match &key_file {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read key file '{path}'"))?,
        ),
        None => None,
    };

    let gcloud = Gcloud::new(Config::from_env());
    gcloud
        .authenticate(explicit_key.as_deref())
        .context("failed to authenticate the Cloud SDK")?;

    log_info!("[Auth] Cloud SDK authenticated");
    Ok(())
}
