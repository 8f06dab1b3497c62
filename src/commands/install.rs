// This file contains the logic for the `setup-cloud-sdk install` command.
// It installs the requested Cloud SDK version and optionally configures the
// project and extra components afterwards.

use anyhow::Context;
use colored::Colorize;

use setup_cloud_sdk::libs::installer::Installer;
use setup_cloud_sdk::{Config, Gcloud, log_info};

/// Installs the Cloud SDK version matching `version` ("latest" when absent),
/// then applies the optional project id and component list.
pub fn run(
    version: Option<String>,
    project_id: Option<String>,
    components: Vec<String>,
) -> anyhow::Result<()> {
    let config = Config::from_env();
    let spec = version.as_deref().unwrap_or("latest");

    let installer = Installer::new(config.clone());
    let bin_dir = installer
        .install(spec)
        .with_context(|| format!("failed to install the Cloud SDK (spec '{spec}')"))?;
    log_info!(
        "[Install] Cloud SDK executables available at {}",
        bin_dir.display().to_string().green()
    );

    if project_id.is_none() && components.is_empty() {
        return Ok(());
    }

    let gcloud = Gcloud::new(config);
    if let Some(project_id) = project_id {
        gcloud
            .set_project(&project_id)
            .with_context(|| format!("failed to set project '{project_id}'"))?;
        log_info!("[Install] Project set to {}", project_id.bold());
    }
    if !components.is_empty() {
        let names: Vec<&str> = components.iter().map(String::as_str).collect();
        gcloud
            .install_component(&names)
            .context("failed to install additional components")?;
        log_info!("[Install] Installed components: {}", components.join(", "));
    }

    Ok(())
}
