// This file contains the logic for the `setup-cloud-sdk run` command.
// It passes an arbitrary command through to `gcloud`, optionally requesting
// and pretty-printing JSON output.

use anyhow::Context;

use setup_cloud_sdk::{Config, Gcloud};

/// Runs `gcloud <args...>`. With `json`, the output is decoded and
/// re-printed as pretty JSON; otherwise stdout is passed through verbatim.
pub fn run(args: Vec<String>, json: bool) -> anyhow::Result<()> {
    let gcloud = Gcloud::new(Config::from_env());
    let argv: Vec<&str> = args.iter().map(String::as_str).collect();

    if json {
        let value = gcloud
            .run_json(&argv, None)
            .context("gcloud command failed")?;
        println!(
            "{}",
            serde_json::to_string_pretty(&value).context("failed to render JSON output")?
        );
    } else {
        let result = gcloud.run(&argv, None).context("gcloud command failed")?;
        // stdout stays verbatim on stdout; diagnostics went to stderr.
        print!("{}", result.stdout);
    }

    Ok(())
}
