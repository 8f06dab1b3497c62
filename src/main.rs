mod commands;

use clap::{Parser, Subcommand};
use setup_cloud_sdk::{log_error, logger};

#[derive(Parser)]
#[command(name = "setup-cloud-sdk")]
#[command(about = "Install and authenticate the Google Cloud SDK", long_about = None)]
struct Cli {
    /// Turn debugging information on
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install a Cloud SDK version
    Install {
        /// Exact version, "latest", or a semver range such as "> 400.0.0"
        #[arg(long)]
        version: Option<String>,
        /// Project id to set after installation
        #[arg(long)]
        project_id: Option<String>,
        /// Additional components to install (repeatable)
        #[arg(long = "component")]
        components: Vec<String>,
    },
    /// Authenticate the installed Cloud SDK
    Auth {
        /// Path to a service account key file; defaults to the
        /// GOOGLE_GHA_CREDS_PATH credentials file
        #[arg(long)]
        key_file: Option<String>,
    },
    /// Run a gcloud command
    Run {
        /// Decode and pretty-print the command output as JSON
        #[arg(long)]
        json: bool,
        /// Arguments passed to gcloud verbatim
        #[arg(trailing_var_arg = true, required = true)]
        args: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    logger::init(cli.debug);

    let outcome = match cli.command {
        Commands::Install {
            version,
            project_id,
            components,
        } => commands::install::run(version, project_id, components),
        Commands::Auth { key_file } => commands::auth::run(key_file),
        Commands::Run { json, args } => commands::run::run(args, json),
    };

    if let Err(err) = outcome {
        log_error!("{err:#}");
        std::process::exit(1);
    }
}
