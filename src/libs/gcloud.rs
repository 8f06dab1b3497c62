//! The `gcloud` invocation wrapper.
//!
//! Every interaction with the installed Cloud SDK goes through [`Gcloud`]:
//! authentication, project configuration, component installation and
//! arbitrary commands with optional JSON decoding. The wrapper owns the
//! execution contract:
//!
//! - the platform-correct command name (`gcloud.cmd` on Windows, `gcloud`
//!   elsewhere) is derived fresh on every call, never cached;
//! - executions default to `{silent: true, ignore_return_code: true}`, with
//!   caller-supplied options winning;
//! - a non-zero exit always becomes a single error carrying the full command
//!   line plus the captured stderr (or a synthetic note when stderr was
//!   empty) — callers never see a bare exit code.
//!
//! Nothing here retries. Where a read-only probe is worth retrying, that is
//! the caller's decision.

use colored::Colorize;
use serde_json::Value;

use crate::config::Config;
use crate::errors::{Error, Result};
use crate::libs::credentials::{self, Credential, CredentialSource};
use crate::libs::exec_runner::{
    ExecOptions, ExecResult, ExecRunner, SystemRunner, failure_detail, render_command,
};
use crate::libs::utilities::platform;
use crate::log_info;

/// Returns the correct `gcloud` command name for a platform token.
///
/// Windows runners execute through a cmd shell, so the `.cmd` shim is
/// required there; everywhere else the bare name resolves through PATH.
pub fn tool_command(os: &str) -> &'static str {
    if os == "win32" { "gcloud.cmd" } else { "gcloud" }
}

/// Wraps `gcloud` executions. Construct with [`Gcloud::new`] for the real
/// process runner, or [`Gcloud::with_runner`] to substitute one in tests.
pub struct Gcloud {
    config: Config,
    runner: Box<dyn ExecRunner>,
}

impl Gcloud {
    pub fn new(config: Config) -> Self {
        Gcloud::with_runner(config, Box::new(SystemRunner))
    }

    pub fn with_runner(config: Config, runner: Box<dyn ExecRunner>) -> Self {
        Gcloud { config, runner }
    }

    /// Runs a `gcloud` command and returns its captured output.
    ///
    /// `overrides`, when given, replaces the default options
    /// `{silent: true, ignore_return_code: true}`. A non-zero exit is always
    /// surfaced as an error here regardless of `ignore_return_code`, which
    /// only governs whether the runner below errors first.
    pub fn run(&self, args: &[&str], overrides: Option<ExecOptions>) -> Result<ExecResult> {
        let options = overrides.unwrap_or_default();
        // Derived per call; the platform cannot change mid-process, but a
        // cached value would leak between environments under test.
        let tool = tool_command(&platform::detect_os());
        let argv: Vec<String> = args.iter().map(|s| s.to_string()).collect();

        let result = self.runner.exec(tool, &argv, &options)?;

        if result.exit_code != 0 {
            let command = render_command(tool, &argv);
            return Err(Error::CommandFailed {
                stderr: failure_detail(result.exit_code, &result.stderr),
                command,
            });
        }
        Ok(result)
    }

    /// Runs a `gcloud` command with `--format json` prepended and parses
    /// stdout as JSON.
    ///
    /// A parse failure carries the verbatim stdout and stderr, so malformed
    /// tool output can be diagnosed without re-running the command.
    pub fn run_json(&self, args: &[&str], overrides: Option<ExecOptions>) -> Result<Value> {
        let mut argv: Vec<&str> = vec!["--format", "json"];
        argv.extend_from_slice(args);

        let result = self.run(&argv, overrides)?;
        serde_json::from_str(&result.stdout).map_err(|e| Error::JsonOutput {
            detail: e.to_string(),
            stdout: result.stdout.clone(),
            stderr: result.stderr.clone(),
        })
    }

    /// Authenticates the Cloud SDK.
    ///
    /// Credential material comes from `explicit_key` when given (legacy
    /// callers), otherwise from the well-known credentials file in the
    /// configuration. The classified shape picks the command sequence:
    ///
    /// - a service account key is activated with the full JSON passed on
    ///   stdin (`--key-file -`), never on the command line, so the secret
    ///   stays out of process listings and shell history;
    /// - a federation configuration is logged in by file path, by reference.
    pub fn authenticate(&self, explicit_key: Option<&str>) -> Result<()> {
        let source = credentials::resolve_source(&self.config, explicit_key)?;
        let material = credentials::read_material(&source)?;

        match credentials::classify(&material)? {
            Credential::ServiceAccountKey(record) => {
                let email = credentials::client_email(&record)?.to_string();
                log_info!(
                    "[Gcloud] Activating service account {}",
                    email.bold()
                );
                let payload = serde_json::to_vec(&record)
                    .map_err(|e| Error::CredentialsParse(e.to_string()))?;
                let options = ExecOptions {
                    input: Some(payload),
                    ..ExecOptions::default()
                };
                self.run(
                    &["auth", "activate-service-account", &email, "--key-file", "-"],
                    Some(options),
                )?;
            }
            Credential::Federated(_) => {
                let CredentialSource::WellKnownFile(path) = source else {
                    return Err(Error::FederatedInline);
                };
                log_info!(
                    "[Gcloud] Logging in with federated credential file {}",
                    path.display().to_string().bold()
                );
                let path = path.to_string_lossy();
                self.run(&["auth", "login", "--cred-file", &path], None)?;
            }
        }

        log_info!("[Gcloud] Authentication {}", "succeeded".green());
        Ok(())
    }

    /// Sets the active project in the gcloud config.
    pub fn set_project(&self, project_id: &str) -> Result<()> {
        self.run(&["config", "set", "project", project_id], None)?;
        Ok(())
    }

    /// Sets the active project from a service account key's `project_id` and
    /// returns it.
    pub fn set_project_with_key(&self, key: &str) -> Result<String> {
        let record = match credentials::classify(key)? {
            Credential::ServiceAccountKey(record) | Credential::Federated(record) => record,
        };
        let project_id = credentials::project_id(&record)?.to_string();
        self.set_project(&project_id)?;
        Ok(project_id)
    }

    /// Whether a project id is set in the gcloud config. `gcloud` reports an
    /// unset property by printing `(unset)`.
    pub fn is_project_id_set(&self) -> Result<bool> {
        let result = self.run(&["config", "get-value", "project"], None)?;
        let combined = format!("{}{}", result.stdout, result.stderr);
        Ok(!combined.contains("unset"))
    }

    /// Whether any account is currently credentialed.
    pub fn is_authenticated(&self) -> Result<bool> {
        let result = self.run(&["auth", "list"], None)?;
        let combined = format!("{}{}", result.stdout, result.stderr);
        Ok(!combined.contains("No credentialed accounts."))
    }

    /// Installs Cloud SDK components (e.g. `alpha`, `beta`,
    /// `gke-gcloud-auth-plugin`).
    pub fn install_component(&self, components: &[&str]) -> Result<()> {
        let mut args = vec!["components", "install"];
        args.extend_from_slice(components);
        self.run(&args, None)
            .map_err(|e| e.wrap(format!("unable to install components {components:?}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    /// Records every invocation and replays scripted results.
    struct FakeRunner {
        calls: Arc<Mutex<Vec<RecordedCall>>>,
        result: std::result::Result<ExecResult, String>,
    }

    #[derive(Debug, Clone)]
    struct RecordedCall {
        command: String,
        args: Vec<String>,
        silent: bool,
        ignore_return_code: bool,
        input: Option<Vec<u8>>,
    }

    impl ExecRunner for FakeRunner {
        fn exec(
            &self,
            command: &str,
            args: &[String],
            options: &ExecOptions,
        ) -> Result<ExecResult> {
            self.calls.lock().unwrap().push(RecordedCall {
                command: command.to_string(),
                args: args.to_vec(),
                silent: options.silent,
                ignore_return_code: options.ignore_return_code,
                input: options.input.clone(),
            });
            match &self.result {
                Ok(result) => Ok(result.clone()),
                Err(message) => Err(Error::CommandFailed {
                    command: command.to_string(),
                    stderr: message.clone(),
                }),
            }
        }
    }

    fn success(stdout: &str, stderr: &str) -> ExecResult {
        ExecResult {
            exit_code: 0,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    fn config() -> Config {
        Config {
            credential_path: None,
            cache_root: PathBuf::from("/tmp/cache"),
            temp_root: PathBuf::from("/tmp"),
        }
    }

    fn gcloud_with(result: std::result::Result<ExecResult, String>) -> (Gcloud, Arc<Mutex<Vec<RecordedCall>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let runner = FakeRunner {
            calls: Arc::clone(&calls),
            result,
        };
        (Gcloud::with_runner(config(), Box::new(runner)), calls)
    }

    #[test]
    fn tool_command_is_platform_correct() {
        assert_eq!(tool_command("win32"), "gcloud.cmd");
        assert_eq!(tool_command("linux"), "gcloud");
        assert_eq!(tool_command("darwin"), "gcloud");
    }

    #[test]
    fn run_uses_silent_tolerant_defaults() {
        let (gcloud, calls) = gcloud_with(Ok(success("", "")));
        gcloud.run(&["info"], None).unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].silent);
        assert!(calls[0].ignore_return_code);
    }

    #[test]
    fn caller_overrides_win_over_defaults() {
        let (gcloud, calls) = gcloud_with(Ok(success("", "")));
        let options = ExecOptions {
            silent: false,
            ..ExecOptions::default()
        };
        gcloud.run(&["info"], Some(options)).unwrap();
        assert!(!calls.lock().unwrap()[0].silent);
    }

    #[test]
    fn nonzero_exit_carries_command_and_stderr() {
        let (gcloud, _) = gcloud_with(Ok(ExecResult {
            exit_code: 1,
            stdout: String::new(),
            stderr: "PERMISSION_DENIED".to_string(),
        }));
        let err = gcloud.run(&["projects", "list"], None).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("gcloud projects list"), "{message}");
        assert!(message.contains("PERMISSION_DENIED"), "{message}");
    }

    #[test]
    fn nonzero_exit_with_empty_stderr_gets_synthetic_note() {
        let (gcloud, _) = gcloud_with(Ok(ExecResult {
            exit_code: 2,
            stdout: String::new(),
            stderr: String::new(),
        }));
        let err = gcloud.run(&["info"], None).unwrap_err();
        assert!(
            err.to_string()
                .contains("exited with code 2 and produced no output on stderr"),
            "{err}"
        );
    }

    #[test]
    fn run_json_prepends_format_flag_and_parses() {
        let (gcloud, calls) = gcloud_with(Ok(success(r#"[{"name": "p1"}]"#, "")));
        let value = gcloud.run_json(&["projects", "list"], None).unwrap();
        assert_eq!(value[0]["name"], "p1");

        let calls = calls.lock().unwrap();
        assert_eq!(
            calls[0].args,
            vec!["--format", "json", "projects", "list"]
        );
    }

    #[test]
    fn run_json_parse_failure_includes_raw_streams() {
        let (gcloud, _) = gcloud_with(Ok(success("definitely not json", "some warning")));
        let err = gcloud.run_json(&["info"], None).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("definitely not json"), "{message}");
        assert!(message.contains("some warning"), "{message}");
    }

    #[test]
    fn service_account_key_is_activated_via_stdin() {
        let key = r#"{"type":"service_account","client_email":"sa@p.iam.gserviceaccount.com","project_id":"p","private_key":"k"}"#;
        let (gcloud, calls) = gcloud_with(Ok(success("", "")));
        gcloud.authenticate(Some(key)).unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].args,
            vec![
                "auth",
                "activate-service-account",
                "sa@p.iam.gserviceaccount.com",
                "--key-file",
                "-"
            ]
        );
        // The key travels on stdin, never as an argument.
        let input = calls[0].input.as_ref().expect("stdin payload");
        let record: serde_json::Value = serde_json::from_slice(input).unwrap();
        assert_eq!(record["client_email"], "sa@p.iam.gserviceaccount.com");
    }

    #[test]
    fn federated_file_is_passed_by_path() {
        let dir = tempfile::tempdir().unwrap();
        let cred_path = dir.path().join("creds.json");
        std::fs::write(&cred_path, r#"{"type":"external_account"}"#).unwrap();

        let calls = Arc::new(Mutex::new(Vec::new()));
        let runner = FakeRunner {
            calls: Arc::clone(&calls),
            result: Ok(success("", "")),
        };
        let config = Config {
            credential_path: Some(cred_path.clone()),
            cache_root: PathBuf::from("/tmp/cache"),
            temp_root: PathBuf::from("/tmp"),
        };
        let gcloud = Gcloud::with_runner(config, Box::new(runner));
        gcloud.authenticate(None).unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(
            calls[0].args,
            vec![
                "auth".to_string(),
                "login".to_string(),
                "--cred-file".to_string(),
                cred_path.to_string_lossy().to_string()
            ]
        );
        assert!(calls[0].input.is_none());
    }

    #[test]
    fn inline_federated_credential_is_rejected() {
        let (gcloud, _) = gcloud_with(Ok(success("", "")));
        let err = gcloud
            .authenticate(Some(r#"{"type":"external_account"}"#))
            .unwrap_err();
        assert!(matches!(err, Error::FederatedInline));
    }

    #[test]
    fn missing_credentials_fail_with_guidance() {
        let (gcloud, _) = gcloud_with(Ok(success("", "")));
        let err = gcloud.authenticate(None).unwrap_err();
        assert!(matches!(err, Error::CredentialsMissing));
    }

    #[test]
    fn project_commands_use_verbatim_argv() {
        let (gcloud, calls) = gcloud_with(Ok(success("my-project\n", "")));
        gcloud.set_project("my-project").unwrap();
        assert!(gcloud.is_project_id_set().unwrap());

        let calls = calls.lock().unwrap();
        assert_eq!(calls[0].args, vec!["config", "set", "project", "my-project"]);
        assert_eq!(calls[1].args, vec!["config", "get-value", "project"]);
    }

    #[test]
    fn unset_project_is_detected() {
        let (gcloud, _) = gcloud_with(Ok(success("", "Your active configuration is: (unset)\n")));
        assert!(!gcloud.is_project_id_set().unwrap());
    }

    #[test]
    fn set_project_with_key_returns_the_project() {
        let key = r#"{"type":"service_account","project_id":"key-project","client_email":"sa@x"}"#;
        let (gcloud, calls) = gcloud_with(Ok(success("", "")));
        let project = gcloud.set_project_with_key(key).unwrap();
        assert_eq!(project, "key-project");
        assert_eq!(
            calls.lock().unwrap()[0].args,
            vec!["config", "set", "project", "key-project"]
        );
    }

    #[test]
    fn authentication_probe_matches_gcloud_output() {
        let (gcloud, _) = gcloud_with(Ok(success("", "No credentialed accounts.\n")));
        assert!(!gcloud.is_authenticated().unwrap());

        let (gcloud, _) = gcloud_with(Ok(success("ACTIVE  sa@p.iam\n", "")));
        assert!(gcloud.is_authenticated().unwrap());
    }

    #[test]
    fn component_install_wraps_failures_with_context() {
        let (gcloud, calls) = gcloud_with(Ok(ExecResult {
            exit_code: 1,
            stdout: String::new(),
            stderr: "network unreachable".to_string(),
        }));
        let err = gcloud.install_component(&["beta"]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("unable to install components"), "{message}");
        assert!(
            calls.lock().unwrap()[0].args.starts_with(&["components".to_string(), "install".to_string()]),
        );
    }
}
