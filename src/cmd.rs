use crate::credential_providers::az_cli::DEFAULT_AZ_CLI;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SERVER_ID: &str = "6dae42f8-4368-4678-94ff-3960e28e3630";
pub const AZ_CLI_PATH_ENV: &str = "AZ_CLI_PATH";
pub const TIMEOUT_SECONDS_ENV: &str = "AZ_KUBELOGIN_TIMEOUT_SECONDS";

/// Kubernetes exec credential plugin backed by the Azure CLI.
///
/// Prints an `ExecCredential` for `client.authentication.k8s.io/v1beta1`
/// built from `az account get-access-token`.
#[derive(Parser, Debug)]
#[command(about, version)]
pub struct Cli {
    /// The Azure AD server (application) ID used to build the token scope.
    #[arg(long, default_value = DEFAULT_SERVER_ID)]
    pub server_id: String,

    /// Optional Kubernetes API server resource passed through to az.
    #[arg(long)]
    pub resource: Option<String>,

    /// Path to the az executable. Defaults to `az` resolved via `PATH`.
    #[arg(long, env = AZ_CLI_PATH_ENV, default_value = DEFAULT_AZ_CLI)]
    pub az_cli_path: PathBuf,

    /// Kill az if it has not finished after this many seconds.
    /// No timeout is applied when unset.
    #[arg(long, env = TIMEOUT_SECONDS_ENV)]
    pub timeout_seconds: Option<u64>,
}

impl Cli {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}
