pub mod az_cli;

use crate::cmd::Cli;
use crate::types::AzAccessToken;
use std::process::ExitStatus;
use std::time::Duration;

pub struct ProvideCredentialsInput {
    pub server_id: String,
    pub resource: Option<String>,
}

impl From<&Cli> for ProvideCredentialsInput {
    fn from(cli: &Cli) -> Self {
        Self {
            server_id: cli.server_id.clone(),
            resource: cli.resource.clone().filter(|r| !r.is_empty()),
        }
    }
}

impl ProvideCredentialsInput {
    pub fn scope(&self) -> String {
        format!("{}/.default", self.server_id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    /// Almost always means the user is not logged in.
    #[error("az command exited with {status}: {stderr}")]
    CommandFailed { status: ExitStatus, stderr: String },
    #[error("failed to parse az command output: {0}")]
    MalformedResponse(#[source] serde_json::Error),
    #[error("az command did not finish within {0:?}")]
    Timeout(Duration),
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to collect az command output: {0}")]
    Io(#[source] std::io::Error),
}

pub trait ProvideCredentials {
    async fn provide_credentials(
        &self,
        input: &ProvideCredentialsInput,
    ) -> Result<AzAccessToken, AcquisitionError>;
}

pub async fn provide_credentials<T: ProvideCredentials>(
    provider: &T,
    input: &ProvideCredentialsInput,
) -> Result<AzAccessToken, AcquisitionError> {
    provider.provide_credentials(input).await
}
