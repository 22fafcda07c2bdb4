mod convert;

use crate::credential_providers::{
    provide_credentials, AcquisitionError, ProvideCredentials, ProvideCredentialsInput,
};
use chrono::FixedOffset;
use convert::TimestampFormatError;
use std::io::Write;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),
    #[error(transparent)]
    Timestamp(#[from] TimestampFormatError),
    #[error("failed to serialize credential: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("failed to write credential: {0}")]
    Write(#[from] std::io::Error),
}

impl Error {
    /// Human readable explanation for stderr.
    pub fn diagnostic(&self) -> String {
        match self {
            Error::Acquisition(AcquisitionError::CommandFailed { stderr, .. }) => format!(
                "Error running az command: {stderr}\n\
                 Failed to get access token from Azure CLI\n\
                 Make sure you are logged in: az login"
            ),
            other => format!("Unexpected error: {other}"),
        }
    }
}

pub type Result = std::result::Result<(), Error>;

/// Acquires one token, converts it and writes the ExecCredential to `out`.
///
/// `out` is only written once the document is fully rendered, so a failure
/// leaves it untouched.
pub async fn exec_get_token<P: ProvideCredentials>(
    credential_provider: &P,
    provider_inputs: &ProvideCredentialsInput,
    local_offset: FixedOffset,
    out: &mut impl Write,
) -> Result {
    let token = provide_credentials(credential_provider, provider_inputs).await?;

    log::debug!("Interpreting expiresOn with local offset {local_offset}");
    let k8s_creds = convert::convert_to_exec_credentials(&token, local_offset)?;

    let rendered = serde_json::to_string_pretty(&k8s_creds)?;
    writeln!(out, "{rendered}")?;
    out.flush()?;

    Ok(())
}
