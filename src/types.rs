use serde::{Deserialize, Serialize};

pub const DEFAULT_EXEC_CREDENTIALS_KIND: &str = "ExecCredential";
pub const DEFAULT_EXEC_CREDENTIALS_API_VERSION: &str = "client.authentication.k8s.io/v1beta1";

/// Output of `az account get-access-token`.
///
/// Only `accessToken` and `expiresOn` are consumed. Missing or `null` fields
/// deserialize to `None` and the converter degrades them to empty strings.
#[derive(Debug, Default, Deserialize)]
pub struct AzAccessToken {
    #[serde(rename = "accessToken", default)]
    pub access_token: Option<String>,
    /// Naive local time, `YYYY-MM-DD HH:MM:SS.ffffff`.
    #[serde(rename = "expiresOn", default)]
    pub expires_on: Option<String>,
    #[serde(default)]
    pub subscription: Option<String>,
    #[serde(default)]
    pub tenant: Option<String>,
    #[serde(rename = "tokenType", default)]
    pub token_type: Option<String>,
    /// Epoch seconds, only emitted by newer az releases.
    #[serde(rename = "expires_on", default)]
    pub expires_on_epoch: Option<i64>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct K8sExecCredentialsSpec {
    pub interactive: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct K8sExecCredentialsStatus {
    /// RFC 3339 UTC with a `Z` suffix, or empty when the expiry is unknown.
    #[serde(rename = "expirationTimestamp")]
    pub expiration_timestamp: String,
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct K8sExecCredentials {
    pub kind: String,
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub spec: K8sExecCredentialsSpec,
    pub status: K8sExecCredentialsStatus,
}

impl K8sExecCredentials {
    pub fn new(token: String, expiration_timestamp: String) -> Self {
        Self {
            kind: DEFAULT_EXEC_CREDENTIALS_KIND.to_string(),
            api_version: DEFAULT_EXEC_CREDENTIALS_API_VERSION.to_string(),
            spec: K8sExecCredentialsSpec { interactive: false },
            status: K8sExecCredentialsStatus {
                expiration_timestamp,
                token,
            },
        }
    }
}
