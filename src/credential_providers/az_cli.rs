use super::{AcquisitionError, ProvideCredentials, ProvideCredentialsInput};
use crate::types::AzAccessToken;
use crate::utils::process::{RunCommand, RunError, TokioCommandRunner};
use std::path::PathBuf;

pub const DEFAULT_AZ_CLI: &str = "az";

/// Fetches a token with `az account get-access-token`.
pub struct AzCliCredentialProvider<R = TokioCommandRunner> {
    az_cli_path: PathBuf,
    runner: R,
}

impl<R: RunCommand> AzCliCredentialProvider<R> {
    pub fn new(az_cli_path: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            az_cli_path: az_cli_path.into(),
            runner,
        }
    }
}

pub fn build_arguments(input: &ProvideCredentialsInput) -> Vec<String> {
    let mut args = vec![
        "account".to_string(),
        "get-access-token".to_string(),
        "--scope".to_string(),
        input.scope(),
    ];
    if let Some(resource) = &input.resource {
        args.push("--resource".to_string());
        args.push(resource.clone());
    }
    args
}

fn parse_token(stdout: &[u8]) -> Result<AzAccessToken, AcquisitionError> {
    let value: serde_json::Value =
        serde_json::from_slice(stdout).map_err(AcquisitionError::MalformedResponse)?;
    if !value.is_object() {
        return Err(AcquisitionError::MalformedResponse(
            serde::de::Error::custom(format!("expected a JSON object, got {value}")),
        ));
    }
    let token: AzAccessToken =
        serde_json::from_value(value).map_err(AcquisitionError::MalformedResponse)?;
    log::debug!(
        "Received {} token for tenant {:?}, subscription {:?}, expires_on {:?}",
        token.token_type.as_deref().unwrap_or("unknown"),
        token.tenant,
        token.subscription,
        token.expires_on_epoch,
    );
    Ok(token)
}

impl From<RunError> for AcquisitionError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::Spawn { program, source } => AcquisitionError::Spawn {
                program: program.display().to_string(),
                source,
            },
            RunError::Io(err) => AcquisitionError::Io(err),
            RunError::TimedOut(limit) => AcquisitionError::Timeout(limit),
        }
    }
}

impl<R: RunCommand> ProvideCredentials for AzCliCredentialProvider<R> {
    async fn provide_credentials(
        &self,
        input: &ProvideCredentialsInput,
    ) -> Result<AzAccessToken, AcquisitionError> {
        let args = build_arguments(input);
        log::debug!("Running {} {}", self.az_cli_path.display(), args.join(" "));

        let output = self.runner.run(&self.az_cli_path, &args).await?;
        log::debug!("az exited with {}", output.status);

        if !output.status.success() {
            return Err(AcquisitionError::CommandFailed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }

        parse_token(&output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::process::testing::exit_status;
    use crate::utils::process::CommandOutput;
    use std::cell::RefCell;
    use std::ffi::OsStr;
    use std::path::Path;

    struct FakeRunner {
        code: i32,
        stdout: &'static str,
        stderr: &'static str,
        calls: RefCell<Vec<(PathBuf, Vec<String>)>>,
    }

    impl FakeRunner {
        fn new(code: i32, stdout: &'static str, stderr: &'static str) -> Self {
            Self {
                code,
                stdout,
                stderr,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl RunCommand for &FakeRunner {
        async fn run<S: AsRef<OsStr>>(
            &self,
            program: &Path,
            args: &[S],
        ) -> Result<CommandOutput, RunError> {
            self.calls.borrow_mut().push((
                program.to_path_buf(),
                args.iter()
                    .map(|a| a.as_ref().to_string_lossy().into_owned())
                    .collect(),
            ));
            Ok(CommandOutput {
                status: exit_status(self.code),
                stdout: self.stdout.as_bytes().to_vec(),
                stderr: self.stderr.as_bytes().to_vec(),
            })
        }
    }

    fn default_input() -> ProvideCredentialsInput {
        ProvideCredentialsInput {
            server_id: "6dae42f8-4368-4678-94ff-3960e28e3630".to_string(),
            resource: None,
        }
    }

    #[tokio::test]
    async fn test_default_invocation_arguments() {
        let runner = FakeRunner::new(0, r#"{"accessToken":"abc123"}"#, "");
        let provider = AzCliCredentialProvider::new("/opt/az/bin/az", &runner);
        let token = provider.provide_credentials(&default_input()).await.unwrap();
        assert_eq!(token.access_token.as_deref(), Some("abc123"));

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, PathBuf::from("/opt/az/bin/az"));
        assert_eq!(
            calls[0].1,
            [
                "account",
                "get-access-token",
                "--scope",
                "6dae42f8-4368-4678-94ff-3960e28e3630/.default"
            ]
        );
    }

    #[tokio::test]
    async fn test_resource_argument_appended() {
        let runner = FakeRunner::new(0, "{}", "");
        let provider = AzCliCredentialProvider::new(DEFAULT_AZ_CLI, &runner);
        let input = ProvideCredentialsInput {
            resource: Some("https://my-cluster".to_string()),
            ..default_input()
        };
        provider.provide_credentials(&input).await.unwrap();

        let calls = runner.calls.borrow();
        assert_eq!(
            &calls[0].1[4..],
            ["--resource".to_string(), "https://my-cluster".to_string()]
        );
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_command_failed() {
        let runner = FakeRunner::new(1, "", "Please run 'az login' to setup account.\n");
        let provider = AzCliCredentialProvider::new(DEFAULT_AZ_CLI, &runner);
        let err = provider
            .provide_credentials(&default_input())
            .await
            .unwrap_err();
        match err {
            AcquisitionError::CommandFailed { stderr, .. } => {
                assert_eq!(stderr, "Please run 'az login' to setup account.")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_output_is_malformed() {
        let runner = FakeRunner::new(0, "not json", "");
        let provider = AzCliCredentialProvider::new(DEFAULT_AZ_CLI, &runner);
        let err = provider
            .provide_credentials(&default_input())
            .await
            .unwrap_err();
        assert!(matches!(err, AcquisitionError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_non_object_output_is_malformed() {
        let runner = FakeRunner::new(0, r#"["abc123", "2025-10-22 11:11:02.000000"]"#, "");
        let provider = AzCliCredentialProvider::new(DEFAULT_AZ_CLI, &runner);
        let err = provider
            .provide_credentials(&default_input())
            .await
            .unwrap_err();
        assert!(matches!(err, AcquisitionError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_wrong_field_type_is_malformed() {
        let runner = FakeRunner::new(0, r#"{"accessToken": 42}"#, "");
        let provider = AzCliCredentialProvider::new(DEFAULT_AZ_CLI, &runner);
        let err = provider
            .provide_credentials(&default_input())
            .await
            .unwrap_err();
        assert!(matches!(err, AcquisitionError::MalformedResponse(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_real_process_failures() {
        let provider = AzCliCredentialProvider::new("false", TokioCommandRunner::default());
        let err = provider
            .provide_credentials(&default_input())
            .await
            .unwrap_err();
        assert!(matches!(err, AcquisitionError::CommandFailed { .. }));

        // echo succeeds but prints its arguments, not JSON.
        let provider = AzCliCredentialProvider::new("echo", TokioCommandRunner::default());
        let err = provider
            .provide_credentials(&default_input())
            .await
            .unwrap_err();
        assert!(matches!(err, AcquisitionError::MalformedResponse(_)));

        let provider = AzCliCredentialProvider::new(
            "/nonexistent/az-kubelogin-test-az",
            TokioCommandRunner::default(),
        );
        let err = provider
            .provide_credentials(&default_input())
            .await
            .unwrap_err();
        assert!(matches!(err, AcquisitionError::Spawn { .. }));
    }
}
