#![warn(unused_extern_crates)]

mod cmd;
mod commands;
mod credential_providers;
mod types;
mod utils;

use chrono::{Local, Offset};
use clap::Parser;
use cmd::Cli;
use credential_providers::{az_cli::AzCliCredentialProvider, ProvideCredentialsInput};
use std::process::ExitCode;
use utils::process::TokioCommandRunner;

const LOG_FILTER_ENV: &str = "AZ_KUBELOGIN_LOG";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or(LOG_FILTER_ENV, "warn"))
        .init();

    let args = Cli::parse();
    let credential_provider =
        AzCliCredentialProvider::new(&args.az_cli_path, TokioCommandRunner::new(args.timeout()));
    let local_offset = Local::now().offset().fix();

    let result = commands::get_token::exec_get_token(
        &credential_provider,
        &ProvideCredentialsInput::from(&args),
        local_offset,
        &mut std::io::stdout().lock(),
    )
    .await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err.diagnostic());
            ExitCode::FAILURE
        }
    }
}
