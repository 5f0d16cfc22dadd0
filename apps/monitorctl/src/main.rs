use monitorctl::cli::Cli;
use monitorctl::run::execute;

use std::process::ExitCode;

use clap::Parser;
use log::error;

#[tokio::main]
async fn main() -> ExitCode {
    // A .env file is optional.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match execute(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
