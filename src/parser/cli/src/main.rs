mod cli;
mod config;
mod demo;

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match cli::Cli::execute().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
