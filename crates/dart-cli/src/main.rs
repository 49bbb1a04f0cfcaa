//! The `dart` command-line tool.

mod cli;
mod commands;
mod error;

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::commands::Output;
use crate::error::CliError;

/// Exit code for arguments clap rejects.
const USAGE_EXIT_CODE: u8 = 64;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            let usage_error = error.use_stderr();
            let _ = error.print();
            return if usage_error {
                ExitCode::from(USAGE_EXIT_CODE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let output = commands::run(cli).await?;

    let mut stdout = std::io::stdout().lock();
    match output {
        Output::Json(value) if cli.pretty => {
            serde_json::to_writer_pretty(&mut stdout, &value)?;
        }
        Output::Json(value) => serde_json::to_writer(&mut stdout, &value)?,
        Output::Text(text) => stdout.write_all(text.as_bytes())?,
    }
    writeln!(stdout)?;
    Ok(())
}
