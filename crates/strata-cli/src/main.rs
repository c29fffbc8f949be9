use std::process::ExitCode;

use clap::{Parser, Subcommand};
use strata_cli::commands::generate::{self, GenerateArgs};
use strata_cli::commands::inspect::{self, InspectArgs};
use strata_cli::logging::init_logging;
use strata_core::StrataError;
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "strata", about = "Layered multigraph batch generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a batch of layered graphs on a worker pool.
    Generate(GenerateArgs),
    /// Decode a generated graph and print its summary.
    Inspect(InspectArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logging() {
        eprintln!("failed to initialise logging: {err}");
        return ExitCode::FAILURE;
    }
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(code = err.code(), error = %err, "command failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), StrataError> {
    match cli.command {
        Command::Generate(args) => {
            let (summary, out) = generate::run(&args)?;
            println!(
                "generated {}/{} graphs into {}",
                summary.completed,
                summary.requested,
                out.display()
            );
        }
        Command::Inspect(args) => {
            println!("{}", inspect::run(&args)?);
        }
    }
    Ok(())
}
