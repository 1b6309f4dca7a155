use std::process::ExitCode;

use clap::Parser;
use minilang_cli::error::CliError;
use minilang_cli::{repl, run, Cli};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_logging(verbose: bool) -> Result<(), CliError> {
    let filter = if verbose { EnvFilter::new("debug") } else { EnvFilter::new("info") };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))?;

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    match dispatch(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: &Cli) -> anyhow::Result<()> {
    if let Some(code) = &cli.tokens {
        run::show_tokens(code)?;
        return Ok(());
    }
    if let Some(code) = &cli.ast {
        run::show_ast(code)?;
        return Ok(());
    }
    if let Some(code) = &cli.code {
        run::run_code(code)?;
        return Ok(());
    }
    if let Some(path) = &cli.file {
        run::run_file(path, cli.debug)?;
        return Ok(());
    }

    repl::run();
    Ok(())
}
