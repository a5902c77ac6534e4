use ckb_debug_invoker::cli::{Cli, Commands};
use ckb_debug_invoker::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();
    let verbosity = cli.verbosity();

    // Initialize logging with verbosity-aware level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| verbosity.to_log_level().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = dispatch(cli) {
        tracing::debug!("Command failed: {:?}", err);
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    let verbosity = cli.verbosity();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Run(args) => {
            ckb_debug_invoker::cli::commands::run(args, verbosity, config)?;
        }
        Commands::Check(args) => {
            ckb_debug_invoker::cli::commands::check(args, verbosity)?;
        }
        Commands::ScriptHash(args) => {
            ckb_debug_invoker::cli::commands::script_hash(args, verbosity)?;
        }
        Commands::Expand(args) => {
            ckb_debug_invoker::cli::commands::expand(args, verbosity)?;
        }
        Commands::Completions(args) => {
            ckb_debug_invoker::cli::commands::completions(args)?;
        }
    }

    Ok(())
}
