//! devctl-go - manages and installs Go SDKs
//!
//! Usage:
//!   devctl-go install <version>    Download and unpack a Go SDK
//!   devctl-go use <version>        Make an installed SDK the current one
//!   devctl-go list                 List installed SDKs
//!   devctl-go current              Print the current SDK version

use anyhow::{Context as _, Result};
use clap::{CommandFactory, Parser, Subcommand};
use devctl_go::commands::{self, validate_arg_count};
use devctl_go::{Context, output};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "devctl-go")]
#[command(about = "Manages and installs Go SDKs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Base directory; SDKs live under <BASE>/sdks/go [default: ~/.devctl]
    #[arg(long, global = true, env = "DEVCTL_HOME")]
    base: Option<PathBuf>,

    /// Print progress details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Install the given version of the Go SDK
    Install {
        /// Version to install, e.g. 1.17.1 or v1.17.1
        #[arg(value_name = "VERSION")]
        args: Vec<String>,
    },

    /// Set an installed Go SDK version as the default
    Use {
        /// Version to activate
        #[arg(value_name = "VERSION")]
        args: Vec<String>,
    },

    /// List installed Go SDKs
    List {
        #[arg(hide = true)]
        args: Vec<String>,
    },

    /// Print the current Go SDK version
    Current {
        #[arg(hide = true)]
        args: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    output::set_verbose(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let mut ctx = Context::from_env(cli.base);

    match command {
        Commands::Install { args } => {
            validate_arg_count("install", &args, 1)?;
            commands::install(&ctx, &args[0])
                .with_context(|| format!("failed to install go sdk {}", args[0]))?;
        }

        Commands::Use { args } => {
            validate_arg_count("use", &args, 1)?;
            commands::use_version(&ctx, &args[0])
                .with_context(|| format!("failed to use go sdk {}", args[0]))?;
        }

        Commands::List { args } => {
            validate_arg_count("list", &args, 0)?;
            commands::list(&mut ctx).context("failed to list installed go sdks")?;
        }

        Commands::Current { args } => {
            validate_arg_count("current", &args, 0)?;
            commands::current(&mut ctx).context("failed to read the current go sdk")?;
        }
    }

    Ok(())
}
