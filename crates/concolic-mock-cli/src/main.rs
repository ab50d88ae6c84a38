//! cmock: command-line interface for concolic mock campaigns
//!
//! ## Usage
//!
//! ```bash
//! cmock run                          # Explore every fixture case
//! cmock run --case testFinal -vv     # One case, debug logging
//! cmock run --format json -o out.json
//! cmock targets                      # How each target is intercepted
//! cmock config                       # Effective configuration as YAML
//! ```

use clap::Parser;
use concolic_mock_cli::{runner, Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    init_tracing(verbosity, cli.verbose > 0);

    let color: ColorChoice = cli.color.into();
    let config = CliConfig::new()
        .with_verbosity(verbosity)
        .with_color(color)
        .load_settings(cli.config.as_deref(), Path::new("."))?;

    match cli.command {
        Commands::Run(args) => {
            let config = config
                .with_workers(args.workers)
                .with_max_executions(args.max_executions);
            runner::run(&config, &args)
        }
        Commands::Targets(args) => runner::targets(&config, &args),
        Commands::Config(args) => runner::show_config(&config, &args),
    }
}

/// `RUST_LOG` wins unless `-v` was given explicitly
fn init_tracing(verbosity: Verbosity, explicit: bool) {
    let filter = if explicit {
        EnvFilter::new(verbosity.log_filter())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity.is_verbose())
        .try_init();
}
