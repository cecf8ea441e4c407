use std::process::ExitCode;

use clap::{CommandFactory, Parser};

use webhook_preview::cli::{Cli, Command};
use webhook_preview::config::Config;
use webhook_preview::{logging, server};

// ========================================
// MAIN ENTRY POINT
// ========================================

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(Command::Serve(args)) = cli.command else {
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    };

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    args.apply(&mut config);

    if let Err(e) = config.validate() {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    logging::init_logging(&config.server.log_level);

    match server::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("FATAL: {}", e);
            ExitCode::FAILURE
        }
    }
}
