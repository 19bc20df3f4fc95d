use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;

use xyb_cli::commands::{batch, check, run, trigger};
use xyb_cli::logging::{self, LogCapture};
use xyb_cli::{Cli, Commands, Config};
use xyb_core::Action;

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    tracing::info!("loaded {} account(s)", config.accounts.len());
    Ok(config)
}

async fn run_all(
    config_path: Option<&Path>,
    capture: &LogCapture,
    action: Action,
    overwrite: bool,
) -> Result<()> {
    let started = Local::now();
    let config = load_config(config_path)?;
    let tasks = batch::all_accounts(&config.accounts, action, overwrite);
    batch::execute(&config, action.as_str(), &tasks, capture, started).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let capture = logging::init(cli.verbose);
    let config_path = cli.config.as_deref();

    match &cli.command {
        Some(Commands::Run) => {
            let started = Local::now();
            let config = load_config(config_path)?;
            let tasks = run::due_tasks(&config.accounts, started.naive_local())?;
            if tasks.is_empty() {
                tracing::info!("no task is due now");
            } else {
                batch::execute(&config, "run", &tasks, &capture, started).await?;
            }
        }
        Some(Commands::Trigger { name }) => {
            let action = trigger::parse(name)?;
            run_all(config_path, &capture, action, true).await?;
        }
        Some(Commands::SignIn { overwrite }) => {
            run_all(config_path, &capture, Action::SignIn, *overwrite).await?;
        }
        Some(Commands::SignOut { overwrite }) => {
            run_all(config_path, &capture, Action::SignOut, *overwrite).await?;
        }
        Some(Commands::Check) => {
            let config = Config::load_from(config_path).context("failed to load configuration")?;
            check::run(&mut std::io::stdout(), &config.accounts, Local::now().naive_local())?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
