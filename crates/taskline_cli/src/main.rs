//! `taskline` command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration from `.env`, environment and flags.
//! - Open the database and dispatch to command handlers.
//! - Print the error chain and exit non-zero on failure.

mod cli;
mod commands;
mod time;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use taskline_core::db::open_db;
use taskline_core::{
    CoreConfig, SqlitePlannerRepository, SqliteSignRepository, SqliteUserRepository,
};

use crate::cli::{Cli, Commands};
use crate::commands::Planner;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    if let Commands::Ping = cli.command {
        println!("taskline_core ping={}", taskline_core::ping());
        println!("taskline_core version={}", taskline_core::core_version());
        return Ok(());
    }

    let mut config = CoreConfig::from_env().context("invalid configuration")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    config
        .init_logging()
        .map_err(anyhow::Error::msg)
        .context("failed to initialize logging")?;
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        config.db_path.display()
    );

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open database {}", config.db_path.display()))?;
    let planner = Planner::new(
        SqlitePlannerRepository::try_new(&conn)?,
        SqliteSignRepository::try_new(&conn)?,
        SqliteUserRepository::try_new(&conn)?,
    );

    match cli.command {
        Commands::Ping => Ok(()),
        Commands::Event(command) => planner.event(command),
        Commands::Task(command) => planner.task(command),
        Commands::Todo(command) => planner.todo(command),
        Commands::Sign(command) => planner.sign(command),
        Commands::User(command) => planner.user(command),
    }
}
