//! sitekit CLI: the `sitekit` command.

mod cli;
mod commands;
mod config;
mod logging;
mod support;

use clap::Parser;
use cli::{Cli, Commands, StatusCommands};
use config::SitekitConfig;

fn main() {
    let cli = Cli::parse();

    let config = SitekitConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });
    logging::init(
        &config.log_filter(cli.log_level),
        config.log_format(cli.log_format),
    );

    match cli.command {
        Commands::Init {
            inventory,
            statuses,
            force,
            json,
        } => commands::init::run(config.inventory_path(inventory), statuses, force, json),

        Commands::Run {
            region,
            status,
            site,
            inventory,
            json,
        } => commands::run::run(commands::run::Args {
            region,
            status,
            site,
            inventory: config.inventory_path(inventory),
            json,
        }),

        Commands::List {
            kind,
            inventory,
            json,
        } => commands::list::run(kind, config.inventory_path(inventory), json),

        Commands::Status { command } => match command {
            StatusCommands::Add {
                name,
                inventory,
                json,
            } => commands::status::run_add(name, config.inventory_path(inventory), json),
        },

        Commands::Describe { json } => commands::describe::run(json),
    }
}
