use crate::config::LogFormat;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "sitekit",
    about = "sitekit: provision regions and sites in a location inventory",
    version
)]
pub struct Cli {
    /// Config file (defaults to ./sitekit.toml when present)
    #[arg(long, global = true, env = "SITEKIT_CONFIG")]
    pub config: Option<String>,

    /// Log filter for stderr diagnostics, e.g. `info` or `sitekit=debug`
    #[arg(long, global = true, env = "SITEKIT_LOG")]
    pub log_level: Option<String>,

    /// Log format for stderr diagnostics
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an inventory file seeded with statuses
    Init {
        /// Path to inventory JSONL
        #[arg(long, env = "SITEKIT_INVENTORY")]
        inventory: Option<String>,

        /// Status to seed (repeatable; defaults to Active and Planned)
        #[arg(long = "status")]
        statuses: Vec<String>,

        /// Overwrite an existing inventory
        #[arg(long)]
        force: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the Create Site job
    Run {
        /// Region to add the site to: West, Central or East
        #[arg(long)]
        region: String,

        /// Status of the new site: Active or Planned
        #[arg(long)]
        status: String,

        /// Name of the new site
        #[arg(long)]
        site: String,

        /// Path to inventory JSONL
        #[arg(long, env = "SITEKIT_INVENTORY")]
        inventory: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List inventory records
    List {
        /// Record kind to list
        #[arg(long, value_enum, default_value = "all")]
        kind: ListKindArg,

        /// Path to inventory JSONL
        #[arg(long, env = "SITEKIT_INVENTORY")]
        inventory: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage statuses
    Status {
        #[command(subcommand)]
        command: StatusCommands,
    },

    /// Show the Create Site job and its input form
    Describe {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ListKindArg {
    #[value(name = "all")]
    All,
    #[value(name = "statuses")]
    Statuses,
    #[value(name = "location-types")]
    LocationTypes,
    #[value(name = "locations")]
    Locations,
}

#[derive(Subcommand, Clone, Debug)]
pub enum StatusCommands {
    /// Add a status
    Add {
        /// Status name
        name: String,

        /// Path to inventory JSONL
        #[arg(long, env = "SITEKIT_INVENTORY")]
        inventory: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
