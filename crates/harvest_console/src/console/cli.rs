use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "harvest_console")]
#[command(about = "Review harvest requests and assign agronomists")]
pub struct Cli {
    /// Path to the RON settings file
    #[arg(short, long, default_value = "console.ron")]
    pub config: PathBuf,

    /// Harvest service base URL (overrides the settings file)
    #[arg(long, env = "HARVEST_BASE_URL")]
    pub base_url: Option<String>,

    /// Administrator bearer token (overrides the settings file)
    #[arg(long, env = "HARVEST_AUTH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Status mix, crop mix, monthly trend and any recent rejection
    Summary,
    /// Harvest requests, optionally narrowed by farmer, crop, variety or location
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Agronomists available for a pending request
    Agronomists { request_id: String },
    /// Assign an available agronomist to a pending request
    Assign {
        request_id: String,
        expert_id: String,
        #[arg(short, long, default_value = "")]
        advice: String,
    },
}
