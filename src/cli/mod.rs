pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "gatectl")]
#[command(about = "gatectl - inspect gatehouse routing, sessions and configuration")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Classify paths as public or protected")]
    Route {
        #[arg(required = true, help = "Request paths, e.g. /signin or /uploads")]
        paths: Vec<String>,
    },

    #[command(about = "Ask the auth service for the session behind a cookie")]
    Session {
        #[arg(long, help = "Session cookie value, e.g. <token>.<signature>")]
        cookie: String,
    },

    #[command(about = "Show the active configuration")]
    Config,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Route { paths } => commands::route::handle(&paths, output_format),
        Commands::Session { cookie } => commands::session::handle(&cookie, output_format).await,
        Commands::Config => commands::config::handle(output_format),
    }
}
