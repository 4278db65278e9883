pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER: &str = "http://localhost:4000";

#[derive(Parser)]
#[command(name = "mdm")]
#[command(about = "MDM CLI - device agent and operator tools for the MDM backend")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run a device agent: register once, then heartbeat on an interval")]
    Agent(commands::agent::AgentArgs),

    #[command(about = "Produce an Argon2 hash suitable for the users table")]
    HashPassword {
        #[arg(help = "Plaintext password")]
        password: String,
    },

    #[command(about = "Log in and print a bearer token")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, env = "MDM_PASSWORD", hide_env_values = true, help = "Password")]
        password: String,
        #[arg(long, env = "MDM_SERVER", default_value = DEFAULT_SERVER, help = "Server base URL")]
        server: String,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
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
        Commands::Agent(args) => commands::agent::handle(args, output_format).await,
        Commands::HashPassword { password } => commands::password::handle(&password, output_format),
        Commands::Login {
            username,
            password,
            server,
        } => commands::login::handle(&server, &username, &password, output_format).await,
    }
}
