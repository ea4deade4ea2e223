//! Gatehouse CLI - command-line client for the gateway
//!
//! Usage:
//!   gatehouse register --email <email> --password <password> --name <name>
//!   gatehouse login --email <email> --password <password>
//!   gatehouse profile --id <id> --token <token>
//!   gatehouse smoke

mod client;
mod smoke;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client::{GatewayClient, Reply};
use gatehouse_core::wire::{
    AddAddressRequest, LoginRequest, RegisterRequest, UpdateProfileRequest,
};

#[derive(Parser)]
#[command(name = "gatehouse")]
#[command(about = "Client for the Gatehouse account gateway")]
#[command(version)]
struct Cli {
    /// Gateway base URL
    #[arg(long, env = "GATEWAY_URL", default_value = "http://localhost:8080", global = true)]
    gateway: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
    },
    /// Log in and print the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Show a profile
    Profile {
        #[arg(long)]
        id: String,
        #[arg(long, env = "GATEHOUSE_TOKEN")]
        token: String,
    },
    /// Change name and/or phone
    UpdateProfile {
        #[arg(long)]
        id: String,
        #[arg(long, env = "GATEHOUSE_TOKEN")]
        token: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Delete a profile
    DeleteProfile {
        #[arg(long)]
        id: String,
        #[arg(long, env = "GATEHOUSE_TOKEN")]
        token: String,
    },
    /// Add an address to a profile
    AddAddress {
        #[arg(long)]
        id: String,
        #[arg(long, env = "GATEHOUSE_TOKEN")]
        token: String,
        #[arg(long)]
        street: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        state: Option<String>,
        #[arg(long, default_value = "")]
        postal_code: String,
        #[arg(long)]
        country: String,
        /// Mark as default address
        #[arg(long)]
        default: bool,
    },
    /// List a profile's addresses
    Addresses {
        #[arg(long)]
        id: String,
        #[arg(long, env = "GATEHOUSE_TOKEN")]
        token: String,
    },
    /// Run the register / login / access check scenario against the gateway
    Smoke,
}

/// Print the body; error responses make the process fail
fn report(reply: Reply) -> Result<()> {
    let pretty = serde_json::to_string_pretty(&reply.body)?;
    if reply.is_success() {
        println!("{pretty}");
        Ok(())
    } else {
        eprintln!("{pretty}");
        anyhow::bail!("gateway returned {}", reply.status)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatehouse_cli=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = GatewayClient::new(&cli.gateway)?;

    match cli.command {
        Commands::Register {
            email,
            password,
            name,
        } => {
            let request = RegisterRequest {
                email,
                password,
                name,
            };
            report(client.register(&request).await?)
        }
        Commands::Login { email, password } => {
            report(client.login(&LoginRequest { email, password }).await?)
        }
        Commands::Profile { id, token } => report(client.profile(&id, Some(&token)).await?),
        Commands::UpdateProfile {
            id,
            token,
            name,
            phone,
        } => {
            let request = UpdateProfileRequest { name, phone };
            report(client.update_profile(&id, &token, &request).await?)
        }
        Commands::DeleteProfile { id, token } => report(client.delete_profile(&id, &token).await?),
        Commands::AddAddress {
            id,
            token,
            street,
            city,
            state,
            postal_code,
            country,
            default,
        } => {
            let request = AddAddressRequest {
                street,
                city,
                state,
                postal_code,
                country,
                is_default: default,
            };
            report(client.add_address(&id, &token, &request).await?)
        }
        Commands::Addresses { id, token } => report(client.addresses(&id, &token).await?),
        Commands::Smoke => smoke::run(&client).await,
    }
}
