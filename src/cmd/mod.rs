use crate::{pkg::server::listen, prelude::Result};
use clap::{Parser, Subcommand};

mod migrate;
mod token;

#[derive(Parser)]
#[command(about = "education marketplace listings service")]
struct Cmd {
    #[command(subcommand)]
    command: Option<SubCommandType>,
}

#[derive(Subcommand)]
enum SubCommandType {
    Listen,
    Migrate,
    /// Issue a session token for an operator or a seeded account
    IssueToken {
        #[arg(long)]
        user: String,
        #[arg(long)]
        role: String,
        /// Repeatable; defaults to the role's permissions when omitted
        #[arg(long = "permission")]
        permissions: Vec<String>,
    },
}

pub async fn run() -> Result<()> {
    let args = Cmd::parse();
    match args.command {
        Some(SubCommandType::Listen) => {
            listen().await?;
        }
        Some(SubCommandType::Migrate) => {
            migrate::apply().await?;
        }
        Some(SubCommandType::IssueToken {
            user,
            role,
            permissions,
        }) => {
            token::issue(&user, &role, &permissions).await?;
        }
        None => {
            tracing::error!("no subcommand passed");
        }
    }
    Ok(())
}
