use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use tg_core::services::crypto::TunnelDirection;

#[derive(Parser)]
#[command(
    name = "tokengate",
    version,
    about = "Issue, inspect and revoke access tokens stored in a TokenGate token store",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file layered over defaults and environment
    #[arg(short, long, global = true, env = "TOKENGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the token store root directory
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Issue a new token and print its client view
    Issue {
        /// Owner of the token
        #[arg(short, long)]
        user_id: u64,

        /// Token subtype
        #[arg(short, long, default_value = "access")]
        subtype: String,

        /// Lifetime in seconds, 0 for a token that never expires
        #[arg(short, long, default_value_t = 0)]
        lifetime: u64,

        /// Hash of the credentials the token is minted for
        #[arg(long)]
        signature: Option<String>,

        /// Client address to bind at registration
        #[arg(long)]
        address: Option<String>,

        /// Client hardware id to bind at registration
        #[arg(long)]
        hardware_id: Option<String>,
    },

    /// Resolve a token and print its record without key material
    Resolve {
        /// Public token identifier
        id: String,

        #[arg(short, long, default_value = "access")]
        subtype: String,

        /// Fail unless the token holds these permissions
        #[arg(short, long = "permission")]
        permissions: Vec<String>,
    },

    /// Disable a token
    Revoke {
        /// Public token identifier
        id: String,
    },

    /// Re-enable a disabled token
    Restore {
        /// Public token identifier
        id: String,
    },

    /// Seal stdin with a tunnel token and print the base64 envelope
    Encrypt {
        /// Public token identifier
        id: String,

        #[arg(short, long, default_value = "tunnel")]
        subtype: String,

        #[arg(short, long, value_enum, default_value_t = Direction::ServerToClient)]
        direction: Direction,
    },

    /// Open a base64 envelope read from stdin and write the payload to stdout
    Decrypt {
        /// Public token identifier
        id: String,

        #[arg(short, long, default_value = "tunnel")]
        subtype: String,

        #[arg(short, long, value_enum, default_value_t = Direction::ClientToServer)]
        direction: Direction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Direction {
    ClientToServer,
    ServerToClient,
}

impl From<Direction> for TunnelDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::ClientToServer => TunnelDirection::ClientToServer,
            Direction::ServerToClient => TunnelDirection::ServerToClient,
        }
    }
}
