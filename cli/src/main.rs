mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::io::{Read, Write};
use std::sync::Arc;

use cli::{Cli, Commands};
use tg_core::services::permission::SubtypeRegistry;
use tg_infra::{config::load_config, initialize, telemetry::init_tracing, FsTokenService};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(root) = cli.root {
        config.storage.root_dir = root;
    }
    init_tracing(&config.logging).context("failed to initialize tracing")?;
    tracing::debug!(
        event = "cli_started",
        environment = %config.environment,
        root = %config.storage.root_dir.display()
    );

    let services = initialize(&config, Arc::new(SubtypeRegistry::standard())).await?;
    let service = services.token_service;

    match cli.command {
        Commands::Issue {
            user_id,
            subtype,
            lifetime,
            signature,
            address,
            hardware_id,
        } => {
            let record = service
                .issue(user_id, signature, lifetime, &subtype, address, hardware_id)
                .await?;
            println!("{}", serde_json::to_string_pretty(&service.client_token(&record))?);
        }
        Commands::Resolve {
            id,
            subtype,
            permissions,
        } => {
            let record = service.resolve(&id, &subtype).await?;
            if !permissions.is_empty() {
                let required: Vec<&str> = permissions.iter().map(String::as_str).collect();
                service.require_permissions(&record, &required)?;
            }

            let output = json!({
                "publicId": record.public_id(),
                "userId": record.user_id(),
                "subtype": record.subtype(),
                "issuedAt": record.issued_at(),
                "expiresAtOrZero": record.expires_at().unwrap_or(0),
                "permissions": record.permissions(),
                "tunnel": service.client_token(&record).is_tunnel(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Revoke { id } => {
            service.revoke(&id).await?;
            println!("revoked {}", id);
        }
        Commands::Restore { id } => {
            service.restore(&id).await?;
            println!("restored {}", id);
        }
        Commands::Encrypt {
            id,
            subtype,
            direction,
        } => {
            let payload = read_stdin()?;
            let sealed = seal(&service, &id, &subtype, direction.into(), &payload).await?;
            println!("{}", sealed);
        }
        Commands::Decrypt {
            id,
            subtype,
            direction,
        } => {
            let envelope = String::from_utf8(read_stdin()?).context("envelope is not text")?;
            let record = service.resolve(&id, &subtype).await?;
            let payload = service
                .codec()
                .decrypt_base64(&record, direction.into(), &envelope)?;
            std::io::stdout().write_all(&payload)?;
        }
    }

    Ok(())
}

async fn seal(
    service: &FsTokenService,
    id: &str,
    subtype: &str,
    direction: tg_core::services::crypto::TunnelDirection,
    payload: &[u8],
) -> Result<String> {
    let record = service.resolve(id, subtype).await?;
    Ok(service.codec().encrypt_base64(&record, direction, payload)?)
}

fn read_stdin() -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    std::io::stdin()
        .read_to_end(&mut buffer)
        .context("failed to read stdin")?;
    Ok(buffer)
}
