use anyhow::{anyhow, Context};
use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::token::decode_claims;
use crate::auth::{generate_jwt, ClaimSet, TokenClaims};
use crate::cli::OutputFormat;
use crate::config;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Mint a signed access token for local testing")]
    Mint {
        #[arg(long, help = "Subject user id (random when omitted)")]
        sub: Option<Uuid>,
        #[arg(long = "role", help = "Masjid membership as <masjid-uuid>=<role>[,<role>...]; repeatable")]
        roles: Vec<String>,
        #[arg(long, help = "Masjid id to advertise as active_masjid_id")]
        active: Option<Uuid>,
        #[arg(long, help = "Global role; repeatable")]
        global: Vec<String>,
        #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },

    #[command(about = "Verify a token and print the normalized claim set")]
    Inspect {
        #[arg(help = "Raw JWT")]
        token: String,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config::config().security;

    match cmd {
        TokenCommands::Mint { sub, roles, active, global, hours } => {
            let mut claims = TokenClaims::new(
                sub.unwrap_or_else(Uuid::new_v4),
                hours.unwrap_or(security.jwt_expiry_hours),
            );

            for spec in &roles {
                let (masjid_id, role_names) = parse_role_spec(spec)?;
                let names: Vec<&str> = role_names.iter().map(String::as_str).collect();
                claims = claims.with_masjid_role(masjid_id, &names);
            }
            if let Some(id) = active {
                claims = claims.with_active_masjid(id);
            }
            claims.roles_global = global;

            let token = generate_jwt(&claims)?;

            match output_format {
                OutputFormat::Json => println!("{}", json!({ "token": token, "claims": claims })),
                OutputFormat::Text => println!("{}", token),
            }
            Ok(())
        }
        TokenCommands::Inspect { token } => {
            let raw = decode_claims(token.trim(), &security.jwt_secret)
                .map_err(|e| anyhow!("{}", e))?;
            let claims = ClaimSet::from_claims(&raw);

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&claims)?),
                OutputFormat::Text => {
                    println!("subject:       {}", claims.subject.as_deref().unwrap_or("-"));
                    let global: Vec<_> = claims.global_roles.iter().map(|r| r.as_str()).collect();
                    println!("global roles:  {}", global.join(", "));
                    for entry in &claims.tenant_roles {
                        let roles: Vec<_> = entry.roles.iter().map(|r| r.as_str()).collect();
                        println!("masjid {}: {}", entry.masjid_id, roles.join(", "));
                    }
                    match claims.tenant_hint() {
                        Some(id) => println!("auto-selected: {}", id),
                        None => println!("auto-selected: -"),
                    }
                }
            }
            Ok(())
        }
    }
}

/// `<uuid>=owner,teacher`
fn parse_role_spec(spec: &str) -> anyhow::Result<(Uuid, Vec<String>)> {
    let (id, roles) = spec
        .split_once('=')
        .ok_or_else(|| anyhow!("expected <masjid-uuid>=<roles>, got '{}'", spec))?;

    let masjid_id = Uuid::parse_str(id.trim()).with_context(|| format!("invalid masjid id '{}'", id))?;
    let roles = roles
        .split(',')
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect();

    Ok((masjid_id, roles))
}
