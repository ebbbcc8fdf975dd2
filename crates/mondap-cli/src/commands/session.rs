//! Stored session commands.
//!
//! Login is not implemented here: the credential pair comes from an
//! external login flow and is imported into the session file.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use mondap_core::{AccessToken, ApiUrl, RefreshToken, TokenPair};

use crate::output;
use crate::store;

#[derive(Args, Debug)]
pub struct SessionCommand {
    #[command(subcommand)]
    pub command: SessionSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum SessionSubcommand {
    /// Import an externally issued credential pair
    Import(ImportArgs),
    /// Show the stored session (tokens are never printed)
    Show,
    /// Clear the stored session
    Clear,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// API base URL
    #[arg(long)]
    pub api: String,

    /// Access token issued by the login flow
    #[arg(long)]
    pub access_token: String,

    /// Refresh token issued by the login flow
    #[arg(long)]
    pub refresh_token: String,
}

pub async fn handle(cmd: SessionCommand) -> Result<()> {
    match cmd.command {
        SessionSubcommand::Import(args) => import(args),
        SessionSubcommand::Show => show(),
        SessionSubcommand::Clear => clear(),
    }
}

fn import(args: ImportArgs) -> Result<()> {
    let api = ApiUrl::new(&args.api).context("Invalid API base URL")?;
    let pair = TokenPair::new(
        AccessToken::new(args.access_token),
        RefreshToken::new(args.refresh_token),
    );

    store::import_session(api.clone(), pair)?;

    output::success("Session imported");
    output::field("API", api.as_str());
    Ok(())
}

fn show() -> Result<()> {
    match store::stored_api()? {
        Some(api) => {
            output::field("API", api.as_str());
            output::field("Credentials", "[REDACTED]");
        }
        None => {
            output::field("Session", "none");
        }
    }
    Ok(())
}

fn clear() -> Result<()> {
    store::clear_session()?;
    output::success("Session cleared");
    Ok(())
}
