//! Ranking commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::commands::print_payload;
use crate::store;

#[derive(Args, Debug)]
pub struct RankingCommand {
    #[command(subcommand)]
    pub command: RankingSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum RankingSubcommand {
    /// Ranking detail for the current user
    Detail(RankingArgs),
    /// Ranking table by likes received
    Likes(RankingArgs),
    /// Ranking table by adopted answers
    Adopted(RankingArgs),
}

#[derive(Args, Debug)]
pub struct RankingArgs {
    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn handle(cmd: RankingCommand) -> Result<()> {
    let session = store::load_session()?;

    match cmd.command {
        RankingSubcommand::Detail(args) => {
            let payload = session
                .ranking()
                .await
                .context("Failed to fetch ranking detail")?;
            print_payload(&payload, args.pretty)
        }
        RankingSubcommand::Likes(args) => {
            let payload = session
                .ranking_likes()
                .await
                .context("Failed to fetch likes ranking")?;
            print_payload(&payload, args.pretty)
        }
        RankingSubcommand::Adopted(args) => {
            let payload = session
                .ranking_adopted()
                .await
                .context("Failed to fetch adopted ranking")?;
            print_payload(&payload, args.pretty)
        }
    }
}
