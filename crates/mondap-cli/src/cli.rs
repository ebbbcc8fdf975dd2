//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::answer::AnswerCommand;
use crate::commands::image::ImageCommand;
use crate::commands::question::QuestionCommand;
use crate::commands::ranking::RankingCommand;
use crate::commands::session::SessionCommand;

/// CLI for the mondap Q&A API.
#[derive(Parser, Debug)]
#[command(name = "mondap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stored session operations
    Session(SessionCommand),
    /// Question operations
    Question(QuestionCommand),
    /// Answer operations
    Answer(AnswerCommand),
    /// Image uploads
    Image(ImageCommand),
    /// Ranking tables
    Ranking(RankingCommand),
}
