//! Answer commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::commands::{parse_body, print_payload};
use crate::store;

#[derive(Args, Debug)]
pub struct AnswerCommand {
    #[command(subcommand)]
    pub command: AnswerSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AnswerSubcommand {
    /// List answers for a question
    List(ListArgs),
    /// Create an answer
    Add(BodyArgs),
    /// Update an answer
    Update(BodyArgs),
    /// Delete an answer
    Delete(BodyArgs),
    /// Adopt an answer as the accepted one
    Adopt(BodyArgs),
    /// Like a question or answer
    Like(BodyArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Question id
    pub question_id: u64,

    /// Page number (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Page size
    #[arg(long, default_value_t = 30)]
    pub offset: u32,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args, Debug)]
pub struct BodyArgs {
    /// Request body as JSON
    #[arg(long)]
    pub body: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn handle(cmd: AnswerCommand) -> Result<()> {
    let session = store::load_session()?;

    match cmd.command {
        AnswerSubcommand::List(args) => {
            let payload = session
                .answers(args.question_id, args.page, args.offset)
                .await
                .context("Failed to list answers")?;
            print_payload(&payload, args.pretty)
        }
        AnswerSubcommand::Add(args) => {
            let payload = session
                .answer(parse_body(&args.body)?)
                .await
                .context("Failed to create answer")?;
            print_payload(&payload, args.pretty)
        }
        AnswerSubcommand::Update(args) => {
            let payload = session
                .update_answer(parse_body(&args.body)?)
                .await
                .context("Failed to update answer")?;
            print_payload(&payload, args.pretty)
        }
        AnswerSubcommand::Delete(args) => {
            let payload = session
                .delete_answer(parse_body(&args.body)?)
                .await
                .context("Failed to delete answer")?;
            print_payload(&payload, args.pretty)
        }
        AnswerSubcommand::Adopt(args) => {
            let payload = session
                .adopt_answer(parse_body(&args.body)?)
                .await
                .context("Failed to adopt answer")?;
            print_payload(&payload, args.pretty)
        }
        AnswerSubcommand::Like(args) => {
            let payload = session
                .like(parse_body(&args.body)?)
                .await
                .context("Failed to send like")?;
            print_payload(&payload, args.pretty)
        }
    }
}
