//! Question commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::Value;

use crate::commands::{parse_body, print_payload};
use crate::store;

#[derive(Args, Debug)]
pub struct QuestionCommand {
    #[command(subcommand)]
    pub command: QuestionSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum QuestionSubcommand {
    /// List questions
    List(ListArgs),
    /// Show one question
    Show(ShowArgs),
    /// Create a question
    Ask(AskArgs),
    /// Update a question
    Update(BodyArgs),
    /// Delete a question
    Delete(BodyArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
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
pub struct ShowArgs {
    /// Question id
    pub id: u64,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Question title
    #[arg(long)]
    pub title: String,

    /// Question content as JSON blocks, or plain text
    #[arg(long)]
    pub content: String,
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

pub async fn handle(cmd: QuestionCommand) -> Result<()> {
    let session = store::load_session()?;

    match cmd.command {
        QuestionSubcommand::List(args) => {
            let payload = session
                .questions(args.page, args.offset)
                .await
                .context("Failed to list questions")?;
            print_payload(&payload, args.pretty)
        }
        QuestionSubcommand::Show(args) => {
            let payload = session
                .question(args.id)
                .await
                .context("Failed to fetch question")?;
            print_payload(&payload, args.pretty)
        }
        QuestionSubcommand::Ask(args) => {
            // Content is structured blocks; accept plain text as a fallback.
            let content: Value = serde_json::from_str(&args.content)
                .unwrap_or_else(|_| Value::String(args.content.clone()));
            let payload = session
                .ask(&args.title, &content)
                .await
                .context("Failed to create question")?;
            print_payload(&payload, false)
        }
        QuestionSubcommand::Update(args) => {
            let payload = session
                .update_question(parse_body(&args.body)?)
                .await
                .context("Failed to update question")?;
            print_payload(&payload, args.pretty)
        }
        QuestionSubcommand::Delete(args) => {
            let payload = session
                .delete_question(parse_body(&args.body)?)
                .await
                .context("Failed to delete question")?;
            print_payload(&payload, args.pretty)
        }
    }
}
