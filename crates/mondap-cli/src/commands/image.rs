//! Image upload command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::commands::print_payload;
use crate::store;

#[derive(Args, Debug)]
pub struct ImageCommand {
    #[command(subcommand)]
    pub command: ImageSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ImageSubcommand {
    /// Upload an image and print its hosted URL
    Upload(UploadArgs),
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Path to the image file
    pub file: PathBuf,

    /// MIME type; guessed from the file extension when omitted
    #[arg(long)]
    pub content_type: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn handle(cmd: ImageCommand) -> Result<()> {
    let session = store::load_session()?;

    match cmd.command {
        ImageSubcommand::Upload(args) => {
            let bytes = fs::read(&args.file)
                .with_context(|| format!("Failed to read {}", args.file.display()))?;
            let file_name = args
                .file
                .file_name()
                .and_then(|n| n.to_str())
                .context("File path has no usable file name")?;
            let content_type = args
                .content_type
                .unwrap_or_else(|| guess_content_type(&args.file).to_string());

            let payload = session
                .upload_image(file_name, &content_type, bytes)
                .await
                .context("Failed to upload image")?;
            print_payload(&payload, args.pretty)
        }
    }
}

fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_guessed_from_extension() {
        assert_eq!(guess_content_type(Path::new("a.png")), "image/png");
        assert_eq!(guess_content_type(Path::new("b.JPG")), "image/jpeg");
        assert_eq!(
            guess_content_type(Path::new("noext")),
            "application/octet-stream"
        );
    }
}
