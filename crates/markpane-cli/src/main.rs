#![forbid(unsafe_code)]

use std::{
    fs,
    io::Read as _,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use markpane_core::{Converter, MarkdownConverter, Page, markdown, page};

#[derive(Parser)]
#[command(name = "markpane-cli", about = "Render markdown without the editor", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert markdown and print the result to stdout.
    Render {
        /// Path to a markdown file. Use `-` to read from stdin.
        path: PathBuf,

        #[arg(long, value_enum, default_value_t = Format::Html)]
        format: Format,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// The converter's HTML fragment.
    Html,
    /// A complete HTML document, as shown by the editor's preview.
    Page,
    /// Plain text with markup stripped.
    Text,
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read markdown from stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(path)
        .with_context(|| format!("failed to read markdown from {}", path.display()))
}

fn render(source: &str, format: Format, base_url: &str) -> anyhow::Result<String> {
    Ok(match format {
        Format::Html => MarkdownConverter.convert(source)?,
        Format::Page => Page::from_fragment(&MarkdownConverter.convert(source)?, base_url).html,
        Format::Text => markdown::plain_text(source),
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Render { path, format } => {
            let source = read_source(&path)?;
            let base_url = if path.as_os_str() == "-" {
                String::new()
            } else {
                page::base_url_for(&path).unwrap_or_default()
            };
            tracing::debug!(bytes = source.len(), ?format, "rendering");
            print!("{}", render(&source, format, &base_url)?);
        }
    }

    Ok(())
}
