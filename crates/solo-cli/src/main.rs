use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use solo_server::permalink::{
    invalid_article_permalink, invalid_page_permalink, is_reserved_link,
    matches_default_article_format, matches_default_page_format,
};
use solo_storage::DocumentStore;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "solo")]
#[command(about = "Solo blog admin CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Classify a permalink the way the console does.
    CheckPermalink {
        permalink: String,
        /// Public base URL the permalink is resolved against.
        #[arg(long, default_value = "http://localhost:8080")]
        server: String,
        /// Check as a page permalink instead of an article permalink.
        #[arg(long)]
        page: bool,
    },
    /// Replay a data directory's WAL and print live documents as JSON lines.
    Dump {
        data_dir: PathBuf,
        #[arg(long)]
        table: Option<String>,
    },
}

#[derive(Serialize)]
struct PermalinkReport<'a> {
    permalink: &'a str,
    kind: &'static str,
    default_format: bool,
    reserved: bool,
    invalid: bool,
}

fn check_permalink<'a>(permalink: &'a str, server: &str, page: bool) -> PermalinkReport<'a> {
    let (kind, default_format, invalid) = if page {
        (
            "page",
            matches_default_page_format(permalink),
            invalid_page_permalink(permalink, server),
        )
    } else {
        (
            "article",
            matches_default_article_format(permalink),
            invalid_article_permalink(permalink, server),
        )
    };
    PermalinkReport {
        permalink,
        kind,
        default_format,
        reserved: is_reserved_link(permalink),
        invalid,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::CheckPermalink {
            permalink,
            server,
            page,
        } => {
            let report = check_permalink(&permalink, &server, page);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Cmd::Dump { data_dir, table } => {
            let (store, last_seq) = solo_storage::restore(&data_dir)
                .with_context(|| format!("replaying {}", data_dir.display()))?;
            let mut docs = store.all_documents();
            docs.retain(|(t, _)| table.as_deref().map_or(true, |want| want == t));
            docs.sort_by(|a, b| a.0.cmp(&b.0));
            for (t, doc) in &docs {
                println!("{}", serde_json::json!({ "table": t, "doc": doc }));
            }
            eprintln!("{} documents, last seq {}", docs.len(), last_seq);
        }
    }
    Ok(())
}
