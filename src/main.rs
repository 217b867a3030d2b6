//! daily-reader CLI entry point.

use anyhow::Context;
use clap::Parser;
use daily_reader::{
    config::{Cli, Command, MailArgs, MailConfig},
    extract::{self, ExtractMode},
    mailer::BrevoClient,
    store::{ChapterStore, DateKey},
    template,
};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daily_reader=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Extract { epub, output, mode } => cmd_extract(&epub, &output, mode),
        Command::Send {
            store,
            date,
            dry_run,
            mail,
        } => cmd_send(&store, date, dry_run, &mail).await,
        Command::Check { store } => cmd_check(&store),
    }
}

/// Extract chapters from an EPUB into the store file.
fn cmd_extract(epub: &Path, output: &Path, mode: ExtractMode) -> anyhow::Result<()> {
    if !epub.exists() {
        anyhow::bail!("File not found: {}", epub.display());
    }

    println!("Opening EPUB file: {}", epub.display());
    let (store, summary) = extract::extract_chapters(epub, mode)?;

    println!("Found {} document items in EPUB", summary.documents);
    println!("Chapters extracted: {}", summary.extracted);
    println!("Items skipped: {}", summary.skipped.len());

    if !summary.skipped.is_empty() {
        println!("\nSkipped items:");
        for item in summary.skipped.iter().take(10) {
            println!("  - {item}");
        }
        if summary.skipped.len() > 10 {
            println!("  ... and {} more", summary.skipped.len() - 10);
        }
    }

    if store.is_empty() {
        anyhow::bail!(
            "No chapters were extracted. The EPUB may have an unusual structure; \
             try --mode inline, or write the store file by hand."
        );
    }

    store.save(output)?;
    println!("\nChapters saved to: {}", output.display());
    print_coverage(&store);

    Ok(())
}

/// Send today's chapter, or the fallback notice on a lookup miss.
async fn cmd_send(
    store_path: &Path,
    date: Option<String>,
    dry_run: bool,
    mail: &MailArgs,
) -> anyhow::Result<()> {
    let store = ChapterStore::load(store_path).with_context(|| {
        format!(
            "Failed to load chapter store {} (run `daily-reader extract` first)",
            store_path.display()
        )
    })?;
    println!(
        "Loaded {} chapters from {}",
        store.len(),
        store_path.display()
    );

    let key: DateKey = match date {
        Some(s) => s.parse()?,
        None => DateKey::today(),
    };
    println!("Looking for chapter for date: {key}");

    let (subject, html) = match store.get(&key) {
        Some(content) => {
            println!("Chapter length: {} characters", content.chars().count());
            template::chapter_email(&key, content)
        }
        None => {
            tracing::warn!(%key, "No chapter found, sending fallback notice");
            template::fallback_email(&key)
        }
    };

    if dry_run {
        println!("\nSubject: {subject}\n");
        println!("{html}");
        return Ok(());
    }

    let config = MailConfig::from_args(mail)?;
    println!("Sending to: {}", config.recipient_email);
    println!("From: {} <{}>", config.sender_name, config.sender_email);

    let client = BrevoClient::new(config);
    let accepted = client.send_email(&subject, &html).await?;
    println!("Email sent successfully (message id: {})", accepted.message_id);

    Ok(())
}

/// Report store coverage against the full calendar.
fn cmd_check(store_path: &Path) -> anyhow::Result<()> {
    let store = ChapterStore::load(store_path)
        .with_context(|| format!("Failed to load chapter store {}", store_path.display()))?;

    if store.is_empty() {
        anyhow::bail!("Chapter store is empty: {}", store_path.display());
    }

    println!("Chapters: {}", store.len());
    print_coverage(&store);

    Ok(())
}

fn print_coverage(store: &ChapterStore) {
    if let Some((first, last)) = store.date_range() {
        println!("Date range: {first} to {last}");
    }
    println!(
        "Average entry length: {} characters",
        store.average_content_len()
    );

    let missing = store.missing_dates();
    if missing.is_empty() {
        println!("All 366 dates present (including leap year Feb 29)");
    } else {
        println!("Warning: missing {} dates", missing.len());
        if missing.len() <= 20 {
            let list: Vec<String> = missing.iter().map(DateKey::to_string).collect();
            println!("Missing dates: {}", list.join(", "));
        }
    }
}
