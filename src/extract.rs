//! EPUB chapter extraction.
//!
//! Walks the spine documents of an EPUB and derives a date-keyed chapter
//! store. Two strategies cover the book shapes seen in practice: dated
//! chapter titles (one entry per document) and inline "Month Day" headers
//! (many entries per document). Undated or empty items are skipped and
//! reported, never fatal.

/// Date recognition in titles and headers.
pub mod date;
/// EPUB archive access.
pub mod epub;
/// Markup stripping.
pub mod html;

use crate::error::Result;
use crate::store::ChapterStore;
use clap::ValueEnum;
use epub::EpubArchive;
use std::path::Path;

/// Entries shorter than this are treated as empty and skipped.
const MIN_CONTENT_LEN: usize = 10;

/// How dates are derived from the book.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractMode {
    /// Per document: inline headers when a document has two or more,
    /// otherwise the chapter title.
    #[default]
    Auto,
    /// One entry per spine document, dated by its title.
    Title,
    /// Entries split at inline "Month Day" header lines.
    Inline,
}

/// What happened during an extraction run.
#[derive(Debug, Default)]
pub struct ExtractSummary {
    /// Spine documents found in the EPUB.
    pub documents: usize,
    /// Entries written to the store.
    pub extracted: usize,
    /// Items skipped, with a reason each.
    pub skipped: Vec<String>,
}

/// Extract all dated chapters from an EPUB file.
pub fn extract_chapters(path: &Path, mode: ExtractMode) -> Result<(ChapterStore, ExtractSummary)> {
    let mut archive = EpubArchive::open(path)?;
    let documents = archive.documents().to_vec();

    let mut store = ChapterStore::new();
    let mut summary = ExtractSummary {
        documents: documents.len(),
        ..Default::default()
    };

    for item in &documents {
        let markup = match archive.read_document(item) {
            Ok(markup) => markup,
            Err(e) => {
                tracing::warn!(path = %item.path, error = %e, "Unreadable spine document");
                summary.skipped.push(format!("{} (unreadable)", item.path));
                continue;
            }
        };

        let text = html::html_to_text(&markup);

        let inline = match mode {
            ExtractMode::Inline => Some(date::split_inline_entries(&text)),
            ExtractMode::Auto => {
                let entries = date::split_inline_entries(&text);
                (entries.len() >= 2).then_some(entries)
            }
            ExtractMode::Title => None,
        };

        match inline {
            Some(entries) => {
                for (key, content) in entries {
                    if content.len() < MIN_CONTENT_LEN {
                        summary.skipped.push(format!("{key} (empty content)"));
                        continue;
                    }
                    insert_entry(&mut store, &mut summary, key, content);
                }
            }
            None => {
                // Prefer a heading from the content; fall back to the
                // archive path, which often encodes the date too.
                let title = html::first_heading(&markup).unwrap_or_else(|| item.path.clone());

                let Some(key) = date::date_from_title(&title) else {
                    tracing::debug!(path = %item.path, %title, "No date in title, skipping");
                    summary.skipped.push(format!("{title} (no date found)"));
                    continue;
                };

                if text.len() < MIN_CONTENT_LEN {
                    summary.skipped.push(format!("{title} (empty content)"));
                    continue;
                }
                insert_entry(&mut store, &mut summary, key, text);
            }
        }
    }

    Ok((store, summary))
}

fn insert_entry(
    store: &mut ChapterStore,
    summary: &mut ExtractSummary,
    key: crate::store::DateKey,
    content: String,
) {
    tracing::debug!(%key, chars = content.len(), "Extracted entry");
    if store.insert(key, content).is_some() {
        tracing::warn!(%key, "Duplicate entry, keeping the later one");
    } else {
        summary.extracted += 1;
    }
}
