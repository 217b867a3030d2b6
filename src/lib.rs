//! daily-reader: extract date-keyed chapters from an EPUB and email the
//! day's entry.
//!
//! Two batch jobs share one data file:
//!
//! - `extract` reads an EPUB archive, derives a calendar date for each
//!   chapter from its title (or from inline "Month Day" headers), strips
//!   markup, and writes a JSON mapping from "MM-DD" keys to plain text.
//! - `send` looks up today's key in that mapping, renders an HTML email,
//!   and submits it to the Brevo transactional API. A missing key sends a
//!   fallback notice instead of failing the run.
//!
//! The daily trigger is an external scheduler; this crate just runs once
//! and exits.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Configuration and CLI.
pub mod config;
/// Error types.
pub mod error;
/// EPUB chapter extraction.
pub mod extract;
/// Brevo transactional email client.
pub mod mailer;
/// Date-keyed chapter store.
pub mod store;
/// Email HTML rendering.
pub mod template;

#[cfg(test)]
mod tests;

pub use config::{Cli, Command, MailConfig};
pub use error::{AppError, Result};
pub use mailer::BrevoClient;
pub use store::{ChapterStore, DateKey};
