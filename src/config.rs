use crate::error::{AppError, Result};
use crate::extract::ExtractMode;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Default Brevo API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.brevo.com";

/// Extracts date-keyed chapters from an EPUB and emails the day's entry.
#[derive(Parser, Debug, Clone)]
#[command(name = "daily-reader")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Extract dated chapters from an EPUB into the store file.
    Extract {
        /// Path to the EPUB file.
        epub: PathBuf,

        /// Where to write the chapter store.
        #[arg(short, long, default_value = "chapters.json")]
        output: PathBuf,

        /// Date derivation strategy.
        #[arg(long, value_enum, default_value = "auto")]
        mode: ExtractMode,
    },

    /// Send today's chapter (or the fallback notice) by email.
    Send {
        /// Path to the chapter store.
        #[arg(short, long, default_value = "chapters.json")]
        store: PathBuf,

        /// Override the lookup date (MM-DD); defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Render the email to stdout instead of calling the API.
        #[arg(long)]
        dry_run: bool,

        /// Mail secrets, usually from the environment.
        #[command(flatten)]
        mail: MailArgs,
    },

    /// Report store coverage against the 366-day calendar.
    Check {
        /// Path to the chapter store.
        #[arg(short, long, default_value = "chapters.json")]
        store: PathBuf,
    },
}

/// Mail settings. The scheduler supplies these as environment secrets;
/// local runs can pass flags instead.
#[derive(Args, Debug, Clone)]
pub struct MailArgs {
    /// Brevo API key.
    #[arg(long, env = "BREVO_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Sender address (must be a verified Brevo sender).
    #[arg(long, env = "SENDER_EMAIL")]
    pub sender_email: Option<String>,

    /// Sender display name.
    #[arg(long, env = "SENDER_NAME", default_value = "Daily Book Reader")]
    pub sender_name: String,

    /// Recipient address.
    #[arg(long, env = "RECIPIENT_EMAIL")]
    pub recipient_email: Option<String>,
}

/// Validated mail configuration.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Brevo API key.
    pub api_key: String,
    /// Sender address.
    pub sender_email: String,
    /// Sender display name.
    pub sender_name: String,
    /// Recipient address.
    pub recipient_email: String,
    /// API base URL, overridable for tests.
    pub base_url: String,
}

impl MailConfig {
    /// Validate CLI/env mail settings, naming every missing variable at
    /// once so a half-configured scheduler fails with one clear message.
    pub fn from_args(args: &MailArgs) -> Result<Self> {
        let mut missing = Vec::new();
        if args.api_key.is_none() {
            missing.push("BREVO_API_KEY");
        }
        if args.sender_email.is_none() {
            missing.push("SENDER_EMAIL");
        }
        if args.recipient_email.is_none() {
            missing.push("RECIPIENT_EMAIL");
        }
        if !missing.is_empty() {
            return Err(AppError::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            api_key: args.api_key.clone().unwrap_or_default(),
            sender_email: args.sender_email.clone().unwrap_or_default(),
            sender_name: args.sender_name.clone(),
            recipient_email: args.recipient_email.clone().unwrap_or_default(),
            base_url: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Point the client at a different endpoint.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}
