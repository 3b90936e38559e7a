//! `quickmail` - send a plain-text email through Gmail from the terminal.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod app;

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use quickmail_core::{MaskedReader, Platform, SettingsStore, SmtpMailer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::App;

const LONG_ABOUT: &str = "\
Quick command-line tool for sending emails via Gmail without opening the full
Gmail interface. Supports saving default settings for faster sends.

All input is interactive: sender, App Password (typed masked), recipient,
subject and body. End the body with Ctrl+D on Unix or Ctrl+Z then Enter on
Windows.";

const AFTER_HELP: &str = "\
FEATURES:
  • Cross-platform (Windows, Linux, macOS)
  • Password input with asterisk masking
  • Save default sender, recipient, and App Password
  • Configuration stored in ~/.gmail_sender_config.json
  • Plain text email support

REQUIREMENTS:
  • Gmail account with App Password enabled
  • Generate App Password at: https://myaccount.google.com/apppasswords

NOTE:
  The saved App Password is base64-encoded, not encrypted. Anyone who can
  read the configuration file can recover it.

Set RUST_LOG=debug for protocol logs on stderr.";

/// Command-line flags. Everything else is asked interactively.
#[derive(Parser, Debug)]
#[command(
    name = "quickmail",
    version,
    about = "Simple CLI email sender for Gmail",
    long_about = LONG_ABOUT,
    after_help = AFTER_HELP
)]
struct Cli {}

fn main() -> Result<ExitCode> {
    let _cli = Cli::parse();

    // Logs go to stderr so prompts on stdout stay clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    info!("Starting quickmail {}", env!("CARGO_PKG_VERSION"));

    let platform = Platform::detect();
    let store = SettingsStore::default_location().context("Cannot locate the configuration file")?;
    let settings = store.load();
    let mailer = SmtpMailer::new(settings.smtp.clone());

    let mut app = App::new(
        io::stdin(),
        io::stdout(),
        MaskedReader::stdio(platform),
        mailer,
        store,
        settings,
        platform,
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;
    let outcome = runtime.block_on(app.run())?;

    Ok(outcome.exit_code())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn only_help_and_version_flags() {
        assert!(Cli::try_parse_from(["quickmail"]).is_ok());
        assert!(Cli::try_parse_from(["quickmail", "--to", "x"]).is_err());

        let help = Cli::try_parse_from(["quickmail", "--help"]).unwrap_err();
        assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);
        assert!(help.to_string().contains("base64-encoded, not encrypted"));

        let version = Cli::try_parse_from(["quickmail", "-V"]).unwrap_err();
        assert_eq!(version.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
