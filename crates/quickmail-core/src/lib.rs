//! # quickmail-core
//!
//! Core pieces of the `quickmail` command-line sender.
//!
//! This crate provides:
//! - **Settings store** - saved sender/recipient defaults and an obfuscated
//!   App Password in a per-user JSON file
//! - **Masked input** - password entry that echoes `*` per character, with
//!   POSIX and Windows console raw-mode backends
//! - **Send service** - builds the plain-text message and submits it over SMTP

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_code)]

mod error;
pub mod service;
pub mod settings;
pub mod terminal;

pub use error::{Error, Result};
pub use service::{Mailer, OutgoingMessage, SendStep, SmtpError, SmtpMailer, send_email};
pub use settings::{Secret, Security, Settings, SettingsStore, SmtpServer};
pub use terminal::{MaskedInput, MaskedLineReader, MaskedReader, Platform};
