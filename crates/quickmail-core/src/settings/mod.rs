//! Saved defaults.
//!
//! Sender, recipient, App Password and SMTP server live in one JSON file in
//! the user's home directory. The password is base64-encoded on disk: this
//! hides it from a casual glance but anyone who can read the file can decode
//! it. The format is shared with earlier releases, so the encoding must stay.

mod model;
pub mod obfuscation;
mod store;

pub use model::{Secret, Security, Settings, SmtpServer};
pub use store::{CONFIG_FILE_NAME, SettingsStore};
