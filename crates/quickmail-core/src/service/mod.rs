//! Send service.
//!
//! Bridges the command-line flow with the SMTP client library.

pub mod message;
pub mod smtp;

pub use message::OutgoingMessage;
pub use smtp::{Mailer, SendStep, SmtpError, SmtpMailer, send_email};
