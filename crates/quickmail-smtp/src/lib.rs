//! # quickmail-smtp
//!
//! A small SMTP submission client (RFC 5321) built for one job: hand a single
//! message to a provider such as Gmail on port 587.
//!
//! ## Features
//!
//! - **Type-state sessions**: the compiler rejects `DATA` before `RCPT TO`
//! - **TLS**: implicit TLS (port 465) and STARTTLS upgrade
//! - **Authentication**: PLAIN and LOGIN
//!
//! ## Quick Start
//!
//! ```ignore
//! use quickmail_smtp::{Address, AuthMechanism, Client};
//! use quickmail_smtp::connection::connect;
//!
//! #[tokio::main]
//! async fn main() -> quickmail_smtp::Result<()> {
//!     let stream = connect("smtp.gmail.com", 587).await?;
//!     let client = Client::greet(stream).await?
//!         .ehlo("localhost").await?
//!         .starttls("smtp.gmail.com", "localhost").await?;
//!
//!     let client = client
//!         .authenticate(AuthMechanism::Plain, "me@gmail.com", "app-password")
//!         .await?;
//!
//!     let client = client
//!         .mail_from(Address::new("me@gmail.com")?).await?
//!         .rcpt_to(Address::new("you@example.com")?).await?
//!         .data().await?;
//!
//!     let client = client.send_message(b"Subject: Hi\r\n\r\nHello\r\n").await?;
//!     client.quit().await
//! }
//! ```
//!
//! ## Session States
//!
//! ```text
//! Greeted ── authenticate() ──→ Authenticated ── mail_from() ──→ Envelope ── rcpt_to() ──→ Recipients
//!                                     ↑                                                          │
//!                                     │                                                       data()
//!                                     └─────────────────── send_message() ──────────────── Data
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use connection::{Authenticated, Client, Data, Envelope, Greeted, Recipients, ServerInfo};
pub use error::{Error, Result};
pub use types::{Address, AuthMechanism, Extension, Reply, ReplyCode};
