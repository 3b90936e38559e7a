//! SMTP service for sending emails.
//!
//! Provides the single send operation the command-line flow needs, on top of
//! the `quickmail-smtp` client.

use quickmail_smtp::connection::{connect, connect_tls};
use quickmail_smtp::{Address, AuthMechanism, Client};
use tracing::{debug, info, warn};

use super::OutgoingMessage;
use crate::settings::{Secret, Security, SmtpServer};

/// Hostname announced in EHLO.
const CLIENT_HOSTNAME: &str = "localhost";

/// Errors that can occur during SMTP operations.
#[derive(Debug, thiserror::Error)]
pub enum SmtpError {
    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The server refused the credentials.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Send failed.
    #[error("Send failed: {0}")]
    Send(String),

    /// Invalid address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

impl SmtpError {
    /// Returns true if the server refused the credentials.
    #[must_use]
    pub const fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}

/// Progress milestones reported while sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStep {
    /// Opening the connection (and TLS).
    Connecting,
    /// Logging in.
    Authenticating,
    /// Transferring the message.
    Sending,
}

/// Delivers a message.
#[allow(async_fn_in_trait)]
pub trait Mailer {
    /// Sends `message`, logging in as its sender with `password`.
    ///
    /// # Errors
    ///
    /// Returns [`SmtpError::Authentication`] if the credentials are refused
    /// and another variant for any other failure.
    async fn send(
        &self,
        message: &OutgoingMessage,
        password: &Secret,
        progress: &mut dyn FnMut(SendStep),
    ) -> Result<(), SmtpError>;
}

/// [`Mailer`] that submits through an SMTP server.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    server: SmtpServer,
}

impl SmtpMailer {
    /// Creates a mailer for `server`.
    #[must_use]
    pub const fn new(server: SmtpServer) -> Self {
        Self { server }
    }
}

impl Mailer for SmtpMailer {
    async fn send(
        &self,
        message: &OutgoingMessage,
        password: &Secret,
        progress: &mut dyn FnMut(SendStep),
    ) -> Result<(), SmtpError> {
        send_email(&self.server, message, password, progress).await
    }
}

/// Send an email through `server`, logging in as the sender.
///
/// Addresses are checked before any connection is opened. Credentials the
/// server refuses surface as [`SmtpError::Authentication`].
///
/// # Errors
///
/// Returns an error if validation, connection, authentication, or sending
/// fails.
pub async fn send_email(
    server: &SmtpServer,
    message: &OutgoingMessage,
    password: &Secret,
    progress: &mut dyn FnMut(SendStep),
) -> Result<(), SmtpError> {
    let from_addr = Address::new(message.from.trim())
        .map_err(|e| SmtpError::InvalidAddress(format!("sender: {e}")))?;
    let to_addr = Address::new(message.to.trim())
        .map_err(|e| SmtpError::InvalidAddress(format!("recipient: {e}")))?;

    progress(SendStep::Connecting);
    debug!(
        "Connecting to {}:{} ({})",
        server.host,
        server.port,
        server.security.display_name()
    );

    let stream = match server.security {
        Security::Tls => connect_tls(&server.host, server.port).await,
        Security::StartTls | Security::None => connect(&server.host, server.port).await,
    }
    .map_err(|e| SmtpError::Connection(e.to_string()))?;

    let client = Client::greet(stream)
        .await
        .map_err(|e| SmtpError::Connection(e.to_string()))?
        .ehlo(CLIENT_HOSTNAME)
        .await
        .map_err(|e| SmtpError::Connection(e.to_string()))?;

    let client = if server.security == Security::StartTls {
        client
            .starttls(&server.host, CLIENT_HOSTNAME)
            .await
            .map_err(|e| SmtpError::Connection(e.to_string()))?
    } else {
        client
    };

    progress(SendStep::Authenticating);
    let mechanism = AuthMechanism::select(&client.server_info().auth_mechanisms());
    debug!("Authenticating as {from_addr} with {}", mechanism.as_str());
    let client = client
        .authenticate(mechanism, from_addr.as_str(), password.expose())
        .await
        .map_err(|e| {
            if e.is_auth_failure() {
                SmtpError::Authentication(e.to_string())
            } else {
                SmtpError::Connection(e.to_string())
            }
        })?;

    progress(SendStep::Sending);
    let client = client
        .mail_from(from_addr)
        .await
        .map_err(|e| SmtpError::Send(e.to_string()))?
        .rcpt_to(to_addr)
        .await
        .map_err(|e| SmtpError::Send(e.to_string()))?
        .data()
        .await
        .map_err(|e| SmtpError::Send(e.to_string()))?;

    let client = client
        .send_message(message.to_rfc5322().as_bytes())
        .await
        .map_err(|e| SmtpError::Send(e.to_string()))?;
    info!("Message to {} accepted by {}", message.to, server.host);

    // The message is already queued; a failed QUIT does not undo that.
    if let Err(e) = client.quit().await {
        warn!("QUIT failed after delivery: {e}");
    }

    Ok(())
}
