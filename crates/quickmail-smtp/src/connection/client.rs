//! Type-state SMTP client.

use super::{ServerInfo, SmtpStream};
use crate::command::Command;
use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::types::{Address, AuthMechanism, Reply, ReplyCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::marker::PhantomData;
use tracing::debug;

/// Type-state marker: greeting received, not yet authenticated.
#[derive(Debug)]
pub struct Greeted;

/// Type-state marker: authenticated, ready for a transaction.
#[derive(Debug)]
pub struct Authenticated;

/// Type-state marker: `MAIL FROM` accepted, no recipient yet.
#[derive(Debug)]
pub struct Envelope;

/// Type-state marker: recipient accepted, ready for `DATA`.
#[derive(Debug)]
pub struct Recipients;

/// Type-state marker: `DATA` accepted, server waits for the message.
#[derive(Debug)]
pub struct Data;

/// SMTP client with type-state pattern.
#[derive(Debug)]
pub struct Client<State> {
    stream: SmtpStream,
    server_info: ServerInfo,
    _state: PhantomData<State>,
}

impl<S> Client<S> {
    fn transition<T>(self) -> Client<T> {
        Client {
            stream: self.stream,
            server_info: self.server_info,
            _state: PhantomData,
        }
    }

    /// Returns the server information.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    async fn send_command(&mut self, cmd: Command) -> Result<Reply> {
        debug!("C: {}", cmd.redacted());
        self.stream.write_all(&cmd.serialize()).await?;
        Self::read_reply(&mut self.stream).await
    }

    async fn read_reply(stream: &mut SmtpStream) -> Result<Reply> {
        let mut lines = Vec::new();
        loop {
            let line = stream.read_line().await?;
            let is_last = is_last_reply_line(&line);
            lines.push(line);
            if is_last {
                break;
            }
        }

        let reply = parse_reply(&lines)?;
        debug!("S: {} {}", reply.code, reply.first_line());
        Ok(reply)
    }

    /// Sends QUIT and closes the session (available in any state).
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT command fails.
    pub async fn quit(mut self) -> Result<()> {
        let reply = self.send_command(Command::Quit).await?;
        if reply.code != ReplyCode::CLOSING {
            reply.expect_success()?;
        }
        Ok(())
    }
}

impl Client<Greeted> {
    /// Wraps a connected stream and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the greeting fails or the server is not
    /// ready (anything but 220).
    pub async fn greet(mut stream: SmtpStream) -> Result<Self> {
        let greeting = Self::read_reply(&mut stream)
            .await?
            .expect_code(ReplyCode::SERVICE_READY)?;

        let hostname = greeting
            .first_line()
            .split_whitespace()
            .next()
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            stream,
            server_info: ServerInfo {
                hostname,
                ..ServerInfo::default()
            },
            _state: PhantomData,
        })
    }

    /// Sends EHLO and records the advertised extensions.
    ///
    /// # Errors
    ///
    /// Returns an error if the EHLO command fails.
    pub async fn ehlo(mut self, client_hostname: &str) -> Result<Self> {
        let reply = self
            .send_command(Command::Ehlo {
                hostname: client_hostname.to_string(),
            })
            .await?
            .expect_success()?;

        self.server_info.update_from_ehlo(&reply.message);
        Ok(self)
    }

    /// Upgrades the session to TLS and repeats EHLO over the secure channel.
    ///
    /// # Errors
    ///
    /// Returns an error if STARTTLS is not advertised, the server refuses it,
    /// or the handshake fails.
    pub async fn starttls(mut self, server_hostname: &str, client_hostname: &str) -> Result<Self> {
        if !self.server_info.supports_starttls() {
            return Err(Error::NotSupported("STARTTLS".into()));
        }

        self.send_command(Command::StartTls)
            .await?
            .expect_code(ReplyCode::SERVICE_READY)?;

        self.stream = self.stream.upgrade_to_tls(server_hostname).await?;
        debug!("TLS established with {server_hostname}");

        // Capabilities learned in plaintext must be discarded (RFC 3207).
        self.ehlo(client_hostname).await
    }

    /// Authenticates with the given mechanism.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rejected`] with the server's code if the credentials
    /// are refused; see [`Error::is_auth_failure`].
    pub async fn authenticate(
        mut self,
        mechanism: AuthMechanism,
        username: &str,
        password: &str,
    ) -> Result<Client<Authenticated>> {
        let reply = match mechanism {
            AuthMechanism::Plain => {
                let credentials = format!("\0{username}\0{password}");
                self.send_command(Command::Auth {
                    mechanism,
                    initial_response: Some(STANDARD.encode(credentials.as_bytes())),
                })
                .await?
            }
            AuthMechanism::Login => {
                self.send_command(Command::Auth {
                    mechanism,
                    initial_response: None,
                })
                .await?
                .expect_code(ReplyCode::AUTH_CONTINUE)?;

                self.send_command(Command::AuthResponse(STANDARD.encode(username)))
                    .await?
                    .expect_code(ReplyCode::AUTH_CONTINUE)?;

                self.send_command(Command::AuthResponse(STANDARD.encode(password)))
                    .await?
            }
        };

        reply.expect_code(ReplyCode::AUTH_SUCCEEDED)?;
        Ok(self.transition())
    }
}

impl Client<Authenticated> {
    /// Starts a mail transaction.
    ///
    /// Announces `BODY=8BITMIME` when the server supports it.
    ///
    /// # Errors
    ///
    /// Returns an error if the MAIL FROM command fails.
    pub async fn mail_from(mut self, from: Address) -> Result<Client<Envelope>> {
        let eight_bit = self.server_info.supports_8bitmime();
        self.send_command(Command::MailFrom { from, eight_bit })
            .await?
            .expect_success()?;
        Ok(self.transition())
    }
}

impl Client<Envelope> {
    /// Adds the recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the RCPT TO command fails.
    pub async fn rcpt_to(mut self, to: Address) -> Result<Client<Recipients>> {
        self.send_command(Command::RcptTo { to })
            .await?
            .expect_success()?;
        Ok(self.transition())
    }
}

impl Client<Recipients> {
    /// Begins sending message data.
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers 354.
    pub async fn data(mut self) -> Result<Client<Data>> {
        self.send_command(Command::Data)
            .await?
            .expect_code(ReplyCode::START_DATA)?;
        Ok(self.transition())
    }
}

impl Client<Data> {
    /// Sends the message content and completes the transaction.
    ///
    /// The message should be RFC 5322 formatted. Line endings are normalized
    /// to CRLF, leading dots are stuffed, and the terminating `.` line is
    /// appended.
    ///
    /// # Errors
    ///
    /// Returns an error if the message exceeds the advertised SIZE, the write
    /// fails, or the server rejects the message.
    pub async fn send_message(mut self, message: &[u8]) -> Result<Client<Authenticated>> {
        let payload = encode_data(message);
        if let Some(limit) = self.server_info.max_message_size()
            && limit > 0
            && payload.len() > limit
        {
            return Err(Error::MessageTooLarge {
                size: payload.len(),
                limit,
            });
        }

        debug!("C: <{} bytes of message data>", payload.len());
        self.stream.write_all(&payload).await?;
        Self::read_reply(&mut self.stream).await?.expect_success()?;
        Ok(self.transition())
    }
}

/// Encodes a message for the DATA phase.
fn encode_data(message: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + message.len() / 32 + 5);
    let body = message.strip_suffix(b"\n").unwrap_or(message);

    if !message.is_empty() {
        for line in body.split(|&b| b == b'\n') {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.first() == Some(&b'.') {
                out.push(b'.');
            }
            out.extend_from_slice(line);
            out.extend_from_slice(b"\r\n");
        }
    }

    out.extend_from_slice(b".\r\n");
    out
}
