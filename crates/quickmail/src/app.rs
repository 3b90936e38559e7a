//! Interactive compose-and-send flow.

use std::io::{self, Read, Write};
use std::process::ExitCode;

use anyhow::Result;
use quickmail_core::{
    Mailer, MaskedInput, MaskedLineReader, OutgoingMessage, Platform, Secret, SendStep, Settings,
    SettingsStore,
};
use tracing::{debug, info, warn};

/// Width of the preview frame.
const RULE_WIDTH: usize = 50;
/// Body characters shown in the preview.
const PREVIEW_CHARS: usize = 100;
/// Where Gmail users create App Passwords.
const APP_PASSWORD_URL: &str = "https://myaccount.google.com/apppasswords";

/// Line-oriented access to standard input.
pub trait LineInput {
    /// Reads one line without its terminator, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Reads everything up to the end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    fn read_rest(&mut self) -> io::Result<String>;
}

impl LineInput for io::Stdin {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if io::Stdin::read_line(self, &mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(trim_newline(line)))
    }

    fn read_rest(&mut self) -> io::Result<String> {
        let mut text = String::new();
        self.read_to_string(&mut text)?;
        Ok(text)
    }
}

fn trim_newline(mut line: String) -> String {
    let len = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(len);
    line
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The message was accepted by the server.
    Sent,
    /// The user chose not to send.
    Declined,
    /// Delivery failed.
    Failed,
    /// The user pressed Ctrl-C at the password prompt.
    Cancelled,
}

impl Outcome {
    /// Process exit code for this outcome.
    #[must_use]
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Sent | Self::Declined => ExitCode::SUCCESS,
            Self::Failed => ExitCode::FAILURE,
            Self::Cancelled => ExitCode::from(130),
        }
    }
}

/// One interactive session.
pub struct App<I, O, R, M> {
    input: I,
    output: O,
    masked: R,
    mailer: M,
    store: SettingsStore,
    settings: Settings,
    platform: Platform,
}

impl<I, O, R, M> App<I, O, R, M>
where
    I: LineInput,
    O: Write,
    R: MaskedLineReader,
    M: Mailer,
{
    /// Creates a session over the given terminal, mailer and saved settings.
    pub const fn new(
        input: I,
        output: O,
        masked: R,
        mailer: M,
        store: SettingsStore,
        settings: Settings,
        platform: Platform,
    ) -> Self {
        Self {
            input,
            output,
            masked,
            mailer,
            store,
            settings,
            platform,
        }
    }

    /// Consumes the session, returning the output sink.
    pub fn into_output(self) -> O {
        self.output
    }

    /// Runs the prompts, sends the message and offers to save the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error only if the terminal itself fails. Delivery and
    /// settings problems are reported to the user and reflected in the
    /// returned [`Outcome`].
    pub async fn run(&mut self) -> Result<Outcome> {
        writeln!(self.output, "=== Quick Gmail Sender ===")?;
        writeln!(self.output, "Version {}", env!("CARGO_PKG_VERSION"))?;

        let default_sender = self.settings.sender_email.clone();
        let sender = self.ask_with_default("Your Gmail address", &default_sender)?;

        let Some(password) = self.password()? else {
            writeln!(self.output, "Cancelled.")?;
            return Ok(Outcome::Cancelled);
        };

        writeln!(self.output)?;
        let default_recipient = self.settings.recipient_email.clone();
        let recipient = self.ask_with_default("Recipient email", &default_recipient)?;
        let subject = self.ask("Subject: ")?.unwrap_or_default().trim().to_string();

        writeln!(
            self.output,
            "\nEmail body (press {} when done):",
            self.platform.end_of_input_hint()
        )?;
        self.output.flush()?;
        let body = self.input.read_rest()?;

        let message = OutgoingMessage::new(sender, recipient, subject, body);
        self.preview(&message)?;

        if !self.confirm("\nSend this email? (Y/n): ")? {
            writeln!(self.output, "Cancelled.")?;
            return Ok(Outcome::Declined);
        }

        if !self.deliver(&message, &password).await? {
            return Ok(Outcome::Failed);
        }

        self.offer_save(message, password)?;
        Ok(Outcome::Sent)
    }

    /// Prints `prompt` and reads one answer.
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.output.write_all(prompt.as_bytes())?;
        self.output.flush()?;
        self.input.read_line()
    }

    /// Prompts for a value, showing and falling back to `default`.
    fn ask_with_default(&mut self, label: &str, default: &str) -> io::Result<String> {
        let prompt = if default.is_empty() {
            format!("{label}: ")
        } else {
            format!("{label} [{default}]: ")
        };
        let answer = self.ask(&prompt)?.unwrap_or_default();
        let answer = answer.trim();
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer.to_string()
        })
    }

    /// Yes unless the user typed something other than `y`. End of input
    /// counts as no.
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        let Some(answer) = self.ask(prompt)? else {
            return Ok(false);
        };
        let answer = answer.trim().to_lowercase();
        Ok(answer.is_empty() || answer == "y")
    }

    /// Returns the saved App Password or reads a new one. `None` if the user
    /// cancelled.
    fn password(&mut self) -> io::Result<Option<Secret>> {
        if let Some(saved) = self.settings.sender_password.clone()
            && !saved.is_empty()
            && self.confirm("Use saved App Password? (Y/n): ")?
        {
            debug!("Using saved App Password");
            return Ok(Some(saved));
        }

        match self.masked.read_masked_line("Your Gmail App Password: ")? {
            MaskedInput::Completed(text) => Ok(Some(Secret::new(text))),
            MaskedInput::Cancelled => Ok(None),
        }
    }

    fn preview(&mut self, message: &OutgoingMessage) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(self.output, "\n{rule}")?;
        writeln!(self.output, "From: {}", message.from)?;
        writeln!(self.output, "To: {}", message.to)?;
        writeln!(self.output, "Subject: {}", message.subject)?;
        writeln!(self.output, "Body: {}", message.body_preview(PREVIEW_CHARS))?;
        writeln!(self.output, "{rule}")
    }

    /// Sends the message, printing progress. Returns false on failure.
    async fn deliver(
        &mut self,
        message: &OutgoingMessage,
        password: &Secret,
    ) -> io::Result<bool> {
        let host = self.settings.smtp.host.clone();
        let output = &mut self.output;
        let mut progress = |step: SendStep| {
            let line = match step {
                SendStep::Connecting => format!("Connecting to {host}..."),
                SendStep::Authenticating => "Logging in...".to_string(),
                SendStep::Sending => "Sending email...".to_string(),
            };
            if let Err(e) = writeln!(output, "{line}").and_then(|()| output.flush()) {
                warn!("Failed to print progress: {e}");
            }
        };

        let result = self.mailer.send(message, password, &mut progress).await;
        match result {
            Ok(()) => {
                info!("Sent message to {}", message.to);
                writeln!(self.output, "✓ Email sent successfully to {}", message.to)?;
                Ok(true)
            }
            Err(e) if e.is_authentication() => {
                warn!("{e}");
                writeln!(
                    self.output,
                    "✗ Authentication failed. Make sure you're using an App Password, not your regular Gmail password."
                )?;
                writeln!(self.output, "  Generate one at: {APP_PASSWORD_URL}")?;
                Ok(false)
            }
            Err(e) => {
                warn!("{e}");
                writeln!(self.output, "✗ Error sending email: {e}")?;
                Ok(false)
            }
        }
    }

    fn offer_save(
        &mut self,
        message: OutgoingMessage,
        password: Secret,
    ) -> io::Result<()> {
        let answer = self
            .ask("\nSave these settings as defaults? (y/n): ")?
            .unwrap_or_default();
        if answer.trim().to_lowercase() != "y" {
            writeln!(self.output, "Settings unchanged.")?;
            return Ok(());
        }

        let settings = Settings {
            sender_email: message.from,
            recipient_email: message.to,
            sender_password: Some(password),
            smtp: self.settings.smtp.clone(),
        };
        match self.store.save(&settings) {
            Ok(path) => {
                writeln!(self.output, "✓ Configuration saved to {}", path.display())?;
            }
            Err(e) => {
                debug!("Could not save config file: {e}");
                writeln!(self.output, "Warning: Could not save config file: {e}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use quickmail_core::SmtpError;
    use quickmail_core::settings::CONFIG_FILE_NAME;

    /// Scripted standard input. The body ends at the first end-of-input and
    /// reading continues afterwards, as on a terminal.
    struct Script {
        lines: VecDeque<String>,
        body: Option<String>,
    }

    impl Script {
        fn new(before_body: &[&str], body: &str, after_body: &[&str]) -> Self {
            let mut lines: VecDeque<String> =
                before_body.iter().map(ToString::to_string).collect();
            lines.push_back(String::from("\u{0}body"));
            lines.extend(after_body.iter().map(ToString::to_string));
            Self {
                lines,
                body: Some(body.to_string()),
            }
        }
    }

    impl LineInput for Script {
        fn read_line(&mut self) -> io::Result<Option<String>> {
            match self.lines.front() {
                Some(marker) if marker == "\u{0}body" => Ok(None),
                _ => Ok(self.lines.pop_front()),
            }
        }

        fn read_rest(&mut self) -> io::Result<String> {
            if self.lines.front().is_some_and(|l| l == "\u{0}body") {
                self.lines.pop_front();
            }
            Ok(self.body.take().unwrap_or_default())
        }
    }

    struct Masked(Vec<MaskedInput>);

    impl MaskedLineReader for Masked {
        fn read_masked_line(&mut self, _prompt: &str) -> io::Result<MaskedInput> {
            Ok(self.0.remove(0))
        }
    }

    #[derive(Clone, Copy)]
    enum Behavior {
        Accept,
        RefuseLogin,
        Unreachable,
    }

    #[derive(Clone)]
    struct FakeMailer {
        behavior: Behavior,
        sent: Rc<RefCell<Vec<(OutgoingMessage, String)>>>,
    }

    impl FakeMailer {
        fn new(behavior: Behavior) -> Self {
            Self {
                behavior,
                sent: Rc::default(),
            }
        }
    }

    impl Mailer for FakeMailer {
        async fn send(
            &self,
            message: &OutgoingMessage,
            password: &Secret,
            progress: &mut dyn FnMut(SendStep),
        ) -> Result<(), SmtpError> {
            progress(SendStep::Connecting);
            if matches!(self.behavior, Behavior::Unreachable) {
                return Err(SmtpError::Connection("connection refused".into()));
            }
            progress(SendStep::Authenticating);
            if matches!(self.behavior, Behavior::RefuseLogin) {
                return Err(SmtpError::Authentication("535 not accepted".into()));
            }
            progress(SendStep::Sending);
            self.sent
                .borrow_mut()
                .push((message.clone(), password.expose().to_string()));
            Ok(())
        }
    }

    type TestApp = App<Script, Vec<u8>, Masked, FakeMailer>;

    fn app(
        dir: &tempfile::TempDir,
        settings: Settings,
        script: Script,
        masked: Vec<MaskedInput>,
        mailer: FakeMailer,
    ) -> TestApp {
        App::new(
            script,
            Vec::new(),
            Masked(masked),
            mailer,
            SettingsStore::new(dir.path().join(CONFIG_FILE_NAME)),
            settings,
            Platform::Posix,
        )
    }

    fn typed(password: &str) -> Vec<MaskedInput> {
        vec![MaskedInput::Completed(password.to_string())]
    }

    #[tokio::test]
    async fn first_run_sends_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let mailer = FakeMailer::new(Behavior::Accept);
        let script = Script::new(&["a@gmail.com", "b@example.com", "Hi"], "Hello\n", &["", "y"]);
        let mut app = app(
            &dir,
            Settings::default(),
            script,
            typed("app-pass-1234"),
            mailer.clone(),
        );

        assert_eq!(app.run().await.unwrap(), Outcome::Sent);

        let sent = mailer.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0.from, "a@gmail.com");
        assert_eq!(sent[0].0.to, "b@example.com");
        assert_eq!(sent[0].0.subject, "Hi");
        assert_eq!(sent[0].0.body, "Hello\n");
        assert_eq!(sent[0].1, "app-pass-1234");

        let path = dir.path().join(CONFIG_FILE_NAME);
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("a@gmail.com"));
        assert!(raw.contains("b@example.com"));
        assert!(!raw.contains("app-pass-1234"));

        let loaded = SettingsStore::new(&path).load();
        assert_eq!(
            loaded.sender_password.as_ref().map(Secret::expose),
            Some("app-pass-1234")
        );

        let out = String::from_utf8(app.into_output()).unwrap();
        assert!(out.starts_with("=== Quick Gmail Sender ===\n"));
        assert!(out.contains("Your Gmail address: "));
        assert!(out.contains("Email body (press Ctrl+D when done):"));
        assert!(out.contains(&format!("{}\nFrom: a@gmail.com\n", "=".repeat(50))));
        assert!(out.contains("Body: Hello\n"));
        assert!(out.contains("Connecting to smtp.gmail.com...\nLogging in...\nSending email...\n"));
        assert!(out.contains("✓ Email sent successfully to b@example.com"));
        assert!(out.contains(&format!("✓ Configuration saved to {}", path.display())));
    }

    #[tokio::test]
    async fn saved_defaults_are_offered() {
        let dir = tempfile::tempdir().unwrap();
        let saved = Settings {
            sender_email: "a@gmail.com".to_string(),
            recipient_email: "b@example.com".to_string(),
            sender_password: Some(Secret::new("app-pass-1234")),
            ..Settings::default()
        };
        let mailer = FakeMailer::new(Behavior::Accept);
        let script = Script::new(&["", "", "", "Status"], "All good", &["y", "n"]);
        let mut app = app(&dir, saved, script, Vec::new(), mailer.clone());

        assert_eq!(app.run().await.unwrap(), Outcome::Sent);

        let sent = mailer.sent.borrow();
        assert_eq!(sent[0].0.from, "a@gmail.com");
        assert_eq!(sent[0].0.to, "b@example.com");
        assert_eq!(sent[0].1, "app-pass-1234");

        let out = String::from_utf8(app.into_output()).unwrap();
        assert!(out.contains("Your Gmail address [a@gmail.com]: "));
        assert!(out.contains("Use saved App Password? (Y/n): "));
        assert!(out.contains("Recipient email [b@example.com]: "));
        assert!(out.contains("Settings unchanged."));
        assert!(!dir.path().join(CONFIG_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn save_failure_is_reported_once_and_run_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let mailer = FakeMailer::new(Behavior::Accept);
        let script = Script::new(&["a@gmail.com", "b@example.com", "Hi"], "Hello\n", &["", "y"]);
        let mut app = App::new(
            script,
            Vec::new(),
            Masked(typed("pw")),
            mailer,
            // A directory where the file should be.
            SettingsStore::new(dir.path()),
            Settings::default(),
            Platform::Posix,
        );

        assert_eq!(app.run().await.unwrap(), Outcome::Sent);

        let out = String::from_utf8(app.into_output()).unwrap();
        assert_eq!(out.matches("Could not save config file").count(), 1);
        assert!(out.contains("Warning: Could not save config file: "));
        assert!(!out.contains("✓ Configuration saved"));
    }

    #[tokio::test]
    async fn declining_saved_password_prompts_for_new_one() {
        let dir = tempfile::tempdir().unwrap();
        let saved = Settings {
            sender_email: "a@gmail.com".to_string(),
            sender_password: Some(Secret::new("old")),
            ..Settings::default()
        };
        let mailer = FakeMailer::new(Behavior::Accept);
        let script = Script::new(&["", "n", "b@example.com", "Hi"], "x", &["", "n"]);
        let mut app = app(&dir, saved, script, typed("new-pass"), mailer.clone());

        assert_eq!(app.run().await.unwrap(), Outcome::Sent);
        assert_eq!(mailer.sent.borrow()[0].1, "new-pass");
    }

    #[tokio::test]
    async fn cancel_at_password_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let mailer = FakeMailer::new(Behavior::Accept);
        let script = Script::new(&["a@gmail.com"], "", &[]);
        let mut app = app(
            &dir,
            Settings::default(),
            script,
            vec![MaskedInput::Cancelled],
            mailer.clone(),
        );

        let outcome = app.run().await.unwrap();

        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(outcome.exit_code(), ExitCode::from(130));
        assert!(mailer.sent.borrow().is_empty());
        let out = String::from_utf8(app.into_output()).unwrap();
        assert!(out.ends_with("Cancelled.\n"));
    }

    #[tokio::test]
    async fn declined_confirmation_does_not_send() {
        let dir = tempfile::tempdir().unwrap();
        let mailer = FakeMailer::new(Behavior::Accept);
        let script = Script::new(&["a@gmail.com", "b@example.com", "Hi"], "Hello\n", &["no"]);
        let mut app = app(
            &dir,
            Settings::default(),
            script,
            typed("pw"),
            mailer.clone(),
        );

        let outcome = app.run().await.unwrap();

        assert_eq!(outcome, Outcome::Declined);
        assert_eq!(outcome.exit_code(), ExitCode::SUCCESS);
        assert!(mailer.sent.borrow().is_empty());
    }

    #[tokio::test]
    async fn end_of_input_at_confirmation_does_not_send() {
        let dir = tempfile::tempdir().unwrap();
        let mailer = FakeMailer::new(Behavior::Accept);
        let script = Script::new(&["a@gmail.com", "b@example.com", "Hi"], "Hello\n", &[]);
        let mut app = app(
            &dir,
            Settings::default(),
            script,
            typed("pw"),
            mailer.clone(),
        );

        assert_eq!(app.run().await.unwrap(), Outcome::Declined);
        assert!(mailer.sent.borrow().is_empty());
    }

    #[tokio::test]
    async fn authentication_failure_shows_hint() {
        let dir = tempfile::tempdir().unwrap();
        let script = Script::new(&["a@gmail.com", "b@example.com", "Hi"], "Hello\n", &[""]);
        let mut app = app(
            &dir,
            Settings::default(),
            script,
            typed("wrong"),
            FakeMailer::new(Behavior::RefuseLogin),
        );

        let outcome = app.run().await.unwrap();

        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(outcome.exit_code(), ExitCode::FAILURE);
        let out = String::from_utf8(app.into_output()).unwrap();
        assert!(out.contains("✗ Authentication failed."));
        assert!(out.contains("https://myaccount.google.com/apppasswords"));
        assert!(!out.contains("Save these settings"));
        assert!(!dir.path().join(CONFIG_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn transport_failure_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let script = Script::new(&["a@gmail.com", "b@example.com", "Hi"], "Hello\n", &["y"]);
        let mut app = app(
            &dir,
            Settings::default(),
            script,
            typed("pw"),
            FakeMailer::new(Behavior::Unreachable),
        );

        assert_eq!(app.run().await.unwrap(), Outcome::Failed);
        let out = String::from_utf8(app.into_output()).unwrap();
        assert!(out.contains("✗ Error sending email: Connection failed: connection refused"));
        assert!(!out.contains("Logging in..."));
    }

    #[tokio::test]
    async fn long_body_preview_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let body = "x".repeat(150);
        let script = Script::new(&["a@gmail.com", "b@example.com", "Hi"], &body, &["n"]);
        let mut app = app(
            &dir,
            Settings::default(),
            script,
            typed("pw"),
            FakeMailer::new(Behavior::Accept),
        );

        app.run().await.unwrap();

        let out = String::from_utf8(app.into_output()).unwrap();
        assert!(out.contains(&format!("Body: {}...\n", "x".repeat(100))));
    }

    #[test]
    fn newline_trimming() {
        assert_eq!(trim_newline("abc\r\n".to_string()), "abc");
        assert_eq!(trim_newline("abc\n".to_string()), "abc");
        assert_eq!(trim_newline("abc".to_string()), "abc");
    }
}
