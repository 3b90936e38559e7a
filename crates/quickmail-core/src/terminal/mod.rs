//! Masked password entry.
//!
//! [`MaskedReader`] prints a prompt, switches the terminal to raw mode, echoes
//! `*` for each character typed and restores the terminal on every exit path.
//! The raw-mode mechanism is a [`RawMode`] strategy chosen from a
//! [`Platform`] value computed once at startup.

mod mask;
#[cfg(unix)]
#[allow(unsafe_code)]
mod unix;
#[cfg(windows)]
#[allow(unsafe_code)]
mod windows;

use std::io::{self, IsTerminal, Read, Write};

use tracing::{debug, warn};

pub use mask::{Key, KeyMap, MaskedLine, Step};

/// Outcome of a masked read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskedInput {
    /// Enter was pressed (or input ended); holds the typed text.
    Completed(String),
    /// The user pressed Ctrl-C.
    Cancelled,
}

/// Reads a line without showing what is typed.
pub trait MaskedLineReader {
    /// Prints `prompt` and reads one masked line.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be switched to raw mode or an
    /// I/O operation fails. Cancellation is not an error.
    fn read_masked_line(&mut self, prompt: &str) -> io::Result<MaskedInput>;
}

/// Switches a terminal into raw mode and back.
pub trait RawMode {
    /// Saves the current mode and enters raw mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal refuses the mode change.
    fn enable(&mut self) -> io::Result<()>;

    /// Restores the mode saved by [`RawMode::enable`]. A no-op if nothing
    /// was saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal refuses the mode change.
    fn restore(&mut self) -> io::Result<()>;
}

/// Raw mode for input that is not a terminal: nothing to switch.
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl RawMode for Passthrough {
    fn enable(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn restore(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Restores the terminal when dropped.
struct RawModeGuard<'a> {
    mode: &'a mut dyn RawMode,
}

impl<'a> RawModeGuard<'a> {
    fn enable(mode: &'a mut dyn RawMode) -> io::Result<Self> {
        mode.enable()?;
        Ok(Self { mode })
    }
}

impl Drop for RawModeGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.mode.restore() {
            warn!("Failed to restore terminal mode: {e}");
        }
    }
}

/// Terminal family, detected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Unix-like terminal driven through termios.
    Posix,
    /// Windows console.
    WindowsConsole,
}

impl Platform {
    /// Detects the platform the binary was built for.
    #[must_use]
    pub const fn detect() -> Self {
        if cfg!(windows) {
            Self::WindowsConsole
        } else {
            Self::Posix
        }
    }

    /// Byte-to-key mapping for this terminal family.
    #[must_use]
    pub const fn key_map(self) -> KeyMap {
        match self {
            Self::Posix => KeyMap::POSIX,
            Self::WindowsConsole => KeyMap::WINDOWS_CONSOLE,
        }
    }

    /// Key combination that ends multi-line input on this platform.
    #[must_use]
    pub const fn end_of_input_hint(self) -> &'static str {
        match self {
            Self::Posix => "Ctrl+D",
            Self::WindowsConsole => "Ctrl+Z then Enter",
        }
    }

    /// Raw-mode strategy for standard input.
    fn stdin_raw_mode(self) -> Box<dyn RawMode> {
        match self {
            #[cfg(unix)]
            Self::Posix => Box::new(unix::Termios::stdin()),
            #[cfg(windows)]
            Self::WindowsConsole => Box::new(windows::Console::stdin()),
            _ => Box::new(Passthrough),
        }
    }
}

/// Masked line reader over any byte source and echo sink.
pub struct MaskedReader<R, W> {
    raw_mode: Box<dyn RawMode>,
    keys: KeyMap,
    input: R,
    output: W,
}

impl<R: Read, W: Write> MaskedReader<R, W> {
    /// Creates a reader from its parts.
    pub fn new(raw_mode: Box<dyn RawMode>, keys: KeyMap, input: R, output: W) -> Self {
        Self {
            raw_mode,
            keys,
            input,
            output,
        }
    }

    /// Consumes the reader, returning the echo sink.
    pub fn into_output(self) -> W {
        self.output
    }
}

impl MaskedReader<io::Stdin, io::Stdout> {
    /// Reader over the process's standard input and output.
    ///
    /// Raw mode is only entered when standard input is a terminal; piped
    /// input is read byte by byte with the same masking.
    #[must_use]
    pub fn stdio(platform: Platform) -> Self {
        let stdin = io::stdin();
        let raw_mode = if stdin.is_terminal() {
            platform.stdin_raw_mode()
        } else {
            debug!("stdin is not a terminal; reading password without raw mode");
            Box::new(Passthrough)
        };
        Self::new(raw_mode, platform.key_map(), stdin, io::stdout())
    }
}

impl<R: Read, W: Write> MaskedLineReader for MaskedReader<R, W> {
    fn read_masked_line(&mut self, prompt: &str) -> io::Result<MaskedInput> {
        self.output.write_all(prompt.as_bytes())?;
        self.output.flush()?;

        let _guard = RawModeGuard::enable(self.raw_mode.as_mut())?;
        let mut line = MaskedLine::new();
        let mut byte = [0u8; 1];

        loop {
            let key = match self.input.read(&mut byte) {
                Ok(0) => Key::Enter,
                Ok(_) => self.keys.classify(byte[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            let step = line.feed(key, &mut self.output)?;
            self.output.flush()?;
            match step {
                Step::Continue => {}
                Step::Finished => return Ok(MaskedInput::Completed(line.into_text())),
                Step::Interrupted => return Ok(MaskedInput::Cancelled),
            }
        }
    }
}
