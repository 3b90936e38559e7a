//! Line editing for masked input.
//!
//! Independent of how raw bytes are obtained, so both terminal backends and
//! the tests share it.

use std::io::{self, Write};

/// Erases the last echoed character.
const ERASE: &[u8] = b"\x08 \x08";

/// Interrupt (Ctrl-C) in raw mode.
const INTERRUPT: u8 = 0x03;

/// What a raw input byte means to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Finish the line.
    Enter,
    /// Drop the last character.
    Backspace,
    /// Abort the read.
    Interrupt,
    /// Part of the typed text.
    Byte(u8),
}

/// Byte-to-key mapping of a terminal family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMap {
    backspace: &'static [u8],
}

impl KeyMap {
    /// POSIX terminals send DEL for the backspace key; some send BS.
    pub const POSIX: Self = Self {
        backspace: &[0x7f, 0x08],
    };

    /// The Windows console sends BS.
    pub const WINDOWS_CONSOLE: Self = Self {
        backspace: &[0x08],
    };

    /// Classifies one raw byte.
    #[must_use]
    pub fn classify(&self, byte: u8) -> Key {
        match byte {
            b'\r' | b'\n' => Key::Enter,
            INTERRUPT => Key::Interrupt,
            b if self.backspace.contains(&b) => Key::Backspace,
            b => Key::Byte(b),
        }
    }
}

/// Result of feeding one key to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Keep reading.
    Continue,
    /// Enter was pressed.
    Finished,
    /// Interrupt was pressed.
    Interrupted,
}

/// Text typed so far, echoed as one `*` per character.
#[derive(Debug, Default)]
pub struct MaskedLine {
    text: String,
    /// Bytes of a UTF-8 sequence that is not complete yet.
    pending: Vec<u8>,
}

impl MaskedLine {
    /// Creates an empty line.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one key, writing the echo to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing the echo fails.
    pub fn feed<W: Write + ?Sized>(&mut self, key: Key, out: &mut W) -> io::Result<Step> {
        match key {
            Key::Enter => {
                self.pending.clear();
                out.write_all(b"\r\n")?;
                Ok(Step::Finished)
            }
            Key::Interrupt => {
                out.write_all(b"\r\n")?;
                Ok(Step::Interrupted)
            }
            Key::Backspace => {
                if !self.pending.is_empty() {
                    self.pending.clear();
                } else if self.text.pop().is_some() {
                    out.write_all(ERASE)?;
                }
                Ok(Step::Continue)
            }
            Key::Byte(byte) => {
                if self.push_byte(byte) {
                    out.write_all(b"*")?;
                }
                Ok(Step::Continue)
            }
        }
    }

    /// Number of characters (and asterisks on screen).
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Returns true if nothing has been typed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns the typed text.
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }

    /// Adds a byte, returning true when it completed a character.
    ///
    /// Control bytes are ignored and invalid UTF-8 is dropped.
    fn push_byte(&mut self, byte: u8) -> bool {
        if self.pending.is_empty() && (byte < 0x20 || byte == 0x7f) {
            return false;
        }

        self.pending.push(byte);
        match std::str::from_utf8(&self.pending) {
            Ok(ch) => {
                self.text.push_str(ch);
                self.pending.clear();
                true
            }
            // Incomplete sequence: wait for more bytes.
            Err(e) if e.error_len().is_none() => false,
            Err(_) => {
                self.pending.clear();
                // The byte that broke the sequence may start a new one.
                if byte.is_ascii() || (0xc2..=0xf4).contains(&byte) {
                    self.push_byte(byte)
                } else {
                    false
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(keys: &[u8], map: KeyMap) -> (MaskedLine, Vec<u8>, Step) {
        let mut line = MaskedLine::new();
        let mut out = Vec::new();
        let mut last = Step::Continue;
        for &b in keys {
            last = line.feed(map.classify(b), &mut out).unwrap_or(Step::Interrupted);
            if last != Step::Continue {
                break;
            }
        }
        (line, out, last)
    }

    fn asterisks_on_screen(out: &[u8]) -> usize {
        let stars = out.iter().filter(|&&b| b == b'*').count();
        let erased = out.windows(ERASE.len()).filter(|w| *w == ERASE).count();
        stars - erased
    }

    #[test]
    fn echoes_one_asterisk_per_character() {
        let (line, out, step) = run(b"secret\r", KeyMap::POSIX);
        assert_eq!(step, Step::Finished);
        assert_eq!(out, b"******\r\n");
        assert_eq!(line.into_text(), "secret");
    }

    #[test]
    fn asterisks_track_buffer_at_every_step() {
        let keys = b"ab\x7fcd\x7f\x7f\x7fxyz\x08";
        let mut line = MaskedLine::new();
        let mut out = Vec::new();
        for &b in keys {
            line.feed(KeyMap::POSIX.classify(b), &mut out).unwrap_or(Step::Interrupted);
            assert_eq!(asterisks_on_screen(&out), line.len());
        }
        assert_eq!(line.into_text(), "xy");
    }

    #[test]
    fn backspace_on_empty_is_noop() {
        let (line, out, _) = run(b"\x7f\x7f", KeyMap::POSIX);
        assert!(line.is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn windows_backspace_is_bs_only() {
        let (line, _, _) = run(b"ab\x08c\r", KeyMap::WINDOWS_CONSOLE);
        assert_eq!(line.into_text(), "ac");

        // DEL is an ignored control byte on the console.
        let (line, _, _) = run(b"ab\x7fc\r", KeyMap::WINDOWS_CONSOLE);
        assert_eq!(line.into_text(), "abc");
    }

    #[test]
    fn interrupt_stops_reading() {
        let (line, out, step) = run(b"ab\x03cd", KeyMap::POSIX);
        assert_eq!(step, Step::Interrupted);
        assert_eq!(out, b"**\r\n");
        assert_eq!(line.len(), 2);
    }

    #[test]
    fn multibyte_character_is_one_asterisk() {
        let (line, out, _) = run("pä密\n".as_bytes(), KeyMap::POSIX);
        assert_eq!(out, b"***\r\n");
        assert_eq!(line.into_text(), "pä密");
    }

    #[test]
    fn backspace_removes_whole_multibyte_character() {
        let (line, _, _) = run("aé\x7f\r".as_bytes(), KeyMap::POSIX);
        assert_eq!(line.into_text(), "a");
    }

    #[test]
    fn invalid_bytes_are_dropped() {
        // Stray continuation byte, then a lead byte cut short by ASCII.
        let (line, out, _) = run(b"a\x80b\xe2c\r", KeyMap::POSIX);
        assert_eq!(line.into_text(), "abc");
        assert_eq!(out, b"***\r\n");
    }

    #[test]
    fn control_bytes_are_ignored() {
        let (line, _, _) = run(b"a\x1b\x01b\t\r", KeyMap::POSIX);
        assert_eq!(line.into_text(), "ab");
    }
}
