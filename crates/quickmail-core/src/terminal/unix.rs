//! termios raw mode.

use std::io;
use std::mem::MaybeUninit;
use std::os::fd::RawFd;

use super::RawMode;

/// Raw mode for a terminal file descriptor.
pub struct Termios {
    fd: RawFd,
    saved: Option<libc::termios>,
}

impl Termios {
    /// Raw mode for standard input.
    pub const fn stdin() -> Self {
        Self {
            fd: libc::STDIN_FILENO,
            saved: None,
        }
    }
}

impl RawMode for Termios {
    fn enable(&mut self) -> io::Result<()> {
        let mut original = MaybeUninit::<libc::termios>::uninit();
        // SAFETY: `original` is a valid out-pointer for tcgetattr.
        if unsafe { libc::tcgetattr(self.fd, original.as_mut_ptr()) } != 0 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: tcgetattr succeeded and filled the struct.
        let original = unsafe { original.assume_init() };

        let mut raw = original;
        // SAFETY: `raw` is an initialized termios.
        unsafe { libc::cfmakeraw(&mut raw) };
        // SAFETY: `raw` is an initialized termios.
        if unsafe { libc::tcsetattr(self.fd, libc::TCSANOW, &raw) } != 0 {
            return Err(io::Error::last_os_error());
        }

        self.saved = Some(original);
        Ok(())
    }

    fn restore(&mut self) -> io::Result<()> {
        let Some(original) = self.saved.take() else {
            return Ok(());
        };
        // SAFETY: `original` came from tcgetattr on the same descriptor.
        if unsafe { libc::tcsetattr(self.fd, libc::TCSADRAIN, &original) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
