//! Windows console raw mode.

use std::io;

use windows_sys::Win32::Foundation::{HANDLE, INVALID_HANDLE_VALUE};
use windows_sys::Win32::System::Console::{
    CONSOLE_MODE, ENABLE_ECHO_INPUT, ENABLE_LINE_INPUT, ENABLE_PROCESSED_INPUT, GetConsoleMode,
    GetStdHandle, STD_INPUT_HANDLE, SetConsoleMode,
};

use super::RawMode;

/// Raw mode for the console input buffer.
pub struct Console {
    saved: Option<(HANDLE, CONSOLE_MODE)>,
}

impl Console {
    /// Raw mode for standard input.
    pub const fn stdin() -> Self {
        Self { saved: None }
    }
}

impl RawMode for Console {
    fn enable(&mut self) -> io::Result<()> {
        // SAFETY: GetStdHandle has no preconditions.
        let handle = unsafe { GetStdHandle(STD_INPUT_HANDLE) };
        if handle == INVALID_HANDLE_VALUE || handle == 0 {
            return Err(io::Error::last_os_error());
        }

        let mut original: CONSOLE_MODE = 0;
        // SAFETY: `original` is a valid out-pointer.
        if unsafe { GetConsoleMode(handle, &mut original) } == 0 {
            return Err(io::Error::last_os_error());
        }

        // Ctrl-C arrives as 0x03 once processed input is off.
        let raw = original & !(ENABLE_LINE_INPUT | ENABLE_ECHO_INPUT | ENABLE_PROCESSED_INPUT);
        // SAFETY: `handle` is a console input handle.
        if unsafe { SetConsoleMode(handle, raw) } == 0 {
            return Err(io::Error::last_os_error());
        }

        self.saved = Some((handle, original));
        Ok(())
    }

    fn restore(&mut self) -> io::Result<()> {
        let Some((handle, original)) = self.saved.take() else {
            return Ok(());
        };
        // SAFETY: `handle` and `original` came from GetConsoleMode.
        if unsafe { SetConsoleMode(handle, original) } == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
