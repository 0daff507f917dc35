//! Raw byte input for the menu.
//!
//! `ByteSource` is the seam between the decoder loop and the terminal.
//! The real implementation reads file descriptor 0 directly with
//! `poll(2)` + `read(2)`: `std::io::Stdin` buffers internally, which would
//! hide already-arrived bytes from `poll` and break the escape timeout.

use std::io;
use std::os::fd::RawFd;
use std::time::Duration;

use crossterm::terminal;

/// Source of single input bytes.
pub trait ByteSource {
    /// Block until one byte arrives. `Ok(None)` means end of input.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Wait at most `timeout` for one byte. `Ok(None)` means nothing
    /// arrived in time (or end of input).
    fn read_byte_timeout(&mut self, timeout: Duration) -> io::Result<Option<u8>>;
}

// ============================================================================
// STDIN
// ============================================================================

/// Unbuffered standard input.
#[derive(Debug)]
pub struct StdinBytes {
    fd: RawFd,
}

impl StdinBytes {
    pub fn new() -> Self {
        StdinBytes {
            fd: libc::STDIN_FILENO,
        }
    }

    /// Wait until the descriptor is readable. Negative timeout waits forever.
    fn wait_readable(&self, timeout_ms: libc::c_int) -> io::Result<bool> {
        let mut pfd = libc::pollfd {
            fd: self.fd,
            events: libc::POLLIN,
            revents: 0,
        };
        loop {
            // SAFETY: pfd is a valid pollfd and we pass a count of 1.
            let rc = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
            if rc < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }
            return Ok(rc > 0);
        }
    }

    fn read_one(&self) -> io::Result<Option<u8>> {
        let mut byte = 0u8;
        loop {
            // SAFETY: reading at most one byte into a valid one-byte buffer.
            let n = unsafe { libc::read(self.fd, (&mut byte as *mut u8).cast(), 1) };
            if n < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }
            return Ok(if n == 0 { None } else { Some(byte) });
        }
    }
}

impl Default for StdinBytes {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteSource for StdinBytes {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.read_one()
    }

    fn read_byte_timeout(&mut self, timeout: Duration) -> io::Result<Option<u8>> {
        let ms = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;
        if self.wait_readable(ms)? {
            self.read_one()
        } else {
            Ok(None)
        }
    }
}

// ============================================================================
// RAW MODE
// ============================================================================

/// Raw mode for the lifetime of the guard: no line buffering, no echo,
/// no signal keys. Restored on drop, including during unwinding.
#[derive(Debug)]
pub struct RawMode {
    _private: (),
}

impl RawMode {
    pub fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawMode { _private: () })
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        // Best-effort: nothing useful to do with a failure here
        let _ = terminal::disable_raw_mode();
    }
}

// ============================================================================
// SCRIPTED SOURCE (tests)
// ============================================================================

/// One element of a scripted input stream.
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scripted {
    Byte(u8),
    /// Models the user pausing longer than any bounded wait.
    Pause,
}

/// Deterministic byte source: bytes are available immediately, `Pause`
/// makes the next bounded read time out. Blocking reads skip pauses.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedBytes {
    items: std::collections::VecDeque<Scripted>,
    pub blocking_reads: usize,
    pub bounded_reads: usize,
}

#[cfg(test)]
impl ScriptedBytes {
    pub fn new(items: impl IntoIterator<Item = Scripted>) -> Self {
        ScriptedBytes {
            items: items.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Raw bytes with no pauses between them.
    pub fn bytes(bytes: &[u8]) -> Self {
        Self::new(bytes.iter().map(|&b| Scripted::Byte(b)))
    }

    pub fn remaining(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
impl ByteSource for ScriptedBytes {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.blocking_reads += 1;
        while let Some(item) = self.items.pop_front() {
            if let Scripted::Byte(b) = item {
                return Ok(Some(b));
            }
        }
        Ok(None)
    }

    fn read_byte_timeout(&mut self, _timeout: Duration) -> io::Result<Option<u8>> {
        self.bounded_reads += 1;
        match self.items.pop_front() {
            Some(Scripted::Byte(b)) => Ok(Some(b)),
            Some(Scripted::Pause) | None => Ok(None),
        }
    }
}
