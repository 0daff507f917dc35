//! Terminal session lifecycle: alternate screen, hidden cursor, and the one
//! teardown path every exit goes through.
//!
//! Exit paths (normal completion, an "Exit" choice, Ctrl-C, SIGINT/SIGTERM/
//! SIGHUP, panic) all funnel into the same one-shot restore guarded by
//! [`SessionState`]. Whoever claims the flag first restores the terminal and
//! prints the farewell; later callers do nothing.
//!
//! The signal handler cannot take locks or allocate, so it restores the
//! termios captured at `begin_session` with `tcsetattr`, writes the
//! pre-encoded escape sequences with `write(2)`, and calls `_exit`.

use std::io::{self, Write};
use std::mem::MaybeUninit;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::cursor::{Hide, Show};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use tracing::{debug, info, warn};

/// Printed on the normal screen when no other message is given.
pub const DEFAULT_FAREWELL: &str = "Goodbye! o/";

/// `Show` followed by `LeaveAlternateScreen`, pre-encoded for the signal handler.
const RESTORE_SEQUENCE: &[u8] = b"\x1b[?25h\x1b[?1049l";

// ============================================================================
// SESSION STATE
// ============================================================================

/// Whether the terminal is currently switched to alternate screen mode.
///
/// Teardown is a one-shot claim on this flag, so it is safe to attempt from
/// the main thread, a signal handler and a panic hook at once.
#[derive(Debug)]
pub struct SessionState {
    active: AtomicBool,
}

impl SessionState {
    pub const fn new() -> Self {
        SessionState {
            active: AtomicBool::new(false),
        }
    }

    /// Mark the session active. Returns false if it already was.
    pub fn activate(&self) -> bool {
        !self.active.swap(true, Ordering::SeqCst)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Take the right to tear down. True for exactly one caller per activation.
    fn claim(&self) -> bool {
        self.active.swap(false, Ordering::SeqCst)
    }

    /// Show the cursor, leave the alternate screen, print `farewell`.
    ///
    /// Returns false (and writes nothing) if the session was not active or
    /// has already been restored. An empty farewell prints nothing.
    pub fn restore<W: Write>(&self, out: &mut W, farewell: &str) -> io::Result<bool> {
        if !self.claim() {
            return Ok(false);
        }
        queue!(out, Show, LeaveAlternateScreen)?;
        if !farewell.is_empty() {
            writeln!(out, "{}", farewell)?;
        }
        out.flush()?;
        Ok(true)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

static SESSION: SessionState = SessionState::new();

/// Cooked-mode terminal settings captured before anything changed them.
static SAVED_TERMIOS: OnceLock<libc::termios> = OnceLock::new();

// ============================================================================
// LIFECYCLE
// ============================================================================

/// Switch to the alternate screen, hide the cursor, and arm the signal and
/// panic handlers that guarantee restoration.
pub fn begin_session() -> io::Result<()> {
    save_termios();

    if !SESSION.activate() {
        debug!("terminal session already active");
        return Ok(());
    }

    install_signal_handlers()?;
    install_panic_hook();

    execute!(io::stdout(), EnterAlternateScreen, Hide)?;
    info!("terminal session started");
    Ok(())
}

/// Restore the terminal, print `farewell` (or [`DEFAULT_FAREWELL`]), and
/// exit with status 0.
pub fn end_session(farewell: Option<&str>) -> ! {
    teardown(farewell.unwrap_or(DEFAULT_FAREWELL));
    std::process::exit(0)
}

/// Idempotent restore without exiting. Returns true if this call did the work.
pub fn teardown(farewell: &str) -> bool {
    if SESSION.is_active() {
        restore_termios();
    }
    match SESSION.restore(&mut io::stdout(), farewell) {
        Ok(true) => {
            info!("terminal session restored");
            true
        }
        Ok(false) => {
            debug!("terminal session already restored");
            false
        }
        Err(e) => {
            warn!(error = %e, "terminal restore failed");
            false
        }
    }
}

// ============================================================================
// TERMIOS
// ============================================================================

fn save_termios() {
    let mut termios = MaybeUninit::<libc::termios>::uninit();
    // SAFETY: tcgetattr fully initializes the struct when it returns 0.
    let rc = unsafe { libc::tcgetattr(libc::STDIN_FILENO, termios.as_mut_ptr()) };
    if rc == 0 {
        // SAFETY: rc == 0 above.
        let termios = unsafe { termios.assume_init() };
        let _ = SAVED_TERMIOS.set(termios);
    } else {
        debug!("stdin is not a terminal; termios not saved");
    }
}

/// Async-signal-safe.
fn restore_termios() {
    if let Some(termios) = SAVED_TERMIOS.get() {
        // SAFETY: termios came from a successful tcgetattr on the same fd.
        unsafe {
            libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, termios);
        }
    }
}

// ============================================================================
// SIGNALS AND PANICS
// ============================================================================

extern "C" fn on_signal(_signal: libc::c_int) {
    if !SESSION.claim() {
        // Main thread is already tearing down and will exit on its own
        return;
    }
    restore_termios();
    write_raw(RESTORE_SEQUENCE);
    write_raw(DEFAULT_FAREWELL.as_bytes());
    write_raw(b"\n");
    // SAFETY: _exit is async-signal-safe and skips atexit handlers.
    unsafe { libc::_exit(0) }
}

/// Unbuffered write to stdout for use inside the signal handler.
fn write_raw(bytes: &[u8]) {
    let mut rest = bytes;
    while !rest.is_empty() {
        // SAFETY: pointer and length describe a live slice.
        let n = unsafe { libc::write(libc::STDOUT_FILENO, rest.as_ptr().cast(), rest.len()) };
        if n <= 0 {
            break;
        }
        rest = &rest[n as usize..];
    }
}

fn install_signal_handlers() -> io::Result<()> {
    let handler = on_signal as extern "C" fn(libc::c_int);
    for signal in [libc::SIGINT, libc::SIGTERM, libc::SIGHUP] {
        // SAFETY: a zeroed sigaction is a valid starting point; the handler
        // only makes async-signal-safe calls.
        unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction = handler as libc::sighandler_t;
            libc::sigemptyset(&mut action.sa_mask);
            if libc::sigaction(signal, &action, std::ptr::null_mut()) != 0 {
                return Err(io::Error::last_os_error());
            }
        }
    }
    debug!("signal handlers installed");
    Ok(())
}

/// Restore the terminal before the default hook prints the panic, so the
/// message lands on the normal screen.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = crossterm::terminal::disable_raw_mode();
        teardown("");
        original_hook(panic_info);
    }));
}

// ============================================================================
// TESTS
// ============================================================================
