//! Ctrl-C handling around the interactive prompts.
//!
//! The terminal reads keys in raw mode and re-raises `SIGINT` itself when it
//! sees Ctrl-C. With the default disposition that kills the process before the
//! prompt can report the interrupt, so a handler is installed that lets the
//! signal through only while a prompt is active. Outside a prompt an interrupt
//! still ends the process, with [`INTERRUPTED_EXIT_CODE`].

use std::sync::atomic::{AtomicU8, Ordering};

/// Exit status used when interrupted outside a prompt (128 + SIGINT).
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

const IDLE: u8 = 0;
const PROMPTING: u8 = 1;
const CANCELLED: u8 = 2;

static STATE: AtomicU8 = AtomicU8::new(IDLE);

/// Install the process-wide Ctrl-C handler. Calling it again is a no-op.
pub fn install_handler() -> Result<(), ctrlc::Error> {
    let installed = ctrlc::set_handler(|| {
        if STATE.load(Ordering::SeqCst) == IDLE {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
    match installed {
        Ok(()) | Err(ctrlc::Error::MultipleHandlers) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Marks a prompt session; interrupts are left to the prompt while it lives.
#[must_use]
#[derive(Debug)]
pub struct PromptScope {
    _private: (),
}

impl PromptScope {
    pub fn enter() -> Self {
        let _ = STATE.compare_exchange(IDLE, PROMPTING, Ordering::SeqCst, Ordering::SeqCst);
        PromptScope { _private: () }
    }

    /// The session was cancelled and the run is unwinding.
    ///
    /// The handler may see the interrupt after the scope is gone, so the
    /// process stays in the cancelled state instead of going back to idle.
    pub fn cancel(self) {
        STATE.store(CANCELLED, Ordering::SeqCst);
    }
}

impl Drop for PromptScope {
    fn drop(&mut self) {
        let _ = STATE.compare_exchange(PROMPTING, IDLE, Ordering::SeqCst, Ordering::SeqCst);
    }
}
