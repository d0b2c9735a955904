//! Ctrl-C during a prompt must reach the prompt instead of ending the process.
//!
//! Kept in its own test binary: the handler and its state are process-wide.

#![cfg(unix)]

use std::process::Command;
use std::thread;
use std::time::Duration;

use stencil_cli::interrupt::{PromptScope, install_handler};

fn send_sigint_to_self() {
    let status = Command::new("kill")
        .args(["-INT", &std::process::id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());
    // Let the handler thread run before checking we survived.
    thread::sleep(Duration::from_millis(300));
}

#[test]
fn interrupt_during_prompt_and_after_cancel_keeps_running() {
    install_handler().unwrap();
    // Installing twice is fine.
    install_handler().unwrap();

    let scope = PromptScope::enter();
    send_sigint_to_self();

    // The prompt reports the interrupt as a cancel; late signals are ignored too.
    scope.cancel();
    send_sigint_to_self();
}
