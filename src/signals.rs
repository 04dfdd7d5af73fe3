//! Interrupt handling for the interactive shell
//!
//! Ctrl-C while a foreground job runs is delivered to the whole terminal
//! process group. The children restore the default disposition when they
//! exec and die; the shell only records that the interrupt happened and
//! carries on to the next prompt.

use std::sync::atomic::{AtomicBool, Ordering};

/// Set by the handler, cleared by [`take_interrupt`]
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Install the SIGINT handler. Only the first call in a process succeeds.
pub fn install_interrupt_guard() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        INTERRUPTED.store(true, Ordering::SeqCst);
    })
}

/// Check whether an interrupt arrived since the last call, and clear the flag
pub fn take_interrupt() -> bool {
    INTERRUPTED.swap(false, Ordering::SeqCst)
}
