//! Raw-mode terminal session for the wizard, restored on drop or panic.

use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

/// Holds the terminal in raw mode on the alternate screen until dropped.
pub struct TerminalGuard {
    active: AtomicBool,
}

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        execute!(io::stdout(), EnterAlternateScreen)
            .context("Failed to enter alternate screen")?;
        Ok(Self {
            active: AtomicBool::new(true),
        })
    }

    /// Leave raw mode early, e.g. before printing the exit message
    pub fn release(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            Self::restore();
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Best-effort restore; errors are ignored since the terminal may already be gone
    pub fn restore() {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        let _ = io::stdout().flush();
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// Restore the terminal before the default panic output
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        TerminalGuard::restore();
        previous(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_only_once() {
        let guard = TerminalGuard {
            active: AtomicBool::new(true),
        };
        guard.release();
        assert!(!guard.is_active());
        // Second release and the drop are no-ops
        guard.release();
        drop(guard);
    }

    #[test]
    fn test_inactive_guard_drops_quietly() {
        let guard = TerminalGuard {
            active: AtomicBool::new(false),
        };
        assert!(!guard.is_active());
        drop(guard);
    }
}
