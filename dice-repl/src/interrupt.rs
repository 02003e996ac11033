//! Ctrl-C handling.
//!
//! While a generation run is in progress, Ctrl-C cancels it: configurations already being
//! searched are finished and stored, the rest are left alone. At any other time Ctrl-C ends the
//! program as usual. At the interactive prompt the line editor reads Ctrl-C as a key, so this
//! only matters while a command runs or in batch mode.

use dice_solver::database::CancelToken;
use std::{
    io,
    process,
    sync::{Arc, Mutex, PoisonError},
    thread,
};
use tracing::warn;

/// The exit code of a process ended by Ctrl-C.
const INTERRUPTED: i32 = 130;

/// The generation run that Ctrl-C would cancel, if any.
#[derive(Debug, Clone, Default)]
pub struct Interrupts(Arc<Mutex<Option<CancelToken>>>);

/// Unregisters its run when dropped.
pub struct Running<'a> {
    interrupts: &'a Interrupts,
    pub token: CancelToken,
}

impl Drop for Running<'_> {
    fn drop(&mut self) {
        *self.interrupts.slot() = None;
    }
}

impl Interrupts {
    fn slot(&self) -> std::sync::MutexGuard<'_, Option<CancelToken>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new run. Ctrl-C cancels its token until the returned guard is dropped.
    pub fn begin(&self) -> Running<'_> {
        let token = CancelToken::new();
        *self.slot() = Some(token.clone());
        Running { interrupts: self, token }
    }

    /// Cancels the registered run. Returns false if there is none.
    pub fn interrupt(&self) -> bool {
        match &*self.slot() {
            Some(token) => {
                token.cancel();
                true
            },
            None => false,
        }
    }

    /// Starts a thread that waits for Ctrl-C for the rest of the program.
    pub fn listen(&self) -> io::Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let interrupts = self.clone();

        thread::Builder::new()
            .name("interrupts".to_owned())
            .spawn(move || runtime.block_on(async {
                while tokio::signal::ctrl_c().await.is_ok() {
                    if interrupts.interrupt() {
                        warn!("interrupted; finishing the configurations in progress");
                    } else {
                        process::exit(INTERRUPTED);
                    }
                }
            }))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_to_cancel() {
        assert!(!Interrupts::default().interrupt());
    }

    #[test]
    fn cancels_the_running_generation() {
        let interrupts = Interrupts::default();
        let running = interrupts.begin();
        assert!(!running.token.is_cancelled());

        assert!(interrupts.interrupt());
        assert!(running.token.is_cancelled());
    }

    #[test]
    fn finished_generation_is_forgotten() {
        let interrupts = Interrupts::default();
        let token = {
            let running = interrupts.begin();
            running.token.clone()
        };

        assert!(!interrupts.interrupt());
        assert!(!token.is_cancelled());
    }
}
