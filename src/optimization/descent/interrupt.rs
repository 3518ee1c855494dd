//! Cooperative interruption of a running driver.
//!
//! An [`Interrupt`] is a cloneable handle to one shared flag. Any holder can
//! raise it: a callback, another thread, or the optional Ctrl-C handler. The
//! driver consumes the flag at the top of each iteration and again after its
//! fan-out, so a raised flag always stops the loop between two completed
//! iterations and never carries over into a later run.
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

#[cfg(feature = "ctrlc")]
use crate::optimization::errors::{OptError, OptResult};

/// Cloneable handle to a shared stop flag.
///
/// Clones observe and raise the same flag.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    /// Fresh, lowered flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the driver stop after its current iteration.
    pub fn raise(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether the flag is currently raised.
    pub fn is_raised(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clear the flag, returning whether it was raised.
    pub fn take(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }

    /// Lower the flag without reading it.
    pub fn clear(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    /// Raise this handle whenever the process receives Ctrl-C.
    ///
    /// # Errors
    /// [`OptError::InterruptHandler`] if a handler is already installed or the
    /// platform refuses the registration.
    #[cfg(feature = "ctrlc")]
    pub fn install_ctrlc(&self) -> OptResult<()> {
        let handle = self.clone();
        ctrlc::set_handler(move || handle.raise())
            .map_err(|e| OptError::InterruptHandler { text: e.to_string() })
    }
}
