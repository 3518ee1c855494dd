//! sinks — where iteration records go.
//!
//! Purpose
//! -------
//! Keep instrumentation out of the driver loop. The driver builds one
//! [`Datum`] per completed iteration and hands it to three kinds of
//! collaborator, in this order:
//!
//! 1. every registered [`Callback`],
//! 2. the optional [`DisplaySink`],
//! 3. the optional [`StorageSink`].
//!
//! Key behaviors
//! -------------
//! - A display sink brackets a run with [`DisplaySink::start`] and
//!   [`DisplaySink::cleanup`], and sets the runtime batch size through
//!   [`DisplaySink::every`].
//! - Every sink method is fallible. An error aborts the remaining fan-out for
//!   that iteration and the run itself.
//!
//! Built-ins
//! ---------
//! - [`Ascii`]: tabular progress on any `std::io::Write`.
//! - [`List`]: retains every record for later inspection.
//! - `SlogDisplay` (feature `obs_slog`): structured progress through `slog`.
use crate::optimization::{descent::traits::Datum, errors::OptResult};

pub mod ascii;
pub mod list;
#[cfg(feature = "obs_slog")]
pub mod slog_display;

pub use self::ascii::Ascii;
pub use self::list::List;
#[cfg(feature = "obs_slog")]
pub use self::slog_display::SlogDisplay;

/// Progress reporting for a run.
pub trait DisplaySink {
    /// Called once at the start of every `run`.
    fn start(&mut self) -> OptResult<()> {
        Ok(())
    }

    /// Called once per completed iteration.
    fn invoke(&mut self, datum: &Datum) -> OptResult<()>;

    /// Called once after the loop exits normally or by interruption.
    ///
    /// `last` is `None` when the run completed no iteration. `runtimes` is
    /// the full history since the last reset.
    fn cleanup(
        &mut self, _last: Option<&Datum>, _runtimes: &[f64], _exit_message: Option<&str>,
    ) -> OptResult<()> {
        Ok(())
    }

    /// Number of iterations each reported runtime covers.
    fn every(&self) -> usize {
        1
    }
}

/// Retention of iteration records.
pub trait StorageSink {
    fn invoke(&mut self, datum: &Datum) -> OptResult<()>;
}

/// User hook run with every record before the display and storage sinks.
pub type Callback = Box<dyn FnMut(&Datum) -> OptResult<()>>;
