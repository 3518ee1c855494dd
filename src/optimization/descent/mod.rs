//! descent — the driver loop and everything it needs around the rules.
//!
//! Purpose
//! -------
//! Run any [`UpdateRule`](crate::optimization::rules::UpdateRule) against a
//! user objective, one iteration at a time, with timing, interruption, and
//! pluggable instrumentation.
//!
//! Key behaviors
//! -------------
//! - [`Objective`] is the user contract over natural-shape [`Params`];
//!   [`wrap`] turns it into a flat [`FlatProblem`] (argmin `CostFunction` +
//!   `Gradient`), finite-differencing when no gradient is provided.
//! - [`Optimizer`] primes the selected rule at construction, then runs
//!   resumable batches of iterations with [`Optimizer::run`].
//! - Each completed iteration produces a [`Datum`] for the callbacks, the
//!   display sink, and the storage sink (see [`sinks`]).
//! - [`Interrupt`] stops a run cleanly between iterations;
//!   [`RunOptions::stop_on_tol`] enables the tolerance stop.
//!
//! Invariants & assumptions
//! ------------------------
//! - The flat length is fixed by the starting parameters and never changes.
//! - The runtime history only grows until [`Optimizer::reset`]; its length is
//!   the number of completed iterations.
//! - Single-threaded: the driver is the only caller of the objective and the
//!   rule. Only the interrupt flag is shared.
//!
//! Downstream usage
//! ----------------
//! - Most callers need only the [`prelude`].
//!
//! [`Params`]: crate::optimization::structure::Params
pub mod adapter;
pub mod api;
pub mod finite_diff;
pub mod interrupt;
pub mod sinks;
pub mod timer;
pub mod tolerance;
pub mod traits;
pub mod types;
pub mod validation;

pub use self::adapter::{FlatProblem, wrap};
pub use self::api::{Optimizer, minimize};
pub use self::interrupt::Interrupt;
pub use self::sinks::{Ascii, Callback, DisplaySink, List, StorageSink};
#[cfg(feature = "obs_slog")]
pub use self::sinks::SlogDisplay;
pub use self::traits::{Datum, Objective, RunOptions, Status, StopReason, Tolerances};
pub use self::types::{Cost, Grad, Theta};

pub mod prelude {
    pub use super::{
        Ascii, Datum, DisplaySink, Interrupt, List, Objective, Optimizer, RunOptions, Status,
        StopReason, StorageSink, Theta, Tolerances, minimize,
    };
    #[cfg(feature = "obs_slog")]
    pub use super::SlogDisplay;
}
