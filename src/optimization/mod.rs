//! optimization — update rules, the descent driver, and the shared error
//! surface.
//!
//! Purpose
//! -------
//! Provide first-order optimization as composable, resumable pieces: a
//! closed set of update rules that work on flat vectors, a driver loop that
//! feeds them gradients of a user objective, and the structure utilities that
//! translate between the caller's parameter shape and the flat world.
//!
//! Key behaviors
//! -------------
//! - `structure`: natural parameter containers (`Params`) and their shape
//!   descriptors (`Layout`) with `destruct` / `restruct`.
//! - `rules`: the two-phase `UpdateRule` protocol, six built-in rules, and
//!   the `RuleAdapter` lifecycle wrapper.
//! - `descent`: the `Objective` contract, the argmin bridge, the
//!   `Optimizer` driver, and its instrumentation sinks.
//! - `errors`: one enum (`OptError`) and alias (`OptResult<T>`) for every
//!   failure in the layer, including errors raised inside argmin traits.
//!
//! Invariants & assumptions
//! ------------------------
//! - Rules minimize. Users who maximize negate their objective.
//! - The flat length of a run is fixed by its starting parameters.
//! - Invalid configuration and invalid state are reported as `OptError`,
//!   never as panics.
//!
//! Conventions
//! -----------
//! - Flat vectors are `ndarray::Array1<f64>` (`Theta`, `Grad`).
//! - Every fallible public entrypoint returns `OptResult<T>`.
//! - The core loop performs no I/O. Progress output is the job of a display
//!   sink.
//!
//! Downstream usage
//! ----------------
//! - Import the curated surface with `optimization::prelude::*`, or the
//!   submodule preludes for a finer split.
//!
//! Testing notes
//! -------------
//! - Unit tests in each submodule check local behavior: update laws, the
//!   adapter lifecycle, layout round-trips, sink output.
//! - Integration tests under `tests/` drive full runs, including resumed,
//!   interrupted, and failing ones.

pub mod descent;
pub mod errors;
pub mod rules;
pub mod structure;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use descent::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::descent::prelude::*;
    pub use super::errors::{OptError, OptResult};
    pub use super::rules::prelude::*;
    pub use super::structure::{Layout, Params, destruct, restruct};
}
