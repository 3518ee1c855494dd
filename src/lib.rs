//! descent — first-order optimization as resumable update rules and a
//! pluggable driver loop.
//!
//! Purpose
//! -------
//! Run iteration-limited optimization experiments against one uniform driver,
//! whichever update rule is chosen. The crate separates the problem (an
//! objective and its gradient), the algorithm (an update rule), and the
//! instrumentation (timing, display, storage, callbacks).
//!
//! Key behaviors
//! -------------
//! - Six built-in rules: momentum descent (`sgd`), Nesterov acceleration
//!   (`nag`), `rmsprop`, windowed stochastic average gradient (`sag`),
//!   SMORMS3 (`smorms`), and `adam`. User rules plug in through the
//!   `UpdateRule` trait.
//! - `Optimizer::run` can be called repeatedly to extend a run, and can be
//!   interrupted between iterations without losing completed work.
//! - Parameters may be a single array, named arrays, or a sequence of arrays.
//!
//! Feature flags
//! -------------
//! - `obs_slog` (default): `SlogDisplay`, a structured-logging display sink.
//! - `ctrlc`: `Interrupt::install_ctrlc` to stop runs from the terminal.
//!
//! Example
//! -------
//! ```rust
//! use descent::prelude::*;
//! use ndarray::array;
//!
//! let f_df = |p: &Params| -> OptResult<(f64, Params)> {
//!     let x = p.as_array().ok_or(OptError::UnknownError)?;
//!     Ok((0.5 * x.iter().map(|v| v * v).sum::<f64>(), p.clone()))
//! };
//! let mut opt = Optimizer::new(f_df, Params::from(array![1.0, -2.0]), "adam")?;
//! opt.run(&RunOptions::with_max_iter(50)?)?;
//! assert_eq!(opt.len(), 50);
//! # Ok::<(), OptError>(())
//! ```

pub mod optimization;

pub mod prelude {
    pub use crate::optimization::prelude::*;
}
