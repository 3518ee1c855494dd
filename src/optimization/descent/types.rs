//! descent::types — shared numeric aliases for the flat-vector world.
//!
//! Purpose
//! -------
//! Name the vector and scalar types every layer passes around so that rules,
//! the argmin bridge, and the driver agree on one representation.
//!
//! Conventions
//! -----------
//! - `Theta` and `Grad` always have the flat length fixed by the starting
//!   parameters of a run.
//! - `Cost` is the raw objective value; the driver minimizes it.
//!
//! Testing notes
//! -------------
//! - Aliases only; exercised by every other module.
use ndarray::Array1;

/// Flat parameter vector.
pub type Theta = Array1<f64>;

/// Flat gradient vector, same length as [`Theta`].
pub type Grad = Array1<f64>;

/// Scalar objective value.
pub type Cost = f64;

/// Iteration budget used when none is configured.
pub const DEFAULT_MAX_ITER: usize = 1000;
