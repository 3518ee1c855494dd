//! descent::finite_diff — gradient approximation for value-only objectives.
//!
//! Purpose
//! -------
//! Differentiate a flat cost closure when the user's [`Objective`] does not
//! supply an analytic gradient, so every rule still receives a validated
//! flat gradient.
//!
//! Key behaviors
//! -------------
//! - [`fd_gradient`] tries central differences first and retries once with
//!   forward differences when the central pass captured an evaluation error
//!   or produced a gradient that fails [`validate_grad`].
//! - [`run_fd_diff`] is the forward-difference pass with error capture.
//!
//! Invariants & assumptions
//! ------------------------
//! - The cost closure cannot return `Result`; it writes the first error it
//!   meets into the shared `closure_err` cell and returns `NaN`.
//! - Returned gradients always satisfy [`validate_grad`] for `theta.len()`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the quadratic happy path, error capture, and the
//!   non-finite rejection path.
//!
//! [`Objective`]: crate::optimization::descent::Objective
use crate::optimization::{
    descent::{
        types::{Grad, Theta},
        validation::validate_grad,
    },
    errors::OptResult,
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// fd_gradient — central-difference gradient with a forward-difference retry.
///
/// Parameters
/// ----------
/// - `theta`: point at which to differentiate.
/// - `func`: flat cost closure that routes errors into `closure_err`.
/// - `closure_err`: shared error slot, cleared on entry.
///
/// Errors
/// ------
/// - Any error captured from `func` during the forward pass.
/// - `OptError::InvalidGradient` / `OptError::GradientDimMismatch` when the
///   forward-difference gradient also fails validation.
pub fn fd_gradient<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let central = theta.central_diff(func);
    if closure_err.borrow().is_none() && validate_grad(&central, theta.len()).is_ok() {
        return Ok(central);
    }
    run_fd_diff(theta, func, closure_err)
}

/// run_fd_diff — forward-difference gradient with error capture and validation.
///
/// # Errors
/// Returns the error captured in `closure_err`, if any, otherwise any
/// validation failure of the forward-difference gradient.
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}
