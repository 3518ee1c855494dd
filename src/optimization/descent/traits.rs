//! descent::traits — the objective contract, run configuration, and the
//! per-iteration record.
//!
//! - [`Objective`]: what users implement (or pass as a closure) to describe
//!   the function being minimized.
//! - [`RunOptions`] / [`Tolerances`]: validated per-run settings.
//! - [`Datum`]: the immutable snapshot handed to every sink.
//! - [`Status`] / [`StopReason`]: where the driver is in its lifecycle.
use crate::optimization::{
    descent::{
        types::{DEFAULT_MAX_ITER, Theta},
        validation::verify_tol,
    },
    errors::{OptError, OptResult},
    structure::Params,
};
use std::fmt;

/// User-implemented objective over natural-shape parameters.
///
/// Required:
/// - `value(&Params) -> OptResult<f64>`: objective at the given point.
///
/// Optional:
/// - `grad(&Params) -> OptResult<Params>`: analytic gradient with the same
///   structure as the input. The default returns
///   [`OptError::GradientNotImplemented`], which makes the driver fall back
///   to finite differences on the flat vector.
/// - `value_and_grad(&Params)`: both at once; the driver calls this once per
///   iteration.
///
/// Any closure `Fn(&Params) -> OptResult<(f64, Params)>` returning the value
/// and gradient together is also an `Objective`.
pub trait Objective {
    fn value(&self, params: &Params) -> OptResult<f64>;

    fn grad(&self, _params: &Params) -> OptResult<Params> {
        Err(OptError::GradientNotImplemented)
    }

    /// Value and gradient at one point. Override when both come from a
    /// single evaluation.
    fn value_and_grad(&self, params: &Params) -> OptResult<(f64, Params)> {
        let grad = self.grad(params)?;
        Ok((self.value(params)?, grad))
    }
}

impl<F> Objective for F
where
    F: Fn(&Params) -> OptResult<(f64, Params)>,
{
    fn value(&self, params: &Params) -> OptResult<f64> {
        Ok(self(params)?.0)
    }

    fn grad(&self, params: &Params) -> OptResult<Params> {
        Ok(self(params)?.1)
    }

    fn value_and_grad(&self, params: &Params) -> OptResult<(f64, Params)> {
        self(params)
    }
}

/// Thresholds for the optional tolerance stop.
///
/// - `obj`: stop when `|f_k − f_{k−1}| ≤ obj`.
/// - `param`: stop when `‖x_k − x_{k−1}‖ ≤ param·√n`.
/// - `grad`: stop when `‖g_k‖ ≤ grad·√n`.
///
/// Defaults: `obj = 1e-18`, `param = 1e-18`, `grad = 1e-16`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub obj: f64,
    pub param: f64,
    pub grad: f64,
}

impl Tolerances {
    /// # Errors
    /// [`OptError::InvalidTolerance`] if any threshold is negative or
    /// non-finite.
    pub fn new(obj: f64, param: f64, grad: f64) -> OptResult<Self> {
        verify_tol("obj", obj)?;
        verify_tol("param", param)?;
        verify_tol("grad", grad)?;
        Ok(Self { obj, param, grad })
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self { obj: 1e-18, param: 1e-18, grad: 1e-16 }
    }
}

/// Per-call settings for [`Optimizer::run`](super::Optimizer::run).
///
/// - `max_iter`: number of additional iterations to execute (default 1000).
/// - `tols`: thresholds used when `stop_on_tol` is set.
/// - `stop_on_tol`: enable the tolerance stop (default `false`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    pub max_iter: usize,
    pub tols: Tolerances,
    pub stop_on_tol: bool,
}

impl RunOptions {
    /// # Errors
    /// [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(max_iter: usize, tols: Tolerances, stop_on_tol: bool) -> OptResult<Self> {
        if max_iter == 0 {
            return Err(OptError::InvalidMaxIter {
                max_iter,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        Ok(Self { max_iter, tols, stop_on_tol })
    }

    /// Default options with a different iteration budget.
    pub fn with_max_iter(max_iter: usize) -> OptResult<Self> {
        Self::new(max_iter, Tolerances::default(), false)
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { max_iter: DEFAULT_MAX_ITER, tols: Tolerances::default(), stop_on_tol: false }
    }
}

/// Datum — immutable record of one completed iteration.
///
/// - `iteration`: 0-based index across every `run` call since the last reset.
/// - `obj`: objective evaluated at the parameters the step started from.
/// - `grad`: flat gradient handed to the rule.
/// - `params`: parameters produced by the step, in natural shape.
/// - `runtime`: seconds spent in the step, summed over the display's batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Datum {
    pub iteration: usize,
    pub obj: f64,
    pub grad: Theta,
    pub params: Params,
    pub runtime: f64,
}

/// Why the last `run` call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The iteration budget was consumed, or a finite rule ended.
    Exhausted,
    /// The interrupt flag was raised.
    Interrupted,
    /// The tolerance stop fired.
    Tolerance,
    /// An evaluator, rule, or sink error aborted the run.
    Failed,
}

/// Driver lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Primed and never run since construction or the last reset.
    Ready,
    Running,
    Stopped(StopReason),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ready => f.write_str("ready"),
            Status::Running => f.write_str("running"),
            Status::Stopped(StopReason::Exhausted) => f.write_str("stopped (exhausted)"),
            Status::Stopped(StopReason::Interrupted) => f.write_str("stopped (interrupted)"),
            Status::Stopped(StopReason::Tolerance) => f.write_str("stopped (tolerance)"),
            Status::Stopped(StopReason::Failed) => f.write_str("stopped (failed)"),
        }
    }
}
