//! The iteration driver.
//!
//! [`Optimizer`] ties together a flat view of the user's objective
//! ([`FlatProblem`]), a primed [`RuleAdapter`], and the instrumentation sinks.
//! Construction performs the priming handshake; every later [`Optimizer::run`]
//! call continues from where the previous one stopped.
//!
//! Lifecycle: `Ready` → `Running` → `Stopped(reason)` → `Running` → …
//! Only [`Optimizer::reset`] returns to `Ready`.
use crate::optimization::{
    descent::{
        adapter::{FlatProblem, wrap},
        interrupt::Interrupt,
        sinks::{Callback, DisplaySink, StorageSink},
        timer::{Stopwatch, batch_runtime},
        tolerance::ToleranceCheck,
        traits::{Datum, Objective, RunOptions, Status, StopReason},
        types::Theta,
    },
    errors::{OptError, OptResult},
    rules::{Algorithm, Phase, RuleAdapter},
    structure::{Layout, Params},
};
use argmin::core::CostFunction;
use std::fmt;

/// Optimizer — resumable driver over one objective and one update rule.
///
/// Per iteration `k` (0-based, continuing across `run` calls):
/// 1. Evaluate the objective and flat gradient at the current parameters.
/// 2. Under a [`Stopwatch`], resume the rule with the gradient and rebuild
///    the natural-shape parameters.
/// 3. Build a [`Datum`] and hand it to every callback, then the display,
///    then the storage sink.
///
/// Errors from the objective, the rule, or any sink abort the run and are
/// returned unchanged. A raised [`Interrupt`] stops the loop at the end of
/// the current iteration without an error.
pub struct Optimizer<O: Objective> {
    problem: FlatProblem<O>,
    theta_init: Params,
    rule: RuleAdapter,
    theta: Params,
    theta_flat: Theta,
    runtimes: Vec<f64>,
    exit_message: Option<String>,
    status: Status,
    display: Option<Box<dyn DisplaySink>>,
    storage: Option<Box<dyn StorageSink>>,
    callbacks: Vec<Callback>,
    interrupt: Interrupt,
    tolerance: ToleranceCheck,
}

impl<O: Objective> Optimizer<O> {
    /// Wrap `objective`, record the layout of `theta_init`, and prime the
    /// selected rule with the flattened starting point.
    ///
    /// `algorithm` accepts a rule name (`"adam"`), a [`RuleConfig`], a
    /// [`RuleKind`], or [`Algorithm::custom`].
    ///
    /// # Errors
    /// - [`OptError::UnknownAlgorithm`] for an unrecognized rule name.
    /// - [`OptError::RuleNotPrimed`] / [`OptError::ParamDimMismatch`] when a
    ///   custom constructor returns an unusable adapter.
    /// - [`OptError::LayoutMismatch`] when `theta_init` holds no values.
    ///
    /// [`RuleConfig`]: crate::optimization::rules::RuleConfig
    /// [`RuleKind`]: crate::optimization::rules::RuleKind
    pub fn new(
        objective: O, theta_init: Params, algorithm: impl Into<Algorithm>,
    ) -> OptResult<Self> {
        let problem = wrap(objective, &theta_init)?;
        let x0 = problem.layout().destruct(&theta_init)?;
        let rule = algorithm.into().prime(x0)?;
        let theta_flat = rule.current().cloned().ok_or(OptError::RuleNotPrimed)?;
        let theta = problem.layout().restruct(&theta_flat)?;
        Ok(Self {
            problem,
            theta_init,
            rule,
            theta,
            theta_flat,
            runtimes: Vec::new(),
            exit_message: None,
            status: Status::Ready,
            display: None,
            storage: None,
            callbacks: Vec::new(),
            interrupt: Interrupt::new(),
            tolerance: ToleranceCheck::new(),
        })
    }

    /// Attach `display` as the display sink, replacing any previous one.
    pub fn with_display<D: DisplaySink + 'static>(mut self, display: D) -> Self {
        self.display = Some(Box::new(display));
        self
    }

    /// Attach `storage` as the storage sink, replacing any previous one.
    pub fn with_storage<S: StorageSink + 'static>(mut self, storage: S) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    /// Builder form of [`add_callback`](Self::add_callback).
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&Datum) -> OptResult<()> + 'static,
    {
        self.add_callback(callback);
        self
    }

    /// Replace (or remove, with `None`) the display sink.
    pub fn set_display(&mut self, display: Option<Box<dyn DisplaySink>>) {
        self.display = display;
    }

    /// Replace (or remove, with `None`) the storage sink.
    pub fn set_storage(&mut self, storage: Option<Box<dyn StorageSink>>) {
        self.storage = storage;
    }

    /// Register a callback. Callbacks run in registration order.
    pub fn add_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&Datum) -> OptResult<()> + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Handle that stops the loop at the end of the current iteration when
    /// raised.
    pub fn interrupt(&self) -> Interrupt {
        self.interrupt.clone()
    }

    /// Execute up to `opts.max_iter` further iterations.
    ///
    /// # Parameters
    /// - `opts`: iteration budget, tolerances, and whether the tolerance stop
    ///   is active. `max_iter = usize::MAX` runs until interrupted.
    ///
    /// # Returns
    /// `Ok(())` when the budget is consumed, when the interrupt flag is
    /// raised, when a finite rule ends, or when the tolerance stop fires
    /// (only with `opts.stop_on_tol`). [`status`](Self::status) tells them
    /// apart. The display's `cleanup` runs in all of those cases.
    ///
    /// An interrupt raised during iteration `k` is consumed after that
    /// iteration's fan-out, so it never carries over into a later `run`.
    ///
    /// # Errors
    /// Any error from the objective, the rule, or a sink. The failing
    /// iteration emits no record and the display is not cleaned up. An
    /// objective error also leaves the runtime history untouched.
    ///
    /// # Panics
    /// Never panics on its own; panics inside the objective or a sink
    /// propagate.
    pub fn run(&mut self, opts: &RunOptions) -> OptResult<()> {
        self.exit_message = None;
        self.status = Status::Running;
        match self.run_loop(opts) {
            Ok(reason) => {
                self.status = Status::Stopped(reason);
                Ok(())
            }
            Err(e) => {
                self.status = Status::Stopped(StopReason::Failed);
                Err(e)
            }
        }
    }

    fn run_loop(&mut self, opts: &RunOptions) -> OptResult<StopReason> {
        if let Some(display) = self.display.as_mut() {
            display.start()?;
        }
        let batch = self.display.as_ref().map_or(1, |d| d.every());
        let first = self.len();
        let mut last: Option<Datum> = None;
        let mut reason = StopReason::Exhausted;

        for i in 0..opts.max_iter {
            let k = first + i;
            if self.interrupt.take() {
                reason = StopReason::Interrupted;
                break;
            }
            if self.rule.phase() == Phase::Ended {
                break;
            }

            let (obj, grad) = self.problem.evaluate(&self.theta_flat)?;
            let (theta_flat, theta) = {
                let _sw = Stopwatch::start(&mut self.runtimes);
                let next = self.rule.resume(&grad)?;
                let natural = self.problem.layout().restruct(&next)?;
                (next, natural)
            };
            self.theta_flat = theta_flat;
            self.theta = theta;

            let datum = Datum {
                iteration: k,
                obj,
                grad,
                params: self.theta.clone(),
                runtime: batch_runtime(&self.runtimes, batch),
            };
            for callback in self.callbacks.iter_mut() {
                callback(&datum)?;
            }
            if let Some(display) = self.display.as_mut() {
                display.invoke(&datum)?;
            }
            if let Some(storage) = self.storage.as_mut() {
                storage.invoke(&datum)?;
            }

            let stop = if opts.stop_on_tol {
                self.tolerance.observe(&opts.tols, k, obj, &datum.grad, &self.theta_flat)
            } else {
                None
            };
            last = Some(datum);
            if let Some(message) = stop {
                self.exit_message = Some(message);
                reason = StopReason::Tolerance;
                break;
            }
            if self.interrupt.take() {
                reason = StopReason::Interrupted;
                break;
            }
        }

        if let Some(display) = self.display.as_mut() {
            display.cleanup(last.as_ref(), &self.runtimes, self.exit_message.as_deref())?;
        }
        Ok(reason)
    }

    /// Clear the runtime history and exit message. Rule state and the current
    /// parameters are kept.
    pub fn reset(&mut self) {
        self.runtimes.clear();
        self.exit_message = None;
        self.status = Status::Ready;
        self.tolerance.reset();
    }

    /// Iterations completed since construction or the last reset.
    pub fn len(&self) -> usize {
        self.runtimes.len()
    }

    /// `true` before the first completed iteration.
    pub fn is_empty(&self) -> bool {
        self.runtimes.is_empty()
    }

    /// Alias of [`len`](Self::len).
    pub fn iterations(&self) -> usize {
        self.len()
    }

    /// Current parameters in the caller's shape.
    pub fn theta(&self) -> &Params {
        &self.theta
    }

    /// Current parameters as the flat vector the rule works on.
    pub fn theta_flat(&self) -> &Theta {
        &self.theta_flat
    }

    /// Starting parameters as passed to [`new`](Self::new).
    pub fn theta_init(&self) -> &Params {
        &self.theta_init
    }

    /// Seconds spent in each rule step, oldest first.
    pub fn runtimes(&self) -> &[f64] {
        &self.runtimes
    }

    /// Message of the last tolerance stop, if the last run ended on one.
    pub fn exit_message(&self) -> Option<&str> {
        self.exit_message.as_deref()
    }

    /// Lifecycle state; see [`Status`].
    pub fn status(&self) -> Status {
        self.status
    }

    /// Shape descriptor recorded from the starting parameters.
    pub fn layout(&self) -> &Layout {
        self.problem.layout()
    }

    /// The primed update rule.
    pub fn rule(&self) -> &RuleAdapter {
        &self.rule
    }

    /// The wrapped objective.
    pub fn objective(&self) -> &O {
        self.problem.objective()
    }

    /// Rebuild a flat vector in the shape of the starting parameters.
    ///
    /// # Errors
    /// [`OptError::ParamDimMismatch`] if `theta` has the wrong length.
    pub fn restruct(&self, theta: &Theta) -> OptResult<Params> {
        self.problem.layout().restruct(theta)
    }
}

impl<O: Objective> fmt::Display for Optimizer<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.rule.name())?;
        writeln!(f, "{} iterations", self.len())?;
        match self.problem.cost(&self.theta_flat) {
            Ok(value) => write!(f, "Objective: {value}"),
            Err(_) => write!(f, "Objective: unavailable"),
        }
    }
}

impl<O: Objective> fmt::Debug for Optimizer<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Optimizer")
            .field("rule", &self.rule)
            .field("layout", self.problem.layout())
            .field("iterations", &self.len())
            .field("status", &self.status)
            .field("exit_message", &self.exit_message)
            .finish()
    }
}

/// Run `algorithm` on `objective` from `theta_init` and return the final
/// parameters.
///
/// Shorthand for [`Optimizer::new`] followed by one [`Optimizer::run`]
/// without sinks.
///
/// # Errors
/// Anything [`Optimizer::new`] or [`Optimizer::run`] can return.
///
/// # Example
/// ```rust
/// use descent::prelude::*;
/// use ndarray::array;
///
/// let f_df = |p: &Params| -> OptResult<(f64, Params)> {
///     let x = p.as_array().ok_or(OptError::UnknownError)?;
///     Ok((0.5 * x.iter().map(|v| v * v).sum::<f64>(), p.clone()))
/// };
/// let cfg = RuleConfig::Sgd(SgdConfig::new(0.1, 0.0)?);
/// let opts = RunOptions::with_max_iter(1)?;
/// let theta = minimize(f_df, Params::from(array![1.0, -2.0]), cfg, &opts)?;
/// assert_eq!(theta, Params::from(array![0.9, -1.8]));
/// # Ok::<(), OptError>(())
/// ```
pub fn minimize<O: Objective>(
    objective: O, theta_init: Params, algorithm: impl Into<Algorithm>, opts: &RunOptions,
) -> OptResult<Params> {
    let mut optimizer = Optimizer::new(objective, theta_init, algorithm)?;
    optimizer.run(opts)?;
    Ok(optimizer.theta)
}
