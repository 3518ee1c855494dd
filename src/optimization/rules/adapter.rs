//! RuleAdapter — uniform resumable wrapper around any [`UpdateRule`].
//!
//! Purpose
//! -------
//! Give the driver a single object with a fixed two-phase protocol, no matter
//! which built-in or user rule sits underneath.
//!
//! Key behaviors
//! -------------
//! - [`RuleAdapter::prime`] hands the starting flat vector to the rule exactly
//!   once and stores the echoed iterate.
//! - [`RuleAdapter::resume`] exchanges exactly one gradient for exactly one
//!   parameter vector.
//! - Resuming before priming, or after the rule has ended, is an invalid-state
//!   error. Any error raised by the rule itself also ends the adapter; it is
//!   never retried.
//!
//! Invariants
//! ----------
//! - The flat length is fixed by the priming vector. Gradients and returned
//!   iterates of any other length are rejected.
//! - The exchange strictly alternates and is never reentrant: `resume` takes
//!   `&mut self`.
use crate::optimization::{
    descent::{Grad, Theta},
    errors::{OptError, OptResult},
    rules::UpdateRule,
};
use std::fmt;

/// Lifecycle of a [`RuleAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, waiting for initial parameters.
    Unprimed,
    /// Primed; every `resume` call is valid.
    Ready,
    /// Permanently ended.
    Ended,
}

/// Two-phase, resumable wrapper around one [`UpdateRule`].
///
/// The adapter owns the rule and enforces the exchange protocol: exactly
/// one [`prime`](Self::prime) with the starting point, then any number of
/// [`resume`](Self::resume) calls, each trading a gradient for the next
/// iterate. It tracks the current iterate, the dimension fixed at priming,
/// and the number of completed steps. Once ended it rejects further use.
pub struct RuleAdapter {
    rule: Box<dyn UpdateRule>,
    phase: Phase,
    dim: usize,
    iterate: Option<Theta>,
    steps: u64,
}

impl RuleAdapter {
    /// Wrap `rule` without priming it.
    pub fn new<R: UpdateRule + 'static>(rule: R) -> Self {
        Self { rule: Box::new(rule), phase: Phase::Unprimed, dim: 0, iterate: None, steps: 0 }
    }

    /// Wrap `rule` and immediately prime it with `x0`.
    pub fn primed<R: UpdateRule + 'static>(rule: R, x0: Theta) -> OptResult<Self> {
        let mut adapter = Self::new(rule);
        adapter.prime(x0)?;
        Ok(adapter)
    }

    /// Phase 1 handshake. Returns the iterate echoed by the rule.
    ///
    /// # Errors
    /// - [`OptError::RuleAlreadyPrimed`] when called twice.
    /// - [`OptError::RuleExhausted`] after the adapter has ended.
    /// - [`OptError::ParamDimMismatch`] if the rule echoes a vector of a
    ///   different length.
    pub fn prime(&mut self, x0: Theta) -> OptResult<Theta> {
        match self.phase {
            Phase::Ready => return Err(OptError::RuleAlreadyPrimed),
            Phase::Ended => return Err(OptError::RuleExhausted),
            Phase::Unprimed => {}
        }
        let dim = x0.len();
        let out = self.rule.initialize(x0);
        let echoed = self.guard(out)?;
        if echoed.len() != dim {
            self.phase = Phase::Ended;
            return Err(OptError::ParamDimMismatch { expected: dim, found: echoed.len() });
        }
        self.dim = dim;
        self.phase = Phase::Ready;
        self.iterate = Some(echoed.clone());
        Ok(echoed)
    }

    /// Phase 2 exchange: one gradient in, one parameter vector out.
    ///
    /// # Parameters
    /// - `grad`: flat gradient at the current iterate; its length must match
    ///   the dimension fixed by [`prime`](Self::prime).
    ///
    /// # Returns
    /// The next iterate, which also becomes [`current`](Self::current). If
    /// the rule reports itself exhausted after this step, the adapter moves
    /// to [`Phase::Ended`] but the step's result is still returned.
    ///
    /// # Errors
    /// - [`OptError::RuleNotPrimed`] before [`prime`](Self::prime).
    /// - [`OptError::RuleExhausted`] once the rule has ended.
    /// - [`OptError::GradientDimMismatch`] if `grad` has the wrong length
    ///   (the adapter stays usable).
    /// - Any error from the rule, after which the adapter is ended.
    /// - [`OptError::ParamDimMismatch`] if the rule returns an iterate of the
    ///   wrong length, after which the adapter is ended.
    ///
    /// # Panics
    /// Never panics on its own; a panic inside the rule propagates.
    pub fn resume(&mut self, grad: &Grad) -> OptResult<Theta> {
        match self.phase {
            Phase::Unprimed => return Err(OptError::RuleNotPrimed),
            Phase::Ended => return Err(OptError::RuleExhausted),
            Phase::Ready => {}
        }
        if grad.len() != self.dim {
            return Err(OptError::GradientDimMismatch { expected: self.dim, found: grad.len() });
        }
        let out = self.rule.step(grad);
        let next = self.guard(out)?;
        if next.len() != self.dim {
            self.phase = Phase::Ended;
            return Err(OptError::ParamDimMismatch { expected: self.dim, found: next.len() });
        }
        self.steps += 1;
        if self.rule.is_exhausted() {
            self.phase = Phase::Ended;
        }
        self.iterate = Some(next.clone());
        Ok(next)
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// `true` once priming succeeded, even if the rule has since ended.
    pub fn is_primed(&self) -> bool {
        self.phase != Phase::Unprimed
    }

    /// Flat length fixed at priming; `0` before that.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of completed `resume` exchanges.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Most recent iterate produced by the rule.
    pub fn current(&self) -> Option<&Theta> {
        self.iterate.as_ref()
    }

    /// Registry name of the wrapped rule.
    pub fn name(&self) -> &'static str {
        self.rule.name()
    }

    fn guard<T>(&mut self, out: OptResult<T>) -> OptResult<T> {
        if out.is_err() {
            self.phase = Phase::Ended;
        }
        out
    }
}

impl fmt::Debug for RuleAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleAdapter")
            .field("rule", &self.rule.name())
            .field("phase", &self.phase)
            .field("dim", &self.dim)
            .field("steps", &self.steps)
            .finish()
    }
}
