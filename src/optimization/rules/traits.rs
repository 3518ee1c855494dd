//! The two-phase update-rule contract.
//!
//! 1. `initialize(x0)`: allocate state shaped like `x0` and return the
//!    starting iterate.
//! 2. `step(grad)`: consume one gradient, return the next iterate.
//!
//! A step must depend only on the rule's own state and the supplied gradient.
//! Rules never read clocks, globals, or anything owned by the driver.
use crate::optimization::{
    descent::{Grad, Theta},
    errors::OptResult,
};

/// Stateful procedure mapping gradients to parameter iterates.
///
/// Implementors own their accumulators exclusively. The
/// [`RuleAdapter`](super::RuleAdapter) enforces call order and dimension
/// checks, so implementations may assume `step` is only called after a
/// successful `initialize` and with a gradient of the primed length.
pub trait UpdateRule {
    /// Short identifier used in displays and logs.
    fn name(&self) -> &'static str;

    /// Phase 1: receive the starting flat vector and return the first iterate.
    fn initialize(&mut self, x0: Theta) -> OptResult<Theta>;

    /// Phase 2: receive one gradient and return the next iterate.
    fn step(&mut self, grad: &Grad) -> OptResult<Theta>;

    /// `true` once the procedure has permanently ended.
    ///
    /// Built-in rules never end. Finite user rules override this.
    fn is_exhausted(&self) -> bool {
        false
    }
}
