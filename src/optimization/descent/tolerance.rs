//! Opt-in tolerance stop.
//!
//! After every emitted record the driver may ask [`ToleranceCheck::observe`]
//! whether the run has stalled. The criteria are checked in order and the
//! first that holds produces the exit message:
//!
//! 1. Scaled gradient norm: `‖g_k‖ ≤ tol.grad·√n`.
//! 2. Objective change: `|f_k − f_{k−1}| ≤ tol.obj`.
//! 3. Parameter change: `‖x_k − x_{k−1}‖ ≤ tol.param·√n`.
//!
//! Criteria 2 and 3 need a previous iterate and never fire on the first
//! observation after [`ToleranceCheck::reset`].
use crate::optimization::descent::{
    traits::Tolerances,
    types::{Cost, Grad, Theta},
};
use argmin_math::{ArgminL2Norm, ArgminSub};

/// Convergence monitor over consecutive iterates.
///
/// Remembers the previous objective value and flat parameters so that
/// the objective and parameter criteria can compare against them.
#[derive(Debug, Clone, Default)]
pub struct ToleranceCheck {
    prev: Option<(Cost, Theta)>,
}

impl ToleranceCheck {
    /// Monitor with no previous iterate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous iterate.
    pub fn reset(&mut self) {
        self.prev = None;
    }

    /// Record iteration `k` and return an exit message if any criterion holds.
    pub fn observe(
        &mut self, tols: &Tolerances, k: usize, obj: Cost, grad: &Grad, theta: &Theta,
    ) -> Option<String> {
        let scale = (theta.len() as f64).sqrt();
        let grad_norm: f64 = grad.l2_norm();
        let message = if grad_norm <= tols.grad * scale {
            Some(format!("Stopped on iteration {k}. Scaled gradient norm: {}", scale * grad_norm))
        } else if let Some((obj_prev, theta_prev)) = &self.prev {
            let delta_obj = (obj - obj_prev).abs();
            let step: Theta = <Theta as ArgminSub<Theta, Theta>>::sub(theta, theta_prev);
            let step_norm: f64 = step.l2_norm();
            if delta_obj <= tols.obj {
                Some(format!(
                    "Stopped on iteration {k}. Objective value not changing, \
                     |f(x^k) - f(x^{{k+1}})|: {delta_obj}"
                ))
            } else if step_norm <= tols.param * scale {
                Some(format!(
                    "Stopped on iteration {k}. Parameters not changing, \
                     sqrt(dim) * ||x^k - x^{{k+1}}||_2: {}",
                    scale * step_norm
                ))
            } else {
                None
            }
        } else {
            None
        };
        self.prev = Some((obj, theta.clone()));
        message
    }
}
