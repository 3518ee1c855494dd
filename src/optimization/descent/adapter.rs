//! Adapter that exposes a user [`Objective`] over flat vectors.
//!
//! Rules only ever see flat `Theta` vectors while users write objectives over
//! their natural parameter shape. [`FlatProblem`] sits between the two: every
//! call reconstructs the flat vector with the run's [`Layout`], evaluates the
//! user objective, and flattens the gradient back. It implements argmin's
//! [`CostFunction`] and [`Gradient`], which are the flat `obj` / `grad` pair.
//!
//! If the objective does not provide a gradient, the flat cost is
//! finite-differenced instead (see [`fd_gradient`]).
use std::{cell::RefCell, fmt};

use crate::optimization::{
    descent::{
        finite_diff::fd_gradient,
        traits::Objective,
        types::{Cost, Grad, Theta},
        validation::{validate_grad, validate_value},
    },
    errors::{OptError, OptResult},
    structure::{Layout, Params},
};
use argmin::core::{CostFunction, Error, Gradient};

/// Build the flat view of `objective` for parameters shaped like `template`.
///
/// # Errors
/// [`OptError::LayoutMismatch`] if `template` holds no scalars.
pub fn wrap<O: Objective>(objective: O, template: &Params) -> OptResult<FlatProblem<O>> {
    let layout = Layout::of(template);
    if layout.is_empty() {
        return Err(OptError::LayoutMismatch {
            reason: "Starting parameters must contain at least one value.".to_string(),
        });
    }
    Ok(FlatProblem { objective, layout })
}

/// Flat-vector view of a user objective.
#[derive(Clone)]
pub struct FlatProblem<O: Objective> {
    objective: O,
    layout: Layout,
}

impl<O: Objective> fmt::Debug for FlatProblem<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatProblem").field("layout", &self.layout).finish_non_exhaustive()
    }
}

impl<O: Objective> FlatProblem<O> {
    /// Shape descriptor used to rebuild natural parameters.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Flat length of every vector this problem accepts.
    pub fn dim(&self) -> usize {
        self.layout.len()
    }

    /// The wrapped objective.
    pub fn objective(&self) -> &O {
        &self.objective
    }

    /// Objective value and flat gradient from a single user evaluation.
    ///
    /// # Errors
    /// - Any error raised by the objective other than
    ///   [`OptError::GradientNotImplemented`].
    /// - [`OptError::NonFiniteCost`] for a non-finite value.
    /// - [`OptError::LayoutMismatch`], [`OptError::GradientDimMismatch`] or
    ///   [`OptError::InvalidGradient`] for a malformed gradient.
    pub fn evaluate(&self, theta: &Theta) -> OptResult<(Cost, Grad)> {
        let params = self.layout.restruct(theta)?;
        match self.objective.value_and_grad(&params) {
            Ok((value, grad)) => {
                validate_value(value)?;
                Ok((value, self.flatten_grad(&grad)?))
            }
            Err(OptError::GradientNotImplemented) => {
                let value = self.objective.value(&params)?;
                validate_value(value)?;
                Ok((value, self.numeric_grad(theta)?))
            }
            Err(e) => Err(e),
        }
    }

    fn flatten_grad(&self, grad: &Params) -> OptResult<Grad> {
        let flat = self.layout.destruct(grad)?;
        validate_grad(&flat, self.dim())?;
        Ok(flat)
    }

    fn numeric_grad(&self, theta: &Theta) -> OptResult<Grad> {
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let cost_func = |theta: &Theta| -> f64 {
            match self.cost(theta) {
                Ok(val) => val,
                Err(e) => {
                    let mut slot = closure_err.borrow_mut();
                    if slot.is_none() {
                        *slot = Some(e);
                    }
                    f64::NAN
                }
            }
        };
        fd_gradient(theta, &cost_func, &closure_err)
    }
}

impl<O: Objective> CostFunction for FlatProblem<O> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate the objective at the natural-shape reconstruction of `theta`.
    ///
    /// # Errors
    /// Propagates objective errors and rejects non-finite values with
    /// `NonFiniteCost`.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let params = self.layout.restruct(theta)?;
        let output = self.objective.value(&params)?;
        validate_value(output)?;
        Ok(output)
    }
}

impl<O: Objective> Gradient for FlatProblem<O> {
    type Param = Theta;
    type Gradient = Grad;

    /// Flat gradient at `theta`.
    ///
    /// - An analytic gradient is checked against the layout, flattened, and
    ///   validated.
    /// - `GradientNotImplemented` switches to finite differences of
    ///   [`cost`](CostFunction::cost).
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let params = self.layout.restruct(theta)?;
        match self.objective.grad(&params) {
            Ok(g) => Ok(self.flatten_grad(&g)?),
            Err(OptError::GradientNotImplemented) => Ok(self.numeric_grad(theta)?),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{ArrayD, IxDyn, array};
    use std::collections::BTreeMap;

    struct Quadratic;

    impl Objective for Quadratic {
        fn value(&self, params: &Params) -> OptResult<f64> {
            let x = params.as_array().ok_or(OptError::UnknownError)?;
            Ok(0.5 * x.iter().map(|v| v * v).sum::<f64>())
        }

        fn grad(&self, params: &Params) -> OptResult<Params> {
            Ok(params.clone())
        }
    }

    struct ValueOnly;

    impl Objective for ValueOnly {
        fn value(&self, params: &Params) -> OptResult<f64> {
            Quadratic.value(params)
        }
    }

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Flat evaluation through argmin's `CostFunction` / `Gradient`.
    // - The finite-difference fallback for value-only objectives.
    // - Rejection of gradients whose structure differs from the template.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The wrapped pair evaluates the user function at the reconstructed point
    // and returns a flat gradient.
    //
    // Given
    // -----
    // - f(x) = 0.5‖x‖² over a 2×1 array template.
    //
    // Expect
    // ------
    // - cost([1, −2]) = 2.5 and gradient([1, −2]) = [1, −2].
    fn wrapped_pair_accepts_flat_vectors() {
        // Arrange
        let template = Params::Array(ArrayD::zeros(IxDyn(&[2, 1])));
        let problem = wrap(Quadratic, &template).unwrap();
        let theta = array![1.0, -2.0];

        // Act
        let cost = problem.cost(&theta).unwrap();
        let grad = problem.gradient(&theta).unwrap();

        // Assert
        assert_eq!(cost, 2.5);
        assert_eq!(grad, theta);
        assert_eq!(problem.evaluate(&theta).unwrap(), (2.5, theta.clone()));
    }

    #[test]
    fn value_only_objective_uses_finite_differences() {
        let problem = wrap(ValueOnly, &Params::from(vec![0.0, 0.0])).unwrap();
        let theta = array![0.5, 3.0];

        let (value, grad) = problem.evaluate(&theta).unwrap();

        assert_relative_eq!(value, 0.5 * (0.25 + 9.0), epsilon = 1e-12);
        assert_relative_eq!(grad[0], 0.5, epsilon = 1e-6);
        assert_relative_eq!(grad[1], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn gradient_with_wrong_structure_is_rejected() {
        let bad = |_: &Params| -> OptResult<(f64, Params)> {
            let mut m = BTreeMap::new();
            m.insert("w".to_string(), ArrayD::zeros(IxDyn(&[2])));
            Ok((0.0, Params::Map(m)))
        };
        let problem = wrap(bad, &Params::from(vec![0.0, 0.0])).unwrap();

        let err = problem.evaluate(&array![0.0, 0.0]).unwrap_err();

        assert!(matches!(err, OptError::LayoutMismatch { .. }));
    }

    #[test]
    fn empty_template_is_rejected() {
        let err = wrap(Quadratic, &Params::Seq(Vec::new())).unwrap_err();
        assert!(matches!(err, OptError::LayoutMismatch { .. }));
    }

    #[test]
    fn debug_shows_layout_without_objective() {
        // `Quadratic` has no `Debug` impl of its own.
        let problem = wrap(Quadratic, &Params::from(array![1.0, 2.0])).unwrap();

        let text = format!("{problem:?}");

        assert!(text.starts_with("FlatProblem { layout: "));
        assert!(!text.contains("Quadratic"));
    }
}
