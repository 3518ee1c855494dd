//! Validation helpers for rule configuration, run options, and evaluator output.
//!
//! - **Hyperparameters**: [`verify_positive`], [`verify_unit_interval`],
//!   [`verify_window`] reject values a rule cannot use.
//! - **Tolerances**: [`verify_tol`] ensures stopping thresholds are finite and
//!   non-negative.
//! - **Gradients**: [`validate_grad`] enforces dimension and finiteness.
//! - **Objective values**: [`validate_value`] checks for finiteness.
//!
//! All helpers return domain-specific [`OptError`] variants so higher layers
//! can report problems uniformly.
use crate::optimization::{
    descent::Grad,
    errors::{OptError, OptResult},
};

/// Require a finite, strictly positive hyperparameter (learning rates,
/// damping, epsilon).
///
/// # Errors
/// [`OptError::InvalidHyperparameter`] if the value is non-finite or ≤ 0.
pub fn verify_positive(name: &'static str, value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::InvalidHyperparameter { name, value, reason: "Must be finite." });
    }
    if value <= 0.0 {
        return Err(OptError::InvalidHyperparameter { name, value, reason: "Must be positive." });
    }
    Ok(())
}

/// Require a coefficient in `[0, 1)` (momentum, decay rates, β's).
///
/// # Errors
/// [`OptError::InvalidHyperparameter`] if the value is NaN or outside `[0, 1)`.
pub fn verify_unit_interval(name: &'static str, value: f64) -> OptResult<()> {
    if !(0.0..1.0).contains(&value) {
        return Err(OptError::InvalidHyperparameter {
            name,
            value,
            reason: "Must lie in the half-open interval [0, 1).",
        });
    }
    Ok(())
}

/// Require a gradient window of at least one slot.
///
/// # Errors
/// [`OptError::InvalidWindow`] if `size == 0`.
pub fn verify_window(size: usize) -> OptResult<()> {
    if size == 0 {
        return Err(OptError::InvalidWindow {
            size,
            reason: "Window must hold at least one gradient.",
        });
    }
    Ok(())
}

/// Validate a stopping tolerance.
///
/// # Errors
/// [`OptError::InvalidTolerance`] if the value is non-finite or negative.
pub fn verify_tol(name: &'static str, tol: f64) -> OptResult<()> {
    if !tol.is_finite() {
        return Err(OptError::InvalidTolerance { name, tol, reason: "Tolerance must be finite." });
    }
    if tol < 0.0 {
        return Err(OptError::InvalidTolerance {
            name,
            tol,
            reason: "Tolerance must be non-negative.",
        });
    }
    Ok(())
}

/// Validate a gradient vector against dimension and finiteness.
///
/// Checks:
/// - `grad.len() == dim`
/// - every element is finite (`NaN` or `±∞` are rejected)
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] if length does not match `dim`.
/// - [`OptError::InvalidGradient`] with the index/value/reason of the first
///   offending element.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate that a scalar objective value is finite.
///
/// # Errors
/// Returns [`OptError::NonFiniteCost`] if the value is `NaN` or infinite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn positive_rejects_zero_negative_and_nan() {
        assert!(verify_positive("lr", 1e-3).is_ok());
        assert!(verify_positive("lr", 0.0).is_err());
        assert!(verify_positive("lr", -1.0).is_err());
        assert!(verify_positive("lr", f64::NAN).is_err());
    }

    #[test]
    fn unit_interval_is_half_open() {
        assert!(verify_unit_interval("mom", 0.0).is_ok());
        assert!(verify_unit_interval("mom", 0.999).is_ok());
        assert!(verify_unit_interval("mom", 1.0).is_err());
        assert!(verify_unit_interval("mom", f64::NAN).is_err());
    }

    #[test]
    fn window_and_tolerance_bounds() {
        assert!(verify_window(1).is_ok());
        assert_eq!(
            verify_window(0),
            Err(OptError::InvalidWindow {
                size: 0,
                reason: "Window must hold at least one gradient.",
            })
        );
        assert!(verify_tol("grad", 0.0).is_ok());
        assert!(verify_tol("grad", -1e-9).is_err());
        assert!(verify_tol("grad", f64::INFINITY).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Ensure `validate_grad` reports the first non-finite entry.
    //
    // Given
    // -----
    // - A gradient `[0, NaN, inf]` of the expected length.
    //
    // Expect
    // ------
    // - `InvalidGradient` pointing at index 1.
    fn validate_grad_reports_first_non_finite_entry() {
        // Arrange
        let grad = array![0.0, f64::NAN, f64::INFINITY];

        // Act
        let err = validate_grad(&grad, 3).expect_err("NaN must be rejected");

        // Assert
        match err {
            OptError::InvalidGradient { index, .. } => assert_eq!(index, 1),
            other => panic!("Unexpected variant: {other:?}"),
        }
        assert_eq!(
            validate_grad(&grad, 2),
            Err(OptError::GradientDimMismatch { expected: 2, found: 3 })
        );
        assert!(validate_value(f64::NAN).is_err());
    }
}
