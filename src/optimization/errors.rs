//! optimization::errors — unified error surface for rules, structures, and the driver.
//!
//! Every fallible operation in the crate returns [`OptResult<T>`]. Errors raised
//! by user objectives travel through argmin's `Error` type when the driver
//! evaluates them via [`FlatProblem`](crate::optimization::descent::FlatProblem);
//! the `From<argmin::core::Error>` conversion recovers the original
//! [`OptError`] so callers see exactly what the objective reported.
use argmin::core::{ArgminError, Error};

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

/// Errors produced by rule configuration, the update rules, and the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Algorithm selection ----
    /// Algorithm name does not match any built-in update rule.
    UnknownAlgorithm {
        name: String,
        reason: &'static str,
    },

    /// Hyperparameter outside its admissible range.
    InvalidHyperparameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Gradient window needs at least one slot.
    InvalidWindow {
        size: usize,
        reason: &'static str,
    },

    // ---- Rule state ----
    /// Rule was resumed before the priming handshake.
    RuleNotPrimed,

    /// Rule was primed a second time.
    RuleAlreadyPrimed,

    /// Underlying procedure has ended; the adapter cannot be resumed.
    RuleExhausted,

    // ---- Dimensions ----
    /// Parameter vector length differs from the length fixed at construction.
    ParamDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Natural parameter structure does not match the recorded layout.
    LayoutMismatch {
        reason: String,
    },

    // ---- Evaluator ----
    /// Implies that finite differences should be used.
    GradientNotImplemented,

    /// Gradient elements need to be finite.
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Objective returned a non-finite value.
    NonFiniteCost {
        value: f64,
    },

    // ---- RunOptions ----
    /// Maximum iterations needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },

    /// Stopping tolerance needs to be finite and non-negative.
    InvalidTolerance {
        name: &'static str,
        tol: f64,
        reason: &'static str,
    },

    // ---- Sinks ----
    /// Display, storage, or callback failure.
    Sink {
        text: String,
    },

    /// Writing progress output failed.
    Io {
        text: String,
    },

    /// Installing the interrupt handler failed.
    InterruptHandler {
        text: String,
    },

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    // ---- Fallback ----
    UnknownError,
}

impl OptError {
    /// Build a [`OptError::Sink`] from anything printable.
    pub fn sink(text: impl Into<String>) -> Self {
        OptError::Sink { text: text.into() }
    }

    /// `true` for errors that leave a rule adapter unusable.
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            OptError::RuleNotPrimed | OptError::RuleAlreadyPrimed | OptError::RuleExhausted
        )
    }
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Algorithm selection ----
            OptError::UnknownAlgorithm { name, reason } => {
                write!(f, "Unknown algorithm '{name}': {reason}")
            }
            OptError::InvalidHyperparameter { name, value, reason } => {
                write!(f, "Invalid hyperparameter {name} = {value}: {reason}")
            }
            OptError::InvalidWindow { size, reason } => {
                write!(f, "Invalid gradient window size {size}: {reason}")
            }

            // ---- Rule state ----
            OptError::RuleNotPrimed => {
                write!(f, "Update rule resumed before it was primed with initial parameters")
            }
            OptError::RuleAlreadyPrimed => {
                write!(f, "Update rule has already been primed")
            }
            OptError::RuleExhausted => {
                write!(f, "Update rule has ended and cannot be resumed")
            }

            // ---- Dimensions ----
            OptError::ParamDimMismatch { expected, found } => {
                write!(f, "Parameter dimension mismatch: expected {expected}, found {found}")
            }
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::LayoutMismatch { reason } => {
                write!(f, "Parameter layout mismatch: {reason}")
            }

            // ---- Evaluator ----
            OptError::GradientNotImplemented => {
                write!(f, "Gradient not implemented")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite objective value: {value}")
            }

            // ---- RunOptions ----
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::InvalidTolerance { name, tol, reason } => {
                write!(f, "Invalid {name} tolerance {tol}: {reason}")
            }

            // ---- Sinks ----
            OptError::Sink { text } => {
                write!(f, "Sink failed: {text}")
            }
            OptError::Io { text } => {
                write!(f, "I/O error: {text}")
            }
            OptError::InterruptHandler { text } => {
                write!(f, "Could not install interrupt handler: {text}")
            }

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(opt_err) => match opt_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

impl From<std::io::Error> for OptError {
    fn from(err: std::io::Error) -> Self {
        OptError::Io { text: err.to_string() }
    }
}

impl From<ndarray::ShapeError> for OptError {
    fn from(err: ndarray::ShapeError) -> Self {
        OptError::LayoutMismatch { reason: err.to_string() }
    }
}
