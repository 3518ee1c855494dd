//! rules — the update-rule protocol, the six built-ins, and the resumable
//! adapter the driver talks to.
//!
//! Purpose
//! -------
//! Express each optimization algorithm as a small stateful object with an
//! explicit two-phase interface, so the driver can run any of them (or a
//! user-defined one) through the same code path.
//!
//! Key behaviors
//! -------------
//! - [`UpdateRule`]: `initialize(x0)` then repeated `step(grad) -> x_next`.
//! - Built-ins, each with a validated config and `Default`:
//!   - [`Sgd`]: momentum descent.
//!   - [`Nag`]: Nesterov-accelerated descent.
//!   - [`RmsProp`]
//!   - [`Sag`]: stochastic average gradient over a bounded window.
//!   - [`Smorms`]: SMORMS3 memory-adaptive rule.
//!   - [`Adam`]: Adam with bias correction.
//! - [`Rule`] / [`RuleConfig`] / [`RuleKind`]: the closed built-in set, its
//!   hyperparameters, and name parsing.
//! - [`RuleAdapter`]: enforces the protocol and tracks its lifecycle.
//! - [`Algorithm`]: the selector passed to the driver.
//!
//! Invariants & assumptions
//! ------------------------
//! - Rule state is private to the rule instance and shaped like `x0`.
//! - Every step is a deterministic function of prior state and the gradient.
//! - Adaptive rules add a damping/epsilon term to every denominator, so a
//!   zero gradient never produces NaN.
//!
//! Testing notes
//! -------------
//! - Each rule module hand-checks its update law on small inputs and checks
//!   zero-gradient behaviour.
//! - `config` checks determinism of every built-in and selector resolution.
//! - `adapter` checks the lifecycle and invalid-state errors.

pub mod adam;
pub mod adapter;
pub mod config;
pub mod nag;
pub mod rmsprop;
pub mod sag;
pub mod sgd;
pub mod smorms;
pub mod traits;

pub use self::adam::{Adam, AdamConfig};
pub use self::adapter::{Phase, RuleAdapter};
pub use self::config::{Algorithm, Rule, RuleConfig, RuleConstructor, RuleKind};
pub use self::nag::{Nag, NagConfig};
pub use self::rmsprop::{RmsProp, RmsPropConfig};
pub use self::sag::{Sag, SagConfig};
pub use self::sgd::{Sgd, SgdConfig};
pub use self::smorms::{Smorms, SmormsConfig};
pub use self::traits::UpdateRule;

pub mod prelude {
    pub use super::{Algorithm, RuleAdapter, RuleConfig, RuleKind, UpdateRule};
    pub use super::{AdamConfig, NagConfig, RmsPropConfig, SagConfig, SgdConfig, SmormsConfig};
}
