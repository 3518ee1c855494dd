//! Gradient descent with classical (heavy-ball) momentum.
//!
//! `v ← mom·v − lr·g`, `x ← x + v`. With `mom = 0` this is plain gradient
//! descent.
use crate::optimization::{
    descent::{
        Grad, Theta,
        validation::{verify_positive, verify_unit_interval},
    },
    errors::{OptError, OptResult},
    rules::UpdateRule,
};

/// Hyperparameters for [`Sgd`].
///
/// Defaults: `lr = 1e-3`, `mom = 0.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SgdConfig {
    pub lr: f64,
    pub mom: f64,
}

impl SgdConfig {
    /// # Errors
    /// `lr` must be finite and positive, `mom` must lie in `[0, 1)`.
    pub fn new(lr: f64, mom: f64) -> OptResult<Self> {
        verify_positive("lr", lr)?;
        verify_unit_interval("mom", mom)?;
        Ok(Self { lr, mom })
    }
}

impl Default for SgdConfig {
    fn default() -> Self {
        Self { lr: 1e-3, mom: 0.0 }
    }
}

#[derive(Debug, Clone)]
struct SgdState {
    xk: Theta,
    vk: Theta,
}

/// Momentum descent rule.
#[derive(Debug, Clone)]
pub struct Sgd {
    cfg: SgdConfig,
    state: Option<SgdState>,
}

impl Sgd {
    /// Unprimed rule with configuration `cfg`.
    pub fn new(cfg: SgdConfig) -> Self {
        Self { cfg, state: None }
    }

    /// Hyperparameters in use.
    pub fn config(&self) -> &SgdConfig {
        &self.cfg
    }
}

impl UpdateRule for Sgd {
    fn name(&self) -> &'static str {
        "sgd"
    }

    fn initialize(&mut self, x0: Theta) -> OptResult<Theta> {
        if self.state.is_some() {
            return Err(OptError::RuleAlreadyPrimed);
        }
        let vk = Theta::zeros(x0.len());
        self.state = Some(SgdState { xk: x0.clone(), vk });
        Ok(x0)
    }

    fn step(&mut self, grad: &Grad) -> OptResult<Theta> {
        let SgdConfig { lr, mom } = self.cfg;
        let st = self.state.as_mut().ok_or(OptError::RuleNotPrimed)?;
        st.vk.mapv_inplace(|v| mom * v);
        st.vk.scaled_add(-lr, grad);
        st.xk += &st.vk;
        Ok(st.xk.clone())
    }
}
