//! Nesterov's accelerated gradient.
//!
//! The rule hands out the look-ahead point `y`; gradients are therefore
//! evaluated at `y`, not at the base iterate `x`:
//!
//! ```text
//! x_{k+1} = y_k − lr·g_k
//! y_{k+1} = x_{k+1} + k/(k+3) · (x_{k+1} − x_k)
//! ```
//!
//! `k` counts completed steps starting at 0, so the first step carries no
//! momentum.
use crate::optimization::{
    descent::{Grad, Theta, validation::verify_positive},
    errors::{OptError, OptResult},
    rules::UpdateRule,
};

/// Hyperparameters for [`Nag`]. Default `lr = 1e-3`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NagConfig {
    pub lr: f64,
}

impl NagConfig {
    pub fn new(lr: f64) -> OptResult<Self> {
        verify_positive("lr", lr)?;
        Ok(Self { lr })
    }
}

impl Default for NagConfig {
    fn default() -> Self {
        Self { lr: 1e-3 }
    }
}

#[derive(Debug, Clone)]
struct NagState {
    xk: Theta,
    yk: Theta,
    k: usize,
}

/// Nesterov-accelerated descent rule.
#[derive(Debug, Clone)]
pub struct Nag {
    cfg: NagConfig,
    state: Option<NagState>,
}

impl Nag {
    /// Unprimed rule with configuration `cfg`.
    pub fn new(cfg: NagConfig) -> Self {
        Self { cfg, state: None }
    }

    /// Hyperparameters in use.
    pub fn config(&self) -> &NagConfig {
        &self.cfg
    }
}

impl UpdateRule for Nag {
    fn name(&self) -> &'static str {
        "nag"
    }

    fn initialize(&mut self, x0: Theta) -> OptResult<Theta> {
        if self.state.is_some() {
            return Err(OptError::RuleAlreadyPrimed);
        }
        self.state = Some(NagState { xk: x0.clone(), yk: x0.clone(), k: 0 });
        Ok(x0)
    }

    fn step(&mut self, grad: &Grad) -> OptResult<Theta> {
        let lr = self.cfg.lr;
        let st = self.state.as_mut().ok_or(OptError::RuleNotPrimed)?;
        let xprev = std::mem::replace(&mut st.xk, &st.yk - &(grad * lr));
        let beta = st.k as f64 / (st.k as f64 + 3.0);
        st.yk = &st.xk + &((&st.xk - &xprev) * beta);
        st.k += 1;
        Ok(st.yk.clone())
    }
}
