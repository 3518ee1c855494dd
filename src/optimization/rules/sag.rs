//! Stochastic average gradient over a bounded window.
//!
//! The last `nterms` gradients are kept; each step moves against their mean.
//! While fewer than `nterms` gradients have been seen, the mean is taken over
//! exactly those seen so far.
use crate::optimization::{
    descent::{
        Grad, Theta,
        validation::{verify_positive, verify_window},
    },
    errors::{OptError, OptResult},
    rules::UpdateRule,
};
use std::collections::VecDeque;

/// Hyperparameters for [`Sag`]. Defaults: `nterms = 10`, `lr = 1e-3`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SagConfig {
    pub nterms: usize,
    pub lr: f64,
}

impl SagConfig {
    pub fn new(nterms: usize, lr: f64) -> OptResult<Self> {
        verify_window(nterms)?;
        verify_positive("lr", lr)?;
        Ok(Self { nterms, lr })
    }
}

impl Default for SagConfig {
    fn default() -> Self {
        Self { nterms: 10, lr: 1e-3 }
    }
}

#[derive(Debug, Clone)]
struct SagState {
    xk: Theta,
    window: VecDeque<Grad>,
}

impl SagState {
    fn mean(&self) -> Grad {
        let mut sum = Grad::zeros(self.xk.len());
        for g in &self.window {
            sum += g;
        }
        sum / self.window.len() as f64
    }
}

/// Windowed stochastic-average-gradient rule.
#[derive(Debug, Clone)]
pub struct Sag {
    cfg: SagConfig,
    state: Option<SagState>,
}

impl Sag {
    /// Unprimed rule with configuration `cfg`.
    pub fn new(cfg: SagConfig) -> Self {
        Self { cfg, state: None }
    }

    /// Hyperparameters in use.
    pub fn config(&self) -> &SagConfig {
        &self.cfg
    }
}

impl UpdateRule for Sag {
    fn name(&self) -> &'static str {
        "sag"
    }

    fn initialize(&mut self, x0: Theta) -> OptResult<Theta> {
        if self.state.is_some() {
            return Err(OptError::RuleAlreadyPrimed);
        }
        let window = VecDeque::with_capacity(self.cfg.nterms);
        self.state = Some(SagState { xk: x0.clone(), window });
        Ok(x0)
    }

    fn step(&mut self, grad: &Grad) -> OptResult<Theta> {
        let SagConfig { nterms, lr } = self.cfg;
        let st = self.state.as_mut().ok_or(OptError::RuleNotPrimed)?;
        st.window.push_back(grad.clone());
        while st.window.len() > nterms {
            st.window.pop_front();
        }
        let avg = st.mean();
        st.xk.scaled_add(-lr, &avg);
        Ok(st.xk.clone())
    }
}
