//! Adam — bias-corrected first and second moment estimates.
use crate::optimization::{
    descent::{
        Grad, Theta,
        validation::{verify_positive, verify_unit_interval},
    },
    errors::{OptError, OptResult},
    rules::UpdateRule,
};
use ndarray::Zip;

/// Hyperparameters for [`Adam`].
///
/// Defaults: `lr = 1e-3`, `beta = (0.9, 0.999)`, `epsilon = 1e-8`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdamConfig {
    pub lr: f64,
    pub beta: (f64, f64),
    pub epsilon: f64,
}

impl AdamConfig {
    pub fn new(lr: f64, beta: (f64, f64), epsilon: f64) -> OptResult<Self> {
        verify_positive("lr", lr)?;
        verify_unit_interval("beta1", beta.0)?;
        verify_unit_interval("beta2", beta.1)?;
        verify_positive("epsilon", epsilon)?;
        Ok(Self { lr, beta, epsilon })
    }
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self { lr: 1e-3, beta: (0.9, 0.999), epsilon: 1e-8 }
    }
}

#[derive(Debug, Clone)]
struct AdamState {
    xk: Theta,
    mk: Theta,
    vk: Theta,
    // 1-based count of the step being taken.
    k: u64,
}

impl AdamState {
    fn corrections(&self, (b1, b2): (f64, f64)) -> (f64, f64) {
        let k = i32::try_from(self.k).unwrap_or(i32::MAX);
        (1.0 - b1.powi(k), 1.0 - b2.powi(k))
    }
}

/// Adam rule.
#[derive(Debug, Clone)]
pub struct Adam {
    cfg: AdamConfig,
    state: Option<AdamState>,
}

impl Adam {
    /// Unprimed rule with configuration `cfg`.
    pub fn new(cfg: AdamConfig) -> Self {
        Self { cfg, state: None }
    }

    /// Hyperparameters in use.
    pub fn config(&self) -> &AdamConfig {
        &self.cfg
    }

    /// Bias-corrected `(m̂, v̂)` after the most recent step.
    #[cfg(test)]
    fn corrected_moments(&self) -> Option<(Theta, Theta)> {
        let st = self.state.as_ref()?;
        let (c1, c2) = st.corrections(self.cfg.beta);
        Some((&st.mk / c1, &st.vk / c2))
    }
}

impl UpdateRule for Adam {
    fn name(&self) -> &'static str {
        "adam"
    }

    fn initialize(&mut self, x0: Theta) -> OptResult<Theta> {
        if self.state.is_some() {
            return Err(OptError::RuleAlreadyPrimed);
        }
        let n = x0.len();
        self.state =
            Some(AdamState { xk: x0.clone(), mk: Theta::zeros(n), vk: Theta::zeros(n), k: 0 });
        Ok(x0)
    }

    fn step(&mut self, grad: &Grad) -> OptResult<Theta> {
        let AdamConfig { lr, beta, epsilon } = self.cfg;
        let (b1, b2) = beta;
        let st = self.state.as_mut().ok_or(OptError::RuleNotPrimed)?;
        st.k += 1;
        let (c1, c2) = st.corrections(beta);
        Zip::from(&mut st.xk).and(&mut st.mk).and(&mut st.vk).and(grad).for_each(
            |x, m, v, &g| {
                *m = b1 * *m + (1.0 - b1) * g;
                *v = b2 * *v + (1.0 - b2) * (g * g);
                let m_hat = *m / c1;
                let v_hat = (*v / c2).sqrt();
                *x -= lr * m_hat / (epsilon + v_hat);
            },
        );
        Ok(st.xk.clone())
    }
}
