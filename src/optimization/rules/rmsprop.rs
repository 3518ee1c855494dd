//! RMSProp — per-coordinate step sizes from a moving average of `g²`.
use crate::optimization::{
    descent::{
        Grad, Theta,
        validation::{verify_positive, verify_unit_interval},
    },
    errors::{OptError, OptResult},
    rules::UpdateRule,
};
use ndarray::Zip;

/// Hyperparameters for [`RmsProp`].
///
/// - `lr`: learning rate (default `1e-3`).
/// - `damping`: added to `√rms` before dividing, so zero gradients never
///   divide by zero (default `1e-12`).
/// - `decay`: weight of the previous average (default `0.9`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RmsPropConfig {
    pub lr: f64,
    pub damping: f64,
    pub decay: f64,
}

impl RmsPropConfig {
    pub fn new(lr: f64, damping: f64, decay: f64) -> OptResult<Self> {
        verify_positive("lr", lr)?;
        verify_positive("damping", damping)?;
        verify_unit_interval("decay", decay)?;
        Ok(Self { lr, damping, decay })
    }
}

impl Default for RmsPropConfig {
    fn default() -> Self {
        Self { lr: 1e-3, damping: 1e-12, decay: 0.9 }
    }
}

#[derive(Debug, Clone)]
struct RmsPropState {
    xk: Theta,
    rms: Theta,
}

/// RMSProp rule.
#[derive(Debug, Clone)]
pub struct RmsProp {
    cfg: RmsPropConfig,
    state: Option<RmsPropState>,
}

impl RmsProp {
    /// Unprimed rule with configuration `cfg`.
    pub fn new(cfg: RmsPropConfig) -> Self {
        Self { cfg, state: None }
    }

    /// Hyperparameters in use.
    pub fn config(&self) -> &RmsPropConfig {
        &self.cfg
    }
}

impl UpdateRule for RmsProp {
    fn name(&self) -> &'static str {
        "rmsprop"
    }

    fn initialize(&mut self, x0: Theta) -> OptResult<Theta> {
        if self.state.is_some() {
            return Err(OptError::RuleAlreadyPrimed);
        }
        let rms = Theta::zeros(x0.len());
        self.state = Some(RmsPropState { xk: x0.clone(), rms });
        Ok(x0)
    }

    fn step(&mut self, grad: &Grad) -> OptResult<Theta> {
        let RmsPropConfig { lr, damping, decay } = self.cfg;
        let st = self.state.as_mut().ok_or(OptError::RuleNotPrimed)?;
        Zip::from(&mut st.xk).and(&mut st.rms).and(grad).for_each(|x, rms, &g| {
            *rms = decay * *rms + (1.0 - decay) * (g * g);
            *x -= lr * g / (damping + rms.sqrt());
        });
        Ok(st.xk.clone())
    }
}
