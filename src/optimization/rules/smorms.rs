//! SMORMS3 — RMSProp variant with a per-coordinate adaptive memory.
//!
//! Each coordinate keeps its own memory length `mem`. The running averages of
//! `g` and `g²` use `r = 1/(mem + 1)`; coordinates whose gradient is
//! consistent (large `ḡ²/g²̄`) shorten their memory and take larger steps,
//! capped at `lr`.
use crate::optimization::{
    descent::{
        Grad, Theta,
        validation::{verify_positive, verify_window},
    },
    errors::{OptError, OptResult},
    rules::UpdateRule,
};
use ndarray::Zip;

/// Hyperparameters for [`Smorms`].
///
/// Defaults: `nterms = 10`, `lr = 1e-3`, `epsilon = 1e-8`. `nterms` is
/// accepted for signature parity with [`SagConfig`](super::SagConfig) and does
/// not enter the update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmormsConfig {
    pub nterms: usize,
    pub lr: f64,
    pub epsilon: f64,
}

impl SmormsConfig {
    pub fn new(nterms: usize, lr: f64, epsilon: f64) -> OptResult<Self> {
        verify_window(nterms)?;
        verify_positive("lr", lr)?;
        verify_positive("epsilon", epsilon)?;
        Ok(Self { nterms, lr, epsilon })
    }
}

impl Default for SmormsConfig {
    fn default() -> Self {
        Self { nterms: 10, lr: 1e-3, epsilon: 1e-8 }
    }
}

#[derive(Debug, Clone)]
struct SmormsState {
    xk: Theta,
    mem: Theta,
    g: Theta,
    g2: Theta,
}

/// Memory-adaptive rule.
#[derive(Debug, Clone)]
pub struct Smorms {
    cfg: SmormsConfig,
    state: Option<SmormsState>,
}

impl Smorms {
    /// Unprimed rule with configuration `cfg`.
    pub fn new(cfg: SmormsConfig) -> Self {
        Self { cfg, state: None }
    }

    /// Hyperparameters in use.
    pub fn config(&self) -> &SmormsConfig {
        &self.cfg
    }
}

impl UpdateRule for Smorms {
    fn name(&self) -> &'static str {
        "smorms"
    }

    fn initialize(&mut self, x0: Theta) -> OptResult<Theta> {
        if self.state.is_some() {
            return Err(OptError::RuleAlreadyPrimed);
        }
        let n = x0.len();
        self.state = Some(SmormsState {
            xk: x0.clone(),
            mem: Theta::ones(n),
            g: Theta::zeros(n),
            g2: Theta::zeros(n),
        });
        Ok(x0)
    }

    fn step(&mut self, grad: &Grad) -> OptResult<Theta> {
        let SmormsConfig { lr, epsilon, .. } = self.cfg;
        let st = self.state.as_mut().ok_or(OptError::RuleNotPrimed)?;
        Zip::from(&mut st.xk)
            .and(&mut st.mem)
            .and(&mut st.g)
            .and(&mut st.g2)
            .and(grad)
            .for_each(|x, mem, g, g2, &dg| {
                let r = 1.0 / (*mem + 1.0);
                *g = (1.0 - r) * *g + r * dg;
                *g2 = (1.0 - r) * *g2 + r * (dg * dg);
                let glr = (*g * *g) / (*g2 + epsilon);
                *mem = 1.0 + *mem * (1.0 - glr);
                *x -= dg * lr.min(glr) / (g2.sqrt() + epsilon);
            });
        Ok(st.xk.clone())
    }
}
