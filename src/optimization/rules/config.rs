//! Built-in rule selection: names, hyperparameter bundles, and the closed
//! [`Rule`] set.
//!
//! Three ways to name a rule, from least to most explicit:
//!
//! - a string, parsed case-insensitively into a [`RuleKind`] and built with
//!   default hyperparameters;
//! - a [`RuleConfig`] carrying validated hyperparameters;
//! - a user constructor wrapped in [`Algorithm::Custom`].
use crate::optimization::{
    descent::{Grad, Theta},
    errors::{OptError, OptResult},
    rules::{
        Adam, AdamConfig, Nag, NagConfig, RmsProp, RmsPropConfig, RuleAdapter, Sag, SagConfig,
        Sgd, SgdConfig, Smorms, SmormsConfig, UpdateRule,
    },
};
use std::{fmt, str::FromStr};

/// Names of the built-in update rules.
///
/// Parsing
/// -------
/// `FromStr` is case-insensitive and accepts:
/// - `"sgd"`, `"momentum"`
/// - `"nag"`, `"nesterov"`
/// - `"rmsprop"`
/// - `"sag"`
/// - `"smorms"`, `"smorms3"`
/// - `"adam"`
///
/// Anything else yields [`OptError::UnknownAlgorithm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Sgd,
    Nag,
    RmsProp,
    Sag,
    Smorms,
    Adam,
}

impl RuleKind {
    /// Every built-in rule, in registry order.
    pub const ALL: [RuleKind; 6] = [
        RuleKind::Sgd,
        RuleKind::Nag,
        RuleKind::RmsProp,
        RuleKind::Sag,
        RuleKind::Smorms,
        RuleKind::Adam,
    ];

    /// Lowercase registry name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Sgd => "sgd",
            RuleKind::Nag => "nag",
            RuleKind::RmsProp => "rmsprop",
            RuleKind::Sag => "sag",
            RuleKind::Smorms => "smorms",
            RuleKind::Adam => "adam",
        }
    }

    /// Default hyperparameters for this rule.
    pub fn default_config(&self) -> RuleConfig {
        match self {
            RuleKind::Sgd => RuleConfig::Sgd(SgdConfig::default()),
            RuleKind::Nag => RuleConfig::Nag(NagConfig::default()),
            RuleKind::RmsProp => RuleConfig::RmsProp(RmsPropConfig::default()),
            RuleKind::Sag => RuleConfig::Sag(SagConfig::default()),
            RuleKind::Smorms => RuleConfig::Smorms(SmormsConfig::default()),
            RuleKind::Adam => RuleConfig::Adam(AdamConfig::default()),
        }
    }
}

impl FromStr for RuleKind {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sgd" | "momentum" => Ok(RuleKind::Sgd),
            "nag" | "nesterov" => Ok(RuleKind::Nag),
            "rmsprop" => Ok(RuleKind::RmsProp),
            "sag" => Ok(RuleKind::Sag),
            "smorms" | "smorms3" => Ok(RuleKind::Smorms),
            "adam" => Ok(RuleKind::Adam),
            _ => Err(OptError::UnknownAlgorithm {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'sgd', 'nag', 'rmsprop', 'sag', \
                         'smorms' or 'adam'.",
            }),
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated hyperparameters for one built-in rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleConfig {
    Sgd(SgdConfig),
    Nag(NagConfig),
    RmsProp(RmsPropConfig),
    Sag(SagConfig),
    Smorms(SmormsConfig),
    Adam(AdamConfig),
}

impl RuleConfig {
    /// Which built-in rule this configuration selects.
    pub fn kind(&self) -> RuleKind {
        match self {
            RuleConfig::Sgd(_) => RuleKind::Sgd,
            RuleConfig::Nag(_) => RuleKind::Nag,
            RuleConfig::RmsProp(_) => RuleKind::RmsProp,
            RuleConfig::Sag(_) => RuleKind::Sag,
            RuleConfig::Smorms(_) => RuleKind::Smorms,
            RuleConfig::Adam(_) => RuleKind::Adam,
        }
    }

    /// Instantiate an unprimed rule.
    pub fn build(&self) -> Rule {
        match *self {
            RuleConfig::Sgd(c) => Rule::Sgd(Sgd::new(c)),
            RuleConfig::Nag(c) => Rule::Nag(Nag::new(c)),
            RuleConfig::RmsProp(c) => Rule::RmsProp(RmsProp::new(c)),
            RuleConfig::Sag(c) => Rule::Sag(Sag::new(c)),
            RuleConfig::Smorms(c) => Rule::Smorms(Smorms::new(c)),
            RuleConfig::Adam(c) => Rule::Adam(Adam::new(c)),
        }
    }
}

impl FromStr for RuleConfig {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<RuleKind>()?.default_config())
    }
}

/// Closed set of built-in rules.
#[derive(Debug, Clone)]
pub enum Rule {
    Sgd(Sgd),
    Nag(Nag),
    RmsProp(RmsProp),
    Sag(Sag),
    Smorms(Smorms),
    Adam(Adam),
}

impl Rule {
    fn inner(&mut self) -> &mut dyn UpdateRule {
        match self {
            Rule::Sgd(r) => r,
            Rule::Nag(r) => r,
            Rule::RmsProp(r) => r,
            Rule::Sag(r) => r,
            Rule::Smorms(r) => r,
            Rule::Adam(r) => r,
        }
    }
}

impl UpdateRule for Rule {
    fn name(&self) -> &'static str {
        match self {
            Rule::Sgd(r) => r.name(),
            Rule::Nag(r) => r.name(),
            Rule::RmsProp(r) => r.name(),
            Rule::Sag(r) => r.name(),
            Rule::Smorms(r) => r.name(),
            Rule::Adam(r) => r.name(),
        }
    }

    fn initialize(&mut self, x0: Theta) -> OptResult<Theta> {
        self.inner().initialize(x0)
    }

    fn step(&mut self, grad: &Grad) -> OptResult<Theta> {
        self.inner().step(grad)
    }
}

/// Constructor for user-defined rules: given the initial flat parameters,
/// return a primed [`RuleAdapter`].
pub type RuleConstructor = Box<dyn FnOnce(Theta) -> OptResult<RuleAdapter>>;

/// Algorithm selector accepted by the driver.
///
/// This is the single polymorphism point: built-ins are chosen by name or by
/// config, anything else plugs in through `Custom` without touching the
/// driver.
pub enum Algorithm {
    Named(String),
    Builtin(RuleConfig),
    Custom(RuleConstructor),
}

impl Algorithm {
    /// Wrap a closure producing a primed adapter.
    pub fn custom<F>(f: F) -> Self
    where
        F: FnOnce(Theta) -> OptResult<RuleAdapter> + 'static,
    {
        Algorithm::Custom(Box::new(f))
    }

    /// Resolve the selector and perform the priming handshake with `x0`.
    ///
    /// # Errors
    /// - [`OptError::UnknownAlgorithm`] for unrecognized names.
    /// - [`OptError::RuleNotPrimed`] if a custom constructor returns an
    ///   unprimed adapter.
    /// - [`OptError::ParamDimMismatch`] if a custom adapter was primed with a
    ///   vector of the wrong length.
    pub fn prime(self, x0: Theta) -> OptResult<RuleAdapter> {
        let dim = x0.len();
        let adapter = match self {
            Algorithm::Named(name) => RuleAdapter::primed(name.parse::<RuleConfig>()?.build(), x0)?,
            Algorithm::Builtin(cfg) => RuleAdapter::primed(cfg.build(), x0)?,
            Algorithm::Custom(ctor) => ctor(x0)?,
        };
        if !adapter.is_primed() {
            return Err(OptError::RuleNotPrimed);
        }
        if adapter.dim() != dim {
            return Err(OptError::ParamDimMismatch { expected: dim, found: adapter.dim() });
        }
        Ok(adapter)
    }
}

impl fmt::Debug for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Algorithm::Builtin(cfg) => f.debug_tuple("Builtin").field(cfg).finish(),
            Algorithm::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<&str> for Algorithm {
    fn from(value: &str) -> Self {
        Algorithm::Named(value.to_string())
    }
}

impl From<String> for Algorithm {
    fn from(value: String) -> Self {
        Algorithm::Named(value)
    }
}

impl From<RuleConfig> for Algorithm {
    fn from(value: RuleConfig) -> Self {
        Algorithm::Builtin(value)
    }
}

impl From<RuleKind> for Algorithm {
    fn from(value: RuleKind) -> Self {
        Algorithm::Builtin(value.default_config())
    }
}
