//! Natural-shape parameter containers.
//!
//! Callers describe their parameters in whatever shape is convenient: a single
//! array of any rank, a mapping of named arrays, or an ordered sequence of
//! arrays. Update rules never see these shapes; they work on the flat
//! [`Theta`](crate::optimization::descent::Theta) produced by
//! [`Layout::destruct`](super::Layout::destruct).
use ndarray::{Array1, ArrayD};
use std::collections::BTreeMap;

/// Params — a possibly-nested numeric parameter structure.
///
/// Variants
/// --------
/// - `Array`: a single array of any rank.
/// - `Map`: named arrays. Flattening visits entries in key order.
/// - `Seq`: an ordered sequence of arrays. Flattening visits them in order.
///
/// Within each array, elements are visited in logical (row-major) order.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    Array(ArrayD<f64>),
    Map(BTreeMap<String, ArrayD<f64>>),
    Seq(Vec<ArrayD<f64>>),
}

impl Params {
    /// Total number of scalars across every array.
    pub fn size(&self) -> usize {
        match self {
            Params::Array(a) => a.len(),
            Params::Map(m) => m.values().map(|a| a.len()).sum(),
            Params::Seq(s) => s.iter().map(|a| a.len()).sum(),
        }
    }

    /// The single array, if this is `Params::Array`.
    pub fn as_array(&self) -> Option<&ArrayD<f64>> {
        match self {
            Params::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Named entry lookup for `Params::Map`.
    pub fn get(&self, name: &str) -> Option<&ArrayD<f64>> {
        match self {
            Params::Map(m) => m.get(name),
            _ => None,
        }
    }

    /// Positional lookup for `Params::Seq`.
    pub fn at(&self, index: usize) -> Option<&ArrayD<f64>> {
        match self {
            Params::Seq(s) => s.get(index),
            _ => None,
        }
    }

    /// Apply `f` to every scalar, keeping the structure.
    pub fn mapv<F: Fn(f64) -> f64 + Copy>(&self, f: F) -> Params {
        match self {
            Params::Array(a) => Params::Array(a.mapv(f)),
            Params::Map(m) => {
                Params::Map(m.iter().map(|(k, a)| (k.clone(), a.mapv(f))).collect())
            }
            Params::Seq(s) => Params::Seq(s.iter().map(|a| a.mapv(f)).collect()),
        }
    }
}

impl From<ArrayD<f64>> for Params {
    fn from(value: ArrayD<f64>) -> Self {
        Params::Array(value)
    }
}

impl From<Array1<f64>> for Params {
    fn from(value: Array1<f64>) -> Self {
        Params::Array(value.into_dyn())
    }
}

impl From<Vec<f64>> for Params {
    fn from(value: Vec<f64>) -> Self {
        Params::Array(Array1::from(value).into_dyn())
    }
}

impl From<BTreeMap<String, ArrayD<f64>>> for Params {
    fn from(value: BTreeMap<String, ArrayD<f64>>) -> Self {
        Params::Map(value)
    }
}

impl From<Vec<ArrayD<f64>>> for Params {
    fn from(value: Vec<ArrayD<f64>>) -> Self {
        Params::Seq(value)
    }
}
