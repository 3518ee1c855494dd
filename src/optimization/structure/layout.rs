//! Shape descriptors and the flatten / reconstruct pair.
//!
//! A [`Layout`] is recorded once from the caller's starting parameters and then
//! reused for every conversion in a run, so shape validation happens a single
//! time instead of on every call.
use crate::optimization::{
    descent::Theta,
    errors::{OptError, OptResult},
    structure::Params,
};
use ndarray::{ArrayD, IxDyn};
use std::collections::BTreeMap;

/// Layout — closed set of shape descriptors for [`Params`].
///
/// Invariants
/// ----------
/// - `len()` equals the flat vector length of every structure the layout
///   accepts and produces; it never changes for a given layout.
/// - `Map` entries are stored in key order, matching `BTreeMap` iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    Array { shape: Vec<usize> },
    Map { entries: Vec<(String, Vec<usize>)> },
    Seq { shapes: Vec<Vec<usize>> },
}

impl Layout {
    /// Record the layout of `params`.
    pub fn of(params: &Params) -> Self {
        match params {
            Params::Array(a) => Layout::Array { shape: a.shape().to_vec() },
            Params::Map(m) => Layout::Map {
                entries: m.iter().map(|(k, a)| (k.clone(), a.shape().to_vec())).collect(),
            },
            Params::Seq(s) => {
                Layout::Seq { shapes: s.iter().map(|a| a.shape().to_vec()).collect() }
            }
        }
    }

    /// Flat vector length described by this layout.
    pub fn len(&self) -> usize {
        let numel = |shape: &Vec<usize>| shape.iter().product::<usize>();
        match self {
            Layout::Array { shape } => numel(shape),
            Layout::Map { entries } => entries.iter().map(|(_, s)| numel(s)).sum(),
            Layout::Seq { shapes } => shapes.iter().map(numel).sum(),
        }
    }

    /// `true` when the layout describes no scalars.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Verify that `params` has exactly this layout.
    ///
    /// # Errors
    /// [`OptError::LayoutMismatch`] naming the first difference found.
    pub fn check(&self, params: &Params) -> OptResult<()> {
        let found = Layout::of(params);
        if &found == self {
            return Ok(());
        }
        let reason = match (self, &found) {
            (Layout::Array { shape: a }, Layout::Array { shape: b }) => {
                format!("expected array of shape {a:?}, found {b:?}")
            }
            (Layout::Map { entries: a }, Layout::Map { entries: b }) => {
                let names = |e: &Vec<(String, Vec<usize>)>| {
                    e.iter().map(|(k, s)| format!("{k}{s:?}")).collect::<Vec<_>>().join(", ")
                };
                format!("expected map {{{}}}, found {{{}}}", names(a), names(b))
            }
            (Layout::Seq { shapes: a }, Layout::Seq { shapes: b }) => {
                format!("expected sequence {a:?}, found {b:?}")
            }
            (expected, found) => {
                format!("expected {} structure, found {}", expected.kind(), found.kind())
            }
        };
        Err(OptError::LayoutMismatch { reason })
    }

    /// Flatten `params` after checking it against this layout.
    pub fn destruct(&self, params: &Params) -> OptResult<Theta> {
        self.check(params)?;
        Ok(destruct(params))
    }

    /// Rebuild a natural-shape structure from a flat vector.
    ///
    /// # Errors
    /// [`OptError::ParamDimMismatch`] if `theta.len() != self.len()`.
    pub fn restruct(&self, theta: &Theta) -> OptResult<Params> {
        if theta.len() != self.len() {
            return Err(OptError::ParamDimMismatch { expected: self.len(), found: theta.len() });
        }
        let values = theta.to_vec();
        let mut cursor = 0;
        let params = match self {
            Layout::Array { shape } => Params::Array(take(&values, &mut cursor, shape)?),
            Layout::Map { entries } => {
                let mut out = BTreeMap::new();
                for (name, shape) in entries {
                    out.insert(name.clone(), take(&values, &mut cursor, shape)?);
                }
                Params::Map(out)
            }
            Layout::Seq { shapes } => {
                let mut out = Vec::with_capacity(shapes.len());
                for shape in shapes {
                    out.push(take(&values, &mut cursor, shape)?);
                }
                Params::Seq(out)
            }
        };
        Ok(params)
    }

    fn kind(&self) -> &'static str {
        match self {
            Layout::Array { .. } => "array",
            Layout::Map { .. } => "map",
            Layout::Seq { .. } => "sequence",
        }
    }
}

/// Flatten any supported structure into a one-dimensional vector.
pub fn destruct(params: &Params) -> Theta {
    match params {
        Params::Array(a) => a.iter().copied().collect(),
        Params::Map(m) => m.values().flat_map(|a| a.iter().copied()).collect(),
        Params::Seq(s) => s.iter().flat_map(|a| a.iter().copied()).collect(),
    }
}

/// Rebuild the shape recorded by `template` from a flat vector.
pub fn restruct(theta: &Theta, template: &Params) -> OptResult<Params> {
    Layout::of(template).restruct(theta)
}

fn take(values: &[f64], cursor: &mut usize, shape: &[usize]) -> OptResult<ArrayD<f64>> {
    let n: usize = shape.iter().product();
    let chunk = values[*cursor..*cursor + n].to_vec();
    *cursor += n;
    Ok(ArrayD::from_shape_vec(IxDyn(shape), chunk)?)
}
