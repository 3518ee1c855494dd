//! structure — natural parameter shapes and their flat-vector form.
//!
//! Update rules operate on one flat `f64` vector. Callers think in terms of
//! arrays, named arrays, or lists of arrays. This module is the bridge:
//!
//! - [`Params`] holds the natural structure.
//! - [`Layout`] records the shape once and converts in both directions.
//! - [`destruct`] / [`restruct`] are the free-function forms, satisfying
//!   `restruct(&destruct(&x), &x) == x` for every supported shape.

pub mod layout;
pub mod params;

pub use self::layout::{Layout, destruct, restruct};
pub use self::params::Params;
