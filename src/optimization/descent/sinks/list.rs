//! In-memory storage of every iteration record.
use crate::optimization::{
    descent::{sinks::StorageSink, traits::Datum},
    errors::OptResult,
};
use std::{cell::RefCell, rc::Rc};

/// List — shared, growable record store.
///
/// Clones share the same records, so a caller can keep one handle and give
/// another to the driver:
///
/// ```rust
/// # use descent::optimization::descent::sinks::List;
/// let store = List::new();
/// let for_driver = store.clone();
/// assert!(store.is_empty() && for_driver.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct List {
    records: Rc<RefCell<Vec<Datum>>>,
}

impl List {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record, oldest first.
    pub fn records(&self) -> Vec<Datum> {
        self.records.borrow().clone()
    }

    /// Objective value of every stored record, oldest first.
    pub fn objectives(&self) -> Vec<f64> {
        self.records.borrow().iter().map(|d| d.obj).collect()
    }

    /// Most recent record, if any.
    pub fn last(&self) -> Option<Datum> {
        self.records.borrow().last().cloned()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    /// `true` when nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    /// Drop every stored record; clones see the cleared store too.
    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

impl StorageSink for List {
    fn invoke(&mut self, datum: &Datum) -> OptResult<()> {
        self.records.borrow_mut().push(datum.clone());
        Ok(())
    }
}
