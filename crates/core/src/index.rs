//! Catalog-wide index of top-level declarations.

use std::collections::BTreeMap;

use apicanon_common::{DeclRef, DeclRefError};

use crate::model::ApiModule;

/// Sorted set of every constant and top-level type in a set of modules,
/// with the number of times each one is declared.
///
/// Some declarations legitimately repeat within a module (one per target
/// architecture), so repeats are counted rather than rejected.
#[derive(Debug, Clone, Default)]
pub struct DeclIndex {
    entries: BTreeMap<DeclRef, usize>,
}

impl DeclIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one declaration. Returns how many times it has now been seen.
    pub fn insert(&mut self, decl: DeclRef) -> usize {
        let count = self.entries.entry(decl).or_insert(0);
        *count += 1;
        *count
    }

    /// Record every constant and top-level type of `module`.
    pub fn add_module(&mut self, name: &str, module: &ApiModule) -> Result<(), DeclRefError> {
        let constants = module.constants.iter().map(|c| c.name.as_str());
        let types = module.types.iter().map(|t| t.name.as_str());
        for decl_name in constants.chain(types) {
            self.insert(DeclRef::new(name, decl_name)?);
        }
        Ok(())
    }

    /// Number of distinct declarations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many times the declaration with this `module:name` key was seen.
    pub fn count(&self, key: &str) -> usize {
        self.entries.get(key).copied().unwrap_or(0)
    }

    /// Distinct declarations in key order.
    pub fn iter(&self) -> impl Iterator<Item = &DeclRef> {
        self.entries.keys()
    }

    /// Declarations seen more than once, in key order.
    pub fn duplicates(&self) -> impl Iterator<Item = (&DeclRef, usize)> {
        self.entries
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(decl, count)| (decl, *count))
    }
}
