use std::collections::HashMap;

use crate::domain::requirements::bit_set::BitSet;
use crate::domain::requirements::category::{CategoryTag, ResourceCategory};

/// Interns resource type names into stable, per-category bit indices.
///
/// Bits are handed out in first-seen order, so loading the same declarations twice yields the same bits.
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    /// Bit index lookup using (category, resource name).
    name_index: HashMap<(ResourceCategory, String), usize>,

    /// Reverse lookup, the position in the vector is the bit index.
    names: HashMap<ResourceCategory, Vec<String>>,
}

impl ResourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bit of `name` in `category`, registering it on first use.
    pub fn intern(&mut self, category: ResourceCategory, name: &str) -> usize {
        if let Some(bit) = self.name_index.get(&(category, name.to_string())) {
            return *bit;
        }
        let names = self.names.entry(category).or_default();
        let bit = names.len();
        names.push(name.to_string());
        self.name_index.insert((category, name.to_string()), bit);
        bit
    }

    pub fn get(&self, category: ResourceCategory, name: &str) -> Option<usize> {
        self.name_index.get(&(category, name.to_string())).copied()
    }

    pub fn get_name(&self, category: ResourceCategory, bit: usize) -> Option<&str> {
        self.names.get(&category).and_then(|names| names.get(bit)).map(String::as_str)
    }

    pub fn len(&self, category: ResourceCategory) -> usize {
        self.names.get(&category).map_or(0, Vec::len)
    }

    /// Builds a bit set for `C` from names, interning unknown ones.
    pub fn bit_set<C: CategoryTag>(&mut self, names: &[String]) -> BitSet<C> {
        names.iter().map(|name| self.intern(C::CATEGORY, name)).collect()
    }

    /// Human readable names of the bits in `set`, unknown bits rendered as `#<bit>`.
    pub fn describe<C: CategoryTag>(&self, set: &BitSet<C>) -> Vec<String> {
        set.iter().map(|bit| self.get_name(C::CATEGORY, bit).map_or_else(|| format!("#{}", bit), str::to_string)).collect()
    }
}
