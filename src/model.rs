//! Value types shared by the miner, the rule generator and the co-occurrence counter

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Interned item label. Ids are assigned in lexicographic label order, so
/// comparing ids compares labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ItemId(pub u32);

impl ItemId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A non-empty set of items stored as a sorted, duplicate-free sequence
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Itemset(Vec<ItemId>);

impl Itemset {
    pub fn new(mut items: Vec<ItemId>) -> Self {
        items.sort_unstable();
        items.dedup();
        Self(items)
    }

    pub fn singleton(item: ItemId) -> Self {
        Self(vec![item])
    }

    pub fn items(&self) -> &[ItemId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if every item of `self` appears in the sorted slice `row`
    pub fn is_contained_in(&self, row: &[ItemId]) -> bool {
        self.0.iter().all(|item| row.binary_search(item).is_ok())
    }

    pub fn union(&self, other: &Itemset) -> Itemset {
        let mut items = self.0.clone();
        items.extend_from_slice(&other.0);
        Itemset::new(items)
    }

    /// Split into the items selected by `mask` bits and the rest
    pub(crate) fn split_by_mask(&self, mask: u64) -> (Itemset, Itemset) {
        let mut selected = Vec::new();
        let mut rest = Vec::new();
        for (i, &item) in self.0.iter().enumerate() {
            if mask & (1u64 << i) != 0 {
                selected.push(item);
            } else {
                rest.push(item);
            }
        }
        (Itemset(selected), Itemset(rest))
    }
}

/// An itemset with its absolute count and its support
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequentItemset {
    pub itemset: Itemset,
    pub count: usize,
    pub support: f64,
}

impl FrequentItemset {
    pub fn len(&self) -> usize {
        self.itemset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.itemset.is_empty()
    }
}

/// Descending support, then smaller itemsets, then item order
pub(crate) fn itemset_order(a: &FrequentItemset, b: &FrequentItemset) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| a.itemset.len().cmp(&b.itemset.len()))
        .then_with(|| a.itemset.cmp(&b.itemset))
}

/// Association rule: antecedent => consequent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssociationRule {
    pub antecedent: Itemset,
    pub consequent: Itemset,
    pub antecedent_support: f64,
    pub consequent_support: f64,
    /// Support of antecedent ∪ consequent
    pub support: f64,
    /// support / antecedent_support
    pub confidence: f64,
    /// confidence / consequent_support
    pub lift: f64,
}

/// Two items bought together, stored with `first < second`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CoOccurrencePair {
    pub first: String,
    pub second: String,
    pub frequency: usize,
}

impl CoOccurrencePair {
    pub fn label(&self) -> String {
        format!("{}, {}", self.first, self.second)
    }
}
