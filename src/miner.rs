//! Frequent itemset mining with FP-Growth
//!
//! Transactions are compressed into a prefix tree whose paths share common
//! prefixes of items ordered by descending frequency. Itemsets are then
//! enumerated by recursively mining conditional trees, one per item, so no
//! candidate itemset is ever generated without support behind it.
//!
//! # Example
//!
//! ```
//! use basketforge::{FpGrowth, ItemTable, MiningConfig, Transaction};
//!
//! let transactions: Vec<Transaction> = ["A,B", "A,B", "A,C", "B,C"]
//!     .iter()
//!     .map(|raw| Transaction::parse(Some(*raw)))
//!     .collect();
//! let table = ItemTable::encode(&transactions);
//!
//! let itemsets = FpGrowth::new(MiningConfig::new(0.25)).mine(&table).unwrap();
//! assert_eq!(itemsets.len(), 6);
//! assert_eq!(itemsets[0].support, 0.75);
//! ```

use crate::config::MiningConfig;
use crate::encoder::ItemTable;
use crate::error::AnalyticsResult;
use crate::model::{itemset_order, FrequentItemset, ItemId, Itemset};
use std::collections::HashMap;
use tracing::debug;

/// A path of items with the number of transactions sharing it
type WeightedPath = (Vec<ItemId>, usize);

#[derive(Debug)]
struct FpNode {
    /// `None` only for the root
    item: Option<ItemId>,
    count: usize,
    parent: Option<usize>,
    children: Vec<usize>,
}

#[derive(Debug)]
struct HeaderEntry {
    item: ItemId,
    count: usize,
    /// Every node in the tree that carries `item`
    nodes: Vec<usize>,
}

/// Arena-allocated FP-tree; node 0 is the root
#[derive(Debug)]
struct FpTree {
    nodes: Vec<FpNode>,
    /// Frequent items by descending count, ties by id
    header: Vec<HeaderEntry>,
    rank: HashMap<ItemId, usize>,
}

impl FpTree {
    /// Build a tree from weighted paths, keeping only items reaching `min_count`.
    /// Returns `None` when no item survives.
    fn build(paths: &[WeightedPath], min_count: usize) -> Option<Self> {
        let mut counts: HashMap<ItemId, usize> = HashMap::new();
        for (items, weight) in paths {
            for &item in items {
                *counts.entry(item).or_insert(0) += weight;
            }
        }

        let mut frequent: Vec<(ItemId, usize)> = counts
            .into_iter()
            .filter(|&(_, count)| count >= min_count)
            .collect();
        if frequent.is_empty() {
            return None;
        }
        frequent.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let rank = frequent
            .iter()
            .enumerate()
            .map(|(r, &(item, _))| (item, r))
            .collect();
        let header = frequent
            .iter()
            .map(|&(item, count)| HeaderEntry {
                item,
                count,
                nodes: Vec::new(),
            })
            .collect();

        let mut tree = Self {
            nodes: vec![FpNode {
                item: None,
                count: 0,
                parent: None,
                children: Vec::new(),
            }],
            header,
            rank,
        };

        for (items, weight) in paths {
            let mut ordered: Vec<(usize, ItemId)> = items
                .iter()
                .filter_map(|item| tree.rank.get(item).map(|&r| (r, *item)))
                .collect();
            ordered.sort_unstable();
            tree.insert(&ordered, *weight);
        }

        Some(tree)
    }

    fn insert(&mut self, ranked_items: &[(usize, ItemId)], weight: usize) {
        let mut current = 0;
        for &(rank, item) in ranked_items {
            let existing = self.nodes[current]
                .children
                .iter()
                .copied()
                .find(|&child| self.nodes[child].item == Some(item));

            let child = match existing {
                Some(child) => child,
                None => {
                    let index = self.nodes.len();
                    self.nodes.push(FpNode {
                        item: Some(item),
                        count: 0,
                        parent: Some(current),
                        children: Vec::new(),
                    });
                    self.nodes[current].children.push(index);
                    self.header[rank].nodes.push(index);
                    index
                }
            };

            self.nodes[child].count += weight;
            current = child;
        }
    }

    /// Items on the path from `node`'s parent up to the root
    fn prefix_path(&self, node: usize) -> Vec<ItemId> {
        let mut path = Vec::new();
        let mut cursor = self.nodes[node].parent;
        while let Some(index) = cursor {
            if let Some(item) = self.nodes[index].item {
                path.push(item);
            }
            cursor = self.nodes[index].parent;
        }
        path
    }

    /// Conditional pattern base of the header entry at `rank`
    fn conditional_base(&self, rank: usize) -> Vec<WeightedPath> {
        self.header[rank]
            .nodes
            .iter()
            .map(|&node| (self.prefix_path(node), self.nodes[node].count))
            .filter(|(path, _)| !path.is_empty())
            .collect()
    }
}

/// FP-Growth frequent itemset miner
#[derive(Debug, Clone)]
pub struct FpGrowth {
    config: MiningConfig,
}

impl FpGrowth {
    pub fn new(config: MiningConfig) -> Self {
        Self { config }
    }

    /// Mine every itemset with `support >= min_support`.
    ///
    /// Returns itemsets sorted by descending support, then by size, then by
    /// item order. An invalid configuration fails before any counting.
    pub fn mine(&self, table: &ItemTable) -> AnalyticsResult<Vec<FrequentItemset>> {
        self.config.validate()?;

        let n = table.n_transactions();
        if n == 0 || table.n_items() == 0 {
            return Ok(Vec::new());
        }
        let min_count = min_count(self.config.min_support, n);

        // identical rows collapse into one weighted path
        let mut grouped: HashMap<Vec<ItemId>, usize> = HashMap::new();
        for row in 0..n {
            let items = table.row_items(row);
            if !items.is_empty() {
                *grouped.entry(items).or_insert(0) += 1;
            }
        }
        let paths: Vec<WeightedPath> = grouped.into_iter().collect();

        let mut found = Vec::new();
        if let Some(tree) = FpTree::build(&paths, min_count) {
            debug!(
                nodes = tree.nodes.len(),
                frequent_items = tree.header.len(),
                min_count,
                "built FP-tree"
            );
            self.grow(&tree, &[], min_count, &mut found);
        }

        let mut itemsets: Vec<FrequentItemset> = found
            .into_iter()
            .map(|(items, count)| FrequentItemset {
                itemset: Itemset::new(items),
                count,
                support: count as f64 / n as f64,
            })
            .collect();
        itemsets.sort_by(itemset_order);

        debug!(itemsets = itemsets.len(), "mined frequent itemsets");
        Ok(itemsets)
    }

    fn grow(
        &self,
        tree: &FpTree,
        suffix: &[ItemId],
        min_count: usize,
        found: &mut Vec<WeightedPath>,
    ) {
        // least frequent first, so each conditional base only looks upward
        for rank in (0..tree.header.len()).rev() {
            let entry = &tree.header[rank];
            let mut itemset = suffix.to_vec();
            itemset.push(entry.item);
            found.push((itemset.clone(), entry.count));

            if self.config.max_len.is_some_and(|max| itemset.len() >= max) {
                continue;
            }

            let base = tree.conditional_base(rank);
            if let Some(conditional) = FpTree::build(&base, min_count) {
                self.grow(&conditional, &itemset, min_count, found);
            }
        }
    }
}

/// Smallest count `c` with `c / n >= min_support`, never below 1
pub(crate) fn min_count(min_support: f64, n: usize) -> usize {
    let total = n as f64;
    let mut count = (min_support * total).ceil().max(1.0) as usize;
    while count > 1 && (count - 1) as f64 / total >= min_support {
        count -= 1;
    }
    while (count as f64 / total) < min_support && count <= n {
        count += 1;
    }
    count
}
