//! One-hot encoding of baskets into a boolean item-presence table

use crate::model::{ItemId, Itemset};
use crate::transaction::Transaction;
use ndarray::Array2;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Bidirectional mapping between item labels and interned ids
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ItemVocabulary {
    labels: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, ItemId>,
}

impl ItemVocabulary {
    /// Collect every distinct label across all transactions, sorted
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let distinct: BTreeSet<&str> = transactions
            .iter()
            .flat_map(|t| t.items().iter().map(String::as_str))
            .collect();

        let labels: Vec<String> = distinct.into_iter().map(str::to_string).collect();
        let index = labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), ItemId(i as u32)))
            .collect();

        Self { labels, index }
    }

    pub fn id(&self, label: &str) -> Option<ItemId> {
        self.index.get(label).copied()
    }

    pub fn label(&self, id: ItemId) -> &str {
        &self.labels[id.index()]
    }

    pub fn labels_of(&self, itemset: &Itemset) -> Vec<String> {
        itemset
            .items()
            .iter()
            .map(|&id| self.label(id).to_string())
            .collect()
    }

    /// Intern a list of labels, `None` if any is unknown
    pub fn itemset(&self, labels: &[&str]) -> Option<Itemset> {
        labels
            .iter()
            .map(|label| self.id(label))
            .collect::<Option<Vec<_>>>()
            .map(Itemset::new)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// Transactions × items presence matrix
#[derive(Debug, Clone)]
pub struct ItemTable {
    vocabulary: ItemVocabulary,
    presence: Array2<bool>,
}

impl ItemTable {
    /// Encode every transaction as one row; duplicates within a row collapse
    pub fn encode(transactions: &[Transaction]) -> Self {
        let vocabulary = ItemVocabulary::from_transactions(transactions);
        let mut presence = Array2::from_elem((transactions.len(), vocabulary.len()), false);

        for (row, transaction) in transactions.iter().enumerate() {
            for label in transaction.basket().items() {
                if let Some(id) = vocabulary.id(label) {
                    presence[[row, id.index()]] = true;
                }
            }
        }

        Self {
            vocabulary,
            presence,
        }
    }

    pub fn vocabulary(&self) -> &ItemVocabulary {
        &self.vocabulary
    }

    pub fn presence(&self) -> &Array2<bool> {
        &self.presence
    }

    pub fn n_transactions(&self) -> usize {
        self.presence.nrows()
    }

    pub fn n_items(&self) -> usize {
        self.presence.ncols()
    }

    /// Sorted ids present in row `row`
    pub fn row_items(&self, row: usize) -> Vec<ItemId> {
        self.presence
            .row(row)
            .iter()
            .enumerate()
            .filter(|&(_, &present)| present)
            .map(|(col, _)| ItemId(col as u32))
            .collect()
    }

    /// Number of transactions containing every item of `itemset`, by full scan
    pub fn count_of(&self, itemset: &Itemset) -> usize {
        (0..self.n_transactions())
            .filter(|&row| itemset.is_contained_in(&self.row_items(row)))
            .count()
    }

    /// Brute-force support of `itemset`
    pub fn support_of(&self, itemset: &Itemset) -> f64 {
        if self.n_transactions() == 0 {
            return 0.0;
        }
        self.count_of(itemset) as f64 / self.n_transactions() as f64
    }
}
