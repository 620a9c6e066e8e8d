//! Memoization of miner output keyed by the content of the transaction set

use crate::config::MiningConfig;
use crate::encoder::ItemTable;
use crate::error::AnalyticsResult;
use crate::miner::FpGrowth;
use crate::model::FrequentItemset;
use sha2::{Digest, Sha256};
use std::rc::Rc;
use tracing::debug;

#[derive(Debug)]
struct CacheEntry {
    key: [u8; 32],
    itemsets: Rc<Vec<FrequentItemset>>,
}

/// Holds the itemsets mined for the latest (transactions, configuration)
/// content hash. Any change to the transaction log replaces the entry.
#[derive(Debug, Default)]
pub struct MiningCache {
    latest: Option<CacheEntry>,
}

impl MiningCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content_hash(table: &ItemTable, config: &MiningConfig) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(config.min_support.to_le_bytes());
        hasher.update((config.max_len.unwrap_or(0) as u64).to_le_bytes());

        for label in table.vocabulary().labels() {
            hasher.update((label.len() as u64).to_le_bytes());
            hasher.update(label.as_bytes());
        }
        hasher.update((table.n_transactions() as u64).to_le_bytes());
        for row in 0..table.n_transactions() {
            let items = table.row_items(row);
            hasher.update((items.len() as u64).to_le_bytes());
            for item in items {
                hasher.update(item.0.to_le_bytes());
            }
        }
        hasher.finalize().into()
    }

    /// Return cached itemsets for this content, mining on a miss
    pub fn get_or_mine(
        &mut self,
        table: &ItemTable,
        config: &MiningConfig,
    ) -> AnalyticsResult<Rc<Vec<FrequentItemset>>> {
        let key = Self::content_hash(table, config);
        if let Some(entry) = self.latest.as_ref().filter(|entry| entry.key == key) {
            debug!("mining cache hit");
            return Ok(Rc::clone(&entry.itemsets));
        }

        let itemsets = Rc::new(FpGrowth::new(*config).mine(table)?);
        self.latest = Some(CacheEntry {
            key,
            itemsets: Rc::clone(&itemsets),
        });
        Ok(itemsets)
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_none()
    }

    pub fn clear(&mut self) {
        self.latest = None;
    }
}
