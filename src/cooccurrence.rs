//! Pairwise "bought together" counting, independent of support thresholds

use crate::model::CoOccurrencePair;
use crate::transaction::Transaction;
use std::collections::HashMap;

/// Count every unordered item pair across all baskets with two or more items.
///
/// Baskets are sorted before pairing, so each pair is tallied in a single
/// orientation. Pairs are ranked by descending frequency; ties keep the order
/// in which the pair was first seen.
pub fn count_pairs(transactions: &[Transaction]) -> Vec<CoOccurrencePair> {
    let mut position: HashMap<(String, String), usize> = HashMap::new();
    let mut pairs: Vec<CoOccurrencePair> = Vec::new();

    for transaction in transactions {
        let basket = transaction.sorted_basket();
        if basket.len() < 2 {
            continue;
        }

        let items = basket.items();
        for (i, first) in items.iter().enumerate() {
            for second in &items[i + 1..] {
                let key = (first.clone(), second.clone());
                match position.get(&key) {
                    Some(&index) => pairs[index].frequency += 1,
                    None => {
                        position.insert(key, pairs.len());
                        pairs.push(CoOccurrencePair {
                            first: first.clone(),
                            second: second.clone(),
                            frequency: 1,
                        });
                    }
                }
            }
        }
    }

    // stable: equal frequencies stay in first-seen order
    pairs.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    pairs
}

/// The `n` most frequent pairs
pub fn top_pairs(pairs: &[CoOccurrencePair], n: usize) -> Vec<CoOccurrencePair> {
    pairs.iter().take(n).cloned().collect()
}
