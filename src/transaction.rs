//! Order records and the product-field parser that turns them into baskets

use crate::error::{AnalyticsError, AnalyticsResult};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashSet;

/// Separator between item names in the raw product field
pub const ITEM_DELIMITER: char = ',';

/// One row of the point-of-sale log with cleaned, typed values.
///
/// Every field is optional: a row missing a timestamp or revenue still
/// counts as a transaction for basket mining.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub placed_at: Option<NaiveDateTime>,
    pub products: Option<String>,
    pub revenue: Option<f64>,
    pub channel: Option<String>,
}

impl Order {
    /// Build an order, rejecting negative or non-finite revenue
    pub fn new(
        placed_at: Option<NaiveDateTime>,
        products: Option<String>,
        revenue: Option<f64>,
        channel: Option<String>,
    ) -> AnalyticsResult<Self> {
        if let Some(amount) = revenue {
            if !amount.is_finite() || amount < 0.0 {
                return Err(AnalyticsError::InvalidRecord(format!(
                    "revenue must be a non-negative number, got {amount}"
                )));
            }
        }

        Ok(Self {
            placed_at,
            products,
            revenue,
            channel,
        })
    }

    /// Revenue with missing values counted as zero
    pub fn revenue_or_zero(&self) -> f64 {
        self.revenue.unwrap_or(0.0)
    }

    pub fn transaction(&self) -> Transaction {
        Transaction::parse(self.products.as_deref())
    }
}

/// Item labels of one order as recorded, trimmed, duplicates kept
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Transaction {
    items: Vec<String>,
}

impl Transaction {
    /// Split a raw product field into trimmed, non-empty labels.
    /// A missing field yields an empty transaction.
    pub fn parse(raw: Option<&str>) -> Self {
        let items = raw
            .map(|field| {
                field
                    .split(ITEM_DELIMITER)
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self { items }
    }

    /// Build from already separated labels; delimiters inside a label are kept
    pub fn from_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let items = items
            .into_iter()
            .map(|item| item.as_ref().trim().to_string())
            .filter(|item| !item.is_empty())
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Distinct labels in first-seen order
    pub fn basket(&self) -> Basket {
        let mut seen = HashSet::with_capacity(self.items.len());
        let items = self
            .items
            .iter()
            .filter(|item| seen.insert(item.as_str()))
            .cloned()
            .collect();
        Basket { items }
    }

    /// Distinct labels in lexicographic order, the canonical form for pair counting
    pub fn sorted_basket(&self) -> Basket {
        let mut items = self.basket().items;
        items.sort();
        Basket { items }
    }
}

/// Deduplicated item labels of one transaction
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Basket {
    items: Vec<String>,
}

impl Basket {
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.items.iter().any(|item| item == label)
    }
}

/// Parse the product field of every order, one transaction per order
pub fn parse_transactions(orders: &[Order]) -> Vec<Transaction> {
    orders.iter().map(Order::transaction).collect()
}
