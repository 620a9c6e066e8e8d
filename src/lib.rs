//! BasketForge: market-basket and sales-pattern analytics for café point-of-sale data
//!
//! This library turns a point-of-sale order log into frequent itemsets (FP-Growth),
//! association rules, bundle recommendations, item co-occurrence counts and
//! revenue time series.

pub mod cache;
pub mod cli;
pub mod config;
pub mod cooccurrence;
pub mod data;
pub mod encoder;
pub mod error;
pub mod miner;
pub mod model;
pub mod pipeline;
pub mod rules;
pub mod summary;
pub mod temporal;
pub mod transaction;
pub mod viz;

// Re-export public items for easier access
pub use cache::MiningCache;
pub use cli::Args;
pub use config::{MiningConfig, PipelineConfig, RuleConfig, SecondaryKey};
pub use cooccurrence::{count_pairs, top_pairs};
pub use data::{load_orders, ColumnNames};
pub use encoder::{ItemTable, ItemVocabulary};
pub use error::{AnalyticsError, AnalyticsResult};
pub use miner::FpGrowth;
pub use model::{AssociationRule, CoOccurrencePair, FrequentItemset, ItemId, Itemset};
pub use pipeline::{AnalyticsPipeline, AnalyticsReport};
pub use rules::{generate_rules, BundlePolicy, BundleRecommendation, BundleTier};
pub use temporal::moving_average;
pub use transaction::{parse_transactions, Basket, Order, Transaction};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
