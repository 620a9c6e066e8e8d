//! Command-line interface definitions and argument parsing

use crate::config::{MiningConfig, PipelineConfig, RuleConfig, SecondaryKey};
use crate::data::ColumnNames;
use crate::rules::BundlePolicy;
use clap::Parser;
use std::path::Path;

/// Market-basket and sales-pattern analytics for café point-of-sale exports
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "transactions.csv")]
    pub input: String,

    /// Minimum support for frequent itemsets (fraction of transactions)
    #[arg(long, default_value = "0.01")]
    pub min_support: f64,

    /// Minimum confidence for association rules
    #[arg(long, default_value = "0.2")]
    pub min_confidence: f64,

    /// Optional minimum lift for association rules
    #[arg(long)]
    pub min_lift: Option<f64>,

    /// Largest itemset size to mine
    #[arg(long)]
    pub max_len: Option<usize>,

    /// Minimum confidence for a rule to become a bundle recommendation
    #[arg(long, default_value = "0.3")]
    pub bundle_confidence: f64,

    /// Minimum lift for a rule to become a bundle recommendation
    #[arg(long, default_value = "1.2")]
    pub bundle_lift: f64,

    /// Number of entries shown in ranked tables
    #[arg(short, long, default_value = "10")]
    pub top: usize,

    /// Window of the monthly moving average
    #[arg(long, default_value = "3")]
    pub window: usize,

    /// Output path for the monthly trend chart; the hourly chart is written
    /// next to it with an `_hourly` suffix
    #[arg(short, long)]
    pub output: Option<String>,

    /// Write the full report as JSON to this path
    #[arg(long)]
    pub json: Option<String>,

    /// Header of the order timestamp column
    #[arg(long, default_value = "Waktu Order")]
    pub timestamp_column: String,

    /// Header of the comma-separated products column
    #[arg(long, default_value = "Produk")]
    pub products_column: String,

    /// Header of the revenue column
    #[arg(long, default_value = "Total Penjualan (Rp)")]
    pub revenue_column: String,

    /// Header of the order type column
    #[arg(long, default_value = "Jenis Order")]
    pub channel_column: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Assemble the pipeline configuration; validation happens in the pipeline
    pub fn pipeline_config(&self) -> PipelineConfig {
        let mut mining = MiningConfig::new(self.min_support);
        mining.max_len = self.max_len;

        let mut rules = RuleConfig::new(self.min_confidence).with_secondary(SecondaryKey::Lift);
        rules.min_lift = self.min_lift;

        PipelineConfig {
            mining,
            rules,
            bundle: BundlePolicy {
                min_confidence: self.bundle_confidence,
                min_lift: self.bundle_lift,
                ..BundlePolicy::default()
            },
            top_pairs: self.top,
            top_products: self.top.min(5),
            moving_average_window: self.window,
        }
    }

    pub fn column_names(&self) -> ColumnNames {
        ColumnNames {
            timestamp: self.timestamp_column.clone(),
            products: self.products_column.clone(),
            revenue: self.revenue_column.clone(),
            channel: self.channel_column.clone(),
        }
    }

    /// Path of the hourly chart derived from `--output`
    pub fn hourly_chart_path(&self) -> Option<String> {
        let path = Path::new(self.output.as_deref()?);
        let stem = path.file_stem()?.to_string_lossy();
        let name = match path.extension() {
            Some(ext) => format!("{stem}_hourly.{}", ext.to_string_lossy()),
            None => format!("{stem}_hourly"),
        };
        Some(path.with_file_name(name).to_string_lossy().into_owned())
    }
}
