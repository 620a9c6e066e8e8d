//! Loading the point-of-sale export with Polars and cleaning it into typed orders

use crate::transaction::Order;
use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use tracing::{debug, warn};

/// Timestamp layouts accepted in the order-time column
const TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M",
];

/// Header names of the columns the pipeline reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub timestamp: String,
    pub products: String,
    pub revenue: String,
    /// Optional; orders are grouped as unknown when the column is absent
    pub channel: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            timestamp: "Waktu Order".to_string(),
            products: "Produk".to_string(),
            revenue: "Total Penjualan (Rp)".to_string(),
            channel: "Jenis Order".to_string(),
        }
    }
}

/// Load a CSV export and clean every row into an [`Order`].
///
/// All columns are read as text so formatted amounts such as `Rp 25.000`
/// survive loading. Rows are never dropped: unparseable timestamps or
/// amounts become `None` and only leave the aggregations that need them.
///
/// # Arguments
/// * `file_path` - Path to the CSV file
/// * `columns` - Header names to read
pub fn load_orders(file_path: &str, columns: &ColumnNames) -> crate::Result<Vec<Order>> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(file_path.into()))?
        .finish()
        .with_context(|| format!("failed to read CSV file {file_path}"))?;

    if df.height() == 0 {
        anyhow::bail!("No orders found in {}", file_path);
    }

    orders_from_frame(&df, columns)
}

/// Convert an all-text frame into orders
pub fn orders_from_frame(df: &DataFrame, columns: &ColumnNames) -> crate::Result<Vec<Order>> {
    let timestamps = string_column(df, &columns.timestamp)?;
    let products = string_column(df, &columns.products)?;
    let revenues = string_column(df, &columns.revenue)?;
    let channels = if df.get_column_names().contains(&columns.channel.as_str()) {
        string_column(df, &columns.channel)?
    } else {
        warn!(column = %columns.channel, "channel column missing, grouping all orders as unknown");
        vec![None; df.height()]
    };

    let mut bad_timestamps = 0usize;
    let mut bad_revenues = 0usize;
    let mut orders = Vec::with_capacity(df.height());

    for (((timestamp, product), revenue), channel) in timestamps
        .into_iter()
        .zip(products)
        .zip(revenues)
        .zip(channels)
    {
        let placed_at = timestamp.as_deref().and_then(parse_timestamp);
        if placed_at.is_none() {
            bad_timestamps += 1;
        }
        let amount = revenue.as_deref().and_then(clean_revenue);
        if amount.is_none() {
            bad_revenues += 1;
        }

        orders.push(Order::new(placed_at, product, amount, channel)?);
    }

    if bad_timestamps > 0 {
        warn!(rows = bad_timestamps, "rows without a usable timestamp are left out of time series");
    }
    if bad_revenues > 0 {
        warn!(rows = bad_revenues, "rows without a usable revenue count as zero revenue");
    }
    debug!(orders = orders.len(), "loaded orders");

    Ok(orders)
}

/// Read a column as optional strings, casting non-text columns first
fn string_column(df: &DataFrame, name: &str) -> crate::Result<Vec<Option<String>>> {
    let series = df
        .column(name)
        .with_context(|| format!("required column '{name}' not found"))?
        .cast(&DataType::String)?;

    let values = series
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect();
    Ok(values)
}

/// Keep only the digits of a formatted amount: `"Rp 25.000"` becomes 25000.
/// Amounts too large to represent are treated as unusable.
pub fn clean_revenue(raw: &str) -> Option<f64> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok().filter(|value: &f64| value.is_finite())
}

/// Parse an order timestamp in any of the accepted layouts
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_local());
    }

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
