//! Headline KPIs and product, weekday and channel breakdowns

use crate::temporal::{hourly_activity, DailyRevenue};
use crate::transaction::{Order, Transaction};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Label used for orders that carry no channel
pub const UNKNOWN_CHANNEL: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesSummary {
    pub total_revenue: f64,
    pub total_orders: usize,
    pub average_order_value: f64,
    /// Hour with the most orders, earliest on ties
    pub peak_hour: Option<u32>,
}

impl SalesSummary {
    pub fn compute(orders: &[Order]) -> Self {
        let total_revenue: f64 = orders.iter().map(Order::revenue_or_zero).sum();
        let total_orders = orders.len();
        let average_order_value = if total_orders > 0 {
            total_revenue / total_orders as f64
        } else {
            0.0
        };

        let peak_hour = hourly_activity(orders)
            .into_iter()
            .fold(None, |best: Option<(u32, usize)>, h| match best {
                Some((_, orders)) if orders >= h.orders => best,
                _ => Some((h.hour, h.orders)),
            })
            .map(|(hour, _)| hour);

        Self {
            total_revenue,
            total_orders,
            average_order_value,
            peak_hour,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductCount {
    pub item: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRevenue {
    pub item: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayCount {
    pub weekday: String,
    pub orders: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelRevenue {
    pub channel: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasketSizeBucket {
    pub items: usize,
    pub orders: usize,
}

/// How often each item was purchased, duplicates within an order included
pub fn product_counts(transactions: &[Transaction]) -> Vec<ProductCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for item in transactions.iter().flat_map(|t| t.items()) {
        *counts.entry(item.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<ProductCount> = counts
        .into_iter()
        .map(|(item, count)| ProductCount {
            item: item.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.item.cmp(&b.item)));
    ranked
}

/// Revenue attributed to each item. Every occurrence of an item in an order
/// is credited with that order's full revenue.
pub fn item_revenue(orders: &[Order], transactions: &[Transaction]) -> Vec<ItemRevenue> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for (order, transaction) in orders.iter().zip(transactions) {
        for item in transaction.items() {
            *totals.entry(item.as_str()).or_insert(0.0) += order.revenue_or_zero();
        }
    }

    let mut ranked: Vec<ItemRevenue> = totals
        .into_iter()
        .map(|(item, revenue)| ItemRevenue {
            item: item.to_string(),
            revenue,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.item.cmp(&b.item))
    });
    ranked
}

/// Daily attributed revenue of a single item
pub fn item_daily_trend(
    orders: &[Order],
    transactions: &[Transaction],
    item: &str,
) -> Vec<DailyRevenue> {
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (order, transaction) in orders.iter().zip(transactions) {
        let Some(placed_at) = order.placed_at else {
            continue;
        };
        let occurrences = transaction.items().iter().filter(|i| *i == item).count();
        if occurrences > 0 {
            *buckets.entry(placed_at.date()).or_insert(0.0) +=
                order.revenue_or_zero() * occurrences as f64;
        }
    }

    buckets
        .into_iter()
        .map(|(date, revenue)| DailyRevenue { date, revenue })
        .collect()
}

/// Orders per day of week, Monday first, days without orders omitted
pub fn weekday_counts(orders: &[Order]) -> Vec<WeekdayCount> {
    let mut counts: BTreeMap<u32, (Weekday, usize)> = BTreeMap::new();
    for placed_at in orders.iter().filter_map(|o| o.placed_at) {
        let weekday = placed_at.weekday();
        counts
            .entry(weekday.num_days_from_monday())
            .or_insert((weekday, 0))
            .1 += 1;
    }

    counts
        .into_values()
        .map(|(weekday, orders)| WeekdayCount {
            weekday: weekday_name(weekday).to_string(),
            orders,
        })
        .collect()
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Revenue per order channel, largest first
pub fn channel_revenue(orders: &[Order]) -> Vec<ChannelRevenue> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for order in orders {
        let channel = order
            .channel
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(UNKNOWN_CHANNEL);
        *totals.entry(channel).or_insert(0.0) += order.revenue_or_zero();
    }

    let mut ranked: Vec<ChannelRevenue> = totals
        .into_iter()
        .map(|(channel, revenue)| ChannelRevenue {
            channel: channel.to_string(),
            revenue,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.channel.cmp(&b.channel))
    });
    ranked
}

/// Histogram of how many items each order lists
pub fn items_per_order(transactions: &[Transaction]) -> Vec<BasketSizeBucket> {
    let mut histogram: BTreeMap<usize, usize> = BTreeMap::new();
    for transaction in transactions {
        *histogram.entry(transaction.len()).or_insert(0) += 1;
    }

    histogram
        .into_iter()
        .map(|(items, orders)| BasketSizeBucket { items, orders })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::parse_transactions;
    use chrono::NaiveDateTime;

    fn order(ts: &str, products: &str, revenue: f64, channel: Option<&str>) -> Order {
        Order::new(
            NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").ok(),
            Some(products.to_string()),
            Some(revenue),
            channel.map(str::to_string),
        )
        .unwrap()
    }

    fn sample() -> Vec<Order> {
        vec![
            // Monday
            order("2025-09-01 10:00:00", "Kopi, Roti", 30000.0, Some("Dine In")),
            order("2025-09-01 20:00:00", "Kopi, Kopi", 40000.0, Some("Take Away")),
            // Wednesday
            order("2025-09-03 20:30:00", "Teh", 10000.0, Some("Dine In")),
            order("2025-09-03 10:30:00", "Roti, Teh, Kopi", 20000.0, None),
        ]
    }

    #[test]
    fn test_sales_summary() {
        let summary = SalesSummary::compute(&sample());
        assert_eq!(summary.total_orders, 4);
        assert_eq!(summary.total_revenue, 100000.0);
        assert_eq!(summary.average_order_value, 25000.0);
        // 10h and 20h both have two orders; earliest wins
        assert_eq!(summary.peak_hour, Some(10));
    }

    #[test]
    fn test_empty_summary() {
        let summary = SalesSummary::compute(&[]);
        assert_eq!(summary.average_order_value, 0.0);
        assert_eq!(summary.peak_hour, None);
    }

    #[test]
    fn test_product_counts_include_duplicates() {
        let counts = product_counts(&parse_transactions(&sample()));
        assert_eq!(counts[0], ProductCount { item: "Kopi".into(), count: 4 });
        assert_eq!(counts[1].item, "Roti");
        assert_eq!(counts[2].item, "Teh");
    }

    #[test]
    fn test_item_revenue_attribution() {
        let orders = sample();
        let revenue = item_revenue(&orders, &parse_transactions(&orders));
        assert_eq!(revenue[0].item, "Kopi");
        assert_eq!(revenue[0].revenue, 130000.0);
        let teh = revenue.iter().find(|r| r.item == "Teh").unwrap();
        assert_eq!(teh.revenue, 30000.0);
    }

    #[test]
    fn test_item_daily_trend() {
        let orders = sample();
        let trend = item_daily_trend(&orders, &parse_transactions(&orders), "Roti");
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].revenue, 30000.0);
        assert_eq!(trend[1].revenue, 20000.0);
    }

    #[test]
    fn test_weekday_counts() {
        let counts = weekday_counts(&sample());
        assert_eq!(
            counts,
            vec![
                WeekdayCount { weekday: "Monday".into(), orders: 2 },
                WeekdayCount { weekday: "Wednesday".into(), orders: 2 },
            ]
        );
    }

    #[test]
    fn test_channel_revenue() {
        let channels = channel_revenue(&sample());
        // equal totals fall back to name order
        assert_eq!(channels[0].channel, "Dine In");
        assert_eq!(channels[0].revenue, 40000.0);
        assert_eq!(channels[1].channel, "Take Away");
        assert_eq!(channels[2].channel, UNKNOWN_CHANNEL);
        assert_eq!(channels[2].revenue, 20000.0);
    }

    #[test]
    fn test_items_per_order() {
        let histogram = items_per_order(&parse_transactions(&sample()));
        assert_eq!(
            histogram,
            vec![
                BasketSizeBucket { items: 1, orders: 1 },
                BasketSizeBucket { items: 2, orders: 2 },
                BasketSizeBucket { items: 3, orders: 1 },
            ]
        );
    }
}
