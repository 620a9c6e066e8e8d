//! Time-bucketed revenue rollups and trailing moving averages

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::transaction::Order;
use chrono::{Datelike, NaiveDate, Timelike};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyActivity {
    /// Hour of day, 0-23
    pub hour: u32,
    pub orders: usize,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month: u32,
    pub revenue: f64,
}

/// Short month label such as `Sep 2025`
pub fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{year}-{month:02}"))
}

/// Revenue per calendar date; orders without a timestamp are skipped
pub fn daily_revenue(orders: &[Order]) -> Vec<DailyRevenue> {
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for order in orders {
        if let Some(placed_at) = order.placed_at {
            *buckets.entry(placed_at.date()).or_insert(0.0) += order.revenue_or_zero();
        }
    }

    buckets
        .into_iter()
        .map(|(date, revenue)| DailyRevenue { date, revenue })
        .collect()
}

/// Order count and revenue per hour of day, only for hours that saw orders
pub fn hourly_activity(orders: &[Order]) -> Vec<HourlyActivity> {
    let mut buckets: BTreeMap<u32, (usize, f64)> = BTreeMap::new();
    for order in orders {
        if let Some(placed_at) = order.placed_at {
            let bucket = buckets.entry(placed_at.hour()).or_insert((0, 0.0));
            bucket.0 += 1;
            bucket.1 += order.revenue_or_zero();
        }
    }

    buckets
        .into_iter()
        .map(|(hour, (orders, revenue))| HourlyActivity {
            hour,
            orders,
            revenue,
        })
        .collect()
}

/// Revenue per (year, month) in chronological order. Months without
/// orders are absent rather than zero.
pub fn monthly_revenue(orders: &[Order]) -> Vec<MonthlyRevenue> {
    let mut buckets: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for order in orders {
        if let Some(placed_at) = order.placed_at {
            let key = (placed_at.year(), placed_at.month());
            *buckets.entry(key).or_insert(0.0) += order.revenue_or_zero();
        }
    }

    buckets
        .into_iter()
        .map(|((year, month), revenue)| MonthlyRevenue {
            year,
            month,
            revenue,
        })
        .collect()
}

/// Trailing mean over `window` points; the first `window - 1` are `None`
pub fn moving_average(values: &[f64], window: usize) -> AnalyticsResult<Vec<Option<f64>>> {
    if window == 0 {
        return Err(AnalyticsError::InvalidParameter {
            param: "window",
            reason: "must be at least 1".to_string(),
        });
    }

    Ok((0..values.len())
        .map(|i| {
            (i + 1 >= window).then(|| {
                let slice = &values[i + 1 - window..=i];
                slice.iter().sum::<f64>() / window as f64
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use proptest::prelude::*;

    fn order(ts: &str, revenue: Option<f64>) -> Order {
        let placed_at = NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").ok();
        Order::new(placed_at, Some("Kopi".to_string()), revenue, None).unwrap()
    }

    fn orders() -> Vec<Order> {
        vec![
            order("2025-09-02 20:15:00", Some(30000.0)),
            order("2025-09-01 09:00:00", Some(15000.0)),
            order("2025-09-01 20:45:00", None),
            order("2025-11-10 20:05:00", Some(20000.0)),
            order("not a timestamp", Some(99999.0)),
            order("2024-12-31 23:59:59", Some(5000.0)),
        ]
    }

    #[test]
    fn test_daily_revenue() {
        let daily = daily_revenue(&orders());
        let dates: Vec<String> = daily.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-12-31", "2025-09-01", "2025-09-02", "2025-11-10"]);
        assert_eq!(daily[1].revenue, 15000.0);
    }

    #[test]
    fn test_hourly_activity_counts_orders_without_revenue() {
        let hourly = hourly_activity(&orders());
        let evening = hourly.iter().find(|h| h.hour == 20).unwrap();
        assert_eq!(evening.orders, 3);
        assert_eq!(evening.revenue, 50000.0);
        assert!(hourly.windows(2).all(|w| w[0].hour < w[1].hour));
        assert_eq!(hourly.iter().map(|h| h.orders).sum::<usize>(), 5);
    }

    #[test]
    fn test_monthly_is_chronological_and_sparse() {
        let monthly = monthly_revenue(&orders());
        let keys: Vec<(i32, u32)> = monthly.iter().map(|m| (m.year, m.month)).collect();
        assert_eq!(keys, vec![(2024, 12), (2025, 9), (2025, 11)]);
        assert_eq!(monthly[1].revenue, 45000.0);
        assert_eq!(month_label(monthly[1].year, monthly[1].month), "Sep 2025");
        assert_eq!(month_label(2025, 13), "2025-13");
    }

    #[test]
    fn test_moving_average_window_three() {
        let ma = moving_average(&[3.0, 6.0, 9.0, 12.0], 3).unwrap();
        assert_eq!(ma, vec![None, None, Some(6.0), Some(9.0)]);
    }

    #[test]
    fn test_moving_average_short_series() {
        assert_eq!(moving_average(&[1.0, 2.0], 3).unwrap(), vec![None, None]);
        assert!(moving_average(&[], 3).unwrap().is_empty());
        assert!(moving_average(&[1.0], 0).is_err());
    }

    proptest! {
        #[test]
        fn prop_moving_average_defined_count(values in prop::collection::vec(0.0f64..1e6, 0..30)) {
            let ma = moving_average(&values, 3).unwrap();
            prop_assert_eq!(ma.len(), values.len());
            prop_assert_eq!(ma.iter().filter(|v| v.is_some()).count(), values.len().saturating_sub(2));

            for (i, value) in ma.iter().enumerate() {
                if let Some(mean) = value {
                    let expected = (values[i - 2] + values[i - 1] + values[i]) / 3.0;
                    prop_assert!((mean - expected).abs() < 1e-6);
                }
            }
        }
    }
}
