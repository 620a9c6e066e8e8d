//! The analytics pipeline: each stage takes the previous stage's output and
//! returns a new value, and the final report is plain serializable data

use crate::cache::MiningCache;
use crate::config::PipelineConfig;
use crate::cooccurrence::{count_pairs, top_pairs};
use crate::encoder::{ItemTable, ItemVocabulary};
use crate::error::AnalyticsResult;
use crate::model::{AssociationRule, CoOccurrencePair, FrequentItemset};
use crate::rules::{generate_rules, BundleRecommendation, BundleTier};
use crate::summary::{
    channel_revenue, item_daily_trend, item_revenue, items_per_order, product_counts,
    weekday_counts, BasketSizeBucket, ChannelRevenue, ItemRevenue, ProductCount, SalesSummary,
    WeekdayCount,
};
use crate::temporal::{
    daily_revenue, hourly_activity, monthly_revenue, moving_average, DailyRevenue, HourlyActivity,
    MonthlyRevenue,
};
use crate::transaction::{parse_transactions, Order};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledItemset {
    pub items: Vec<String>,
    pub support: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledRule {
    pub antecedent: Vec<String>,
    pub consequent: Vec<String>,
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledRecommendation {
    pub antecedent: Vec<String>,
    pub consequent: Vec<String>,
    pub confidence: f64,
    pub lift: f64,
    pub tier: BundleTier,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrendPoint {
    pub year: i32,
    pub month: u32,
    pub revenue: f64,
    pub moving_average: Option<f64>,
}

/// Item trend for the item with the largest attributed revenue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopItemTrend {
    pub item: String,
    pub daily: Vec<DailyRevenue>,
}

/// Render-agnostic output of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub summary: SalesSummary,
    pub top_products: Vec<ProductCount>,
    pub item_revenue: Vec<ItemRevenue>,
    pub top_item_trend: Option<TopItemTrend>,
    pub weekday_orders: Vec<WeekdayCount>,
    pub channel_revenue: Vec<ChannelRevenue>,
    pub items_per_order: Vec<BasketSizeBucket>,
    pub frequent_itemsets: Vec<LabeledItemset>,
    pub rules: Vec<LabeledRule>,
    pub bundle_rules: Vec<LabeledRule>,
    pub recommendations: Vec<LabeledRecommendation>,
    pub top_pairs: Vec<CoOccurrencePair>,
    pub daily_revenue: Vec<DailyRevenue>,
    pub hourly_activity: Vec<HourlyActivity>,
    pub monthly_trend: Vec<MonthlyTrendPoint>,
}

/// Runs every analysis stage over a materialized order log
#[derive(Debug)]
pub struct AnalyticsPipeline {
    config: PipelineConfig,
    cache: MiningCache,
}

impl AnalyticsPipeline {
    /// Validate the configuration; nothing runs with invalid thresholds
    pub fn new(config: PipelineConfig) -> AnalyticsResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cache: MiningCache::new(),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(&mut self, orders: &[Order]) -> AnalyticsResult<AnalyticsReport> {
        let transactions = parse_transactions(orders);

        let table = ItemTable::encode(&transactions);
        let itemsets = self.cache.get_or_mine(&table, &self.config.mining)?;
        let rules = generate_rules(&itemsets, &self.config.rules)?;
        let bundle_rules = self.config.bundle.apply(&rules);
        let recommendations = self.config.bundle.recommend(&bundle_rules);

        let pairs = count_pairs(&transactions);

        let monthly = monthly_revenue(orders);
        let monthly_trend = monthly_trend(&monthly, self.config.moving_average_window)?;

        let item_revenue = item_revenue(orders, &transactions);
        let top_item_trend = item_revenue.first().map(|top| TopItemTrend {
            item: top.item.clone(),
            daily: item_daily_trend(orders, &transactions, &top.item),
        });

        let mut top_products = product_counts(&transactions);
        top_products.truncate(self.config.top_products);

        let vocabulary = table.vocabulary();
        let report = AnalyticsReport {
            summary: SalesSummary::compute(orders),
            top_products,
            item_revenue,
            top_item_trend,
            weekday_orders: weekday_counts(orders),
            channel_revenue: channel_revenue(orders),
            items_per_order: items_per_order(&transactions),
            frequent_itemsets: label_itemsets(vocabulary, &itemsets),
            rules: label_rules(vocabulary, &rules),
            bundle_rules: label_rules(vocabulary, &bundle_rules),
            recommendations: label_recommendations(vocabulary, &recommendations),
            top_pairs: top_pairs(&pairs, self.config.top_pairs),
            daily_revenue: daily_revenue(orders),
            hourly_activity: hourly_activity(orders),
            monthly_trend,
        };

        info!(
            orders = orders.len(),
            items = vocabulary.len(),
            itemsets = report.frequent_itemsets.len(),
            rules = report.rules.len(),
            bundles = report.bundle_rules.len(),
            "analytics pipeline complete"
        );
        Ok(report)
    }
}

fn monthly_trend(
    monthly: &[MonthlyRevenue],
    window: usize,
) -> AnalyticsResult<Vec<MonthlyTrendPoint>> {
    let values: Vec<f64> = monthly.iter().map(|m| m.revenue).collect();
    let averages = moving_average(&values, window)?;

    Ok(monthly
        .iter()
        .zip(averages)
        .map(|(m, moving_average)| MonthlyTrendPoint {
            year: m.year,
            month: m.month,
            revenue: m.revenue,
            moving_average,
        })
        .collect())
}

fn label_itemsets(vocabulary: &ItemVocabulary, itemsets: &[FrequentItemset]) -> Vec<LabeledItemset> {
    itemsets
        .iter()
        .map(|f| LabeledItemset {
            items: vocabulary.labels_of(&f.itemset),
            support: f.support,
        })
        .collect()
}

fn label_rules(vocabulary: &ItemVocabulary, rules: &[AssociationRule]) -> Vec<LabeledRule> {
    rules
        .iter()
        .map(|r| LabeledRule {
            antecedent: vocabulary.labels_of(&r.antecedent),
            consequent: vocabulary.labels_of(&r.consequent),
            support: r.support,
            confidence: r.confidence,
            lift: r.lift,
        })
        .collect()
}

fn label_recommendations(
    vocabulary: &ItemVocabulary,
    recommendations: &[BundleRecommendation],
) -> Vec<LabeledRecommendation> {
    recommendations
        .iter()
        .map(|r| LabeledRecommendation {
            antecedent: vocabulary.labels_of(&r.antecedent),
            consequent: vocabulary.labels_of(&r.consequent),
            confidence: r.confidence,
            lift: r.lift,
            tier: r.tier,
            action: r.tier.action().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MiningConfig, RuleConfig};
    use crate::error::AnalyticsError;
    use chrono::NaiveDateTime;

    fn order(ts: &str, products: &str, revenue: f64) -> Order {
        Order::new(
            NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").ok(),
            Some(products.to_string()),
            Some(revenue),
            Some("Dine In".to_string()),
        )
        .unwrap()
    }

    fn reference_orders() -> Vec<Order> {
        vec![
            order("2025-08-10 19:00:00", "A, B", 20000.0),
            order("2025-09-11 20:00:00", "B, A", 25000.0),
            order("2025-10-12 20:30:00", "A, C", 15000.0),
            order("2025-11-13 21:00:00", "B, C", 10000.0),
        ]
    }

    fn reference_config() -> PipelineConfig {
        PipelineConfig {
            mining: MiningConfig::new(0.25),
            rules: RuleConfig::new(0.1),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_reference_run() {
        let mut pipeline = AnalyticsPipeline::new(reference_config()).unwrap();
        let report = pipeline.run(&reference_orders()).unwrap();

        let ab = report
            .frequent_itemsets
            .iter()
            .find(|f| f.items == ["A", "B"])
            .unwrap();
        assert_eq!(ab.support, 0.5);

        assert_eq!(report.top_pairs[0].label(), "A, B");
        assert_eq!(report.top_pairs[0].frequency, 2);

        assert_eq!(report.summary.total_orders, 4);
        assert_eq!(report.summary.total_revenue, 70000.0);
        assert_eq!(report.summary.peak_hour, Some(20));

        assert_eq!(report.monthly_trend.len(), 4);
        assert_eq!(report.monthly_trend[1].moving_average, None);
        assert_eq!(report.monthly_trend[2].moving_average, Some(20000.0));
    }

    #[test]
    fn test_rerun_uses_cache() {
        let mut pipeline = AnalyticsPipeline::new(reference_config()).unwrap();
        let first = pipeline.run(&reference_orders()).unwrap();
        let second = pipeline.run(&reference_orders()).unwrap();
        assert_eq!(first, second);
        assert!(!pipeline.cache.is_empty());
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = PipelineConfig {
            mining: MiningConfig::new(0.0),
            ..PipelineConfig::default()
        };
        let err = AnalyticsPipeline::new(config).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidThreshold { .. }));
    }

    #[test]
    fn test_empty_log_gives_empty_report() {
        let mut pipeline = AnalyticsPipeline::new(PipelineConfig::default()).unwrap();
        let report = pipeline.run(&[]).unwrap();
        assert!(report.frequent_itemsets.is_empty());
        assert!(report.rules.is_empty());
        assert!(report.recommendations.is_empty());
        assert!(report.top_pairs.is_empty());
        assert!(report.monthly_trend.is_empty());
        assert!(report.top_item_trend.is_none());
        assert_eq!(report.summary.average_order_value, 0.0);
    }

    #[test]
    fn test_report_serializes() {
        let mut pipeline = AnalyticsPipeline::new(reference_config()).unwrap();
        let report = pipeline.run(&reference_orders()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["frequent_itemsets"].is_array());
        assert_eq!(json["summary"]["total_orders"], 4);
    }
}
