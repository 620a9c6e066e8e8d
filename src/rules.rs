//! Association rule generation from mined itemsets, plus the bundling policy
//! that narrows rules down to actionable recommendations

use crate::config::{validate_ratio, RuleConfig, SecondaryKey};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::model::{AssociationRule, FrequentItemset, Itemset};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Itemsets larger than this are not split into rules
const MAX_RULE_ITEMSET_LEN: usize = 63;

/// Derive every rule `antecedent => consequent` from the mined itemsets.
///
/// Supports of antecedents and consequents are taken from `itemsets`; by
/// downward closure every subset of a frequent itemset is itself present.
/// A split whose subset supports are missing or zero is skipped.
pub fn generate_rules(
    itemsets: &[FrequentItemset],
    config: &RuleConfig,
) -> AnalyticsResult<Vec<AssociationRule>> {
    config.validate()?;

    let supports: HashMap<&Itemset, f64> = itemsets
        .iter()
        .map(|f| (&f.itemset, f.support))
        .collect();

    let mut rules = Vec::new();
    for frequent in itemsets {
        let k = frequent.itemset.len();
        if !(2..=MAX_RULE_ITEMSET_LEN).contains(&k) {
            continue;
        }

        // every non-empty proper subset as antecedent
        for mask in 1..((1u64 << k) - 1) {
            let (antecedent, consequent) = frequent.itemset.split_by_mask(mask);

            let (Some(&antecedent_support), Some(&consequent_support)) =
                (supports.get(&antecedent), supports.get(&consequent))
            else {
                debug!(?antecedent, ?consequent, "skipping rule with unmined subset");
                continue;
            };
            if antecedent_support <= 0.0 || consequent_support <= 0.0 {
                continue;
            }

            let confidence = frequent.support / antecedent_support;
            if confidence < config.min_confidence {
                continue;
            }
            let lift = confidence / consequent_support;
            if config.min_lift.is_some_and(|min| lift < min) {
                continue;
            }

            rules.push(AssociationRule {
                antecedent,
                consequent,
                antecedent_support,
                consequent_support,
                support: frequent.support,
                confidence,
                lift,
            });
        }
    }

    rules.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| secondary_order(a, b, config.secondary))
            .then_with(|| structural_order(a, b))
    });

    debug!(rules = rules.len(), "generated association rules");
    Ok(rules)
}

fn secondary_order(a: &AssociationRule, b: &AssociationRule, key: SecondaryKey) -> Ordering {
    match key {
        SecondaryKey::None => Ordering::Equal,
        SecondaryKey::Lift => b.lift.total_cmp(&a.lift),
        SecondaryKey::Support => b.support.total_cmp(&a.support),
    }
}

/// Smaller antecedents first, then label order of antecedent and consequent
fn structural_order(a: &AssociationRule, b: &AssociationRule) -> Ordering {
    a.antecedent
        .len()
        .cmp(&b.antecedent.len())
        .then_with(|| a.antecedent.cmp(&b.antecedent))
        .then_with(|| a.consequent.cmp(&b.consequent))
}

/// Filter for rules strong enough to act on as product bundles.
///
/// This is a reporting policy layered over rule generation, not a
/// property of rule validity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BundlePolicy {
    pub min_confidence: f64,
    pub min_lift: f64,
    pub single_consequent: bool,
    /// Rules at or above both primary thresholds become primary bundles
    pub primary_confidence: f64,
    pub primary_lift: f64,
}

impl Default for BundlePolicy {
    fn default() -> Self {
        Self {
            min_confidence: 0.3,
            min_lift: 1.2,
            single_consequent: true,
            primary_confidence: 0.45,
            primary_lift: 1.5,
        }
    }
}

impl BundlePolicy {
    pub fn validate(&self) -> AnalyticsResult<()> {
        validate_ratio("bundle min_confidence", self.min_confidence)?;
        validate_ratio("bundle primary_confidence", self.primary_confidence)?;
        for (param, lift) in [
            ("bundle min_lift", self.min_lift),
            ("bundle primary_lift", self.primary_lift),
        ] {
            if !(lift.is_finite() && lift > 0.0) {
                return Err(AnalyticsError::threshold(param, lift, "positive"));
            }
        }
        Ok(())
    }

    pub fn accepts(&self, rule: &AssociationRule) -> bool {
        rule.confidence >= self.min_confidence
            && rule.lift >= self.min_lift
            && (!self.single_consequent || rule.consequent.len() == 1)
    }

    /// Keep accepted rules, strongest lift first
    pub fn apply(&self, rules: &[AssociationRule]) -> Vec<AssociationRule> {
        let mut kept: Vec<AssociationRule> =
            rules.iter().filter(|r| self.accepts(r)).cloned().collect();
        kept.sort_by(|a, b| {
            b.lift
                .total_cmp(&a.lift)
                .then_with(|| b.confidence.total_cmp(&a.confidence))
                .then_with(|| structural_order(a, b))
        });
        kept
    }

    pub fn tier(&self, rule: &AssociationRule) -> BundleTier {
        if rule.confidence >= self.primary_confidence && rule.lift >= self.primary_lift {
            BundleTier::Primary
        } else {
            BundleTier::Supporting
        }
    }

    /// Classify already-filtered rules into bundle recommendations
    pub fn recommend(&self, bundle_rules: &[AssociationRule]) -> Vec<BundleRecommendation> {
        bundle_rules
            .iter()
            .map(|rule| BundleRecommendation {
                antecedent: rule.antecedent.clone(),
                consequent: rule.consequent.clone(),
                confidence: rule.confidence,
                lift: rule.lift,
                tier: self.tier(rule),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BundleTier {
    /// Strong enough for a discounted package
    Primary,
    /// Worth suggesting at the counter
    Supporting,
}

impl BundleTier {
    pub fn action(self) -> &'static str {
        match self {
            BundleTier::Primary => "Create a bundle deal",
            BundleTier::Supporting => "Suggestive selling",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BundleTier::Primary => "Primary bundle",
            BundleTier::Supporting => "Supporting bundle",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BundleRecommendation {
    pub antecedent: Itemset,
    pub consequent: Itemset,
    pub confidence: f64,
    pub lift: f64,
    pub tier: BundleTier,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MiningConfig;
    use crate::encoder::ItemTable;
    use crate::miner::FpGrowth;
    use crate::model::ItemId;
    use crate::transaction::Transaction;

    fn mine(raw: &[&str], min_support: f64) -> (ItemTable, Vec<FrequentItemset>) {
        let transactions: Vec<Transaction> =
            raw.iter().map(|r| Transaction::parse(Some(*r))).collect();
        let table = ItemTable::encode(&transactions);
        let itemsets = FpGrowth::new(MiningConfig::new(min_support))
            .mine(&table)
            .unwrap();
        (table, itemsets)
    }

    fn find<'a>(
        rules: &'a [AssociationRule],
        table: &ItemTable,
        antecedent: &[&str],
        consequent: &[&str],
    ) -> Option<&'a AssociationRule> {
        let a = table.vocabulary().itemset(antecedent)?;
        let c = table.vocabulary().itemset(consequent)?;
        rules.iter().find(|r| r.antecedent == a && r.consequent == c)
    }

    #[test]
    fn test_reference_rule() {
        let (table, itemsets) = mine(&["A,B", "A,B", "A,C", "B,C"], 0.25);
        let rules = generate_rules(&itemsets, &RuleConfig::new(0.1)).unwrap();

        let a_b = find(&rules, &table, &["A"], &["B"]).unwrap();
        assert!((a_b.support - 0.5).abs() < 1e-12);
        assert!((a_b.confidence - 0.5 / 0.75).abs() < 1e-12);
        assert!((a_b.lift - (0.5 / 0.75) / 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_rules_match_brute_force() {
        let (table, itemsets) = mine(&["A,B,C", "A,B", "A,C", "B,C", "A,B,C,D", "D"], 0.15);
        let rules = generate_rules(&itemsets, &RuleConfig::new(0.01)).unwrap();
        assert!(!rules.is_empty());

        for rule in &rules {
            let mut union = rule.antecedent.items().to_vec();
            union.extend_from_slice(rule.consequent.items());
            let union = Itemset::new(union);
            let confidence = table.support_of(&union) / table.support_of(&rule.antecedent);
            let lift = confidence / table.support_of(&rule.consequent);
            assert!((rule.confidence - confidence).abs() < 1e-9);
            assert!((rule.lift - lift).abs() < 1e-9);
            assert!(rule.antecedent.items().iter().all(|i| !rule.consequent.items().contains(i)));
        }
    }

    #[test]
    fn test_every_split_enumerated() {
        let (_, itemsets) = mine(&["A,B,C", "A,B,C"], 0.5);
        let rules = generate_rules(&itemsets, &RuleConfig::new(0.1)).unwrap();
        // 3 pairs x 2 directions + 6 splits of the triple
        assert_eq!(rules.len(), 12);
        assert!(rules.iter().all(|r| (r.confidence - 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_confidence_and_lift_floor() {
        let (_, itemsets) = mine(&["A,B,C", "A,B", "A,C", "A"], 0.25);
        let rules = generate_rules(&itemsets, &RuleConfig::new(0.8)).unwrap();
        assert!(rules.iter().all(|r| r.confidence >= 0.8));

        let rules = generate_rules(&itemsets, &RuleConfig::new(0.1).with_min_lift(1.01)).unwrap();
        assert!(rules.iter().all(|r| r.lift >= 1.01));
    }

    #[test]
    fn test_ordering_is_deterministic() {
        let (table, itemsets) = mine(&["A,B,C", "A,B,C", "A,B", "C"], 0.25);
        let rules = generate_rules(&itemsets, &RuleConfig::new(0.1)).unwrap();

        for pair in rules.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
            if pair[0].confidence == pair[1].confidence {
                assert!(pair[0].antecedent.len() <= pair[1].antecedent.len());
            }
        }
        // A and B always co-occur: A => B precedes B => A, both confidence 1
        let first = &rules[0];
        assert_eq!(table.vocabulary().labels_of(&first.antecedent), vec!["A"]);
        assert_eq!(table.vocabulary().labels_of(&first.consequent), vec!["B"]);
    }

    #[test]
    fn test_secondary_key_lift() {
        let (_, itemsets) = mine(&["A,B", "A,B", "A,C", "C", "C", "B"], 0.1);
        let rules = generate_rules(
            &itemsets,
            &RuleConfig::new(0.1).with_secondary(SecondaryKey::Lift),
        )
        .unwrap();
        for pair in rules.windows(2) {
            if pair[0].confidence == pair[1].confidence {
                assert!(pair[0].lift >= pair[1].lift);
            }
        }
    }

    #[test]
    fn test_no_rules_from_singletons() {
        let (_, itemsets) = mine(&["A", "B", "C"], 0.3);
        let rules = generate_rules(&itemsets, &RuleConfig::new(0.1)).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_missing_subset_is_skipped() {
        let pair = FrequentItemset {
            itemset: Itemset::new(vec![ItemId(0), ItemId(1)]),
            count: 2,
            support: 0.5,
        };
        let only_a = FrequentItemset {
            itemset: Itemset::singleton(ItemId(0)),
            count: 0,
            support: 0.0,
        };
        let rules = generate_rules(&[pair, only_a], &RuleConfig::new(0.1)).unwrap();
        assert!(rules.iter().all(|r| r.confidence.is_finite() && r.lift.is_finite()));
        assert!(rules.is_empty());
    }

    #[test]
    fn test_invalid_confidence() {
        assert!(generate_rules(&[], &RuleConfig::new(0.0)).is_err());
        assert!(generate_rules(&[], &RuleConfig::new(1.5)).is_err());
    }

    #[test]
    fn test_bundle_policy_filters_and_sorts() {
        let (table, itemsets) = mine(
            &["Kopi,Roti", "Kopi,Roti", "Kopi,Roti,Teh", "Teh", "Teh", "Air", "Kopi"],
            0.1,
        );
        let rules = generate_rules(&itemsets, &RuleConfig::new(0.2)).unwrap();
        let policy = BundlePolicy::default();
        let bundles = policy.apply(&rules);

        assert!(!bundles.is_empty());
        for rule in &bundles {
            assert!(rule.confidence >= 0.3);
            assert!(rule.lift >= 1.2);
            assert_eq!(rule.consequent.len(), 1);
        }
        for pair in bundles.windows(2) {
            assert!(pair[0].lift >= pair[1].lift);
        }

        let roti_kopi = find(&bundles, &table, &["Roti"], &["Kopi"]).unwrap();
        assert_eq!(policy.tier(roti_kopi), BundleTier::Primary);
    }

    #[test]
    fn test_recommend_tiers() {
        let rule = |confidence, lift| AssociationRule {
            antecedent: Itemset::singleton(ItemId(0)),
            consequent: Itemset::singleton(ItemId(1)),
            antecedent_support: 0.5,
            consequent_support: 0.5,
            support: 0.25,
            confidence,
            lift,
        };
        let policy = BundlePolicy::default();
        let recs = policy.recommend(&[rule(0.5, 1.6), rule(0.5, 1.3), rule(0.35, 2.0)]);
        let tiers: Vec<BundleTier> = recs.iter().map(|r| r.tier).collect();
        assert_eq!(
            tiers,
            vec![BundleTier::Primary, BundleTier::Supporting, BundleTier::Supporting]
        );
        assert_eq!(BundleTier::Primary.action(), "Create a bundle deal");
    }

    #[test]
    fn test_bundle_policy_validation() {
        assert!(BundlePolicy::default().validate().is_ok());
        let bad = BundlePolicy {
            min_lift: -1.0,
            ..BundlePolicy::default()
        };
        assert!(bad.validate().is_err());
    }
}
