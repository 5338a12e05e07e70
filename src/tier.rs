use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub min: f64,
    pub label: String,
}

impl Tier {
    pub fn new(min: f64, label: impl Into<String>) -> Self {
        Self {
            min,
            label: label.into(),
        }
    }
}

pub fn default_tiers() -> Vec<Tier> {
    vec![
        Tier::new(100_000.0, "Tier 1"),
        Tier::new(50_000.0, "Tier 2"),
        Tier::new(20_000.0, "Tier 3"),
    ]
}

pub fn descending(tiers: &[Tier]) -> Vec<&Tier> {
    let mut ordered = tiers.iter().collect::<Vec<_>>();
    ordered.sort_by(|a, b| b.min.total_cmp(&a.min));
    ordered
}

/// Highest threshold the value reaches, regardless of configured order.
pub fn tier_of(value: f64, tiers: &[Tier]) -> Option<&Tier> {
    descending(tiers).into_iter().find(|tier| value >= tier.min)
}

pub fn tier_level(tier: &Tier, tiers: &[Tier]) -> usize {
    1 + tiers.iter().filter(|other| other.min > tier.min).count()
}
