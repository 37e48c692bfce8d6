//! The reward matching algorithm.
//!
//! Partners register mechanics that map a goods-description pattern to a reward. For each purchased
//! good, the mechanic whose pattern occurs within the description determines the accrual; when
//! several patterns match, the longest one wins (the most specific rule), with ties broken by
//! earliest registration.
use lp_common::Points;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RewardKind {
    /// The reward is a percentage of the good's price, truncated to whole points.
    Percent,
    /// The reward is a flat point amount regardless of price.
    Points,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mechanic {
    #[serde(rename = "match")]
    pub match_text: String,
    #[serde(rename = "rewardType")]
    pub reward_kind: RewardKind,
    #[serde(rename = "rewardPoints")]
    pub reward_points: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Good {
    pub description: String,
    pub price: Points,
}

impl Mechanic {
    /// The points this mechanic awards for a single good.
    pub fn reward_for(&self, good: &Good) -> Points {
        match self.reward_kind {
            RewardKind::Percent => Points::percent_of(good.price, self.reward_points),
            RewardKind::Points => Points::from(self.reward_points),
        }
    }
}

/// Picks the mechanic that applies to `good`: the longest `match_text` found within the
/// description, ties broken by earliest registration (mechanics are in registration order).
fn best_mechanic<'a>(mechanics: &'a [Mechanic], good: &Good) -> Option<&'a Mechanic> {
    let mut best: Option<&Mechanic> = None;
    for mechanic in mechanics {
        if !good.description.contains(&mechanic.match_text) {
            continue;
        }
        match best {
            // Strictly longer wins; an equal length keeps the earlier registration
            Some(b) if mechanic.match_text.len() <= b.match_text.len() => {},
            _ => best = Some(mechanic),
        }
    }
    best
}

/// Computes the total accrual for a list of goods. Goods matching no mechanic contribute zero.
pub fn total_accrual(mechanics: &[Mechanic], goods: &[Good]) -> Points {
    goods
        .iter()
        .map(|good| best_mechanic(mechanics, good).map(|m| m.reward_for(good)).unwrap_or_default())
        .sum()
}
