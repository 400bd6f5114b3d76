//! Bias phase: risk-tiered modifiers offered between levels
//!
//! Offers are owned values. Everything handed out of the round machine is a
//! clone, so callers can never edit an offer in place.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    Safe,
    Bold,
    Reckless,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::Safe, RiskTier::Bold, RiskTier::Reckless];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Safe => "safe",
            RiskTier::Bold => "bold",
            RiskTier::Reckless => "reckless",
        }
    }
}

/// One effect carried by a bias option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BiasEffect {
    /// Scales ball speed and brick toughness for the next level
    Difficulty { multiplier: f64 },
    /// Scales the chance of power-up drops
    PowerUpChance { multiplier: f64 },
    /// Extra points on every break
    ScoreBonus { multiplier: f64 },
    /// Immediate stored-entropy payout
    EntropyGrant { amount: u32 },
    /// Costs one life up front
    LifeCost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasOption {
    pub id: String,
    pub tier: RiskTier,
    pub label: String,
    pub effects: Vec<BiasEffect>,
}

impl BiasOption {
    pub fn difficulty_multiplier(&self) -> f64 {
        self.effects
            .iter()
            .map(|e| match e {
                BiasEffect::Difficulty { multiplier } => *multiplier,
                _ => 1.0,
            })
            .product()
    }

    pub fn power_up_multiplier(&self) -> f64 {
        self.effects
            .iter()
            .map(|e| match e {
                BiasEffect::PowerUpChance { multiplier } => *multiplier,
                _ => 1.0,
            })
            .product()
    }

    pub fn score_multiplier(&self) -> f64 {
        self.effects
            .iter()
            .map(|e| match e {
                BiasEffect::ScoreBonus { multiplier } => *multiplier,
                _ => 1.0,
            })
            .product()
    }

    pub fn entropy_grant(&self) -> u32 {
        self.effects
            .iter()
            .map(|e| match e {
                BiasEffect::EntropyGrant { amount } => *amount,
                _ => 0,
            })
            .sum()
    }

    pub fn life_cost(&self) -> u32 {
        self.effects
            .iter()
            .filter(|e| matches!(e, BiasEffect::LifeCost))
            .count() as u32
    }
}

/// Offered options plus the committed selection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BiasPhaseState {
    pub options: Vec<BiasOption>,
    /// Committed but not yet applied
    pub pending_selection: Option<BiasOption>,
    pub last_selection: Option<BiasOption>,
}

impl BiasPhaseState {
    pub fn is_offering(&self) -> bool {
        !self.options.is_empty()
    }
}

/// One offer per tier; riskier tiers scale harder with depth
pub fn generate_bias_options(rng: &mut Pcg32, level_index: u32) -> Vec<BiasOption> {
    let depth = level_index.min(20) as f64;
    RiskTier::ALL
        .iter()
        .map(|&tier| {
            let variant = rng.random_range(0..2u32);
            let (label, effects) = match (tier, variant) {
                (RiskTier::Safe, 0) => (
                    "Steady Hands",
                    vec![BiasEffect::Difficulty { multiplier: 0.9 }],
                ),
                (RiskTier::Safe, _) => (
                    "Supply Drop",
                    vec![BiasEffect::PowerUpChance { multiplier: 1.25 }],
                ),
                (RiskTier::Bold, 0) => (
                    "Overclock",
                    vec![
                        BiasEffect::Difficulty {
                            multiplier: 1.15 + depth * 0.02,
                        },
                        BiasEffect::ScoreBonus { multiplier: 1.3 },
                    ],
                ),
                (RiskTier::Bold, _) => (
                    "Entropy Tap",
                    vec![
                        BiasEffect::Difficulty { multiplier: 1.1 },
                        BiasEffect::EntropyGrant {
                            amount: 20 + 2 * level_index.min(20),
                        },
                    ],
                ),
                (RiskTier::Reckless, 0) => (
                    "Glass Cannon",
                    vec![
                        BiasEffect::Difficulty {
                            multiplier: 1.3 + depth * 0.05,
                        },
                        BiasEffect::PowerUpChance { multiplier: 0.75 },
                        BiasEffect::ScoreBonus { multiplier: 1.75 },
                    ],
                ),
                (RiskTier::Reckless, _) => (
                    "Blood Pact",
                    vec![
                        BiasEffect::LifeCost,
                        BiasEffect::EntropyGrant { amount: 50 },
                        BiasEffect::ScoreBonus { multiplier: 1.5 },
                    ],
                ),
            };
            BiasOption {
                id: format!("{}-{}-{}", tier.as_str(), level_index, variant),
                tier,
                label: label.to_string(),
                effects,
            }
        })
        .collect()
}
