//! Reward catalogue and seeded reward rolls

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Tag identifying a reward variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RewardKind {
    MultiBall,
    WidenPaddle,
    SlowBall,
    ExtraLife,
    Coins,
    DoublePoints,
    Gamble,
    ShieldCharge,
    EntropyCache,
}

/// A reward offered between levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reward {
    /// Spawn extra balls at the next serve
    MultiBall { balls: u8 },
    WidenPaddle { secs: f32 },
    SlowBall { factor: f32, secs: f32 },
    ExtraLife,
    Coins { amount: u64 },
    /// Every break scores twice for a while
    DoublePoints { secs: f32 },
    /// Scaled bonus on every break for a while
    Gamble { multiplier: f32, secs: f32 },
    ShieldCharge,
    EntropyCache { amount: u32 },
}

impl Reward {
    pub fn kind(&self) -> RewardKind {
        match self {
            Reward::MultiBall { .. } => RewardKind::MultiBall,
            Reward::WidenPaddle { .. } => RewardKind::WidenPaddle,
            Reward::SlowBall { .. } => RewardKind::SlowBall,
            Reward::ExtraLife => RewardKind::ExtraLife,
            Reward::Coins { .. } => RewardKind::Coins,
            Reward::DoublePoints { .. } => RewardKind::DoublePoints,
            Reward::Gamble { .. } => RewardKind::Gamble,
            Reward::ShieldCharge => RewardKind::ShieldCharge,
            Reward::EntropyCache { .. } => RewardKind::EntropyCache,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Reward::MultiBall { balls } => format!("Multi-ball x{}", balls),
            Reward::WidenPaddle { secs } => format!("Wide paddle ({:.0}s)", secs),
            Reward::SlowBall { secs, .. } => format!("Slow ball ({:.0}s)", secs),
            Reward::ExtraLife => "Extra life".to_string(),
            Reward::Coins { amount } => format!("{} coins", amount),
            Reward::DoublePoints { secs } => format!("Double points ({:.0}s)", secs),
            Reward::Gamble { multiplier, secs } => {
                format!("Gamble x{:.1} ({:.0}s)", multiplier, secs)
            }
            Reward::ShieldCharge => "Shield charge".to_string(),
            Reward::EntropyCache { amount } => format!("+{} entropy", amount),
        }
    }

    /// Rewards the core applies itself; the rest go to the physics layer
    pub fn is_economic(&self) -> bool {
        !matches!(
            self,
            Reward::MultiBall { .. } | Reward::WidenPaddle { .. } | Reward::SlowBall { .. }
        )
    }
}

/// Relative roll weights (out of 100)
const REWARD_WEIGHTS: [(RewardKind, u32); 9] = [
    (RewardKind::MultiBall, 16),
    (RewardKind::WidenPaddle, 16),
    (RewardKind::SlowBall, 12),
    (RewardKind::Coins, 16),
    (RewardKind::DoublePoints, 10),
    (RewardKind::Gamble, 8),
    (RewardKind::ShieldCharge, 8),
    (RewardKind::EntropyCache, 10),
    (RewardKind::ExtraLife, 4),
];

/// Draw a reward, never returning an excluded kind
///
/// Returns `None` only when every kind is excluded.
pub fn roll_reward(rng: &mut Pcg32, level_index: u32, excluded: &[RewardKind]) -> Option<Reward> {
    let eligible: Vec<(RewardKind, u32)> = REWARD_WEIGHTS
        .iter()
        .copied()
        .filter(|(kind, _)| !excluded.contains(kind))
        .collect();
    let total: u32 = eligible.iter().map(|(_, w)| w).sum();
    if total == 0 {
        return None;
    }

    let mut roll = rng.random_range(0..total);
    let mut picked = eligible[eligible.len() - 1].0;
    for (kind, weight) in &eligible {
        if roll < *weight {
            picked = *kind;
            break;
        }
        roll -= weight;
    }

    let reward = build_reward(picked, level_index);
    log::debug!("Rolled reward {:?} for level {}", reward, level_index);
    Some(reward)
}

/// Concrete payload for `kind`, scaled by how deep the run is
fn build_reward(kind: RewardKind, level_index: u32) -> Reward {
    let depth = level_index.min(20) as f32;
    match kind {
        RewardKind::MultiBall => Reward::MultiBall {
            balls: if level_index >= 5 { 3 } else { 2 },
        },
        RewardKind::WidenPaddle => Reward::WidenPaddle { secs: 15.0 },
        RewardKind::SlowBall => Reward::SlowBall {
            factor: 0.7,
            secs: 10.0,
        },
        RewardKind::ExtraLife => Reward::ExtraLife,
        RewardKind::Coins => Reward::Coins {
            amount: 25 + 10 * level_index.min(20) as u64,
        },
        RewardKind::DoublePoints => Reward::DoublePoints { secs: 12.0 },
        RewardKind::Gamble => Reward::Gamble {
            multiplier: (1.5 + depth * 0.1).min(3.0),
            secs: 8.0,
        },
        RewardKind::ShieldCharge => Reward::ShieldCharge,
        RewardKind::EntropyCache => Reward::EntropyCache {
            amount: 15 + 2 * level_index.min(20),
        },
    }
}
