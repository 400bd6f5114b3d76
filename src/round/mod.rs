//! Round machine: level progression and the in-run economy
//!
//! - `assist`: auto-complete countdown for stalled levels
//! - `entropy`: reroll / shield / bailout charges
//! - `reward`: reward catalogue and seeded rolls
//! - `bias`: risk-tiered modifiers offered between levels
//! - `machine`: the machine tying them together

pub mod assist;
pub mod bias;
pub mod entropy;
pub mod machine;
pub mod reward;

pub use assist::{AutoCompleteAssist, AutoCompleteConfig, AutoCompleteState, AutoCompleteTick};
pub use bias::{BiasEffect, BiasOption, BiasPhaseState, RiskTier, generate_bias_options};
pub use entropy::{EntropyActionKind, EntropyActionRecord, EntropyConfig, EntropyState};
pub use machine::{AchievementUnlock, LevelBaseline, RoundConfig, RoundMachine, RoundRecap};
pub use reward::{Reward, RewardKind, roll_reward};
