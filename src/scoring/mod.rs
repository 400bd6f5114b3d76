//! Scoring engine
//!
//! Combo count, decay timer, running score and the momentum sub-metrics
//! that feed the session.

pub mod combo;
pub mod impact;

pub use combo::{ActiveBonuses, BrickAward, ComboState, ScoringConfig, ScoringEngine};
pub use impact::{ImpactContext, base_points, combo_multiplier};
