//! Impact-context point algorithm
//!
//! Base points reward three things on top of the brick's own value: how fast
//! the ball was moving, how few bricks were left, and how deep into the
//! formation the brick sat (top rows are harder to reach).

use serde::{Deserialize, Serialize};

use super::combo::ScoringConfig;
use crate::impact::{BrickKind, ImpactEvent};

/// Bonus weights applied to the normalized factors
const SPEED_WEIGHT: f64 = 0.5;
const SCARCITY_WEIGHT: f64 = 0.5;
const PLACEMENT_WEIGHT: f64 = 0.25;

/// Everything the scorer needs to know about one break
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactContext {
    pub brick_kind: BrickKind,
    pub initial_hit_points: u8,
    pub impact_speed: f32,
    /// Row of the brick, 0 = top
    pub row: u32,
    /// Rows in the formation
    pub row_count: u32,
    /// Bricks standing before this break
    pub bricks_remaining: u32,
    pub brick_total: u32,
}

impl ImpactContext {
    pub fn from_impact(
        impact: &ImpactEvent,
        bricks_remaining: u32,
        brick_total: u32,
        row_count: u32,
    ) -> Self {
        Self {
            brick_kind: impact.brick_kind,
            initial_hit_points: impact.initial_hit_points,
            impact_speed: impact.impact_speed(),
            row: impact.row,
            row_count,
            bricks_remaining,
            brick_total,
        }
    }

    /// 0 at or below the speed floor, 1 at or above the ceiling
    pub fn speed_factor(&self, config: &ScoringConfig) -> f64 {
        let span = (config.speed_ceiling - config.speed_floor) as f64;
        if span <= 0.0 || !self.impact_speed.is_finite() {
            return 0.0;
        }
        ((self.impact_speed - config.speed_floor) as f64 / span).clamp(0.0, 1.0)
    }

    /// Grows toward 1 as the formation empties
    pub fn scarcity_factor(&self) -> f64 {
        if self.brick_total == 0 {
            return 0.0;
        }
        let remaining = self.bricks_remaining.min(self.brick_total) as f64;
        (1.0 - remaining / self.brick_total as f64).clamp(0.0, 1.0)
    }

    /// 1 for the top row, 0 for the bottom row
    pub fn placement_factor(&self) -> f64 {
        if self.row_count <= 1 {
            return 0.0;
        }
        let depth = self.row.min(self.row_count - 1) as f64 / (self.row_count - 1) as f64;
        1.0 - depth
    }
}

/// Combo multiplier: 1.1x at combo 2, growing by `step` up to `cap`
pub fn combo_multiplier(combo: u32, config: &ScoringConfig) -> f64 {
    if combo > 1 {
        (1.0 + (combo - 1) as f64 * config.combo_multiplier_step).min(config.combo_multiplier_cap)
    } else {
        1.0
    }
}

/// Points for a break before temporary bonuses
pub fn base_points(ctx: &ImpactContext, combo: u32, config: &ScoringConfig) -> u64 {
    let raw = ctx.brick_kind.base_points() as f64 * ctx.initial_hit_points.max(1) as f64;
    let bonus = 1.0
        + ctx.speed_factor(config) * SPEED_WEIGHT
        + ctx.scarcity_factor() * SCARCITY_WEIGHT
        + ctx.placement_factor() * PLACEMENT_WEIGHT;
    (raw * bonus * combo_multiplier(combo, config)).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn ctx(speed: f32, remaining: u32, row: u32) -> ImpactContext {
        ImpactContext {
            brick_kind: BrickKind::Glass,
            initial_hit_points: 1,
            impact_speed: speed,
            row,
            row_count: 5,
            bricks_remaining: remaining,
            brick_total: 20,
        }
    }

    #[test]
    fn test_plain_break_is_base_value() {
        let config = ScoringConfig::default();
        // Slow ball, full formation, bottom row
        assert_eq!(base_points(&ctx(100.0, 20, 4), 1, &config), 10);
    }

    #[test]
    fn test_every_factor_maxed() {
        let config = ScoringConfig::default();
        // 10 * (1 + 0.5 + 0.5 + 0.25) = 22.5 -> 23
        assert_eq!(base_points(&ctx(500.0, 0, 0), 1, &config), 23);
    }

    #[test]
    fn test_hit_points_scale_value() {
        let config = ScoringConfig::default();
        let mut c = ctx(100.0, 20, 4);
        c.brick_kind = BrickKind::Armored;
        c.initial_hit_points = 3;
        assert_eq!(base_points(&c, 1, &config), 75);
    }

    #[test]
    fn test_combo_multiplier_curve() {
        let config = ScoringConfig::default();
        assert_eq!(combo_multiplier(0, &config), 1.0);
        assert_eq!(combo_multiplier(1, &config), 1.0);
        assert!((combo_multiplier(2, &config) - 1.1).abs() < 1e-9);
        assert_eq!(combo_multiplier(50, &config), 3.0);
    }

    #[test]
    fn test_speed_factor_midpoint() {
        let config = ScoringConfig::default();
        let c = ctx(275.0, 20, 4);
        assert!((c.speed_factor(&config) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_context_from_impact() {
        let impact = ImpactEvent::new(1, 7, Vec2::new(300.0, 400.0), BrickKind::Crystal)
            .with_hit_points(2);
        let c = ImpactContext::from_impact(&impact, 9, 12, 4);
        assert_eq!(c.impact_speed, 500.0);
        assert_eq!(c.initial_hit_points, 2);
        assert_eq!(c.bricks_remaining, 9);
        assert!((c.placement_factor() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_round_has_no_scarcity() {
        let mut c = ctx(0.0, 0, 0);
        c.brick_total = 0;
        assert_eq!(c.scarcity_factor(), 0.0);
    }
}
