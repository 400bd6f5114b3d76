//! Combo scoring engine
//!
//! The combo climbs by one per break and lapses when its decay timer runs
//! out. Temporary bonuses (double points, gamble) are computed from the base
//! award and added on top rather than folded into it. The level score
//! multiplier scales that sum, so `BrickAward::total` is exactly what gets
//! credited. The engine's momentum is the authoritative copy; the session
//! mirrors it.

use serde::{Deserialize, Serialize};

use super::impact::{ImpactContext, base_points};
use crate::consts::*;
use crate::events::CoreEvent;
use crate::momentum::Momentum;

/// Scoring tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Seconds a combo survives without a new break
    pub combo_decay_secs: f64,
    /// Combo that fires a milestone event (0 disables)
    pub combo_milestone: u32,
    pub combo_multiplier_step: f64,
    pub combo_multiplier_cap: f64,
    pub combo_heat_cap: u32,
    pub speed_floor: f32,
    pub speed_ceiling: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            combo_decay_secs: COMBO_DECAY_SECS,
            combo_milestone: COMBO_MILESTONE,
            combo_multiplier_step: COMBO_MULTIPLIER_STEP,
            combo_multiplier_cap: COMBO_MULTIPLIER_CAP,
            combo_heat_cap: COMBO_HEAT_CAP,
            speed_floor: IMPACT_SPEED_FLOOR,
            speed_ceiling: IMPACT_SPEED_CEILING,
        }
    }
}

/// Mutable scoring state
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComboState {
    pub combo: u32,
    /// Seconds until the combo lapses
    pub combo_timer: f64,
    /// Running score, only ever reset explicitly
    pub score: u64,
    pub momentum: Momentum,
}

/// Temporary multiplicative effects in force for a break
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ActiveBonuses {
    pub double_points: bool,
    pub gamble_multiplier: Option<f64>,
    /// Level-wide multiplier from the bias phase; `None` is neutral
    pub score_multiplier: Option<f64>,
}

/// Point breakdown for one break
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrickAward {
    pub base_points: u64,
    pub double_points_bonus: u64,
    pub gamble_bonus: u64,
    /// Base plus bonuses, scaled by the level multiplier and rounded
    pub total: u64,
    /// Combo after this break
    pub combo: u32,
    pub milestone_crossed: bool,
}

#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
    state: ComboState,
    events: Vec<CoreEvent>,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        let config = ScoringConfig {
            combo_decay_secs: crate::finite_or(config.combo_decay_secs, COMBO_DECAY_SECS).max(0.0),
            combo_multiplier_cap: crate::positive_or_one(config.combo_multiplier_cap),
            ..config
        };
        Self {
            config,
            state: ComboState::default(),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn state(&self) -> &ComboState {
        &self.state
    }

    pub fn combo(&self) -> u32 {
        self.state.combo
    }

    pub fn combo_timer(&self) -> f64 {
        self.state.combo_timer
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn momentum(&self) -> Momentum {
        self.state.momentum
    }

    /// Score a broken brick and advance the combo
    pub fn award_brick(&mut self, ctx: &ImpactContext, bonuses: &ActiveBonuses) -> BrickAward {
        let previous = self.state.combo;
        let combo = if self.state.combo_timer > 0.0 {
            previous + 1
        } else {
            1
        };
        self.state.combo = combo;
        self.state.combo_timer = self.config.combo_decay_secs;

        let base = base_points(ctx, combo, &self.config);
        let double_points_bonus = if bonuses.double_points { base } else { 0 };
        let gamble_bonus = bonuses
            .gamble_multiplier
            .map(|m| {
                let m = crate::positive_or_one(m);
                (base as f64 * (m - 1.0)).floor().max(0.0) as u64
            })
            .unwrap_or(0);
        let subtotal = base + double_points_bonus + gamble_bonus;
        let total = match bonuses.score_multiplier {
            Some(m) => (subtotal as f64 * crate::positive_or_one(m)).round() as u64,
            None => subtotal,
        };
        self.state.score = self.state.score.saturating_add(total);

        let momentum = &mut self.state.momentum;
        momentum.volley_length += 1;
        momentum.combo_heat = (momentum.combo_heat + 1).min(self.config.combo_heat_cap);
        let target = ctx.speed_factor(&self.config) as f32;
        momentum.speed_pressure =
            (momentum.speed_pressure + (target - momentum.speed_pressure) * 0.25).clamp(0.0, 1.0);
        momentum.recompute_density(ctx.bricks_remaining.saturating_sub(1), ctx.brick_total);
        momentum.combo_timer = self.state.combo_timer;

        let threshold = self.config.combo_milestone;
        let milestone_crossed = threshold > 0 && previous < threshold && combo >= threshold;
        if milestone_crossed {
            log::debug!("Combo milestone {} reached", threshold);
            self.events
                .push(CoreEvent::ComboMilestone { combo, threshold });
        }

        BrickAward {
            base_points: base,
            double_points_bonus,
            gamble_bonus,
            total,
            combo,
            milestone_crossed,
        }
    }

    /// Run the decay timer down; returns true when the combo lapsed
    pub fn decay_combo(&mut self, delta_secs: f64) -> bool {
        let delta = crate::finite_or(delta_secs, 0.0).max(0.0);
        if self.state.combo_timer <= 0.0 {
            return false;
        }

        self.state.combo_timer -= delta;
        if self.state.combo_timer <= 0.0 {
            self.state.combo = 0;
            self.state.combo_timer = 0.0;
            self.state.momentum.combo_timer = 0.0;
            return true;
        }
        self.state.momentum.combo_timer = self.state.combo_timer;
        false
    }

    /// Ball lost: the combo and volley go, the score stays
    pub fn life_lost(&mut self) {
        self.state.combo = 0;
        self.state.combo_timer = 0.0;
        self.state.momentum.break_volley();
    }

    /// Fresh momentum for a new round; combo and score carry over
    pub fn start_round(&mut self, brick_total: u32) {
        self.state.momentum = Momentum {
            combo_timer: self.state.combo_timer,
            ..Momentum::for_round(brick_total)
        };
    }

    /// Zero score, combo, timer and momentum together
    pub fn reset_all(&mut self) {
        self.state = ComboState::default();
    }

    pub fn drain_events(&mut self) -> Vec<CoreEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impact::BrickKind;

    fn glass(remaining: u32) -> ImpactContext {
        ImpactContext {
            brick_kind: BrickKind::Glass,
            initial_hit_points: 1,
            impact_speed: 0.0,
            row: 0,
            row_count: 1,
            bricks_remaining: remaining,
            brick_total: 0,
        }
    }

    fn engine_with_window(secs: f64) -> ScoringEngine {
        ScoringEngine::new(ScoringConfig {
            combo_decay_secs: secs,
            ..Default::default()
        })
    }

    #[test]
    fn test_combo_climbs_per_break() {
        let mut engine = engine_with_window(6.0);
        for expected in 1..=4 {
            let award = engine.award_brick(&glass(10), &ActiveBonuses::default());
            assert_eq!(award.combo, expected);
        }
        assert_eq!(engine.combo_timer(), 6.0);
    }

    #[test]
    fn test_combo_decays_exactly_at_window() {
        let mut engine = engine_with_window(6.0);
        for _ in 0..4 {
            engine.award_brick(&glass(10), &ActiveBonuses::default());
        }
        assert_eq!(engine.combo(), 4);

        for _ in 0..11 {
            assert!(!engine.decay_combo(0.5));
            assert_eq!(engine.combo(), 4);
        }
        assert!(engine.decay_combo(0.5));
        assert_eq!(engine.combo(), 0);
        assert_eq!(engine.combo_timer(), 0.0);
        assert!(!engine.decay_combo(0.5));
    }

    #[test]
    fn test_break_refreshes_timer() {
        let mut engine = engine_with_window(2.0);
        engine.award_brick(&glass(10), &ActiveBonuses::default());
        engine.decay_combo(1.5);
        engine.award_brick(&glass(9), &ActiveBonuses::default());
        engine.decay_combo(1.5);
        assert_eq!(engine.combo(), 2);
    }

    #[test]
    fn test_combo_multiplier_applies() {
        let mut engine = engine_with_window(6.0);
        let first = engine.award_brick(&glass(10), &ActiveBonuses::default());
        let second = engine.award_brick(&glass(9), &ActiveBonuses::default());
        assert_eq!(first.total, 10);
        assert_eq!(second.total, 11);
        assert_eq!(engine.score(), 21);
    }

    #[test]
    fn test_bonuses_added_on_top_of_base() {
        let mut engine = engine_with_window(6.0);
        let bonuses = ActiveBonuses {
            double_points: true,
            gamble_multiplier: Some(1.55),
            ..Default::default()
        };
        let award = engine.award_brick(&glass(10), &bonuses);
        assert_eq!(award.base_points, 10);
        assert_eq!(award.double_points_bonus, 10);
        // floor(10 * 0.55)
        assert_eq!(award.gamble_bonus, 5);
        assert_eq!(award.total, 25);
        assert_eq!(engine.score(), 25);
    }

    #[test]
    fn test_bad_gamble_multiplier_is_neutral() {
        let mut engine = engine_with_window(6.0);
        for m in [f64::NAN, -2.0, 0.5] {
            let award = engine.award_brick(
                &glass(10),
                &ActiveBonuses {
                    gamble_multiplier: Some(m),
                    ..Default::default()
                },
            );
            assert_eq!(award.gamble_bonus, 0);
        }
    }

    #[test]
    fn test_milestone_fires_once_per_crossing() {
        let mut engine = ScoringEngine::new(ScoringConfig {
            combo_milestone: 3,
            combo_decay_secs: 5.0,
            ..Default::default()
        });
        let crossings: Vec<bool> = (0..5)
            .map(|_| {
                engine
                    .award_brick(&glass(10), &ActiveBonuses::default())
                    .milestone_crossed
            })
            .collect();
        assert_eq!(crossings, vec![false, false, true, false, false]);
        assert_eq!(engine.drain_events().len(), 1);

        // A reset re-arms the milestone
        engine.life_lost();
        for _ in 0..3 {
            engine.award_brick(&glass(10), &ActiveBonuses::default());
        }
        assert_eq!(
            engine.drain_events(),
            vec![CoreEvent::ComboMilestone {
                combo: 3,
                threshold: 3
            }]
        );
    }

    #[test]
    fn test_life_lost_keeps_score() {
        let mut engine = engine_with_window(6.0);
        engine.award_brick(&glass(10), &ActiveBonuses::default());
        engine.award_brick(&glass(9), &ActiveBonuses::default());
        let score = engine.score();
        engine.life_lost();
        assert_eq!(engine.combo(), 0);
        assert_eq!(engine.combo_timer(), 0.0);
        assert_eq!(engine.score(), score);
    }

    #[test]
    fn test_reset_all_zeroes_everything() {
        let mut engine = engine_with_window(6.0);
        engine.award_brick(&glass(10), &ActiveBonuses::default());
        engine.reset_all();
        assert_eq!(engine.state(), &ComboState::default());
    }

    #[test]
    fn test_momentum_tracks_breaks() {
        let mut engine = engine_with_window(6.0);
        let mut ctx = glass(4);
        ctx.brick_total = 4;
        ctx.impact_speed = 400.0;
        engine.award_brick(&ctx, &ActiveBonuses::default());
        let m = engine.momentum();
        assert_eq!(m.volley_length, 1);
        assert_eq!(m.combo_heat, 1);
        assert!((m.brick_density - 0.75).abs() < 1e-6);
        assert!((m.speed_pressure - 0.25).abs() < 1e-6);
        assert_eq!(m.combo_timer, 6.0);
    }

    #[test]
    fn test_score_multiplier_scales_credited_total() {
        let mut engine = engine_with_window(6.0);
        let bonuses = ActiveBonuses {
            double_points: true,
            score_multiplier: Some(1.5),
            ..Default::default()
        };
        let award = engine.award_brick(&glass(10), &bonuses);
        assert_eq!(award.base_points, 10);
        assert_eq!(award.double_points_bonus, 10);
        assert_eq!(award.total, 30);
        assert_eq!(engine.score(), 30);

        // Rounded, and a broken multiplier is neutral
        let award = engine.award_brick(
            &glass(9),
            &ActiveBonuses {
                score_multiplier: Some(1.25),
                ..Default::default()
            },
        );
        assert_eq!(award.total, 14);
        let award = engine.award_brick(
            &glass(8),
            &ActiveBonuses {
                score_multiplier: Some(f64::NAN),
                ..Default::default()
            },
        );
        assert_eq!(award.total, award.base_points);
    }

    #[test]
    fn test_life_lost_breaks_volley() {
        let mut engine = engine_with_window(6.0);
        let mut ctx = glass(4);
        ctx.brick_total = 4;
        ctx.impact_speed = 400.0;
        engine.award_brick(&ctx, &ActiveBonuses::default());
        engine.life_lost();
        let m = engine.momentum();
        assert_eq!(m.volley_length, 0);
        assert_eq!(m.combo_heat, 0);
        assert_eq!(m.combo_timer, 0.0);
        assert!((m.speed_pressure - 0.125).abs() < 1e-6);
    }

    #[test]
    fn test_start_round_resets_momentum_only() {
        let mut engine = engine_with_window(6.0);
        engine.award_brick(&glass(10), &ActiveBonuses::default());
        engine.award_brick(&glass(9), &ActiveBonuses::default());
        let score = engine.score();
        engine.start_round(8);
        assert_eq!(engine.combo(), 2);
        assert_eq!(engine.score(), score);
        let m = engine.momentum();
        assert_eq!(m.volley_length, 0);
        assert_eq!(m.brick_density, 1.0);
        assert_eq!(m.combo_timer, 6.0);
    }
}
