//! Round intensity metrics shared by the session and the scoring engine

use serde::{Deserialize, Serialize};

/// Secondary metrics summarizing how intense the current round is
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Momentum {
    /// Bricks broken since the last life loss
    pub volley_length: u32,
    /// How hard the ball is being driven (0-1)
    pub speed_pressure: f32,
    /// Fraction of the round's bricks still standing (0-1)
    pub brick_density: f32,
    /// Streak heat, capped by config
    pub combo_heat: u32,
    /// Seconds left before the combo lapses
    pub combo_timer: f64,
}

impl Momentum {
    /// Fresh momentum for a round with `brick_total` bricks
    pub fn for_round(brick_total: u32) -> Self {
        Self {
            brick_density: if brick_total > 0 { 1.0 } else { 0.0 },
            ..Default::default()
        }
    }

    /// Move speed pressure toward 1.0 by `step`
    pub fn nudge_speed_pressure(&mut self, step: f32) {
        self.speed_pressure = (self.speed_pressure + step).clamp(0.0, 1.0);
    }

    /// `remaining / total`, or zero for an empty round
    pub fn recompute_density(&mut self, remaining: u32, total: u32) {
        self.brick_density = if total == 0 {
            0.0
        } else {
            (remaining as f32 / total as f32).clamp(0.0, 1.0)
        };
    }

    /// Life lost: streak metrics reset and speed pressure halves
    pub fn break_volley(&mut self) {
        self.volley_length = 0;
        self.combo_heat = 0;
        self.combo_timer = 0.0;
        self.speed_pressure *= 0.5;
    }

    /// Single 0-1 figure used for audio intensity
    pub fn intensity(&self, heat_cap: u32) -> f32 {
        let heat = if heat_cap == 0 {
            0.0
        } else {
            (self.combo_heat as f32 / heat_cap as f32).min(1.0)
        };
        let clearance = 1.0 - self.brick_density;
        (self.speed_pressure * 0.45 + heat * 0.35 + clearance * 0.2).clamp(0.0, 1.0)
    }
}
