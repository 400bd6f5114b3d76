//! Collision payloads handed over by the physics collaborator

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Brick types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BrickKind {
    #[default]
    Glass,
    Armored,
    Explosive,
    Crystal,
    PowerUpCapsule,
}

impl BrickKind {
    /// Points for breaking one hit point of this brick before bonuses
    pub fn base_points(&self) -> u32 {
        match self {
            BrickKind::Glass => 10,
            BrickKind::Armored => 25,
            BrickKind::Explosive => 50,
            BrickKind::Crystal => 20,
            BrickKind::PowerUpCapsule => 15,
        }
    }
}

/// A brick break as reported by collision detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactEvent {
    pub row: u32,
    pub col: u32,
    /// Ball velocity at the moment of impact (pixels/s)
    pub impact_velocity: Vec2,
    pub brick_kind: BrickKind,
    /// Hit points the brick spawned with
    pub initial_hit_points: u8,
}

impl ImpactEvent {
    pub fn new(row: u32, col: u32, impact_velocity: Vec2, brick_kind: BrickKind) -> Self {
        Self {
            row,
            col,
            impact_velocity,
            brick_kind,
            initial_hit_points: 1,
        }
    }

    pub fn with_hit_points(mut self, hp: u8) -> Self {
        self.initial_hit_points = hp.max(1);
        self
    }

    /// Impact speed; non-finite velocities count as standing still
    pub fn impact_speed(&self) -> f32 {
        let speed = self.impact_velocity.length();
        if speed.is_finite() { speed } else { 0.0 }
    }
}
