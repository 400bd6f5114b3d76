//! Telemetry events published by the core
//!
//! Components push into their own outbox; the driver drains each outbox
//! once per frame and forwards to HUD, audio and effects collaborators.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::impact::BrickKind;
use crate::session::RoundResult;

/// Something observers may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CoreEvent {
    /// A brick was destroyed and scored
    BrickBroken {
        points: u64,
        row: u32,
        col: u32,
        impact_velocity: Vec2,
        brick_kind: BrickKind,
        initial_hit_points: u8,
    },
    /// The combo crossed the configured milestone
    ComboMilestone { combo: u32, threshold: u32 },
    /// A life was lost
    LifeLost { lives_remaining: u32, cause: String },
    /// The round ended
    RoundFinished {
        result: RoundResult,
        score_awarded: u64,
        duration_ms: f64,
    },
    /// The auto-complete assist cleared a stalled level
    AutoCompleteTriggered { level_index: u32 },
    /// Audio/visual drift crossed the warning threshold
    DriftWarningRaised { peak_ms: f64, average_ms: f64, at_secs: f64 },
    /// Drift settled back under the recovery threshold
    DriftWarningCleared { peak_ms: f64, average_ms: f64, at_secs: f64 },
    /// Periodic drift sample, emitted regardless of warning state
    DriftDiagnostic {
        drift_ms: f64,
        average_ms: f64,
        peak_ms: f64,
        sample_count: usize,
        at_secs: f64,
    },
}
