//! Entropy Breaker - orchestration core for a ball-and-paddle arcade game
//!
//! Core modules:
//! - `session`: Session state machine (score, lives, round status, HUD projection)
//! - `scoring`: Combo scoring engine with time decay
//! - `round`: Level progression, rewards, entropy economy and bias phase
//! - `sync`: Audio/visual clock drift monitor
//! - `frame`: Per-frame composition of the four components
//!
//! Physics, rendering, audio synthesis and persistence are collaborators that
//! talk to this crate through plain data; nothing here blocks or schedules.

pub mod clock;
pub mod events;
pub mod frame;
pub mod impact;
pub mod momentum;
pub mod round;
pub mod scoring;
pub mod session;
pub mod settings;
pub mod sync;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use events::CoreEvent;
pub use frame::{CoreConfig, FrameInput, FrameReport, GameCore};
pub use impact::{BrickKind, ImpactEvent};
pub use momentum::Momentum;
pub use settings::{InputScheme, Preferences};

/// Tunable defaults
pub mod consts {
    /// Lives at the start of a run
    pub const INITIAL_LIVES: u32 = 3;
    /// Lives can never be stacked beyond this
    pub const MAX_LIVES: u32 = 9;

    /// How far speed pressure moves toward 1.0 on each brick break
    pub const SPEED_PRESSURE_STEP: f32 = 0.05;
    /// Combo heat ceiling
    pub const COMBO_HEAT_CAP: u32 = 99;

    /// Seconds without a break before the combo resets
    pub const COMBO_DECAY_SECS: f64 = 2.5;
    /// Combo count that fires a milestone event when crossed upward
    pub const COMBO_MILESTONE: u32 = 10;
    /// Score multiplier gained per combo step (1.1x at combo 2)
    pub const COMBO_MULTIPLIER_STEP: f64 = 0.1;
    /// Maximum combo multiplier
    pub const COMBO_MULTIPLIER_CAP: f64 = 3.0;

    /// Impact speeds at or below this earn no speed bonus (pixels/s)
    pub const IMPACT_SPEED_FLOOR: f32 = 150.0;
    /// Impact speeds at or above this earn the full speed bonus (pixels/s)
    pub const IMPACT_SPEED_CEILING: f32 = 400.0;

    /// Auto-complete countdown length
    pub const AUTO_COMPLETE_COUNTDOWN_SECS: f64 = 5.0;
    /// Bricks remaining at or below which the auto-complete countdown arms
    pub const AUTO_COMPLETE_TRIGGER_BRICKS: u32 = 3;

    /// Entropy costs
    pub const REROLL_COST: u32 = 20;
    pub const SHIELD_COST: u32 = 35;
    pub const BAILOUT_COST: u32 = 50;
    /// Cap on reroll tokens and shield charges
    pub const MAX_ENTROPY_CHARGES: u8 = 3;
    /// Stored entropy ceiling on the session
    pub const MAX_STORED_ENTROPY: u32 = 100;
    /// Entropy accrued per brick broken
    pub const ENTROPY_PER_BRICK: u32 = 2;

    /// Rolling drift window
    pub const DRIFT_WINDOW_SECS: f64 = 6.0;
    /// Hard cap on retained drift samples (6 s at 120 Hz)
    pub const DRIFT_MAX_SAMPLES: usize = 720;
    /// Peak drift that raises the warning
    pub const DRIFT_WARN_MS: f64 = 35.0;
    /// Peak and average drift must both fall below this to clear the warning
    pub const DRIFT_RECOVER_MS: f64 = 12.0;
    /// Interval between diagnostic drift samples
    pub const DRIFT_DIAGNOSTIC_INTERVAL_SECS: f64 = 12.0;
}

/// Replace a non-finite value with `fallback`
#[inline]
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        log::warn!("Non-finite value {} replaced with {}", value, fallback);
        fallback
    }
}

/// Multipliers must be finite and positive; anything else becomes 1.0
#[inline]
pub fn positive_or_one(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        log::warn!("Invalid multiplier {} replaced with 1.0", value);
        1.0
    }
}
