//! Session state machine
//!
//! Owns score, lives, round progress and the momentum snapshot for one run.
//! Every mutating operation is a guarded no-op outside the status it applies
//! to and reports whether it took effect.

use serde::{Deserialize, Serialize};

use super::audio_scene::AudioScene;
use super::hud::HudProjection;
use crate::clock::SharedClock;
use crate::consts::*;
use crate::events::CoreEvent;
use crate::impact::ImpactEvent;
use crate::momentum::Momentum;
use crate::settings::Preferences;

/// Lifecycle of the current round
///
/// `Pending -> Active -> {Paused <-> Active} -> {Completed | Failed}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Created, no round started yet
    Pending,
    /// Round in play
    Active,
    /// Round frozen by the player
    Paused,
    /// Round cleared
    Completed,
    /// Out of lives
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Active => "active",
            SessionStatus::Paused => "paused",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }

    /// Terminal for the current round instance
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundResult {
    Win,
    Loss,
}

/// How the last round ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub result: RoundResult,
    /// Points scored during the round
    pub score_awarded: u64,
    pub duration_ms: f64,
    pub cause: Option<String>,
}

/// Opaque run identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn random() -> Self {
        Self::from_seed(rand::random::<u64>())
    }

    pub fn from_seed(seed: u64) -> Self {
        Self(format!("run-{:016x}", seed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Session tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub initial_lives: u32,
    pub max_lives: u32,
    /// Speed pressure gained per brick break
    pub speed_pressure_step: f32,
    pub combo_heat_cap: u32,
    /// Momentum combo timer refill on each break
    pub combo_window_secs: f64,
    pub max_stored_entropy: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_lives: INITIAL_LIVES,
            max_lives: MAX_LIVES,
            speed_pressure_step: SPEED_PRESSURE_STEP,
            combo_heat_cap: COMBO_HEAT_CAP,
            combo_window_secs: COMBO_DECAY_SECS,
            max_stored_entropy: MAX_STORED_ENTROPY,
        }
    }
}

/// Read-only view of a session, recomputed on every call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub status: SessionStatus,
    pub score: u64,
    pub lives_remaining: u32,
    pub round_number: u32,
    pub brick_total: u32,
    pub brick_remaining: u32,
    pub elapsed_ms: f64,
    pub stored_entropy: u32,
    pub coins: u64,
    pub last_outcome: Option<RoundOutcome>,
    pub momentum: Momentum,
    pub audio_scene: AudioScene,
    pub preferences: Preferences,
    pub hud: HudProjection,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// One run of the game
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    config: SessionConfig,
    clock: SharedClock,
    status: SessionStatus,
    score: u64,
    lives_remaining: u32,
    round_number: u32,
    brick_total: u32,
    brick_remaining: u32,
    /// Score when the current round started
    round_start_score: u64,
    round_start_ms: f64,
    /// Frozen elapsed time while not active
    elapsed_ms: f64,
    last_outcome: Option<RoundOutcome>,
    momentum: Momentum,
    audio_scene: AudioScene,
    preferences: Preferences,
    stored_entropy: u32,
    coins: u64,
    events: Vec<CoreEvent>,
}

impl Session {
    pub fn new(config: SessionConfig, preferences: Preferences, clock: SharedClock) -> Self {
        Self::with_id(SessionId::random(), config, preferences, clock)
    }

    pub fn with_id(
        id: SessionId,
        config: SessionConfig,
        preferences: Preferences,
        clock: SharedClock,
    ) -> Self {
        let now = clock.now_ms();
        Self {
            id,
            lives_remaining: config.initial_lives,
            config,
            clock,
            status: SessionStatus::Pending,
            score: 0,
            round_number: 1,
            brick_total: 0,
            brick_remaining: 0,
            round_start_score: 0,
            round_start_ms: now,
            elapsed_ms: 0.0,
            last_outcome: None,
            momentum: Momentum::default(),
            audio_scene: AudioScene::silent(),
            preferences: preferences.sanitized(),
            stored_entropy: 0,
            coins: 0,
            events: Vec::new(),
        }
    }

    // === Round lifecycle ===

    /// Begin a round with `breakable_brick_count` bricks
    ///
    /// Callable from any status. Returns `false` only when the run is over
    /// (no lives left); a new run needs a new session.
    ///
    /// A zero-brick round has nothing to break, so it only ends through
    /// `complete_round`. `GameCore::tick` does that on the round's first
    /// active frame.
    pub fn start_round(&mut self, breakable_brick_count: u32) -> bool {
        if self.lives_remaining == 0 {
            log::warn!("start_round ignored: session {} has no lives", self.id.as_str());
            return false;
        }

        if self.status == SessionStatus::Completed {
            self.round_number += 1;
        }

        self.status = SessionStatus::Active;
        self.brick_total = breakable_brick_count;
        self.brick_remaining = breakable_brick_count;
        self.momentum = Momentum::for_round(breakable_brick_count);
        self.round_start_ms = self.clock.now_ms();
        self.round_start_score = self.score;
        self.elapsed_ms = 0.0;
        self.last_outcome = None;
        self.refresh_audio_scene();

        log::info!(
            "Round {} started with {} bricks ({} lives)",
            self.round_number,
            breakable_brick_count,
            self.lives_remaining
        );
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.status != SessionStatus::Active {
            return false;
        }
        self.elapsed_ms = self.live_elapsed_ms();
        self.status = SessionStatus::Paused;
        self.refresh_audio_scene();
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.status != SessionStatus::Paused {
            return false;
        }
        // Shift the start so `now - start` picks up where the pause froze it
        self.round_start_ms = self.clock.now_ms() - self.elapsed_ms;
        self.status = SessionStatus::Active;
        self.refresh_audio_scene();
        true
    }

    /// Score a broken brick
    pub fn record_brick_break(&mut self, points: i64, impact: Option<&ImpactEvent>) -> bool {
        if self.status != SessionStatus::Active {
            return false;
        }

        let awarded = points.max(0) as u64;
        self.score = self.score.saturating_add(awarded);
        self.brick_remaining = self.brick_remaining.saturating_sub(1);

        self.momentum.volley_length += 1;
        self.momentum.combo_heat = (self.momentum.combo_heat + 1).min(self.config.combo_heat_cap);
        self.momentum
            .nudge_speed_pressure(self.config.speed_pressure_step);
        self.momentum
            .recompute_density(self.brick_remaining, self.brick_total);
        self.momentum.combo_timer = self.config.combo_window_secs;
        self.refresh_audio_scene();

        if let Some(impact) = impact {
            self.events.push(CoreEvent::BrickBroken {
                points: awarded,
                row: impact.row,
                col: impact.col,
                impact_velocity: impact.impact_velocity,
                brick_kind: impact.brick_kind,
                initial_hit_points: impact.initial_hit_points,
            });
        }
        true
    }

    pub fn record_life_lost(&mut self, cause: &str) -> bool {
        if self.status != SessionStatus::Active {
            return false;
        }

        self.lives_remaining = self.lives_remaining.saturating_sub(1);
        self.momentum.break_volley();
        self.events.push(CoreEvent::LifeLost {
            lives_remaining: self.lives_remaining,
            cause: cause.to_string(),
        });

        if self.lives_remaining == 0 {
            self.finish_round(RoundResult::Loss, Some(cause.to_string()));
            self.status = SessionStatus::Failed;
            log::info!(
                "Session {} failed in round {} ({})",
                self.id.as_str(),
                self.round_number,
                cause
            );
        } else {
            log::debug!("Life lost ({}), {} remaining", cause, self.lives_remaining);
        }
        self.refresh_audio_scene();
        true
    }

    pub fn complete_round(&mut self) -> bool {
        if self.status != SessionStatus::Active {
            return false;
        }

        self.brick_remaining = 0;
        self.momentum.recompute_density(0, self.brick_total);
        self.finish_round(RoundResult::Win, None);
        self.status = SessionStatus::Completed;
        self.refresh_audio_scene();
        log::info!("Round {} completed, score {}", self.round_number, self.score);
        true
    }

    fn finish_round(&mut self, result: RoundResult, cause: Option<String>) {
        self.elapsed_ms = self.live_elapsed_ms();
        let outcome = RoundOutcome {
            result,
            score_awarded: self.score - self.round_start_score,
            duration_ms: self.elapsed_ms,
            cause,
        };
        self.events.push(CoreEvent::RoundFinished {
            result,
            score_awarded: outcome.score_awarded,
            duration_ms: outcome.duration_ms,
        });
        self.last_outcome = Some(outcome);
    }

    // === Resources ===

    /// Adopt the scoring engine's momentum
    ///
    /// A session driven on its own keeps momentum with its own rules in
    /// `record_brick_break` and `record_life_lost`; under a scoring engine the
    /// engine's copy wins.
    pub fn sync_momentum(&mut self, momentum: Momentum) {
        let unit = |v: f32| crate::finite_or(v as f64, 0.0).clamp(0.0, 1.0) as f32;
        self.momentum = Momentum {
            speed_pressure: unit(momentum.speed_pressure),
            brick_density: unit(momentum.brick_density),
            combo_timer: crate::finite_or(momentum.combo_timer, 0.0).max(0.0),
            ..momentum
        };
        self.refresh_audio_scene();
    }

    /// Bank entropy up to the configured ceiling; returns the new total
    pub fn add_entropy(&mut self, amount: u32) -> u32 {
        self.stored_entropy = self
            .stored_entropy
            .saturating_add(amount)
            .min(self.config.max_stored_entropy);
        self.stored_entropy
    }

    pub fn can_afford_entropy(&self, cost: u32) -> bool {
        self.stored_entropy >= cost
    }

    /// Spend stored entropy; fails without change when short
    pub fn spend_entropy(&mut self, cost: u32) -> bool {
        if !self.can_afford_entropy(cost) {
            return false;
        }
        self.stored_entropy -= cost;
        true
    }

    pub fn grant_life(&mut self) -> bool {
        if self.lives_remaining == 0 || self.lives_remaining >= self.config.max_lives {
            return false;
        }
        self.lives_remaining += 1;
        self.refresh_audio_scene();
        true
    }

    pub fn add_coins(&mut self, amount: u64) {
        self.coins = self.coins.saturating_add(amount);
    }

    pub fn set_preferences(&mut self, preferences: Preferences) {
        self.preferences = preferences.sanitized();
        self.refresh_audio_scene();
    }

    // === Reads ===

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives_remaining(&self) -> u32 {
        self.lives_remaining
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn brick_total(&self) -> u32 {
        self.brick_total
    }

    pub fn brick_remaining(&self) -> u32 {
        self.brick_remaining
    }

    pub fn stored_entropy(&self) -> u32 {
        self.stored_entropy
    }

    pub fn coins(&self) -> u64 {
        self.coins
    }

    pub fn last_outcome(&self) -> Option<&RoundOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn momentum(&self) -> Momentum {
        self.momentum
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Elapsed round time: live while active, frozen otherwise
    pub fn elapsed_ms(&self) -> f64 {
        if self.status == SessionStatus::Active {
            self.live_elapsed_ms()
        } else {
            self.elapsed_ms
        }
    }

    fn live_elapsed_ms(&self) -> f64 {
        (self.clock.now_ms() - self.round_start_ms).max(0.0)
    }

    /// Build the read-only projection for HUD and telemetry
    pub fn snapshot(&self) -> SessionSnapshot {
        let mut snapshot = SessionSnapshot {
            id: self.id.clone(),
            status: self.status,
            score: self.score,
            lives_remaining: self.lives_remaining,
            round_number: self.round_number,
            brick_total: self.brick_total,
            brick_remaining: self.brick_remaining,
            elapsed_ms: self.elapsed_ms(),
            stored_entropy: self.stored_entropy,
            coins: self.coins,
            last_outcome: self.last_outcome.clone(),
            momentum: self.momentum,
            audio_scene: self.audio_scene,
            preferences: self.preferences.clone(),
            hud: HudProjection::default(),
        };
        snapshot.hud = HudProjection::build(&snapshot);
        snapshot
    }

    /// Take all telemetry events published since the last drain
    pub fn drain_events(&mut self) -> Vec<CoreEvent> {
        std::mem::take(&mut self.events)
    }

    fn refresh_audio_scene(&mut self) {
        self.audio_scene = AudioScene::derive(
            self.status,
            &self.momentum,
            self.lives_remaining,
            self.config.combo_heat_cap,
            self.preferences.reduced_motion,
        );
    }
}
