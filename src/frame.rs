//! Per-frame composition of the four components
//!
//! `GameCore::tick` applies one frame of collaborator input in a fixed order:
//! combo decay, brick breaks, life losses, momentum sync, round-clear check,
//! auto-complete, then drift. Auto-complete must see the brick count left by
//! this frame's breaks.
//!
//! The scoring engine owns score arithmetic and momentum. Every credited
//! point is an award total, so the session's score tracks the engine's.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::clock::SharedClock;
use crate::consts::*;
use crate::events::CoreEvent;
use crate::impact::ImpactEvent;
use crate::round::{
    AutoCompleteTick, BiasOption, EntropyActionKind, LevelBaseline, Reward, RewardKind,
    RoundConfig, RoundMachine, RoundRecap, generate_bias_options, roll_reward,
};
use crate::scoring::{ActiveBonuses, BrickAward, ImpactContext, ScoringConfig, ScoringEngine};
use crate::session::{Session, SessionConfig, SessionId, SessionSnapshot};
use crate::settings::Preferences;
use crate::sync::{DriftStatus, SyncDriftConfig, SyncDriftMonitor};

/// Everything needed to build a `GameCore`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub session: SessionConfig,
    pub scoring: ScoringConfig,
    pub round: RoundConfig,
    pub drift: SyncDriftConfig,
    /// Stored entropy earned per brick broken
    pub entropy_per_brick: u32,
    /// Reward and bias RNG seed; random when absent
    pub seed: Option<u64>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            scoring: ScoringConfig::default(),
            round: RoundConfig::default(),
            drift: SyncDriftConfig::default(),
            entropy_per_brick: ENTROPY_PER_BRICK,
            seed: None,
        }
    }
}

impl CoreConfig {
    /// Parse a partial JSON override; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Collaborator input for one frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Seconds since the previous frame
    pub dt: f64,
    /// Audio scheduler clock
    pub audio_seconds: f64,
    /// High-resolution frame clock, if the platform has one
    pub visual_seconds: Option<f64>,
    /// Bricks destroyed by physics this frame
    pub brick_breaks: Vec<ImpactEvent>,
    /// One cause per ball lost this frame
    pub lives_lost: Vec<String>,
    /// Rows in the current formation
    pub row_count: u32,
    /// Pause toggle
    pub pause: bool,
}

/// What happened during one frame
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub awards: Vec<BrickAward>,
    pub combo_lapsed: bool,
    /// Losses absorbed by a shield charge
    pub shields_used: u32,
    pub lives_lost: u32,
    pub round_cleared: bool,
    pub auto_complete: AutoCompleteTick,
    pub drift: DriftStatus,
    /// Telemetry from every component, in publication order per component
    pub events: Vec<CoreEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct GambleBonus {
    multiplier: f64,
    secs_remaining: f64,
}

/// The orchestration core for one run
#[derive(Debug)]
pub struct GameCore {
    clock: SharedClock,
    rng: Pcg32,
    entropy_per_brick: u32,
    session: Session,
    scoring: ScoringEngine,
    round: RoundMachine,
    drift: SyncDriftMonitor,
    double_points_secs: f64,
    gamble: Option<GambleBonus>,
    /// Seconds since the core was created; the drift monitor's timebase
    elapsed_secs: f64,
}

impl GameCore {
    pub fn new(config: CoreConfig, preferences: Preferences, clock: SharedClock) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random::<u64>);
        log::info!("Creating game core (seed {:016x})", seed);
        Self {
            rng: Pcg32::seed_from_u64(seed),
            entropy_per_brick: config.entropy_per_brick,
            session: Session::with_id(
                SessionId::from_seed(seed),
                config.session,
                preferences,
                clock.clone(),
            ),
            scoring: ScoringEngine::new(config.scoring),
            round: RoundMachine::new(config.round, clock.clone()),
            drift: SyncDriftMonitor::new(config.drift),
            clock,
            double_points_secs: 0.0,
            gamble: None,
            elapsed_secs: 0.0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn scoring(&self) -> &ScoringEngine {
        &self.scoring
    }

    pub fn round(&self) -> &RoundMachine {
        &self.round
    }

    /// For collaborators that feed the round machine directly
    /// (achievement unlocks, auto-complete toggle)
    pub fn round_mut(&mut self) -> &mut RoundMachine {
        &mut self.round
    }

    pub fn drift(&self) -> &SyncDriftMonitor {
        &self.drift
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn round_recap(&self) -> RoundRecap {
        self.round.round_recap(self.session.score(), self.session.coins())
    }

    pub fn active_bonuses(&self) -> ActiveBonuses {
        ActiveBonuses {
            double_points: self.double_points_secs > 0.0,
            gamble_multiplier: self.gamble.map(|g| g.multiplier),
            score_multiplier: Some(self.round.score_multiplier()),
        }
    }

    // === Levels ===

    /// Start level `index` with `brick_count` breakable bricks
    ///
    /// A committed bias selection is consumed and applied here. Returns
    /// `false` when the run is over.
    pub fn begin_level(&mut self, index: u32, brick_count: u32) -> bool {
        if self.session.lives_remaining() == 0 {
            return false;
        }

        self.round.clear_level_modifiers();
        let bias = self.round.consume_pending_bias_selection();
        if let Some(option) = &bias {
            self.round.apply_bias_selection(option);
            let granted = option.entropy_grant();
            if granted > 0 {
                self.session.add_entropy(granted);
            }
        }

        self.round.start_level(
            index,
            LevelBaseline {
                combo: self.scoring.combo(),
                score: self.session.score(),
                coins: self.session.coins(),
            },
        );
        if !self.session.start_round(brick_count) {
            return false;
        }
        self.scoring.start_round(brick_count);

        // Life costs never end the run, but they do cost the combo
        if let Some(option) = &bias {
            for _ in 0..option.life_cost() {
                if self.session.lives_remaining() <= 1 {
                    break;
                }
                self.session.record_life_lost("bias");
                self.scoring.life_lost();
            }
        }
        self.session.sync_momentum(self.scoring.momentum());
        true
    }

    /// Move on to the next level index
    pub fn advance_level(&mut self, brick_count: u32) -> bool {
        let next = self.round.level_index() + 1;
        self.begin_level(next, brick_count)
    }

    // === Frame ===

    pub fn tick(&mut self, input: &FrameInput) -> FrameReport {
        let dt = crate::finite_or(input.dt, 0.0).max(0.0);
        let mut report = FrameReport::default();

        if input.pause && !self.session.pause() {
            self.session.resume();
        }

        if self.session.is_active() {
            self.tick_bonuses(dt);
            report.combo_lapsed = self.scoring.decay_combo(dt);

            for impact in &input.brick_breaks {
                if !self.session.is_active() {
                    break;
                }
                let award = self.apply_brick_break(impact, input.row_count);
                report.awards.push(award);
            }

            let now_ms = self.clock.now_ms();
            for cause in &input.lives_lost {
                if !self.session.is_active() {
                    break;
                }
                if self.round.consume_shield_charge(now_ms) {
                    log::debug!("Shield absorbed a life loss ({})", cause);
                    report.shields_used += 1;
                    continue;
                }
                self.session.record_life_lost(cause);
                self.scoring.life_lost();
                report.lives_lost += 1;
            }

            self.session.sync_momentum(self.scoring.momentum());

            // Also clears a zero-brick round on its first frame
            if self.session.is_active() && self.session.brick_remaining() == 0 {
                report.round_cleared = self.session.complete_round();
            }
        }

        report.auto_complete = self.round.tick_auto_complete(
            dt,
            self.session.is_active(),
            self.session.brick_remaining(),
        );
        if report.auto_complete.triggered {
            report.round_cleared |= self.session.complete_round();
        }

        self.elapsed_secs += dt;
        report.drift = self
            .drift
            .update(self.elapsed_secs, input.visual_seconds, input.audio_seconds);

        report.events = self.drain_events();
        report
    }

    fn apply_brick_break(&mut self, impact: &ImpactEvent, row_count: u32) -> BrickAward {
        let ctx = ImpactContext::from_impact(
            impact,
            self.session.brick_remaining(),
            self.session.brick_total(),
            row_count,
        );
        let bonuses = self.active_bonuses();
        let award = self.scoring.award_brick(&ctx, &bonuses);

        self.session
            .record_brick_break(award.total.min(i64::MAX as u64) as i64, Some(impact));
        self.session.add_entropy(self.entropy_per_brick);
        self.round.update_highest_combos(award.combo);
        award
    }

    fn tick_bonuses(&mut self, dt: f64) {
        self.double_points_secs = (self.double_points_secs - dt).max(0.0);
        if let Some(gamble) = &mut self.gamble {
            gamble.secs_remaining -= dt;
            if gamble.secs_remaining <= 0.0 {
                self.gamble = None;
            }
        }
    }

    /// Session, scoring, round and drift outboxes, in that order
    pub fn drain_events(&mut self) -> Vec<CoreEvent> {
        let mut events = self.session.drain_events();
        events.extend(self.scoring.drain_events());
        events.extend(self.round.drain_events());
        events.extend(self.drift.drain_events());
        events
    }

    // === Entropy ===

    /// Spend stored entropy on a charge
    ///
    /// Fails without spending when the charge is already at its cap or the
    /// session can't afford it.
    pub fn purchase_entropy_action(&mut self, kind: EntropyActionKind) -> bool {
        if kind == EntropyActionKind::Bailout {
            return self.activate_bailout();
        }
        if !self.round.can_grant(kind) {
            return false;
        }
        if !self.session.spend_entropy(self.round.entropy_cost(kind)) {
            return false;
        }
        self.round.grant_entropy_action(kind, self.clock.now_ms());
        true
    }

    /// Pay for returning the ball to the paddle
    ///
    /// Only while a round is in play; moving the ball is up to physics.
    pub fn activate_bailout(&mut self) -> bool {
        if !self.session.is_active() {
            return false;
        }
        let cost = self.round.entropy_cost(EntropyActionKind::Bailout);
        if !self.session.spend_entropy(cost) {
            return false;
        }
        self.round.record_bailout_activation(self.clock.now_ms())
    }

    // === Rewards ===

    /// Kinds that would be wasted right now
    fn reward_exclusions(&self) -> Vec<RewardKind> {
        let mut excluded = Vec::new();
        if self.session.lives_remaining() >= self.session.config().max_lives {
            excluded.push(RewardKind::ExtraLife);
        }
        if !self.round.can_grant(EntropyActionKind::Shield) {
            excluded.push(RewardKind::ShieldCharge);
        }
        excluded
    }

    /// The pending reward, rolling one if there is none
    pub fn offer_reward(&mut self) -> Option<Reward> {
        if let Some(pending) = self.round.pending_reward() {
            return Some(pending);
        }
        let excluded = self.reward_exclusions();
        let reward = roll_reward(&mut self.rng, self.round.level_index(), &excluded);
        self.round.set_pending_reward(reward.clone());
        reward
    }

    pub fn lock_reward(&mut self) -> bool {
        self.round.lock_pending_reward()
    }

    /// Spend a reroll token on a different reward
    ///
    /// `None` when nothing is pending, the reward is locked, or no tokens
    /// remain.
    pub fn reroll_reward(&mut self) -> Option<Reward> {
        let current = self.round.pending_reward()?;
        if !self.round.consume_reroll_token(self.clock.now_ms()) {
            return None;
        }
        let mut excluded = self.reward_exclusions();
        excluded.push(current.kind());
        let reward =
            roll_reward(&mut self.rng, self.round.level_index(), &excluded).unwrap_or(current);
        self.round.set_pending_reward(Some(reward.clone()));
        Some(reward)
    }

    /// Claim the pending reward
    ///
    /// Economic rewards are applied here. Multi-ball, paddle and ball-speed
    /// rewards are returned for the physics layer to apply.
    pub fn claim_reward(&mut self) -> Option<Reward> {
        let reward = self.round.take_pending_reward()?;
        match &reward {
            Reward::ExtraLife => {
                self.session.grant_life();
            }
            Reward::Coins { amount } => self.session.add_coins(*amount),
            Reward::DoublePoints { secs } => {
                self.double_points_secs = self.double_points_secs.max(*secs as f64);
            }
            Reward::Gamble { multiplier, secs } => {
                self.gamble = Some(GambleBonus {
                    multiplier: *multiplier as f64,
                    secs_remaining: *secs as f64,
                });
            }
            Reward::ShieldCharge => {
                self.round
                    .grant_entropy_action(EntropyActionKind::Shield, self.clock.now_ms());
            }
            Reward::EntropyCache { amount } => {
                self.session.add_entropy(*amount);
            }
            Reward::MultiBall { .. } | Reward::WidenPaddle { .. } | Reward::SlowBall { .. } => {}
        }
        log::debug!("Claimed reward: {}", reward.label());
        Some(reward)
    }

    // === Bias phase ===

    /// Roll and offer bias options for the upcoming level
    pub fn enter_bias_phase(&mut self) -> Vec<BiasOption> {
        let options = generate_bias_options(&mut self.rng, self.round.level_index() + 1);
        self.round.set_bias_phase_options(&options);
        options
    }

    /// Commit an offered option; it takes effect at the next `begin_level`
    pub fn select_bias(&mut self, id: &str) -> Option<BiasOption> {
        self.round.commit_bias_selection(id)
    }

    pub fn skip_bias_phase(&mut self) {
        self.round.skip_bias_phase();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::impact::BrickKind;
    use crate::round::{AutoCompleteConfig, BiasEffect, RiskTier};
    use crate::session::{RoundResult, SessionStatus};
    use glam::Vec2;
    use std::rc::Rc;

    fn core_with(config: CoreConfig) -> (GameCore, Rc<ManualClock>) {
        let clock = ManualClock::new(0.0);
        let core = GameCore::new(config, Preferences::default(), clock.clone());
        (core, clock)
    }

    fn core() -> (GameCore, Rc<ManualClock>) {
        core_with(CoreConfig {
            seed: Some(1234),
            ..Default::default()
        })
    }

    fn glass(col: u32) -> ImpactEvent {
        ImpactEvent::new(0, col, Vec2::new(0.0, 100.0), BrickKind::Glass)
    }

    fn frame(dt: f64) -> FrameInput {
        FrameInput {
            dt,
            row_count: 1,
            ..Default::default()
        }
    }

    fn breaks(n: u32) -> FrameInput {
        FrameInput {
            brick_breaks: (0..n).map(glass).collect(),
            ..frame(0.016)
        }
    }

    #[test]
    fn test_full_level_through_frames() {
        let (mut core, clock) = core();
        assert!(core.begin_level(0, 10));

        let mut total = 0;
        for col in 0..10 {
            clock.advance_ms(100.0);
            let report = core.tick(&FrameInput {
                brick_breaks: vec![glass(col)],
                ..frame(0.1)
            });
            total += report.awards[0].total;
            assert_eq!(report.round_cleared, col == 9);
        }

        let session = core.session();
        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(session.brick_remaining(), 0);
        assert_eq!(session.score(), total);
        assert_eq!(core.scoring().combo(), 10);

        let outcome = session.last_outcome().unwrap();
        assert_eq!(outcome.result, RoundResult::Win);
        assert_eq!(outcome.score_awarded, total);
        assert_eq!(session.stored_entropy(), 10 * ENTROPY_PER_BRICK);
        assert_eq!(core.round_recap().points_gained, total);
    }

    #[test]
    fn test_frame_events_are_collected() {
        let (mut core, _) = core();
        core.begin_level(0, 20);
        let report = core.tick(&breaks(10));
        let broken = report
            .events
            .iter()
            .filter(|e| matches!(e, CoreEvent::BrickBroken { .. }))
            .count();
        assert_eq!(broken, 10);
        assert!(
            report
                .events
                .iter()
                .any(|e| matches!(e, CoreEvent::ComboMilestone { threshold: 10, .. }))
        );
        assert!(core.drain_events().is_empty());
    }

    #[test]
    fn test_combo_decays_between_frames() {
        let (mut core, _) = core();
        core.begin_level(0, 20);
        core.tick(&breaks(3));
        assert_eq!(core.scoring().combo(), 3);

        for _ in 0..5 {
            core.tick(&frame(0.5));
        }
        assert_eq!(core.scoring().combo(), 0);
        assert_eq!(core.session().momentum().combo_timer, 0.0);
    }

    #[test]
    fn test_shield_absorbs_life_loss() {
        let (mut core, _) = core();
        core.begin_level(0, 30);
        core.tick(&breaks(20));
        assert!(core.purchase_entropy_action(EntropyActionKind::Shield));
        assert_eq!(core.round().shield_charges(), 1);

        let lives = core.session().lives_remaining();
        let report = core.tick(&FrameInput {
            lives_lost: vec!["drain".to_string(), "drain".to_string()],
            ..frame(0.016)
        });
        assert_eq!(report.shields_used, 1);
        assert_eq!(report.lives_lost, 1);
        assert_eq!(core.session().lives_remaining(), lives - 1);
        assert_eq!(core.scoring().combo(), 0);
    }

    #[test]
    fn test_losing_every_life_fails_run() {
        let (mut core, _) = core();
        core.begin_level(0, 10);
        let report = core.tick(&FrameInput {
            lives_lost: vec!["drain".to_string(); 5],
            ..frame(0.016)
        });
        assert_eq!(report.lives_lost, INITIAL_LIVES);
        assert_eq!(core.session().status(), SessionStatus::Failed);
        assert!(!core.begin_level(1, 10));
    }

    #[test]
    fn test_purchase_requires_entropy() {
        let (mut core, _) = core();
        core.begin_level(0, 40);
        assert!(!core.purchase_entropy_action(EntropyActionKind::Reroll));
        assert_eq!(core.round().reroll_tokens(), 0);

        core.tick(&breaks(10));
        assert_eq!(core.session().stored_entropy(), REROLL_COST);
        assert!(core.purchase_entropy_action(EntropyActionKind::Reroll));
        assert_eq!(core.session().stored_entropy(), 0);
        assert_eq!(core.round().reroll_tokens(), 1);
    }

    #[test]
    fn test_purchase_refused_at_cap_keeps_entropy() {
        let config = CoreConfig {
            seed: Some(3),
            entropy_per_brick: 50,
            ..Default::default()
        };
        let (mut core, _) = core_with(config);
        core.begin_level(0, 40);
        for _ in 0..MAX_ENTROPY_CHARGES {
            core.tick(&breaks(1));
            assert!(core.purchase_entropy_action(EntropyActionKind::Reroll));
        }
        core.tick(&breaks(1));
        let stored = core.session().stored_entropy();
        assert!(!core.purchase_entropy_action(EntropyActionKind::Reroll));
        assert_eq!(core.session().stored_entropy(), stored);
    }

    #[test]
    fn test_bailout_only_while_active() {
        let config = CoreConfig {
            seed: Some(5),
            entropy_per_brick: 50,
            ..Default::default()
        };
        let (mut core, clock) = core_with(config);
        assert!(!core.activate_bailout());
        core.begin_level(0, 10);
        core.tick(&breaks(1));
        clock.set_ms(777.0);
        assert!(core.purchase_entropy_action(EntropyActionKind::Bailout));
        assert_eq!(core.session().stored_entropy(), 0);
        let last = core.round().last_entropy_action().unwrap();
        assert_eq!(last.kind, EntropyActionKind::Bailout);
        assert_eq!(last.timestamp_ms, 777.0);
    }

    #[test]
    fn test_reward_offer_lock_and_reroll() {
        let config = CoreConfig {
            seed: Some(99),
            entropy_per_brick: 50,
            ..Default::default()
        };
        let (mut core, _) = core_with(config);
        core.begin_level(0, 20);
        core.tick(&breaks(2));
        assert!(core.purchase_entropy_action(EntropyActionKind::Reroll));
        assert!(core.purchase_entropy_action(EntropyActionKind::Reroll));

        let offered = core.offer_reward().unwrap();
        assert_eq!(core.offer_reward(), Some(offered.clone()));

        let rerolled = core.reroll_reward().unwrap();
        assert_ne!(rerolled.kind(), offered.kind());
        assert_eq!(core.round().reroll_count(), 1);

        assert!(core.lock_reward());
        assert_eq!(core.reroll_reward(), None);
        assert_eq!(core.round().reroll_tokens(), 1);
        assert_eq!(core.offer_reward(), Some(rerolled));
    }

    #[test]
    fn test_extra_life_not_offered_at_cap() {
        let config = CoreConfig {
            seed: Some(8),
            session: SessionConfig {
                initial_lives: 9,
                max_lives: 9,
                ..Default::default()
            },
            ..Default::default()
        };
        let (mut core, _) = core_with(config);
        for _ in 0..100 {
            let reward = core.offer_reward().unwrap();
            assert_ne!(reward.kind(), RewardKind::ExtraLife);
            core.claim_reward();
        }
    }

    #[test]
    fn test_claim_applies_economic_rewards() {
        let (mut core, _) = core();
        core.begin_level(0, 20);

        core.round_mut().set_pending_reward(Some(Reward::Coins { amount: 40 }));
        assert_eq!(core.claim_reward(), Some(Reward::Coins { amount: 40 }));
        assert_eq!(core.session().coins(), 40);
        assert_eq!(core.claim_reward(), None);

        core.round_mut().set_pending_reward(Some(Reward::EntropyCache { amount: 30 }));
        core.claim_reward();
        assert_eq!(core.session().stored_entropy(), 30);

        core.round_mut().set_pending_reward(Some(Reward::ShieldCharge));
        core.claim_reward();
        assert_eq!(core.round().shield_charges(), 1);

        let lives = core.session().lives_remaining();
        core.round_mut().set_pending_reward(Some(Reward::ExtraLife));
        core.claim_reward();
        assert_eq!(core.session().lives_remaining(), lives + 1);

        core.round_mut().set_pending_reward(Some(Reward::MultiBall { balls: 2 }));
        assert_eq!(core.claim_reward(), Some(Reward::MultiBall { balls: 2 }));
    }

    #[test]
    fn test_double_points_bonus_expires() {
        let (mut core, _) = core();
        core.begin_level(0, 20);
        core.round_mut().set_pending_reward(Some(Reward::DoublePoints { secs: 1.0 }));
        core.claim_reward();
        assert!(core.active_bonuses().double_points);

        let report = core.tick(&breaks(1));
        let award = report.awards[0];
        assert_eq!(award.double_points_bonus, award.base_points);

        core.tick(&frame(1.0));
        assert!(!core.active_bonuses().double_points);
    }

    #[test]
    fn test_gamble_bonus_scales_points() {
        let (mut core, _) = core();
        core.begin_level(0, 20);
        core.round_mut().set_pending_reward(Some(Reward::Gamble {
            multiplier: 2.0,
            secs: 5.0,
        }));
        core.claim_reward();
        let report = core.tick(&breaks(1));
        let award = report.awards[0];
        assert_eq!(award.gamble_bonus, award.base_points);
        assert_eq!(award.total, award.base_points * 2);
    }

    #[test]
    fn test_bias_applies_at_next_level() {
        let (mut core, _) = core();
        core.begin_level(0, 5);
        core.tick(&breaks(5));
        assert_eq!(core.session().status(), SessionStatus::Completed);

        let options = core.enter_bias_phase();
        assert_eq!(options.len(), 3);
        assert!(options.iter().all(|o| o.id.contains("-1-")));

        let pick = options[0].clone();
        assert_eq!(core.select_bias(&pick.id), Some(pick.clone()));
        assert!(core.advance_level(5));
        assert_eq!(core.round().level_index(), 1);
        assert!((core.round().difficulty_multiplier() - pick.difficulty_multiplier()).abs() < 1e-9);
        assert_eq!(core.session().round_number(), 2);

        // Modifiers last one level
        core.tick(&breaks(5));
        core.advance_level(5);
        assert_eq!(core.round().difficulty_multiplier(), 1.0);
    }

    #[test]
    fn test_bias_life_cost_never_ends_run() {
        let (mut core, _) = core();
        core.begin_level(0, 5);
        core.tick(&FrameInput {
            lives_lost: vec!["drain".to_string(); 2],
            ..frame(0.016)
        });
        core.tick(&breaks(5));
        assert_eq!(core.session().lives_remaining(), 1);

        core.round_mut().set_bias_phase_options(&[BiasOption {
            id: "pact".to_string(),
            tier: RiskTier::Reckless,
            label: "Pact".to_string(),
            effects: vec![BiasEffect::LifeCost, BiasEffect::EntropyGrant { amount: 50 }],
        }]);
        core.select_bias("pact");
        assert!(core.advance_level(5));
        assert_eq!(core.session().lives_remaining(), 1);
        assert_eq!(core.session().stored_entropy(), 5 * ENTROPY_PER_BRICK + 50);
        assert!(core.session().is_active());
    }

    fn commit_bias(core: &mut GameCore, effects: Vec<BiasEffect>) {
        core.round_mut().set_bias_phase_options(&[BiasOption {
            id: "custom".to_string(),
            tier: RiskTier::Bold,
            label: "Custom".to_string(),
            effects,
        }]);
        assert!(core.select_bias("custom").is_some());
    }

    #[test]
    fn test_score_bonus_keeps_scores_in_step() {
        let (mut core, _) = core();
        core.begin_level(0, 5);
        core.tick(&breaks(5));
        commit_bias(&mut core, vec![BiasEffect::ScoreBonus { multiplier: 1.5 }]);
        assert!(core.advance_level(10));
        assert_eq!(core.round().score_multiplier(), 1.5);

        let report = core.tick(&breaks(4));
        for award in &report.awards {
            assert_eq!(award.total, (award.base_points as f64 * 1.5).round() as u64);
        }
        assert_eq!(core.scoring().score(), core.session().score());
        assert_eq!(core.session().momentum(), core.scoring().momentum());
        assert_eq!(core.session().momentum().volley_length, 4);

        core.tick(&FrameInput {
            lives_lost: vec!["drain".to_string()],
            ..frame(0.016)
        });
        assert_eq!(core.session().momentum(), core.scoring().momentum());
        assert_eq!(core.session().momentum().volley_length, 0);
    }

    #[test]
    fn test_bias_life_cost_drops_combo() {
        let (mut core, _) = core();
        core.begin_level(0, 5);
        core.tick(&breaks(5));
        assert_eq!(core.scoring().combo(), 5);

        commit_bias(&mut core, vec![BiasEffect::LifeCost]);
        assert!(core.advance_level(5));
        assert_eq!(core.session().lives_remaining(), INITIAL_LIVES - 1);
        assert_eq!(core.scoring().combo(), 0);
        assert_eq!(core.scoring().combo_timer(), 0.0);
        assert_eq!(core.session().momentum().volley_length, 0);
    }

    #[test]
    fn test_empty_round_clears_on_first_frame() {
        let (mut core, _) = core();
        assert!(core.begin_level(0, 0));
        assert!(core.session().is_active());

        let report = core.tick(&frame(0.016));
        assert!(report.round_cleared);
        assert_eq!(core.session().status(), SessionStatus::Completed);
        assert_eq!(
            core.session().last_outcome().map(|o| o.result),
            Some(RoundResult::Win)
        );
        assert!(core.advance_level(5));
        assert_eq!(core.session().round_number(), 2);
    }

    #[test]
    fn test_auto_complete_clears_stalled_level() {
        let config = CoreConfig {
            seed: Some(2),
            round: RoundConfig {
                auto_complete: AutoCompleteConfig {
                    enabled: true,
                    countdown_secs: 1.0,
                    trigger_bricks: 3,
                },
                ..Default::default()
            },
            ..Default::default()
        };
        let (mut core, _) = core_with(config);
        core.begin_level(0, 5);
        let report = core.tick(&breaks(2));
        assert!(report.auto_complete.active);

        let mut cleared = false;
        for _ in 0..4 {
            let report = core.tick(&frame(0.5));
            if report.round_cleared {
                cleared = true;
                assert!(
                    report
                        .events
                        .iter()
                        .any(|e| matches!(e, CoreEvent::AutoCompleteTriggered { level_index: 0 }))
                );
                break;
            }
        }
        assert!(cleared);
        assert_eq!(core.session().status(), SessionStatus::Completed);
        assert!(core.round_recap().auto_completed);
    }

    #[test]
    fn test_pause_toggle_freezes_play() {
        let (mut core, _) = core();
        core.begin_level(0, 10);
        core.tick(&breaks(2));
        let paused = core.tick(&FrameInput {
            pause: true,
            brick_breaks: vec![glass(5)],
            ..frame(0.016)
        });
        assert!(paused.awards.is_empty());
        assert_eq!(core.session().status(), SessionStatus::Paused);

        // Combo timer holds while paused
        let timer = core.scoring().combo_timer();
        core.tick(&frame(5.0));
        assert_eq!(core.scoring().combo_timer(), timer);

        core.tick(&FrameInput {
            pause: true,
            ..frame(0.016)
        });
        assert!(core.session().is_active());
    }

    #[test]
    fn test_drift_runs_every_frame() {
        let (mut core, _) = core();
        let mut warned = false;
        for i in 1..=20 {
            let t = i as f64 * 0.1;
            let report = core.tick(&FrameInput {
                audio_seconds: t,
                visual_seconds: Some(t + 0.05),
                ..frame(0.1)
            });
            warned |= report
                .events
                .iter()
                .any(|e| matches!(e, CoreEvent::DriftWarningRaised { .. }));
        }
        assert!(warned);
        assert!(core.drift().is_warning());

        let report = core.tick(&frame(0.1));
        assert!(report.drift.degraded);
    }

    #[test]
    fn test_seed_makes_runs_repeatable() {
        let (mut a, _) = core();
        let (mut b, _) = core();
        assert_eq!(a.session().id(), b.session().id());
        for _ in 0..10 {
            assert_eq!(a.offer_reward(), b.offer_reward());
            a.claim_reward();
            b.claim_reward();
        }
        assert_eq!(a.enter_bias_phase(), b.enter_bias_phase());
    }

    #[test]
    fn test_partial_json_config() {
        let json = r#"{"entropy_per_brick": 5, "session": {"initial_lives": 4}}"#;
        let config = CoreConfig::from_json(json).unwrap();
        assert_eq!(config.entropy_per_brick, 5);
        assert_eq!(config.session.initial_lives, 4);
        assert_eq!(config.session.max_lives, MAX_LIVES);
        assert_eq!(config.drift, SyncDriftConfig::default());
    }
}
