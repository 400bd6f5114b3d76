//! Round machine
//!
//! Level progression, the reward pipeline, entropy charges, the bias phase
//! and achievement relay. Reads facts the caller passes in (session status,
//! bricks remaining, stored entropy) and answers with instructions; it never
//! touches the session or scoring engine itself.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::assist::{AutoCompleteAssist, AutoCompleteConfig, AutoCompleteState, AutoCompleteTick};
use super::bias::{BiasOption, BiasPhaseState};
use super::entropy::{EntropyActionKind, EntropyActionRecord, EntropyConfig, EntropyState};
use super::reward::Reward;
use crate::clock::SharedClock;
use crate::events::CoreEvent;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    pub auto_complete: AutoCompleteConfig,
    pub entropy: EntropyConfig,
}

/// Figures captured when a level starts, for the recap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelBaseline {
    pub combo: u32,
    pub score: u64,
    pub coins: u64,
}

/// Gains since the level started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecap {
    pub level_index: u32,
    pub points_gained: u64,
    pub coins_gained: u64,
    pub highest_combo_round: u32,
    pub highest_combo_run: u32,
    pub auto_completed: bool,
}

/// Unlock notice relayed from the meta-progression layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementUnlock {
    pub id: String,
    pub title: String,
}

#[derive(Debug)]
pub struct RoundMachine {
    config: RoundConfig,
    clock: SharedClock,
    level_index: u32,
    assist: AutoCompleteAssist,
    difficulty_multiplier: f64,
    power_up_multiplier: f64,
    score_multiplier: f64,
    pending_reward: Option<Reward>,
    reward_locked: bool,
    reroll_count: u32,
    achievements: VecDeque<AchievementUnlock>,
    entropy: EntropyState,
    bias: BiasPhaseState,
    baseline: LevelBaseline,
    highest_combo_run: u32,
    highest_combo_round: u32,
    events: Vec<CoreEvent>,
}

impl RoundMachine {
    pub fn new(config: RoundConfig, clock: SharedClock) -> Self {
        Self {
            assist: AutoCompleteAssist::new(config.auto_complete.clone()),
            config,
            clock,
            level_index: 0,
            difficulty_multiplier: 1.0,
            power_up_multiplier: 1.0,
            score_multiplier: 1.0,
            pending_reward: None,
            reward_locked: false,
            reroll_count: 0,
            achievements: VecDeque::new(),
            entropy: EntropyState::default(),
            bias: BiasPhaseState::default(),
            baseline: LevelBaseline::default(),
            highest_combo_run: 0,
            highest_combo_round: 0,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    /// Caller-supplied timestamps must be finite and non-negative
    fn stamp(&self, timestamp_ms: f64) -> f64 {
        if timestamp_ms.is_finite() && timestamp_ms >= 0.0 {
            timestamp_ms
        } else {
            let now = self.clock.now_ms();
            log::warn!("Invalid timestamp {} replaced with {}", timestamp_ms, now);
            now
        }
    }

    // === Levels ===

    pub fn level_index(&self) -> u32 {
        self.level_index
    }

    pub fn increment_level_index(&mut self) -> u32 {
        self.level_index += 1;
        self.level_index
    }

    pub fn set_current_level_index(&mut self, index: u32) {
        self.level_index = index;
    }

    /// Reset per-level state and capture recap baselines
    pub fn start_level(&mut self, index: u32, baseline: LevelBaseline) {
        self.level_index = index;
        self.assist.reset();
        self.baseline = baseline;
        self.highest_combo_round = baseline.combo;
        log::info!(
            "Level {} started (difficulty x{:.2}, power-ups x{:.2})",
            index,
            self.difficulty_multiplier,
            self.power_up_multiplier
        );
    }

    pub fn tick_auto_complete(
        &mut self,
        delta_secs: f64,
        session_active: bool,
        bricks_remaining: u32,
    ) -> AutoCompleteTick {
        let tick = self.assist.tick(delta_secs, session_active, bricks_remaining);
        if tick.triggered {
            log::info!("Auto-complete cleared level {}", self.level_index);
            self.events.push(CoreEvent::AutoCompleteTriggered {
                level_index: self.level_index,
            });
        }
        tick
    }

    pub fn auto_complete_state(&self) -> AutoCompleteState {
        self.assist.state()
    }

    pub fn set_auto_complete_enabled(&mut self, enabled: bool) {
        self.assist.set_enabled(enabled);
    }

    /// Per-level multipliers; invalid values fall back to 1
    pub fn set_level_modifiers(&mut self, difficulty: f64, power_up_chance: f64) {
        self.difficulty_multiplier = crate::positive_or_one(difficulty);
        self.power_up_multiplier = crate::positive_or_one(power_up_chance);
    }

    pub fn difficulty_multiplier(&self) -> f64 {
        self.difficulty_multiplier
    }

    pub fn power_up_multiplier(&self) -> f64 {
        self.power_up_multiplier
    }

    pub fn score_multiplier(&self) -> f64 {
        self.score_multiplier
    }

    /// Fold a consumed bias selection into the level modifiers
    pub fn apply_bias_selection(&mut self, option: &BiasOption) {
        self.set_level_modifiers(
            self.difficulty_multiplier * option.difficulty_multiplier(),
            self.power_up_multiplier * option.power_up_multiplier(),
        );
        self.score_multiplier = crate::positive_or_one(self.score_multiplier * option.score_multiplier());
        log::debug!("Applied bias '{}' ({})", option.label, option.tier.as_str());
    }

    /// Back to neutral modifiers
    pub fn clear_level_modifiers(&mut self) {
        self.difficulty_multiplier = 1.0;
        self.power_up_multiplier = 1.0;
        self.score_multiplier = 1.0;
    }

    pub fn update_highest_combos(&mut self, combo: u32) {
        self.highest_combo_run = self.highest_combo_run.max(combo);
        self.highest_combo_round = self.highest_combo_round.max(combo);
    }

    pub fn highest_combo_run(&self) -> u32 {
        self.highest_combo_run
    }

    pub fn highest_combo_round(&self) -> u32 {
        self.highest_combo_round
    }

    pub fn baseline(&self) -> LevelBaseline {
        self.baseline
    }

    pub fn round_recap(&self, score: u64, coins: u64) -> RoundRecap {
        RoundRecap {
            level_index: self.level_index,
            points_gained: score.saturating_sub(self.baseline.score),
            coins_gained: coins.saturating_sub(self.baseline.coins),
            highest_combo_round: self.highest_combo_round,
            highest_combo_run: self.highest_combo_run,
            auto_completed: self.assist.state().level_auto_completed,
        }
    }

    // === Rewards ===

    /// Replace the pending reward; always unlocks
    pub fn set_pending_reward(&mut self, reward: Option<Reward>) {
        self.pending_reward = reward;
        self.reward_locked = false;
    }

    pub fn pending_reward(&self) -> Option<Reward> {
        self.pending_reward.clone()
    }

    pub fn is_pending_reward_locked(&self) -> bool {
        self.reward_locked
    }

    pub fn lock_pending_reward(&mut self) -> bool {
        if self.pending_reward.is_none() || self.reward_locked {
            return false;
        }
        self.reward_locked = true;
        true
    }

    /// Claim the pending reward, clearing it and its lock
    pub fn take_pending_reward(&mut self) -> Option<Reward> {
        self.reward_locked = false;
        self.pending_reward.take()
    }

    /// Successful rerolls this run
    pub fn reroll_count(&self) -> u32 {
        self.reroll_count
    }

    // === Entropy ===

    pub fn entropy_cost(&self, kind: EntropyActionKind) -> u32 {
        self.config.entropy.cost(kind)
    }

    /// Whether a grant would change anything (bailout always does)
    pub fn can_grant(&self, kind: EntropyActionKind) -> bool {
        match self.entropy.charges(kind) {
            Some(charges) => charges < self.config.entropy.max_charges,
            None => true,
        }
    }

    pub fn grant_entropy_action(&mut self, kind: EntropyActionKind, timestamp_ms: f64) {
        let ts = self.stamp(timestamp_ms);
        self.entropy.grant(kind, ts, self.config.entropy.max_charges);
        log::debug!(
            "Granted {} (rerolls {}, shields {})",
            kind.as_str(),
            self.entropy.reroll_tokens,
            self.entropy.shield_charges
        );
    }

    /// Fails when no tokens remain or the pending reward is locked
    pub fn consume_reroll_token(&mut self, timestamp_ms: f64) -> bool {
        if self.reward_locked {
            return false;
        }
        let ts = self.stamp(timestamp_ms);
        if !self.entropy.consume(EntropyActionKind::Reroll, ts) {
            return false;
        }
        self.reroll_count += 1;
        true
    }

    pub fn consume_shield_charge(&mut self, timestamp_ms: f64) -> bool {
        let ts = self.stamp(timestamp_ms);
        self.entropy.consume(EntropyActionKind::Shield, ts)
    }

    /// Always succeeds; returning the ball is the caller's job
    pub fn record_bailout_activation(&mut self, timestamp_ms: f64) -> bool {
        let ts = self.stamp(timestamp_ms);
        self.entropy.record(EntropyActionKind::Bailout, ts);
        true
    }

    pub fn reroll_tokens(&self) -> u8 {
        self.entropy.reroll_tokens
    }

    pub fn shield_charges(&self) -> u8 {
        self.entropy.shield_charges
    }

    pub fn last_entropy_action(&self) -> Option<EntropyActionRecord> {
        self.entropy.last_action
    }

    pub fn entropy_state(&self) -> EntropyState {
        self.entropy.clone()
    }

    // === Bias phase ===

    /// Replace the offer; any uncommitted selection is dropped
    pub fn set_bias_phase_options(&mut self, options: &[BiasOption]) {
        self.bias.options = options.to_vec();
        self.bias.pending_selection = None;
    }

    pub fn bias_phase_state(&self) -> BiasPhaseState {
        self.bias.clone()
    }

    /// Commit the offered option with `id`; unknown ids change nothing
    pub fn commit_bias_selection(&mut self, id: &str) -> Option<BiasOption> {
        let selected = self.bias.options.iter().find(|o| o.id == id)?.clone();
        self.bias.pending_selection = Some(selected.clone());
        self.bias.last_selection = Some(selected.clone());
        self.bias.options.clear();
        log::debug!("Bias '{}' committed", selected.label);
        Some(selected)
    }

    /// Take the committed selection; returns it exactly once
    pub fn consume_pending_bias_selection(&mut self) -> Option<BiasOption> {
        self.bias.pending_selection.take()
    }

    /// Skip the offer without choosing
    pub fn skip_bias_phase(&mut self) {
        self.bias.options.clear();
        self.bias.pending_selection = None;
    }

    // === Achievements ===

    pub fn enqueue_achievement_unlocks(&mut self, unlocks: Vec<AchievementUnlock>) {
        if unlocks.is_empty() {
            return;
        }
        self.achievements.extend(unlocks);
    }

    pub fn consume_achievement_notifications(&mut self) -> Vec<AchievementUnlock> {
        self.achievements.drain(..).collect()
    }

    pub fn drain_events(&mut self) -> Vec<CoreEvent> {
        std::mem::take(&mut self.events)
    }
}
