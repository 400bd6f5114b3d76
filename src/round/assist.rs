//! Auto-complete assist
//!
//! `inactive -> counting -> triggered -> inactive`. Arms when the bricks left
//! fall inside `[1, trigger_bricks]`, disarms if they leave that window, and
//! clears the level when the countdown runs out.

use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoCompleteConfig {
    pub enabled: bool,
    pub countdown_secs: f64,
    /// Bricks remaining at or below which the countdown arms
    pub trigger_bricks: u32,
}

impl Default for AutoCompleteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            countdown_secs: AUTO_COMPLETE_COUNTDOWN_SECS,
            trigger_bricks: AUTO_COMPLETE_TRIGGER_BRICKS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AutoCompleteState {
    /// Countdown running
    pub active: bool,
    pub timer: f64,
    /// The assist cleared this level
    pub level_auto_completed: bool,
}

/// Result of one assist tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AutoCompleteTick {
    /// Resync any countdown UI
    pub state_changed: bool,
    /// Clear the level now
    pub triggered: bool,
    pub active: bool,
    pub seconds_remaining: f64,
}

#[derive(Debug, Clone)]
pub struct AutoCompleteAssist {
    config: AutoCompleteConfig,
    state: AutoCompleteState,
}

impl AutoCompleteAssist {
    pub fn new(config: AutoCompleteConfig) -> Self {
        let config = AutoCompleteConfig {
            countdown_secs: crate::finite_or(config.countdown_secs, AUTO_COMPLETE_COUNTDOWN_SECS)
                .max(0.0),
            ..config
        };
        Self {
            config,
            state: AutoCompleteState::default(),
        }
    }

    pub fn config(&self) -> &AutoCompleteConfig {
        &self.config
    }

    pub fn state(&self) -> AutoCompleteState {
        self.state
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    /// Back to inactive for a fresh level
    pub fn reset(&mut self) {
        self.state = AutoCompleteState::default();
    }

    pub fn tick(&mut self, delta_secs: f64, session_active: bool, bricks_remaining: u32) -> AutoCompleteTick {
        let delta = crate::finite_or(delta_secs, 0.0).max(0.0);
        let mut state_changed = false;
        let mut triggered = false;

        let in_window = (1..=self.config.trigger_bricks).contains(&bricks_remaining);

        if !self.config.enabled || !session_active {
            if self.state.active {
                self.disarm();
                state_changed = true;
            }
        } else if in_window {
            if !self.state.active {
                self.state.active = true;
                self.state.timer = self.config.countdown_secs;
                state_changed = true;
            } else {
                self.state.timer = (self.state.timer - delta).max(0.0);
            }
            if self.state.active && self.state.timer <= 0.0 {
                self.disarm();
                self.state.level_auto_completed = true;
                triggered = true;
                state_changed = true;
            }
        } else if self.state.active {
            self.disarm();
            state_changed = true;
        }

        AutoCompleteTick {
            state_changed,
            triggered,
            active: self.state.active,
            seconds_remaining: self.state.timer,
        }
    }

    fn disarm(&mut self) {
        self.state.active = false;
        self.state.timer = 0.0;
    }
}
