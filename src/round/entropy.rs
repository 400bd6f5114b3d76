//! Entropy economy: the three spendable actions and their charge counters

use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntropyActionKind {
    /// Re-draw the pending reward
    Reroll,
    /// Absorb the next life loss
    Shield,
    /// Return the ball to the paddle
    Bailout,
}

impl EntropyActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntropyActionKind::Reroll => "reroll",
            EntropyActionKind::Shield => "shield",
            EntropyActionKind::Bailout => "bailout",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "reroll" => Some(EntropyActionKind::Reroll),
            "shield" => Some(EntropyActionKind::Shield),
            "bailout" => Some(EntropyActionKind::Bailout),
            _ => None,
        }
    }
}

/// Costs are charged against the session's stored entropy by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntropyConfig {
    pub reroll_cost: u32,
    pub shield_cost: u32,
    pub bailout_cost: u32,
    /// Cap on reroll tokens and on shield charges
    pub max_charges: u8,
}

impl Default for EntropyConfig {
    fn default() -> Self {
        Self {
            reroll_cost: REROLL_COST,
            shield_cost: SHIELD_COST,
            bailout_cost: BAILOUT_COST,
            max_charges: MAX_ENTROPY_CHARGES,
        }
    }
}

impl EntropyConfig {
    pub fn cost(&self, kind: EntropyActionKind) -> u32 {
        match kind {
            EntropyActionKind::Reroll => self.reroll_cost,
            EntropyActionKind::Shield => self.shield_cost,
            EntropyActionKind::Bailout => self.bailout_cost,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntropyActionRecord {
    pub kind: EntropyActionKind,
    pub timestamp_ms: f64,
}

/// Charge counters plus the most recent action
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntropyState {
    pub reroll_tokens: u8,
    pub shield_charges: u8,
    pub last_action: Option<EntropyActionRecord>,
}

impl EntropyState {
    /// Counter backing `kind`, if it has one
    pub fn charges(&self, kind: EntropyActionKind) -> Option<u8> {
        match kind {
            EntropyActionKind::Reroll => Some(self.reroll_tokens),
            EntropyActionKind::Shield => Some(self.shield_charges),
            EntropyActionKind::Bailout => None,
        }
    }

    pub fn record(&mut self, kind: EntropyActionKind, timestamp_ms: f64) {
        self.last_action = Some(EntropyActionRecord { kind, timestamp_ms });
    }

    /// Record a grant; the matching counter saturates at `max_charges`
    pub fn grant(&mut self, kind: EntropyActionKind, timestamp_ms: f64, max_charges: u8) {
        match kind {
            EntropyActionKind::Reroll => {
                self.reroll_tokens = self.reroll_tokens.saturating_add(1).min(max_charges)
            }
            EntropyActionKind::Shield => {
                self.shield_charges = self.shield_charges.saturating_add(1).min(max_charges)
            }
            EntropyActionKind::Bailout => {}
        }
        self.record(kind, timestamp_ms);
    }

    /// Spend one charge of `kind`; false when empty
    pub fn consume(&mut self, kind: EntropyActionKind, timestamp_ms: f64) -> bool {
        let counter = match kind {
            EntropyActionKind::Reroll => &mut self.reroll_tokens,
            EntropyActionKind::Shield => &mut self.shield_charges,
            EntropyActionKind::Bailout => {
                self.record(kind, timestamp_ms);
                return true;
            }
        };
        if *counter == 0 {
            return false;
        }
        *counter -= 1;
        self.record(kind, timestamp_ms);
        true
    }
}
