//! HUD projection derived from a session snapshot
//!
//! Never stored; rebuilt every time a snapshot is taken.

use serde::Serialize;

use super::state::{SessionSnapshot, SessionStatus};
use crate::settings::InputScheme;

/// A labelled HUD readout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HudEntry {
    pub label: &'static str,
    pub value: String,
}

/// Call-to-action shown for the current status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HudPrompt {
    Launch,
    LastLife,
    Resume,
    Quit,
    NextRound,
    Retry,
}

impl HudPrompt {
    pub fn text(&self, scheme: InputScheme) -> String {
        match self {
            HudPrompt::Launch => format!("{} to launch", scheme.launch_hint()),
            HudPrompt::LastLife => "Last life!".to_string(),
            HudPrompt::Resume => format!("{} to resume", scheme.launch_hint()),
            HudPrompt::Quit => "Esc to quit".to_string(),
            HudPrompt::NextRound => format!("{} for next round", scheme.launch_hint()),
            HudPrompt::Retry => format!("{} to try again", scheme.launch_hint()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HudProjection {
    pub entries: Vec<HudEntry>,
    pub prompts: Vec<HudPrompt>,
}

impl HudProjection {
    pub fn build(snapshot: &SessionSnapshot) -> Self {
        let mut entries = vec![
            HudEntry {
                label: "Score",
                value: snapshot.score.to_string(),
            },
            HudEntry {
                label: "Lives",
                value: snapshot.lives_remaining.to_string(),
            },
            HudEntry {
                label: "Round",
                value: snapshot.round_number.to_string(),
            },
            HudEntry {
                label: "Bricks",
                value: format!("{}/{}", snapshot.brick_remaining, snapshot.brick_total),
            },
            HudEntry {
                label: "Time",
                value: format_duration(snapshot.elapsed_ms),
            },
            HudEntry {
                label: "Entropy",
                value: snapshot.stored_entropy.to_string(),
            },
        ];
        if snapshot.momentum.combo_heat > 0 {
            entries.push(HudEntry {
                label: "Heat",
                value: format!("x{}", snapshot.momentum.combo_heat),
            });
        }

        let prompts = match snapshot.status {
            SessionStatus::Pending => vec![HudPrompt::Launch],
            SessionStatus::Active if snapshot.lives_remaining == 1 => vec![HudPrompt::LastLife],
            SessionStatus::Active => Vec::new(),
            SessionStatus::Paused => vec![HudPrompt::Resume, HudPrompt::Quit],
            SessionStatus::Completed => vec![HudPrompt::NextRound],
            SessionStatus::Failed => vec![HudPrompt::Retry],
        };

        Self { entries, prompts }
    }

    pub fn entry(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.value.as_str())
    }
}

/// Format milliseconds as `m:ss`
pub fn format_duration(ms: f64) -> String {
    let total_secs = if ms.is_finite() && ms > 0.0 {
        (ms / 1000.0).floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}
