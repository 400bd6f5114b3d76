//! Audio-scene hints for the music sequencer

use serde::{Deserialize, Serialize};

use super::state::SessionStatus;
use crate::momentum::Momentum;

/// Broad musical state the sequencer should be in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioMood {
    Silent,
    Ambient,
    Driving,
    Climax,
    Victory,
    Defeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioScene {
    pub mood: AudioMood,
    /// 0-1 layer intensity
    pub intensity: f32,
}

impl AudioScene {
    pub fn silent() -> Self {
        Self {
            mood: AudioMood::Silent,
            intensity: 0.0,
        }
    }

    pub fn derive(
        status: SessionStatus,
        momentum: &Momentum,
        lives_remaining: u32,
        heat_cap: u32,
        reduced_motion: bool,
    ) -> Self {
        let mut intensity = momentum.intensity(heat_cap);
        if lives_remaining == 1 {
            intensity = (intensity + 0.1).min(1.0);
        }
        if reduced_motion {
            intensity *= 0.6;
        }

        match status {
            SessionStatus::Pending => Self::silent(),
            SessionStatus::Paused => Self {
                mood: AudioMood::Ambient,
                intensity: intensity * 0.3,
            },
            SessionStatus::Completed => Self {
                mood: AudioMood::Victory,
                intensity: 1.0,
            },
            SessionStatus::Failed => Self {
                mood: AudioMood::Defeat,
                intensity: 0.4,
            },
            SessionStatus::Active => {
                let mood = if intensity < 0.35 {
                    AudioMood::Ambient
                } else if intensity < 0.75 {
                    AudioMood::Driving
                } else {
                    AudioMood::Climax
                };
                Self { mood, intensity }
            }
        }
    }
}
