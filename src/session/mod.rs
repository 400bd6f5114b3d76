//! Session state machine
//!
//! Tracks one run: score, lives, round progress, momentum and the derived
//! HUD and audio-scene projections. Leaf component; other components feed
//! it facts but never reach into it.

pub mod audio_scene;
pub mod hud;
pub mod state;

pub use audio_scene::{AudioMood, AudioScene};
pub use hud::{HudEntry, HudProjection, HudPrompt, format_duration};
pub use state::{
    RoundOutcome, RoundResult, Session, SessionConfig, SessionId, SessionSnapshot, SessionStatus,
};
