//! Audio/visual drift monitor
//!
//! Compares the frame clock against the audio scheduler clock every tick and
//! keeps a time-bounded window of samples. A warning raises when peak drift
//! reaches `warn_threshold_ms` and clears only once peak and average are both
//! under `recover_threshold_ms`.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::events::CoreEvent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncDriftConfig {
    pub window_secs: f64,
    /// Backstop against clock irregularities flooding the window
    pub max_samples: usize,
    pub warn_threshold_ms: f64,
    pub recover_threshold_ms: f64,
    pub diagnostic_interval_secs: f64,
}

impl Default for SyncDriftConfig {
    fn default() -> Self {
        Self {
            window_secs: DRIFT_WINDOW_SECS,
            max_samples: DRIFT_MAX_SAMPLES,
            warn_threshold_ms: DRIFT_WARN_MS,
            recover_threshold_ms: DRIFT_RECOVER_MS,
            diagnostic_interval_secs: DRIFT_DIAGNOSTIC_INTERVAL_SECS,
        }
    }
}

impl SyncDriftConfig {
    fn sanitized(self) -> Self {
        let defaults = Self::default();
        let positive = |v: f64, fallback: f64| {
            let v = crate::finite_or(v, fallback);
            if v > 0.0 { v } else { fallback }
        };
        let warn = positive(self.warn_threshold_ms, defaults.warn_threshold_ms);
        Self {
            window_secs: positive(self.window_secs, defaults.window_secs),
            max_samples: self.max_samples.max(1),
            warn_threshold_ms: warn,
            recover_threshold_ms: positive(self.recover_threshold_ms, defaults.recover_threshold_ms)
                .min(warn),
            diagnostic_interval_secs: positive(
                self.diagnostic_interval_secs,
                defaults.diagnostic_interval_secs,
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyncDriftSample {
    /// Seconds since session start
    pub timestamp_secs: f64,
    /// Signed; positive when the frame clock runs ahead of audio
    pub drift_ms: f64,
    pub magnitude_ms: f64,
}

/// Rolling statistics after one update
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DriftStatus {
    pub drift_ms: f64,
    /// Signed mean over the window
    pub average_ms: f64,
    /// Largest magnitude in the window
    pub peak_ms: f64,
    pub peak_at_secs: f64,
    pub sample_count: usize,
    pub warning: bool,
    /// No wall clock was available; nothing is tracked
    pub degraded: bool,
}

#[derive(Debug)]
pub struct SyncDriftMonitor {
    config: SyncDriftConfig,
    samples: VecDeque<SyncDriftSample>,
    status: DriftStatus,
    next_diagnostic_secs: f64,
    events: Vec<CoreEvent>,
}

impl SyncDriftMonitor {
    pub fn new(config: SyncDriftConfig) -> Self {
        let config = config.sanitized();
        Self {
            next_diagnostic_secs: config.diagnostic_interval_secs,
            config,
            samples: VecDeque::new(),
            status: DriftStatus::default(),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &SyncDriftConfig {
        &self.config
    }

    pub fn status(&self) -> DriftStatus {
        self.status
    }

    pub fn is_warning(&self) -> bool {
        self.status.warning
    }

    pub fn samples(&self) -> impl Iterator<Item = &SyncDriftSample> {
        self.samples.iter()
    }

    /// Feed one tick
    ///
    /// `now_secs` is elapsed session time; `wall_secs` the high-resolution
    /// frame clock, if any; `audio_secs` the audio scheduler clock.
    pub fn update(&mut self, now_secs: f64, wall_secs: Option<f64>, audio_secs: f64) -> DriftStatus {
        let Some(wall_secs) = wall_secs else {
            self.status = DriftStatus {
                degraded: true,
                ..DriftStatus::default()
            };
            return self.status;
        };

        let now = crate::finite_or(now_secs, self.latest_timestamp());
        let drift_ms = crate::finite_or((wall_secs - audio_secs) * 1000.0, 0.0);

        self.samples.push_back(SyncDriftSample {
            timestamp_secs: now,
            drift_ms,
            magnitude_ms: drift_ms.abs(),
        });
        self.purge(now);
        self.recompute(drift_ms);
        self.update_warning(now);

        if now >= self.next_diagnostic_secs {
            self.emit_diagnostic(now);
            // Next interval boundary after `now`, in one step
            let interval = self.config.diagnostic_interval_secs;
            self.next_diagnostic_secs = ((now / interval).floor() + 1.0) * interval;
        }

        self.status
    }

    /// Forget all samples and the warning state
    pub fn reset(&mut self) {
        self.samples.clear();
        self.status = DriftStatus::default();
        self.next_diagnostic_secs = self.config.diagnostic_interval_secs;
    }

    pub fn drain_events(&mut self) -> Vec<CoreEvent> {
        std::mem::take(&mut self.events)
    }

    fn latest_timestamp(&self) -> f64 {
        self.samples.back().map_or(0.0, |s| s.timestamp_secs)
    }

    fn purge(&mut self, now: f64) {
        let cutoff = now - self.config.window_secs;
        while self
            .samples
            .front()
            .is_some_and(|s| s.timestamp_secs <= cutoff)
        {
            self.samples.pop_front();
        }
        while self.samples.len() > self.config.max_samples {
            self.samples.pop_front();
        }
    }

    fn recompute(&mut self, drift_ms: f64) {
        let count = self.samples.len();
        let sum: f64 = self.samples.iter().map(|s| s.drift_ms).sum();
        let (peak_ms, peak_at_secs) = self
            .samples
            .iter()
            .fold((0.0_f64, 0.0_f64), |(peak, at), s| {
                if s.magnitude_ms > peak {
                    (s.magnitude_ms, s.timestamp_secs)
                } else {
                    (peak, at)
                }
            });

        self.status = DriftStatus {
            drift_ms,
            average_ms: if count > 0 { sum / count as f64 } else { 0.0 },
            peak_ms,
            peak_at_secs,
            sample_count: count,
            warning: self.status.warning,
            degraded: false,
        };
    }

    fn update_warning(&mut self, now: f64) {
        let DriftStatus {
            peak_ms,
            average_ms,
            ..
        } = self.status;

        if !self.status.warning && peak_ms >= self.config.warn_threshold_ms {
            self.status.warning = true;
            log::warn!(
                "A/V drift warning: peak {:.1}ms (avg {:.1}ms) at {:.2}s",
                peak_ms,
                average_ms,
                now
            );
            self.events.push(CoreEvent::DriftWarningRaised {
                peak_ms,
                average_ms,
                at_secs: now,
            });
        } else if self.status.warning
            && peak_ms < self.config.recover_threshold_ms
            && average_ms.abs() < self.config.recover_threshold_ms
        {
            self.status.warning = false;
            log::info!(
                "A/V drift recovered: peak {:.1}ms (avg {:.1}ms) at {:.2}s",
                peak_ms,
                average_ms,
                now
            );
            self.events.push(CoreEvent::DriftWarningCleared {
                peak_ms,
                average_ms,
                at_secs: now,
            });
        }
    }

    fn emit_diagnostic(&mut self, now: f64) {
        let s = self.status;
        log::debug!(
            "A/V drift {:.1}ms avg {:.1}ms peak {:.1}ms over {} samples",
            s.drift_ms,
            s.average_ms,
            s.peak_ms,
            s.sample_count
        );
        self.events.push(CoreEvent::DriftDiagnostic {
            drift_ms: s.drift_ms,
            average_ms: s.average_ms,
            peak_ms: s.peak_ms,
            sample_count: s.sample_count,
            at_secs: now,
        });
    }
}

impl Default for SyncDriftMonitor {
    fn default() -> Self {
        Self::new(SyncDriftConfig::default())
    }
}
