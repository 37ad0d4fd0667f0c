//! Delay scheduling against the wall clock or a compressed clock.
//!
//! The engine never sleeps directly; every pause goes through a
//! [`TimeProvider`] so that tests and quick play-throughs can swap the
//! strategy without touching playback logic.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Source of time and suspension for the engine.
#[async_trait]
pub trait TimeProvider: Send + Sync {
    /// Suspend for a requested duration, as interpreted by the strategy.
    async fn delay(&self, ms: u64);

    /// Current wall-clock instant.
    fn now(&self) -> DateTime<Utc>;

    /// Milliseconds elapsed since `since`, never negative.
    fn elapsed_since(&self, since: DateTime<Utc>) -> u64 {
        let elapsed = self.now().signed_duration_since(since).num_milliseconds();
        u64::try_from(elapsed).unwrap_or(0)
    }
}

/// Delays proportional to the requested duration, divided by a speed factor.
#[derive(Debug, Clone, Copy)]
pub struct RealTime {
    speed_factor: f64,
}

impl Default for RealTime {
    fn default() -> Self {
        Self { speed_factor: 1.0 }
    }
}

impl RealTime {
    /// Real time at normal speed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scale delays by `1 / factor`. Non-positive factors are ignored.
    pub fn with_speed(mut self, factor: f64) -> Self {
        if factor > 0.0 && factor.is_finite() {
            self.speed_factor = factor;
        }
        self
    }

    /// Current speed factor.
    pub fn speed_factor(&self) -> f64 {
        self.speed_factor
    }

    /// Duration actually slept for a requested delay.
    pub fn scaled(&self, ms: u64) -> Duration {
        Duration::from_millis((ms as f64 / self.speed_factor).floor() as u64)
    }
}

#[async_trait]
impl TimeProvider for RealTime {
    async fn delay(&self, ms: u64) {
        tokio::time::sleep(self.scaled(ms)).await;
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Every delay collapses to the same short pause.
#[derive(Debug, Clone, Copy)]
pub struct CompressedTime {
    pause: Duration,
}

impl Default for CompressedTime {
    fn default() -> Self {
        Self {
            pause: Duration::from_millis(500),
        }
    }
}

impl CompressedTime {
    /// Compressed time with the default 500 ms pause.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different fixed pause.
    pub fn with_pause(mut self, ms: u64) -> Self {
        self.pause = Duration::from_millis(ms);
        self
    }

    /// The fixed pause.
    pub fn pause(&self) -> Duration {
        self.pause
    }
}

#[async_trait]
impl TimeProvider for CompressedTime {
    async fn delay(&self, _ms: u64) {
        if !self.pause.is_zero() {
            tokio::time::sleep(self.pause).await;
        }
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Which strategy a session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeMode {
    /// Proportional delays.
    Real,
    /// Fixed short delays.
    Compressed,
}

/// Build the provider for a mode.
///
/// `speed` only applies to [`TimeMode::Real`]; `pause_ms` only to
/// [`TimeMode::Compressed`].
pub fn time_provider(mode: TimeMode, speed: f64, pause_ms: u64) -> Arc<dyn TimeProvider> {
    match mode {
        TimeMode::Real => Arc::new(RealTime::new().with_speed(speed)),
        TimeMode::Compressed => Arc::new(CompressedTime::new().with_pause(pause_ms)),
    }
}

/// Render a duration as whole seconds, minutes, hours, or days.
pub fn format_duration(ms: u64) -> String {
    const MINUTE: u64 = 60_000;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;

    if ms < MINUTE {
        format!("{} seconds", ms / 1000)
    } else if ms < HOUR {
        format!("{} minutes", ms / MINUTE)
    } else if ms < DAY {
        format!("{} hours", ms / HOUR)
    } else {
        format!("{} days", ms / DAY)
    }
}
