use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Interval between autonomous production-cycle ticks.
pub const PRODUCTION_INTERVAL: Duration = Duration::from_millis(10_000);

/// Chance that a production-cycle tick counts as a rejection.
pub const REJECT_CHANCE: f64 = 0.1;

/// Operational state reported to the console and the telemetry surface.
///
/// Failure overrides the enabled flag for reporting; it is not a stored
/// third state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    Enabled,
    Disabled,
    Failure,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Enabled => "enabled",
            DeviceStatus::Disabled => "disabled",
            DeviceStatus::Failure => "failure",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One on-demand sample of the full read-only surface. Each signal is an
/// independent draw; nothing is cached between samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub enabled: bool,
    pub failure: bool,
    pub produced: u64,
    pub rejected: u64,
    pub temperature: f64,
    pub pressure: f64,
    pub depth: f64,
    pub speed: f64,
}

/// Simulated lathe: run/failure flags, production counters, and synthetic
/// telemetry. The periodic production cycle itself is driven externally;
/// the runtime keeps exactly one tick task alive iff the device is
/// enabled.
#[derive(Debug, Clone)]
pub struct Lathe<R> {
    enabled: bool,
    failure: bool,
    produced: u64,
    rejected: u64,
    rng: R,
}

impl<R: RandomSource> Lathe<R> {
    pub fn new(rng: R, enabled: bool) -> Self {
        let mut lathe = Self {
            enabled: false,
            failure: false,
            produced: 0,
            rejected: 0,
            rng,
        };
        lathe.set_enabled(enabled);
        lathe
    }

    pub fn status(&self) -> DeviceStatus {
        if self.failure {
            DeviceStatus::Failure
        } else if self.enabled {
            DeviceStatus::Enabled
        } else {
            DeviceStatus::Disabled
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn failure(&self) -> bool {
        self.failure
    }

    pub fn produced(&self) -> u64 {
        self.produced
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Writing the run flag always clears failure first, even when the
    /// value does not change. Writing the current value is therefore the
    /// way to recover from failure without touching the run state.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.failure = false;

        if enabled == self.enabled {
            return;
        }

        self.enabled = enabled;
    }

    /// Entering failure mode stops the device first; leaving it touches
    /// nothing but the flag.
    pub fn set_failure(&mut self, failure: bool) {
        if failure {
            self.set_enabled(false);
        }

        self.failure = failure;
    }

    /// One autonomous production-cycle step: a draw at or below
    /// [`REJECT_CHANCE`] rejects, anything above produces.
    pub fn cycle_tick(&mut self) {
        if self.rng.next_unit() <= REJECT_CHANCE {
            self.reject();
        } else {
            self.produce();
        }
    }

    /// Counts only while enabled; the console may call this directly, so
    /// a disabled device returns the unchanged counter instead of
    /// erroring.
    pub fn produce(&mut self) -> u64 {
        if self.enabled {
            self.produced += 1;
        }

        self.produced
    }

    pub fn reject(&mut self) -> u64 {
        if self.enabled {
            self.rejected += 1;
        }

        self.rejected
    }

    /// Zeroes both counters regardless of run or failure state.
    pub fn reset(&mut self) {
        self.produced = 0;
        self.rejected = 0;
    }

    fn band(&mut self, center: f64, spread: f64) -> f64 {
        if !self.enabled {
            return 0.0;
        }

        center + spread * (1.0 - 2.0 * self.rng.next_unit())
    }

    pub fn temperature(&mut self) -> f64 {
        self.band(100.0, 20.0)
    }

    pub fn pressure(&mut self) -> f64 {
        self.band(10.0, 1.0)
    }

    pub fn depth(&mut self) -> f64 {
        self.band(10.0, 5.0)
    }

    pub fn speed(&mut self) -> f64 {
        self.band(10.0, 5.0)
    }

    pub fn snapshot(&mut self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            enabled: self.enabled,
            failure: self.failure,
            produced: self.produced,
            rejected: self.rejected,
            temperature: self.temperature(),
            pressure: self.pressure(),
            depth: self.depth(),
            speed: self.speed(),
        }
    }
}
