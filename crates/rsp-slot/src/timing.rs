//! Timing profiles for the reel timeline
//!
//! All values are expressed in the unit of the frame delta handed to
//! `update`; with a 60 Hz ticker that is one frame per 1.0.

use serde::{Deserialize, Serialize};

use rsp_core::{SlotError, SlotResult};

/// Timing profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Normal gameplay timing
    #[default]
    Normal,
    /// Quick spin
    Turbo,
    /// Derived via `scaled` or loaded from config
    Custom,
}

/// Reel timeline constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Profile type
    #[serde(default)]
    pub profile: TimingProfile,

    /// Full spin speed (units per delta unit)
    pub max_speed: f64,

    /// Acceleration ramp duration
    pub in_time: f64,

    /// Deceleration duration after `stop()`
    pub out_time: f64,

    /// Delay between consecutive reel starts
    pub start_stagger: f64,

    /// Delay from `spin_reels()` until the first reel is told to stop
    pub first_stop_delay: f64,

    /// Whole tiles travelled past the next boundary while decelerating
    pub stop_run_tiles: u32,

    /// Blur strength per unit of speed
    pub blur_factor: f64,
}

impl TimingConfig {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            max_speed: 80.0,
            in_time: 30.0,
            out_time: 30.0,
            start_stagger: 18.0,    // 300 ms at 60 Hz
            first_stop_delay: 90.0, // 1500 ms at 60 Hz
            stop_run_tiles: 2,
            blur_factor: 0.3,
        }
    }

    /// Quick spin
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            max_speed: 80.0,
            in_time: 12.0,
            out_time: 15.0,
            start_stagger: 6.0,
            first_stop_delay: 36.0,
            stop_run_tiles: 1,
            blur_factor: 0.3,
        }
    }

    /// Get config for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Custom => Self::normal(),
        }
    }

    /// Scale durations by factor (< 1.0 = faster); speed is kept
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            profile: TimingProfile::Custom,
            in_time: self.in_time * factor,
            out_time: self.out_time * factor,
            start_stagger: self.start_stagger * factor,
            first_stop_delay: self.first_stop_delay * factor,
            ..self.clone()
        }
    }

    /// Offset of the last reel's start relative to `spin_reels()`
    pub fn last_start_offset(&self, reel_count: u8) -> f64 {
        f64::from(reel_count.saturating_sub(1)) * self.start_stagger
    }

    /// Time from `spin_reels()` to settle, ignoring frame quantization
    pub fn nominal_spin_duration(&self, reel_count: u8) -> f64 {
        self.first_stop_delay + f64::from(reel_count) * self.out_time
    }

    pub fn validate(&self, reel_count: u8) -> SlotResult<()> {
        let positive = [
            ("max_speed", self.max_speed),
            ("in_time", self.in_time),
            ("out_time", self.out_time),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SlotError::InvalidConfig(format!("{name} must be positive, got {value}")));
            }
        }
        let non_negative = [
            ("start_stagger", self.start_stagger),
            ("first_stop_delay", self.first_stop_delay),
            ("blur_factor", self.blur_factor),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SlotError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        // Reel 1 is stopped by reel 0's completion, so every reel must be
        // spinning before the first stop fires.
        if self.first_stop_delay < self.last_start_offset(reel_count) {
            return Err(SlotError::InvalidConfig(format!(
                "first_stop_delay {} is shorter than the last reel start {}",
                self.first_stop_delay,
                self.last_start_offset(reel_count)
            )));
        }
        Ok(())
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::normal()
    }
}
