//! Runtime configuration and the simulation clock
//!
//! Everything the control surface can change lives here. Values are checked
//! on the way in so the tick logic never sees an out-of-range input.

use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::types::SECONDS_PER_TICK;

/// Slowest speed multiplier the control surface accepts
pub const MIN_SPEED_MULTIPLIER: f64 = 0.5;
/// Fastest speed multiplier the control surface accepts
pub const MAX_SPEED_MULTIPLIER: f64 = 5.0;

/// Background traffic level scaling passenger arrivals
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CongestionLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl CongestionLevel {
    pub fn multiplier(self) -> f64 {
        match self {
            CongestionLevel::Low => 0.7,
            CongestionLevel::Medium => 1.0,
            CongestionLevel::High => 1.5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CongestionLevel::Low => "low",
            CongestionLevel::Medium => "medium",
            CongestionLevel::High => "high",
        }
    }
}

impl fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CongestionLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(CongestionLevel::Low),
            "medium" => Ok(CongestionLevel::Medium),
            "high" => Ok(CongestionLevel::High),
            other => anyhow::bail!(
                "Unrecognized congestion level '{}' (expected low, medium or high)",
                other
            ),
        }
    }
}

/// User-controlled switches read by every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ConfigState {
    pub congestion_level: CongestionLevel,
    pub rush_hour: bool,
    pub dynamic_routing: bool,
}

impl ConfigState {
    pub fn new(congestion_level: CongestionLevel, rush_hour: bool, dynamic_routing: bool) -> Self {
        Self {
            congestion_level,
            rush_hour,
            dynamic_routing,
        }
    }
}

/// Logical time of the simulation
///
/// `tick` counts completed logical ticks. The speed multiplier decides how
/// many logical ticks one external timer tick is worth; fractional amounts
/// carry over to the next external tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationClock {
    tick: u64,
    speed_multiplier: f64,
    carry: f64,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationClock {
    pub fn new() -> Self {
        Self {
            tick: 0,
            speed_multiplier: 1.0,
            carry: 0.0,
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }

    /// Simulated seconds since the start of the run
    pub fn elapsed_seconds(&self) -> f64 {
        self.tick as f64 * SECONDS_PER_TICK
    }

    /// Set the speed multiplier.
    ///
    /// Non-finite and non-positive values are rejected; anything else is
    /// clamped into `[MIN_SPEED_MULTIPLIER, MAX_SPEED_MULTIPLIER]`. Returns
    /// the value actually applied.
    pub fn set_speed_multiplier(&mut self, multiplier: f64) -> Result<f64> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            anyhow::bail!("Speed multiplier must be a positive number, got {}", multiplier);
        }
        let clamped = multiplier.clamp(MIN_SPEED_MULTIPLIER, MAX_SPEED_MULTIPLIER);
        if clamped != multiplier {
            warn!(
                "Speed multiplier {} out of range, clamped to {}",
                multiplier, clamped
            );
        }
        self.speed_multiplier = clamped;
        Ok(clamped)
    }

    /// Account for one external tick and return how many logical ticks to run
    pub fn take_budget(&mut self) -> u32 {
        self.carry += self.speed_multiplier;
        let whole = self.carry.floor();
        self.carry -= whole;
        whole as u32
    }

    /// Record one completed logical tick
    pub fn advance(&mut self) {
        self.tick += 1;
    }
}
