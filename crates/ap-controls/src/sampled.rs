//! Sample-interval accounting for digital controllers.
//!
//! The scheduler may tick a controller faster than the controller wants to
//! sample. Elapsed time is accumulated across ticks and released as one
//! sample once it exceeds the desired interval; between samples the last
//! output is held.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// Accumulates scheduler time until a full sample interval has passed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SampleAccumulator {
    /// Desired sample interval in seconds. `0.0` samples on every tick that
    /// advances time.
    desired_interval: f64,
    /// Time accrued since the last released sample.
    elapsed: f64,
}

impl SampleAccumulator {
    /// Create an accumulator for the given desired interval.
    ///
    /// # Errors
    ///
    /// Returns error if `desired_interval` is negative or not finite.
    pub fn new(desired_interval: f64) -> ControlResult<Self> {
        let mut acc = Self::default();
        acc.set_desired_interval(desired_interval)?;
        Ok(acc)
    }

    /// Change the desired interval. Accrued time is kept.
    pub fn set_desired_interval(&mut self, desired_interval: f64) -> ControlResult<()> {
        if !desired_interval.is_finite() || desired_interval < 0.0 {
            return Err(ControlError::InvalidArg {
                what: "sample interval must be finite and non-negative",
            });
        }
        self.desired_interval = desired_interval;
        Ok(())
    }

    /// Desired sample interval in seconds.
    pub fn desired_interval(&self) -> f64 {
        self.desired_interval
    }

    /// Time accrued since the last released sample.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Add `dt` and, if the accrued time now exceeds the desired interval,
    /// release it as the actual sample interval and start over.
    ///
    /// The released interval is the real accrued time, which may be longer
    /// than the desired one.
    pub fn accumulate(&mut self, dt: f64) -> Option<f64> {
        self.elapsed += dt;
        if self.elapsed <= self.desired_interval {
            return None;
        }
        Some(std::mem::take(&mut self.elapsed))
    }
}
