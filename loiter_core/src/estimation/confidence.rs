// loiter_core/src/estimation/confidence.rs

use crate::config::ConfidenceConfig;

/// Localization health as judged by the confidence counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceState {
    /// Counter is positive: recent matches were informative.
    Tracking,
    /// Counter is at or below zero but above the lost threshold.
    Degraded,
    /// Counter crossed the lost threshold on this update. The counter has
    /// already been zeroed; the owner must restart localization.
    Lost,
}

/// Leaky, asymmetric hysteresis counter over localizer weights.
///
/// One informative frame recovers from any amount of decay, but it takes
/// `bound + 1` consecutive uninformative frames to declare localization lost.
#[derive(Debug, Clone)]
pub struct ConfidenceTracker {
    counter: i32,
    bound: i32,
    uninformative_weight: f64,
    tolerance: f64,
}

impl ConfidenceTracker {
    pub fn new(config: &ConfidenceConfig) -> Self {
        Self {
            counter: 0,
            bound: config.bound,
            uninformative_weight: config.uninformative_weight,
            tolerance: config.tolerance,
        }
    }

    /// Feeds one localizer weight and returns the resulting state.
    pub fn update(&mut self, weight: f64) -> ConfidenceState {
        if is_almost_equal(weight, self.uninformative_weight, self.tolerance) {
            self.counter -= 1;
        } else if self.counter <= 0 {
            self.counter = 1;
        } else {
            self.counter = (self.counter + 1).min(self.bound);
        }

        if self.counter < -self.bound {
            self.counter = 0;
            return ConfidenceState::Lost;
        }
        self.state()
    }

    pub fn state(&self) -> ConfidenceState {
        if self.counter > 0 {
            ConfidenceState::Tracking
        } else {
            ConfidenceState::Degraded
        }
    }

    pub fn counter(&self) -> i32 {
        self.counter
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }
}

/// `|a − b| ≤ epsilon`.
pub fn is_almost_equal(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}
