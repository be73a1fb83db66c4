// loiter_sim/src/simulation/core/schedule.rs

/// Fires once per period of simulated time.
///
/// The n-th firing is due at `n * period`, computed fresh each time so that
/// long runs do not accumulate rounding drift.
#[derive(Debug, Clone)]
pub struct PeriodicTimer {
    period: f64,
    fired: u64,
}

// Absorbs the rounding of `step * dt` against `n * period`.
const SLACK: f64 = 1e-9;

impl PeriodicTimer {
    pub fn from_rate(rate_hz: f64) -> Self {
        Self {
            period: 1.0 / rate_hz,
            fired: 0,
        }
    }

    /// Returns true if a firing is due at `now`. Missed firings collapse
    /// into one.
    pub fn tick(&mut self, now: f64) -> bool {
        if now + SLACK < self.next_due() {
            return false;
        }
        while self.next_due() <= now + SLACK {
            self.fired += 1;
        }
        true
    }

    fn next_due(&self) -> f64 {
        self.fired as f64 * self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_at_rate_on_a_finer_clock() {
        let mut timer = PeriodicTimer::from_rate(20.0);
        let dt = 1.0 / 200.0;
        let fired = (0..2000).filter(|&i| timer.tick(i as f64 * dt)).count();
        // t = 0.0 .. 9.995 s inclusive of the first firing at t = 0.
        assert_eq!(fired, 200);
    }

    #[test]
    fn test_missed_firings_collapse() {
        let mut timer = PeriodicTimer::from_rate(10.0);
        assert!(timer.tick(0.0));
        assert!(timer.tick(0.55));
        assert!(!timer.tick(0.58));
        assert!(timer.tick(0.6));
    }
}
