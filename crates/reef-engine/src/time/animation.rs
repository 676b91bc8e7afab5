use std::time::Duration;

/// Normalized animation phase in `[0, 1)`.
///
/// Advances by `elapsed / period` per frame. Reaching or passing `1.0` wraps
/// to exactly `0.0`; the overshoot is dropped.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AnimationClock {
    time: f32,
    period: f32,
}

impl AnimationClock {
    /// Creates a clock with the given period in seconds.
    ///
    /// Non-positive or non-finite periods are replaced by one second.
    pub fn new(period_seconds: f32) -> Self {
        let period = if period_seconds.is_finite() && period_seconds > 0.0 {
            period_seconds
        } else {
            log::warn!("invalid animation period {period_seconds}; using 1s");
            1.0
        };
        Self { time: 0.0, period }
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    /// Advances by `elapsed` wall time and returns the new phase.
    pub fn advance(&mut self, elapsed: Duration) -> f32 {
        self.advance_by(elapsed.as_secs_f32() / self.period)
    }

    /// Advances by an already normalized delta.
    pub fn advance_by(&mut self, dt: f32) -> f32 {
        self.time += dt;
        if self.time >= 1.0 || self.time.is_nan() {
            self.time = 0.0;
        }
        self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_scales_by_period() {
        let mut clock = AnimationClock::new(4.0);
        let t = clock.advance(Duration::from_secs(1));
        assert!((t - 0.25).abs() < 1e-6);
    }

    #[test]
    fn wraps_to_exact_zero() {
        let mut clock = AnimationClock::new(1.0);
        clock.advance_by(0.9);
        assert_eq!(clock.advance_by(0.3), 0.0);
    }

    #[test]
    fn reaching_one_wraps() {
        let mut clock = AnimationClock::new(1.0);
        clock.advance_by(0.5);
        assert_eq!(clock.advance_by(0.5), 0.0);
    }

    #[test]
    fn stays_in_unit_interval() {
        let mut clock = AnimationClock::new(4.0);
        let steps = [0.016, 0.5, 0.033, 1.7, 0.0001, 3.9, 0.25, 0.9];
        for _ in 0..50 {
            for s in steps {
                let t = clock.advance(Duration::from_secs_f32(s));
                assert!((0.0..1.0).contains(&t), "time {t} out of range");
            }
        }
    }

    #[test]
    fn monotonic_between_wraps() {
        let mut clock = AnimationClock::new(4.0);
        let mut prev = clock.time();
        for _ in 0..100 {
            let t = clock.advance(Duration::from_millis(7));
            assert!(t > prev || t == 0.0);
            prev = t;
        }
    }

    #[test]
    fn invalid_period_falls_back() {
        assert_eq!(AnimationClock::new(0.0).period(), 1.0);
        assert_eq!(AnimationClock::new(f32::NAN).period(), 1.0);
    }
}
