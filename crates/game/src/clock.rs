//! Simulation time.

/// Current time and the delta of the tick in progress.
///
/// The clock only moves when the outer loop hands the simulation a delta.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Clock {
    /// Seconds since the simulation started.
    pub time: f64,
    /// Length of the current tick in seconds.
    pub delta: f32,
    /// Number of ticks run so far.
    pub frame: u64,
}

impl Clock {
    /// Start a new tick of length `delta`.
    pub fn advance(&mut self, delta: f32) {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        self.delta = delta;
        self.time += f64::from(delta);
        self.frame += 1;
    }

    /// Seconds elapsed since `earlier`.
    #[inline]
    pub fn since(&self, earlier: f64) -> f64 {
        self.time - earlier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance() {
        let mut clock = Clock::default();
        clock.advance(0.5);
        clock.advance(0.25);
        assert_eq!(clock.frame, 2);
        assert_eq!(clock.time, 0.75);
        assert_eq!(clock.delta, 0.25);
        assert_eq!(clock.since(0.5), 0.25);
    }

    #[test]
    fn test_bad_delta_is_zero() {
        let mut clock = Clock::default();
        clock.advance(f32::NAN);
        clock.advance(-1.0);
        assert_eq!(clock.time, 0.0);
        assert_eq!(clock.frame, 2);
    }
}
