use crate::traits::TimeSource;
use std::time::Instant;

/// A [`TimeSource`] backed by [`std::time::Instant`], for real-time hosts that run the
/// interpreter at wall-clock speed.
pub struct WallClockTimeSource {
    origin: Instant,
}

impl Default for WallClockTimeSource {
    fn default() -> Self {
        WallClockTimeSource {
            origin: Instant::now(),
        }
    }
}

impl WallClockTimeSource {
    /// Constructor that returns a [`WallClockTimeSource`] whose origin is the moment of
    /// construction.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimeSource for WallClockTimeSource {
    fn elapsed_seconds(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// A [`TimeSource`] that advances only when explicitly told to, for deterministic tests and
/// for hosts that decouple emulation speed from real time (for example, a step loop that
/// advances virtual time by `1 / frequency` per instruction executed rather than sampling the
/// wall clock).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VirtualTimeSource {
    elapsed: f64,
}

impl VirtualTimeSource {
    /// Constructor that returns a [`VirtualTimeSource`] starting at zero elapsed seconds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the virtual clock by `seconds`, which may be fractional.
    pub fn advance(&mut self, seconds: f64) {
        self.elapsed += seconds;
    }

    /// Sets the virtual clock to an absolute elapsed-seconds value, for tests that want to
    /// jump straight to a particular timer-decay point rather than accumulate it.
    pub fn set(&mut self, seconds: f64) {
        self.elapsed = seconds;
    }
}

impl TimeSource for VirtualTimeSource {
    fn elapsed_seconds(&self) -> f64 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_time_source_starts_at_zero() {
        let clock = VirtualTimeSource::new();
        assert_eq!(clock.elapsed_seconds(), 0.0);
    }

    #[test]
    fn test_virtual_time_source_advance_accumulates() {
        let mut clock = VirtualTimeSource::new();
        clock.advance(0.5);
        clock.advance(0.25);
        assert_eq!(clock.elapsed_seconds(), 0.75);
    }

    #[test]
    fn test_virtual_time_source_set_is_absolute() {
        let mut clock = VirtualTimeSource::new();
        clock.advance(10.0);
        clock.set(1.0);
        assert_eq!(clock.elapsed_seconds(), 1.0);
    }

    #[test]
    fn test_wall_clock_time_source_is_non_decreasing() {
        let clock = WallClockTimeSource::new();
        let first = clock.elapsed_seconds();
        let second = clock.elapsed_seconds();
        assert!(second >= first);
    }
}
