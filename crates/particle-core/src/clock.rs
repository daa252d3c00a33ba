//! Frame time sources

use std::time::Instant;

/// Seconds elapsed since the clock started. Must never decrease.
pub trait FrameClock {
    fn elapsed(&mut self) -> f64;
}

/// Wall clock
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn elapsed(&mut self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Advances by `step` seconds every time it is read.
#[derive(Debug, Clone, Copy)]
pub struct FixedStepClock {
    step: f64,
    ticks: u32,
}

impl FixedStepClock {
    pub fn new(step: f64) -> Self {
        Self { step, ticks: 0 }
    }
}

impl FrameClock for FixedStepClock {
    fn elapsed(&mut self) -> f64 {
        self.ticks += 1;
        f64::from(self.ticks) * self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_step() {
        let mut clock = FixedStepClock::new(0.5);
        assert_eq!(clock.elapsed(), 0.5);
        assert_eq!(clock.elapsed(), 1.0);
    }

    #[test]
    fn test_system_clock_monotonic() {
        let mut clock = SystemClock::new();
        let a = clock.elapsed();
        let b = clock.elapsed();
        assert!(b >= a);
    }
}
