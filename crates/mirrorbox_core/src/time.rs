//! Frame timing.
//!
//! The runner owns one [`TimeClock`] and ticks it once per presented frame.
//! The snapshots feed the optional frame governor and the teardown report;
//! the scene itself is purely event-driven and never reads them.

use std::time::{Duration, Instant};

/// Timing snapshot for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Time {
    /// Seconds since the previous tick.
    pub delta: f32,
    /// Seconds since the clock was created.
    pub elapsed: f64,
    /// Frames ticked before this one.
    pub frame_count: u64,
}

impl Time {
    /// Instantaneous frames per second derived from `delta`.
    pub fn fps(&self) -> f32 {
        if self.delta > 0.0 { 1.0 / self.delta } else { 0.0 }
    }
}

/// Stateful clock that produces [`Time`] snapshots.
#[derive(Debug)]
pub struct TimeClock {
    start: Instant,
    last_tick: Instant,
    frame_count: u64,
}

impl TimeClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self { start: now, last_tick: now, frame_count: 0 }
    }

    /// Snapshot without advancing the frame counter.
    pub fn peek(&self) -> Time {
        self.snapshot(Instant::now())
    }

    /// Advances by one frame and returns the snapshot for it.
    pub fn tick(&mut self) -> Time {
        let now = Instant::now();
        let time = self.snapshot(now);
        self.last_tick = now;
        self.frame_count += 1;
        time
    }

    /// Frames ticked so far.
    pub fn frames(&self) -> u64 {
        self.frame_count
    }

    /// Time since the last tick.
    pub fn since_last_tick(&self) -> Duration {
        self.last_tick.elapsed()
    }

    fn snapshot(&self, now: Instant) -> Time {
        Time {
            delta: (now - self.last_tick).as_secs_f32(),
            elapsed: (now - self.start).as_secs_f64(),
            frame_count: self.frame_count,
        }
    }
}

impl Default for TimeClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_counts_frames_and_peek_does_not() {
        let mut clock = TimeClock::new();
        assert_eq!(clock.peek().frame_count, 0);
        assert_eq!(clock.tick().frame_count, 0);
        assert_eq!(clock.tick().frame_count, 1);
        assert_eq!(clock.peek().frame_count, 2);
        assert_eq!(clock.frames(), 2);
    }

    #[test]
    fn elapsed_never_decreases() {
        let mut clock = TimeClock::new();
        let a = clock.tick();
        std::thread::sleep(Duration::from_millis(2));
        let b = clock.tick();
        assert!(b.elapsed >= a.elapsed);
        assert!(b.delta > 0.0);
    }

    #[test]
    fn fps_of_zero_delta_is_zero() {
        assert_eq!(Time::default().fps(), 0.0);
        let t = Time { delta: 0.5, ..Default::default() };
        assert_eq!(t.fps(), 2.0);
    }
}
