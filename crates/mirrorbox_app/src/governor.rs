//! Optional frame-rate cap, applied after a frame has been presented.

use std::time::Duration;

use mirrorbox_core::TimeClock;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameGovernor {
    budget: Option<Duration>,
}

impl FrameGovernor {
    /// `None` or `Some(0)` disables the cap.
    pub fn new(frame_cap: Option<u32>) -> Self {
        let budget = frame_cap.filter(|fps| *fps > 0).map(|fps| Duration::from_secs(1) / fps);
        Self { budget }
    }

    pub fn budget(&self) -> Option<Duration> {
        self.budget
    }

    /// Time left in the frame budget after `spent`.
    pub fn remaining(&self, spent: Duration) -> Option<Duration> {
        self.budget?.checked_sub(spent).filter(|left| !left.is_zero())
    }

    /// Sleeps out the rest of the frame started at the clock's last tick.
    pub fn wait(&self, clock: &TimeClock) {
        if let Some(left) = self.remaining(clock.since_last_tick()) {
            std::thread::sleep(left);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapped_never_waits() {
        let governor = FrameGovernor::new(None);
        assert_eq!(governor.budget(), None);
        assert_eq!(governor.remaining(Duration::ZERO), None);
        assert_eq!(FrameGovernor::new(Some(0)), governor);
    }

    #[test]
    fn waits_out_the_remaining_budget() {
        let governor = FrameGovernor::new(Some(50));
        assert_eq!(governor.budget(), Some(Duration::from_millis(20)));
        assert_eq!(governor.remaining(Duration::from_millis(5)), Some(Duration::from_millis(15)));
        assert_eq!(governor.remaining(Duration::from_millis(20)), None);
        assert_eq!(governor.remaining(Duration::from_millis(35)), None);
    }
}
