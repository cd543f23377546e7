use std::sync::atomic::{AtomicU32, Ordering};

/// The simulated clock. Time advances in whole minutes, once per scheduler
/// tick; flight tasks only ever read it for display timestamps.
///
/// Owned by the Scheduler and shared by `Arc`; there is no global.
#[derive(Debug, Default)]
pub struct SimClock {
    minutes: AtomicU32,
}

impl SimClock {
    pub fn new() -> Self {
        SimClock {
            minutes: AtomicU32::new(0),
        }
    }

    pub fn set_minutes(&self, minutes: u32) {
        self.minutes.store(minutes, Ordering::SeqCst);
    }

    pub fn minutes(&self) -> u32 {
        self.minutes.load(Ordering::SeqCst)
    }

    /// The current simulated time formatted `HH:MM`.
    pub fn timestamp(&self) -> String {
        let minutes = self.minutes();
        format!("{:02}:{:02}", minutes / 60, minutes % 60)
    }
}
