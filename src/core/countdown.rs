// src/core/countdown.rs

/// Length of the offer countdown, started when a result first appears.
pub const OFFER_SECONDS: u32 = 15 * 60;

/// Countdown shown next to the unlock offer. Holds at zero once expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    seconds_remaining: u32,
}

impl Countdown {
    pub fn start() -> Self {
        Self { seconds_remaining: OFFER_SECONDS }
    }

    /// One second elapsed. No-op once the countdown is at zero.
    pub fn tick(&mut self) {
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn minutes(&self) -> u32 {
        self.seconds_remaining / 60
    }

    pub fn seconds(&self) -> u32 {
        self.seconds_remaining % 60
    }

    pub fn is_expired(&self) -> bool {
        self.seconds_remaining() == 0
    }
}

impl std::fmt::Display for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes(), self.seconds())
    }
}
