//! Blind escalation.

use serde::{Deserialize, Serialize};

use crate::game::entities::{Blinds, Chips};

/// Big blind after `hands` completed hands and `bumps` elimination bumps:
/// `base × 2^(hands / period + bumps)`, saturating.
#[must_use]
pub fn blind_level(base: Chips, hands: u32, period: u32, bumps: u32) -> Chips {
    let doublings = (hands / period.max(1)).saturating_add(bumps);
    base.saturating_mul(2u32.saturating_pow(doublings))
}

/// Tracks how far a tournament's blinds have climbed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindSchedule {
    /// Big blind of the first hand
    base: Chips,
    /// Completed hands per doubling
    period: u32,
    /// Whether a hand with eliminations doubles the blinds once more
    double_on_elimination: bool,
    hands: u32,
    bumps: u32,
}

impl BlindSchedule {
    #[must_use]
    pub fn new(base: Chips, period: u32, double_on_elimination: bool) -> Self {
        Self {
            base,
            period: period.max(1),
            double_on_elimination,
            hands: 0,
            bumps: 0,
        }
    }

    #[must_use]
    pub fn current(&self) -> Blinds {
        let big = blind_level(self.base, self.hands, self.period, self.bumps);
        Blinds {
            small: big / 2,
            big,
        }
    }

    #[must_use]
    pub fn hands(&self) -> u32 {
        self.hands
    }

    #[must_use]
    pub fn bumps(&self) -> u32 {
        self.bumps
    }

    /// Count a completed hand. Any number of eliminations in it adds a
    /// single bump. Returns the new blinds when they went up.
    pub fn record_hand(&mut self, eliminations: usize) -> Option<Blinds> {
        let before = self.current();
        self.hands = self.hands.saturating_add(1);
        if self.double_on_elimination && eliminations > 0 {
            self.bumps = self.bumps.saturating_add(1);
        }
        let after = self.current();
        (after.big > before.big).then_some(after)
    }

    pub fn reset(&mut self) {
        self.hands = 0;
        self.bumps = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blind_level_formula() {
        assert_eq!(blind_level(10, 0, 10, 0), 10);
        assert_eq!(blind_level(10, 9, 10, 0), 10);
        assert_eq!(blind_level(10, 10, 10, 0), 20);
        assert_eq!(blind_level(10, 25, 10, 1), 80);
        assert_eq!(blind_level(10, 5, 0, 0), 320);
        assert_eq!(blind_level(10, 0, 1, 64), Chips::MAX);
    }

    #[test]
    fn test_doubles_on_period() {
        let mut schedule = BlindSchedule::new(10, 2, false);
        assert_eq!(schedule.current(), Blinds { small: 5, big: 10 });
        assert_eq!(schedule.record_hand(0), None);
        assert_eq!(schedule.record_hand(0), Some(Blinds { small: 10, big: 20 }));
    }

    #[test]
    fn test_simultaneous_eliminations_bump_once() {
        let mut schedule = BlindSchedule::new(10, 100, true);
        assert_eq!(schedule.record_hand(2), Some(Blinds { small: 10, big: 20 }));
        assert_eq!(schedule.bumps(), 1);
        assert_eq!(schedule.record_hand(0), None);
        assert_eq!(schedule.current().big, 20);
    }

    #[test]
    fn test_elimination_ignored_when_disabled() {
        let mut schedule = BlindSchedule::new(10, 100, false);
        assert_eq!(schedule.record_hand(3), None);
        assert_eq!(schedule.current().big, 10);
    }

    #[test]
    fn test_reset() {
        let mut schedule = BlindSchedule::new(10, 1, true);
        schedule.record_hand(1);
        schedule.reset();
        assert_eq!(schedule.current().big, 10);
        assert_eq!(schedule.hands(), 0);
    }
}
