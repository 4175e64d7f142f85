/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::time::{Duration, Instant};

use shakmaty::Bitboard;

/// A single debounced recognition attempt.
///
/// The occupancy delta is frozen at scheduling time: the check evaluates the
/// gesture as it looked when it was armed, not whatever the sensor reports
/// when the deadline fires.
#[derive(Debug, Clone, Copy)]
pub struct PendingCheck {
    /// Squares occupied in the confirmed position but not in the snapshot.
    pub disappearances: Bitboard,

    /// Squares occupied in the snapshot but not in the confirmed position.
    pub appearances: Bitboard,

    /// Temporarily lifted squares at scheduling time.
    pub lifted: Bitboard,

    deadline: Instant,
}

impl PendingCheck {
    /// When this check becomes due.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

/// Arms, re-arms and cancels the single pending recognition attempt.
///
/// While a human is mid-motion the sensor reports intermediate occupancy
/// states. Each differing snapshot supersedes the previous pending check,
/// so only the last settled delta is ever classified.
#[derive(Debug)]
pub struct DebounceScheduler {
    delay: Duration,
    pending: Option<PendingCheck>,
}

impl DebounceScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// The configured move delay. Zero means "attempt on every differing
    /// snapshot with no debounce".
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Captures a delta and arms a new deadline, cancelling any previously
    /// pending check.
    pub fn arm(&mut self, disappearances: Bitboard, appearances: Bitboard, lifted: Bitboard, now: Instant) {
        self.pending = Some(PendingCheck {
            disappearances,
            appearances,
            lifted,
            deadline: now + self.delay,
        });
    }

    /// Drops the pending check, if any.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Deadline of the pending check, if one is armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|check| check.deadline)
    }

    /// Takes the pending check if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<PendingCheck> {
        if self.pending.is_some_and(|check| check.deadline <= now) {
            self.pending.take()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::Square;

    const DELAY: Duration = Duration::from_millis(50);

    #[test]
    fn fires_only_after_the_delay() {
        let mut scheduler = DebounceScheduler::new(DELAY);
        let start = Instant::now();

        scheduler.arm(Bitboard::from(Square::E2), Bitboard::EMPTY, Bitboard::EMPTY, start);
        assert!(scheduler.take_due(start).is_none());
        assert!(scheduler.take_due(start + Duration::from_millis(49)).is_none());

        let check = scheduler.take_due(start + DELAY).unwrap();
        assert_eq!(check.disappearances, Bitboard::from(Square::E2));

        // Taking the check disarms the scheduler
        assert!(scheduler.deadline().is_none());
    }

    #[test]
    fn rearming_supersedes_the_previous_check() {
        let mut scheduler = DebounceScheduler::new(DELAY);
        let start = Instant::now();

        scheduler.arm(Bitboard::from(Square::E2), Bitboard::from(Square::E3), Bitboard::EMPTY, start);
        scheduler.arm(
            Bitboard::from(Square::E2),
            Bitboard::from(Square::E4),
            Bitboard::EMPTY,
            start + Duration::from_millis(20),
        );

        // The first deadline has passed but its delta is gone
        let check = scheduler.take_due(start + Duration::from_millis(80)).unwrap();
        assert_eq!(check.appearances, Bitboard::from(Square::E4));
    }

    #[test]
    fn cancel_discards_the_pending_check() {
        let mut scheduler = DebounceScheduler::new(DELAY);
        let start = Instant::now();

        scheduler.arm(Bitboard::from(Square::E2), Bitboard::from(Square::E4), Bitboard::EMPTY, start);
        scheduler.cancel();

        assert!(scheduler.deadline().is_none());
        assert!(scheduler.take_due(start + DELAY).is_none());
    }

    #[test]
    fn zero_delay_is_immediately_due() {
        let mut scheduler = DebounceScheduler::new(Duration::ZERO);
        let now = Instant::now();

        scheduler.arm(Bitboard::from(Square::E2), Bitboard::from(Square::E4), Bitboard::EMPTY, now);
        assert!(scheduler.take_due(now).is_some());
    }
}
