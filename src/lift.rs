/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use shakmaty::Bitboard;

/// Accumulates squares vacated since the last confirmed move.
///
/// A capture shows up on the sensor as the captured piece disappearing and
/// the capturing piece later covering its square again. Remembering every
/// square that went empty at some point lets the classifier tell a capture
/// apart from a piece simply being slid around.
///
/// The tracked set only grows between clears; squares are never removed
/// individually.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiftTracker {
    lifted: Bitboard,
}

impl LiftTracker {
    /// Records every square that is occupied in the confirmed position but
    /// missing from the current snapshot.
    pub fn observe(&mut self, confirmed: Bitboard, current: Bitboard) {
        self.lifted |= confirmed & !current;
    }

    /// Squares that disappeared at some point since the last move and are
    /// occupied again now. These are the candidate origin squares of a
    /// captured piece, now covered by the capturing piece.
    pub fn temporarily_lifted(&self, current: Bitboard) -> Bitboard {
        self.lifted & current
    }

    /// Forgets all tracked squares.
    pub fn clear(&mut self) {
        self.lifted = Bitboard::EMPTY;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::Square;

    fn bb(squares: &[Square]) -> Bitboard {
        squares
            .iter()
            .fold(Bitboard::EMPTY, |acc, &sq| acc | Bitboard::from(sq))
    }

    #[test]
    fn accumulates_vacated_squares() {
        let confirmed = bb(&[Square::E4, Square::D5, Square::A1]);
        let mut tracker = LiftTracker::default();

        // d5 lifted first, then e4 as well
        tracker.observe(confirmed, bb(&[Square::E4, Square::A1]));
        tracker.observe(confirmed, bb(&[Square::A1]));

        // e4 piece now covers d5
        let current = bb(&[Square::D5, Square::A1]);
        assert_eq!(tracker.temporarily_lifted(current), bb(&[Square::D5]));
    }

    #[test]
    fn grows_monotonically_until_cleared() {
        let confirmed = bb(&[Square::E2, Square::D2]);
        let mut tracker = LiftTracker::default();

        tracker.observe(confirmed, bb(&[Square::D2]));
        // e2 reappears; it stays tracked regardless
        tracker.observe(confirmed, confirmed);
        assert_eq!(tracker.temporarily_lifted(confirmed), bb(&[Square::E2]));

        tracker.clear();
        assert_eq!(tracker.temporarily_lifted(confirmed), Bitboard::EMPTY);
    }
}
