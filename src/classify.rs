/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use shakmaty::{Bitboard, Move};

use crate::Position;

/// How a recognized move showed up on the physical board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveClass {
    /// One piece moved to an empty square.
    Normal,
    /// A piece landed on a square whose occupant was lifted earlier.
    Capture,
    /// Two pieces disappeared, one appeared.
    EnPassant,
    /// King and rook swapped wings together.
    Castling,
}

impl fmt::Display for MoveClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Normal => "normal",
            Self::Capture => "capture",
            Self::EnPassant => "en passant",
            Self::Castling => "castling",
        };
        f.write_str(name)
    }
}

/// A legal move resolved from an occupancy delta, with its class.
#[derive(Debug, Clone)]
pub struct ResolvedMove {
    pub mv: Move,
    pub class: MoveClass,
}

/// Resolves an occupancy delta to at most one legal move.
///
/// `disappearances` are squares occupied in the confirmed position but not
/// in the observed snapshot, `appearances` the reverse, and `lifted` the
/// temporarily lifted squares from the [`LiftTracker`](crate::LiftTracker).
///
/// The cardinalities of the two delta sets select exactly one case; if that
/// case finds no matching legal move, classification fails for this delta
/// and no other case is tried:
///
/// | disappeared | appeared | looks for                                  |
/// |-------------|----------|--------------------------------------------|
/// | 1           | 1        | non-capture, non-castle move               |
/// | 1           | 0        | capture onto a temporarily lifted square   |
/// | 2           | 1        | en passant                                 |
/// | 2           | 2        | castling                                   |
///
/// Candidate squares are tried in ascending square-index order (a1 first),
/// so resolution is deterministic. Every returned move comes from the rules
/// engine's legal-move enumeration; a delta that only matches illegal
/// geometry resolves to `None`.
pub fn classify(
    position: &Position,
    disappearances: Bitboard,
    appearances: Bitboard,
    lifted: Bitboard,
) -> Option<ResolvedMove> {
    match (disappearances.count(), appearances.count()) {
        // One piece moved to an empty square.
        (1, 1) => {
            let from = disappearances.into_iter().next()?;
            let to = appearances.into_iter().next()?;
            let mv = position.legal_move(from, to)?;

            (!mv.is_capture() && !mv.is_castle()).then_some(ResolvedMove {
                mv,
                class: MoveClass::Normal,
            })
        }

        // A piece vanished and some earlier-lifted square is covered again:
        // a capture, with the capturing piece on the victim's square.
        (1, 0) => {
            let from = disappearances.into_iter().next()?;

            lifted.into_iter().find_map(|to| {
                let mv = position.legal_move(from, to)?;
                (mv.is_capture() && !mv.is_en_passant()).then_some(ResolvedMove {
                    mv,
                    class: MoveClass::Capture,
                })
            })
        }

        // Two disappearances, one appearance: the capturing pawn and the
        // captured pawn both left their squares.
        (2, 1) => {
            let to = appearances.into_iter().next()?;

            disappearances.into_iter().find_map(|from| {
                let mv = position.legal_move(from, to)?;
                mv.is_en_passant().then_some(ResolvedMove {
                    mv,
                    class: MoveClass::EnPassant,
                })
            })
        }

        // King and rook both vacated, both targets covered.
        (2, 2) => disappearances.into_iter().find_map(|from| {
            appearances.into_iter().find_map(|to| {
                let mv = position.legal_move(from, to)?;
                mv.is_castle().then_some(ResolvedMove {
                    mv,
                    class: MoveClass::Castling,
                })
            })
        }),

        _ => None,
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

    fn position_after(moves: &str) -> Position {
        let mut position = Position::new();
        position.replay(moves).unwrap();
        position
    }

    #[test]
    fn pawn_push_is_normal() {
        let position = Position::new();
        let resolved = classify(
            &position,
            bb(&[Square::E2]),
            bb(&[Square::E4]),
            Bitboard::EMPTY,
        )
        .unwrap();

        assert_eq!(resolved.class, MoveClass::Normal);
        assert_eq!(position.uci(&resolved.mv), "e2e4");
    }

    #[test]
    fn capture_needs_a_lifted_square() {
        let position = position_after("e2e4 d7d5");

        // Without the lift record the delta is meaningless
        assert!(classify(&position, bb(&[Square::E4]), Bitboard::EMPTY, Bitboard::EMPTY).is_none());

        let resolved = classify(
            &position,
            bb(&[Square::E4]),
            Bitboard::EMPTY,
            bb(&[Square::D5]),
        )
        .unwrap();

        assert_eq!(resolved.class, MoveClass::Capture);
        assert_eq!(position.uci(&resolved.mv), "e4d5");
    }

    #[test]
    fn capture_disguised_as_normal_move_is_rejected() {
        let position = position_after("e2e4 d7d5");

        // A (1, 1) delta selects the "normal" case; exd5 is a capture, so
        // the sole candidate fails and no other case is tried.
        assert!(classify(
            &position,
            bb(&[Square::E4]),
            bb(&[Square::D5]),
            Bitboard::EMPTY,
        )
        .is_none());
    }

    #[test]
    fn en_passant_from_both_vacated_squares() {
        let position = position_after("e2e4 a7a6 e4e5 d7d5");

        let resolved = classify(
            &position,
            bb(&[Square::E5, Square::D5]),
            bb(&[Square::D6]),
            Bitboard::EMPTY,
        )
        .unwrap();

        assert_eq!(resolved.class, MoveClass::EnPassant);
        assert_eq!(position.uci(&resolved.mv), "e5d6");
    }

    #[test]
    fn kingside_castle() {
        let position = position_after("e2e4 e7e5 g1f3 b8c6 f1c4 g8f6");

        let resolved = classify(
            &position,
            bb(&[Square::E1, Square::H1]),
            bb(&[Square::F1, Square::G1]),
            Bitboard::EMPTY,
        )
        .unwrap();

        assert_eq!(resolved.class, MoveClass::Castling);
        assert_eq!(position.uci(&resolved.mv), "e1g1");
    }

    #[test]
    fn queenside_castle() {
        let position = position_after("d2d4 d7d5 b1c3 b8c6 c1f4 c8f5 d1d2 d8d7");

        let resolved = classify(
            &position,
            bb(&[Square::E1, Square::A1]),
            bb(&[Square::C1, Square::D1]),
            Bitboard::EMPTY,
        )
        .unwrap();

        assert_eq!(resolved.class, MoveClass::Castling);
        assert_eq!(position.uci(&resolved.mv), "e1c1");
    }

    #[test]
    fn castle_without_rights_is_no_match() {
        // Two knights "moved at once": a (2, 2) delta with no castle behind it
        let position = Position::new();

        assert!(classify(
            &position,
            bb(&[Square::B1, Square::G1]),
            bb(&[Square::A3, Square::H3]),
            Bitboard::EMPTY,
        )
        .is_none());
    }

    #[test]
    fn promotion_defaults_to_queen() {
        let position = position_after("a2a4 b7b5 a4b5 b8c6 b5b6 c6b4 b6b7 d7d5");

        let resolved = classify(
            &position,
            bb(&[Square::B7]),
            bb(&[Square::B8]),
            Bitboard::EMPTY,
        )
        .unwrap();

        assert_eq!(resolved.class, MoveClass::Normal);
        assert_eq!(position.uci(&resolved.mv), "b7b8q");
    }

    #[test]
    fn oversized_deltas_never_match() {
        let position = Position::new();

        assert!(classify(
            &position,
            bb(&[Square::E2, Square::D2, Square::C2]),
            bb(&[Square::E4]),
            Bitboard::EMPTY,
        )
        .is_none());

        assert!(classify(&position, Bitboard::EMPTY, Bitboard::EMPTY, Bitboard::EMPTY).is_none());
    }
}
