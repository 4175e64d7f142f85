/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use shakmaty::{Bitboard, Chess, Color, Move, MoveList, Position as _, Role, Square};

use crate::RecognitionError;

/// The engine's confirmed position, backed by the consumed rules engine.
///
/// This always reflects a legal game reachable from the starting position.
/// It is only ever mutated by applying a resolved move, resetting to the
/// start, or replaying an externally streamed move list.
#[derive(Debug, Clone)]
pub struct Position {
    board: Chess,
    ply: u32,
}

impl Position {
    pub fn new() -> Self {
        Self {
            board: Chess::default(),
            ply: 0,
        }
    }

    /// Resets to the standard starting position.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// The side to move.
    pub fn turn(&self) -> Color {
        self.board.turn()
    }

    /// Number of half-moves played since the start of the game.
    pub fn ply(&self) -> u32 {
        self.ply
    }

    /// The set of occupied squares, comparable against sensor snapshots.
    pub fn occupied(&self) -> Bitboard {
        self.board.board().occupied()
    }

    /// All legal moves in this position.
    pub fn legal_moves(&self) -> MoveList {
        self.board.legal_moves()
    }

    /// Whether `mv` is legal here.
    pub fn is_legal(&self, mv: &Move) -> bool {
        self.board.legal_moves().contains(mv)
    }

    /// Applies a move known to be legal.
    pub fn apply(&mut self, mv: &Move) {
        debug_assert!(self.is_legal(mv));
        self.board.play_unchecked(mv);
        self.ply += 1;
    }

    /// Destination square as seen on the physical board.
    ///
    /// The rules engine encodes a castle as king-takes-rook; on the board the
    /// piece that visibly arrives somewhere new is the king, on its castled
    /// square.
    pub fn physical_to(&self, mv: &Move) -> Square {
        match mv.castling_side() {
            Some(side) => side.king_to(self.turn()),
            None => mv.to(),
        }
    }

    /// Finds the legal move from `from` to the physically observed `to`.
    ///
    /// If the squares match several legal moves they are promotions; the
    /// queen promotion is preferred, since the sensor cannot tell promotion
    /// pieces apart.
    pub fn legal_move(&self, from: Square, to: Square) -> Option<Move> {
        let mut fallback = None;

        for mv in self.board.legal_moves() {
            if mv.from() != Some(from) || self.physical_to(&mv) != to {
                continue;
            }

            match mv.promotion() {
                None | Some(Role::Queen) => return Some(mv),
                Some(_) => fallback = fallback.or(Some(mv)),
            }
        }

        fallback
    }

    /// The move's UCI token, e.g. `e2e4`, `e1g1`, `e7e8q`.
    pub fn uci(&self, mv: &Move) -> String {
        // `mv.from()` is only `None` for drops, which never occur here.
        let from = mv.from().unwrap_or_else(|| mv.to());
        let to = self.physical_to(mv);

        match mv.promotion() {
            Some(role) => format!("{from}{to}{}", role.char()),
            None => format!("{from}{to}"),
        }
    }

    /// Applies a single streamed UCI token.
    pub fn play_token(&mut self, token: &str) -> Result<Move, RecognitionError> {
        let mv = self.parse_token(token)?;
        self.apply(&mv);
        Ok(mv)
    }

    /// Resets and replays a space-separated UCI move list, as streamed by a
    /// remote game. Replaying the full list from the start keeps the result
    /// deterministic even for an out-of-order or resynchronizing stream; on
    /// error the position is left unchanged.
    pub fn replay(&mut self, moves: &str) -> Result<(), RecognitionError> {
        let mut fresh = Self::new();
        for token in moves.split_ascii_whitespace() {
            fresh.play_token(token)?;
        }

        *self = fresh;
        Ok(())
    }

    fn parse_token(&self, token: &str) -> Result<Move, RecognitionError> {
        let illegal = || RecognitionError::IllegalStreamedMove(token.to_string());

        let bytes = token.as_bytes();
        if !(4..=5).contains(&bytes.len()) {
            return Err(illegal());
        }

        let from = parse_square(&bytes[0..2]).ok_or_else(illegal)?;
        let to = parse_square(&bytes[2..4]).ok_or_else(illegal)?;
        let promotion = match bytes.get(4) {
            Some(&c) => Some(Role::from_char(c as char).ok_or_else(illegal)?),
            None => None,
        };

        self.board
            .legal_moves()
            .into_iter()
            .find(|mv| {
                mv.from() == Some(from) && self.physical_to(mv) == to && mv.promotion() == promotion
            })
            .ok_or_else(illegal)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{}", rank + 1)?;
            for file in 0..8 {
                let square = Square::new(rank * 8 + file);
                match self.board.board().piece_at(square) {
                    Some(piece) => write!(f, " {}", piece.char())?,
                    None => write!(f, " .")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "  a b c d e f g h")
    }
}

fn parse_square(bytes: &[u8]) -> Option<Square> {
    let file = bytes[0].checked_sub(b'a')?;
    let rank = bytes[1].checked_sub(b'1')?;
    if file > 7 || rank > 7 {
        return None;
    }

    Some(Square::new(rank as u32 * 8 + file as u32))
}
