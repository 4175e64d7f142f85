/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;
use std::str::FromStr;

use shakmaty::{Bitboard, Square};

use crate::RecognitionError;

/// A point-in-time reading of which of the 64 squares are covered by a piece.
///
/// Bit `N` of the mask corresponds to square index `N` (a1 = 0, h8 = 63).
/// Snapshots are immutable once constructed; equality is set equality,
/// regardless of how the snapshot was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancySnapshot {
    occupied: Bitboard,
}

impl OccupancySnapshot {
    /// Occupancy of the standard starting position (ranks 1, 2, 7 and 8).
    pub const STARTING: Self = Self {
        occupied: Bitboard(0xFFFF_0000_0000_FFFF),
    };

    /// A snapshot with no occupied squares.
    pub const EMPTY: Self = Self {
        occupied: Bitboard::EMPTY,
    };

    /// Constructs a snapshot from a set of occupied squares.
    pub const fn new(occupied: Bitboard) -> Self {
        Self { occupied }
    }

    /// Constructs a snapshot from a raw 8-byte sensor payload.
    ///
    /// The payload is big-endian: the first byte holds the eighth rank,
    /// the last byte the first rank.
    pub fn from_bytes(payload: &[u8]) -> Result<Self, RecognitionError> {
        let bytes: [u8; 8] = payload
            .try_into()
            .map_err(|_| RecognitionError::InvalidData(payload.len()))?;

        Ok(Self::new(Bitboard(u64::from_be_bytes(bytes))))
    }

    /// Constructs a snapshot from a 16-digit hexadecimal frame, e.g.
    /// `FFFF00000000FFFF` for the starting position.
    pub fn from_hex(frame: &str) -> Result<Self, RecognitionError> {
        let invalid = || RecognitionError::InvalidFrame(frame.to_string());

        // `from_str_radix` would also accept a leading sign
        if frame.len() != 16 || !frame.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let mask = u64::from_str_radix(frame, 16).map_err(|_| invalid())?;
        Ok(Self::new(Bitboard(mask)))
    }

    /// The set of occupied squares.
    pub const fn occupied(&self) -> Bitboard {
        self.occupied
    }

    /// Whether `square` is sensed as occupied.
    pub fn contains(&self, square: Square) -> bool {
        self.occupied.contains(square)
    }

    /// Number of occupied squares.
    pub fn count(&self) -> usize {
        self.occupied.count()
    }
}

impl From<Bitboard> for OccupancySnapshot {
    fn from(occupied: Bitboard) -> Self {
        Self::new(occupied)
    }
}

impl FromStr for OccupancySnapshot {
    type Err = RecognitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for OccupancySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{}", rank + 1)?;
            for file in 0..8 {
                let square = Square::new(rank * 8 + file);
                let mark = if self.contains(square) { 'X' } else { '.' };
                write!(f, " {mark}")?;
            }
            writeln!(f)?;
        }
        write!(f, "  a b c d e f g h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_from_bytes() {
        let payload = [0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF];
        let snapshot = OccupancySnapshot::from_bytes(&payload).unwrap();

        assert_eq!(snapshot, OccupancySnapshot::STARTING);
        assert_eq!(snapshot.count(), 32);
        assert!(snapshot.contains(Square::E2));
        assert!(!snapshot.contains(Square::E4));
    }

    #[test]
    fn hex_frame_matches_raw_payload() {
        let from_hex = OccupancySnapshot::from_hex("FFFF00000000FFFF").unwrap();
        let payload = [0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF];
        let from_bytes = OccupancySnapshot::from_bytes(&payload).unwrap();

        assert_eq!(from_hex, from_bytes);
    }

    #[test]
    fn wrong_length_payload_is_rejected() {
        let err = OccupancySnapshot::from_bytes(&[0xFF; 7]).unwrap_err();
        assert!(matches!(err, RecognitionError::InvalidData(7)));

        assert!(OccupancySnapshot::from_hex("FFFF").is_err());
        assert!(OccupancySnapshot::from_hex("XYZ!00000000FFFF").is_err());
    }

    #[test]
    fn signed_frames_are_rejected() {
        assert!(OccupancySnapshot::from_hex("+FFF00000000FFFF").is_err());
        assert!(OccupancySnapshot::from_hex("-FFF00000000FFFF").is_err());
    }

    #[test]
    fn equality_is_set_equality() {
        let a = OccupancySnapshot::new(Bitboard::from(Square::A1) | Bitboard::from(Square::H8));
        let b = OccupancySnapshot::new(Bitboard::from(Square::H8) | Bitboard::from(Square::A1));

        assert_eq!(a, b);
        assert_ne!(a, OccupancySnapshot::EMPTY);
    }
}
