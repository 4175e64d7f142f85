/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use shakmaty::Move;

use crate::{MoveClass, OccupancySnapshot};

/// Status of a remote game, as reported by its stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// The game is running; moves may still be streamed and submitted.
    InProgress,
    /// The game ended (mate, resignation, abort, timeout, ...).
    Ended,
}

/// An event from the remote, authoritative game stream.
///
/// The transport that talks to the remote API translates its wire format
/// into these; the engine never sees the protocol itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A remote game became active.
    GameStarted { id: String },

    /// The remote game with this id is over.
    GameFinished { id: String },

    /// The full list of moves played so far, as space-separated UCI tokens.
    ///
    /// Streams resend the whole list, so consumers replay it from the
    /// starting position rather than appending.
    MoveList(String),

    /// The remote game's status changed.
    StatusChanged(GameStatus),
}

/// A notification published by the engine to its host.
///
/// Consumers (UI, game recording, remote-move submission) receive these over
/// the channel returned when the engine is built.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// The engine reset to the starting position.
    NewGame,

    /// A physical move was recognized and applied to the confirmed position.
    MoveRecognized {
        mv: Move,
        class: MoveClass,
        /// UCI token, ready for submission to a remote game.
        uci: String,
        /// Occupancy of the position after the move.
        occupied: OccupancySnapshot,
    },
}
