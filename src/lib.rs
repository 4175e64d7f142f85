/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Classification of occupancy deltas into legal moves.
mod classify;

/// Command-line types: engine commands and binary options.
mod cli;

/// Debouncing of in-flight gestures.
mod debounce;

/// The engine's event loop; the single serialization point.
mod engine;

/// Typed errors surfaced by the core.
mod errors;

/// Tracking of temporarily lifted pieces, for capture recognition.
mod lift;

/// The confirmed position, backed by the consumed rules engine.
mod position;

/// The recognition state machine.
mod recognizer;

/// Sensor occupancy snapshots.
mod snapshot;

/// Remote-stream input events and engine output events.
mod stream;

pub use classify::*;
pub use cli::*;
pub use debounce::*;
pub use engine::*;
pub use errors::*;
pub use lift::*;
pub use position::*;
pub use recognizer::*;
pub use snapshot::*;
pub use stream::*;
