/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use thiserror::Error;

/// Errors surfaced by the recognition core.
///
/// A failed classification is *not* an error; it is an expected outcome
/// represented by `None` from the classifier.
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// A raw occupancy payload had the wrong size.
    #[error("invalid occupancy payload: expected 8 bytes, got {0}")]
    InvalidData(usize),

    /// A textual occupancy frame was not 16 hexadecimal digits.
    #[error("invalid occupancy frame {0:?}")]
    InvalidFrame(String),

    /// A streamed move token could not be matched to a legal move.
    ///
    /// This indicates an inconsistency between the remote game and the
    /// engine's confirmed position; the position is left unchanged.
    #[error("streamed move {0:?} is not legal in the current position")]
    IllegalStreamedMove(String),
}
