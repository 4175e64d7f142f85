/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use shakmaty::Color;
use tracing::{debug, info, warn};

use crate::{
    classify, DebounceScheduler, EngineEvent, GameStatus, LiftTracker, OccupancySnapshot,
    Position, RecognitionError, StreamEvent,
};

/// Phase of the recognition state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionPhase {
    /// Board and position agree, but it is not the local side's turn.
    /// No recognition attempts are made.
    Idle,

    /// It is the local side's turn; occupancy deltas are debounced and
    /// classified.
    Recognize,

    /// The confirmed position diverged from the sensed occupancy, because a
    /// streamed move was applied or a game just started. The engine waits
    /// for the physical board to match the position again.
    CatchUp,
}

/// Tracks a virtual position and recognizes moves from occupancy deltas.
///
/// One recognizer manages exactly one game at a time. All mutation happens
/// through [`on_snapshot`](Self::on_snapshot), [`tick`](Self::tick) and
/// [`on_stream_event`](Self::on_stream_event), which the hosting loop calls
/// one event at a time.
///
/// In pure local mode (no external stream) every turn counts as the local
/// side's; placing the pieces back on their starting squares begins a new
/// game. In reconciliation mode the position is also driven by streamed
/// moves from a remote, authoritative game, and the [`RecognitionPhase`]
/// keeps the physical board and the remote game in sync.
#[derive(Debug)]
pub struct Recognizer {
    position: Position,
    lifted: LiftTracker,
    debounce: DebounceScheduler,
    phase: RecognitionPhase,

    /// Color the human plays when reconciling; `None` means every turn is
    /// local (hotseat).
    local_side: Option<Color>,
    reconcile: bool,
    game_id: Option<String>,
    game_over: bool,

    /// Most recent sensor snapshot, for resynchronization decisions.
    latest: OccupancySnapshot,

    events: Sender<EngineEvent>,
}

impl Recognizer {
    /// A recognizer for a purely local board.
    pub fn new(move_delay: Duration, events: Sender<EngineEvent>) -> Self {
        Self {
            position: Position::new(),
            lifted: LiftTracker::default(),
            debounce: DebounceScheduler::new(move_delay),
            phase: RecognitionPhase::Recognize,
            local_side: None,
            reconcile: false,
            game_id: None,
            game_over: false,
            latest: OccupancySnapshot::EMPTY,
            events,
        }
    }

    /// A recognizer reconciling against an external move stream.
    ///
    /// Starts in [`RecognitionPhase::CatchUp`] until the physical board
    /// matches the confirmed position.
    pub fn with_stream(
        move_delay: Duration,
        local_side: Option<Color>,
        events: Sender<EngineEvent>,
    ) -> Self {
        Self {
            phase: RecognitionPhase::CatchUp,
            local_side,
            reconcile: true,
            ..Self::new(move_delay, events)
        }
    }

    pub fn phase(&self) -> RecognitionPhase {
        self.phase
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Whether the current game has ended; further input is ignored.
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Deadline of the pending debounced check, if one is armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    /// Handles a new sensor snapshot.
    pub fn on_snapshot(&mut self, snapshot: OccupancySnapshot, now: Instant) {
        if self.game_over {
            return;
        }

        self.latest = snapshot;

        // A board set up on its starting squares begins a new game. Only in
        // local mode; a reconciled game starts when the stream says so.
        if !self.reconcile && snapshot == OccupancySnapshot::STARTING {
            self.start_game();
            return;
        }

        let confirmed = self.position.occupied();
        match self.phase {
            RecognitionPhase::Idle => {}

            RecognitionPhase::CatchUp => {
                if snapshot.occupied() == confirmed {
                    debug!("physical board caught up with the confirmed position");
                    self.resync();
                }
            }

            RecognitionPhase::Recognize => {
                self.lifted.observe(confirmed, snapshot.occupied());

                if snapshot.occupied() == confirmed {
                    // Back in agreement; whatever gesture was in flight is moot
                    self.debounce.cancel();
                } else {
                    let disappearances = confirmed & !snapshot.occupied();
                    let appearances = snapshot.occupied() & !confirmed;
                    let lifted = self.lifted.temporarily_lifted(snapshot.occupied());

                    self.debounce.arm(disappearances, appearances, lifted, now);
                    if self.debounce.delay().is_zero() {
                        self.tick(now);
                    }
                }
            }
        }
    }

    /// Fires the pending debounced check if its deadline has passed.
    ///
    /// A failed classification is terminal for that delta: nothing is
    /// rescheduled until the sensor reports a further change.
    pub fn tick(&mut self, now: Instant) {
        let Some(check) = self.debounce.take_due(now) else {
            return;
        };

        // Pending checks are armed in Recognize only and cancelled on every
        // phase exit, so this does not happen.
        if self.phase != RecognitionPhase::Recognize {
            warn!(phase = ?self.phase, "dropping pending check outside Recognize");
            return;
        }

        match classify(
            &self.position,
            check.disappearances,
            check.appearances,
            check.lifted,
        ) {
            Some(resolved) => {
                let uci = self.position.uci(&resolved.mv);
                info!(%uci, class = %resolved.class, "move recognized");

                self.position.apply(&resolved.mv);
                self.lifted.clear();
                self.debounce.cancel();

                self.publish(EngineEvent::MoveRecognized {
                    uci,
                    class: resolved.class,
                    occupied: OccupancySnapshot::new(self.position.occupied()),
                    mv: resolved.mv,
                });

                self.phase = if self.local_turn() {
                    RecognitionPhase::Recognize
                } else {
                    RecognitionPhase::Idle
                };
            }
            None => debug!("no legal move matches the occupancy delta"),
        }
    }

    /// Handles an event from the remote game stream.
    pub fn on_stream_event(&mut self, event: StreamEvent) -> Result<(), RecognitionError> {
        match event {
            StreamEvent::GameStarted { id } => {
                // A duplicate start notification must not clobber the game
                // in progress; only a finished game may be replaced.
                if self.game_id.is_some() && !self.game_over {
                    warn!(game = %id, "ignoring game start while a game is active");
                    return Ok(());
                }

                info!(game = %id, "remote game started");
                self.game_id = Some(id);
                self.game_over = false;
                self.position.reset();
                self.lifted.clear();
                self.debounce.cancel();
                self.resync();
                self.publish(EngineEvent::NewGame);
            }

            StreamEvent::MoveList(moves) => {
                if self.game_over {
                    return Ok(());
                }

                debug!(%moves, "replaying streamed move list");
                self.position.replay(&moves)?;
                self.lifted.clear();
                self.debounce.cancel();
                self.resync();
            }

            StreamEvent::GameFinished { id } => {
                if self.game_id.as_deref() == Some(id.as_str()) {
                    self.finish();
                }
            }

            StreamEvent::StatusChanged(status) => {
                if status != GameStatus::InProgress {
                    self.finish();
                }
            }
        }

        Ok(())
    }

    /// Resets to the starting position and announces a new game.
    pub fn start_game(&mut self) {
        info!("new game");
        self.position.reset();
        self.lifted.clear();
        self.debounce.cancel();
        self.phase = RecognitionPhase::Recognize;
        self.publish(EngineEvent::NewGame);
    }

    /// Picks the phase after the position changed underneath the board.
    fn resync(&mut self) {
        self.phase = if self.latest.occupied() == self.position.occupied() {
            if self.local_turn() {
                RecognitionPhase::Recognize
            } else {
                RecognitionPhase::Idle
            }
        } else {
            RecognitionPhase::CatchUp
        };
        debug!(phase = ?self.phase, "resynchronized");
    }

    fn finish(&mut self) {
        info!("game over; ignoring further input");
        self.game_over = true;
        self.debounce.cancel();
    }

    fn local_turn(&self) -> bool {
        self.local_side
            .map_or(true, |side| side == self.position.turn())
    }

    fn publish(&self, event: EngineEvent) {
        // The host may have dropped its receiver during shutdown; there is
        // nobody left to notify then.
        if self.events.send(event).is_err() {
            debug!("event receiver dropped; notification discarded");
        }
    }
}
