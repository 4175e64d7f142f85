/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender},
    time::{Duration, Instant},
};

use anyhow::Result;
use shakmaty::Color;
use tracing::warn;

use crate::{EngineCommand, EngineEvent, Recognizer, StreamEvent};

/// The move recognition engine.
///
/// This is the single serialization point of the system: the sensor
/// transport and the remote-stream transport both feed it through cloned
/// [`Sender`]s, and every command is processed to completion before the
/// next one is taken. The debounce deadline is realized by waiting on the
/// channel with a timeout, so an armed check fires exactly when no newer
/// input supersedes it.
#[derive(Debug)]
pub struct Engine {
    /// The recognition state machine: confirmed position, lift tracking,
    /// debounce and phase.
    recognizer: Recognizer,

    /// One half of a channel, responsible for sending commands to the engine to execute.
    sender: Sender<EngineCommand>,

    /// One half of a channel, responsible for receiving commands for the engine to execute.
    receiver: Receiver<EngineCommand>,
}

impl Engine {
    /// Constructs an engine for a purely local board, returning the channel
    /// on which it publishes [`EngineEvent`]s.
    pub fn new(move_delay: Duration) -> (Self, Receiver<EngineEvent>) {
        let (events_tx, events_rx) = channel();
        let (sender, receiver) = channel();

        let engine = Self {
            recognizer: Recognizer::new(move_delay, events_tx),
            sender,
            receiver,
        };

        (engine, events_rx)
    }

    /// Constructs an engine that reconciles against an external move stream.
    pub fn with_stream(
        move_delay: Duration,
        local_side: Option<Color>,
    ) -> (Self, Receiver<EngineEvent>) {
        let (events_tx, events_rx) = channel();
        let (sender, receiver) = channel();

        let engine = Self {
            recognizer: Recognizer::with_stream(move_delay, local_side, events_tx),
            sender,
            receiver,
        };

        (engine, events_rx)
    }

    /// A handle for feeding the engine; clone one per input source.
    pub fn sender(&self) -> Sender<EngineCommand> {
        self.sender.clone()
    }

    /// Sends an [`EngineCommand`] to the engine to be executed.
    pub fn send_command(&self, command: EngineCommand) {
        // Safe unwrap: `send` can only fail if its corresponding receiver
        // doesn't exist, and the receiver lives as long as the engine does.
        self.sender.send(command).unwrap();
    }

    /// Execute the main event loop for the engine.
    ///
    /// Returns when an [`EngineCommand::Exit`] arrives, the current game is
    /// reported over by the stream, or every sender has been dropped.
    pub fn run(&mut self) -> Result<()> {
        loop {
            let command = match self.recognizer.deadline() {
                // A check is pending: wait at most until its deadline
                Some(deadline) => {
                    let timeout = deadline.saturating_duration_since(Instant::now());
                    match self.receiver.recv_timeout(timeout) {
                        Ok(command) => Some(command),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match self.receiver.recv() {
                    Ok(command) => Some(command),
                    Err(_) => break,
                },
            };

            match command {
                // The deadline passed with no superseding input
                None => self.recognizer.tick(Instant::now()),

                Some(EngineCommand::Snapshot { snapshot }) => {
                    self.recognizer.on_snapshot(snapshot, Instant::now());
                }

                Some(EngineCommand::Stream { event }) => {
                    if self.on_stream(event) {
                        break;
                    }
                }

                Some(EngineCommand::MoveList { moves }) => {
                    if self.on_stream(StreamEvent::MoveList(moves.join(" "))) {
                        break;
                    }
                }

                Some(EngineCommand::GameStart { id }) => {
                    if self.on_stream(StreamEvent::GameStarted { id }) {
                        break;
                    }
                }

                Some(EngineCommand::GameFinish { id }) => {
                    if self.on_stream(StreamEvent::GameFinished { id }) {
                        break;
                    }
                }

                Some(EngineCommand::Display) => println!("{}", self.recognizer.position()),

                Some(EngineCommand::Moves) => {
                    let position = self.recognizer.position();
                    let moves = position.legal_moves();

                    // If there are none, print "(none)"
                    let moves_string = if moves.is_empty() {
                        String::from("(none)")
                    } else {
                        moves
                            .into_iter()
                            .map(|mv| position.uci(&mv))
                            .collect::<Vec<_>>()
                            .join(", ")
                    };
                    println!("{moves_string}");
                }

                Some(EngineCommand::NewGame) => self.recognizer.start_game(),

                Some(EngineCommand::Exit) => break,
            }
        }

        Ok(())
    }

    /// Forwards a stream event to the recognizer.
    ///
    /// Returns `true` once the stream has reported the game over, which
    /// ends the loop.
    fn on_stream(&mut self, event: StreamEvent) -> bool {
        // Keep running, even on error
        if let Err(e) = self.recognizer.on_stream_event(event) {
            warn!("stream event rejected: {e}");
        }

        self.recognizer.is_game_over()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OccupancySnapshot, Position};

    fn occupancy(moves: &str) -> OccupancySnapshot {
        let mut position = Position::new();
        position.replay(moves).unwrap();
        OccupancySnapshot::new(position.occupied())
    }

    #[test]
    fn loop_processes_snapshots_and_exits() {
        let (mut engine, events) = Engine::new(Duration::ZERO);

        engine.send_command(EngineCommand::Snapshot {
            snapshot: occupancy("e2e4"),
        });
        engine.send_command(EngineCommand::Exit);

        engine.run().unwrap();

        let recognized = events.try_iter().any(|event| {
            matches!(event, EngineEvent::MoveRecognized { ref uci, .. } if uci == "e2e4")
        });
        assert!(recognized);
    }

    #[test]
    fn stream_commands_drive_a_reconciled_game() {
        let (mut engine, events) = Engine::with_stream(Duration::ZERO, Some(Color::Black));

        engine.send_command(EngineCommand::GameStart {
            id: String::from("abc123"),
        });
        engine.send_command(EngineCommand::MoveList {
            moves: vec![String::from("e2e4")],
        });
        engine.send_command(EngineCommand::Snapshot {
            snapshot: occupancy("e2e4"),
        });
        engine.send_command(EngineCommand::Snapshot {
            snapshot: occupancy("e2e4 e7e5"),
        });
        engine.send_command(EngineCommand::GameFinish {
            id: String::from("abc123"),
        });

        // The finish notification ends the loop; no Exit is needed
        engine.run().unwrap();

        let recognized = events.try_iter().any(|event| {
            matches!(event, EngineEvent::MoveRecognized { ref uci, .. } if uci == "e7e5")
        });
        assert!(recognized);
    }
}
