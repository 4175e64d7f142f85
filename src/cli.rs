/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::str::FromStr;

use clap::{Parser, ValueEnum};
use shakmaty::Color;

use crate::{OccupancySnapshot, StreamEvent};

/// A command to be sent to the engine.
#[derive(Debug, Clone, Parser)]
#[command(
    multicall = true,
    about,
    rename_all = "lower",
    override_usage("<OCCUPANCY FRAME> | <COMMAND>")
)]
pub enum EngineCommand {
    /// Print a visual representation of the confirmed position.
    #[command(alias = "d")]
    Display,

    /// Show all legal moves in the confirmed position.
    Moves,

    /// Reset to the starting position and begin a new game.
    NewGame,

    /// Quit the engine.
    Exit,

    /// Apply a move list streamed from the remote game.
    MoveList {
        /// Move tokens in game order, e.g. `e2e4 e7e5`.
        moves: Vec<String>,
    },

    /// Handle a remote game start notification.
    GameStart {
        /// Identifier of the remote game.
        id: String,
    },

    /// Handle a remote game finish notification.
    GameFinish {
        /// Identifier of the remote game.
        id: String,
    },

    /// A sensor occupancy snapshot.
    #[command(skip)]
    Snapshot { snapshot: OccupancySnapshot },

    /// An event from the remote game stream.
    #[command(skip)]
    Stream { event: StreamEvent },
}

impl FromStr for EngineCommand {
    type Err = clap::Error;

    /// Attempt to parse an [`EngineCommand`] from a string.
    ///
    /// A 16-digit hexadecimal line is taken as a raw occupancy frame;
    /// anything else is parsed as a named command.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(snapshot) = OccupancySnapshot::from_hex(s) {
            return Ok(Self::Snapshot { snapshot });
        }

        Self::try_parse_from(s.split_ascii_whitespace())
    }
}

/// Options for the demo binary.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// The delay in milliseconds before a move is recognized.
    ///
    /// Useful to enable "sliding" pieces across the board.
    #[arg(short = 'd', long, default_value_t = 0)]
    pub move_delay: u64,

    /// Reconcile against an external move stream instead of running
    /// standalone.
    #[arg(short, long)]
    pub reconcile: bool,

    /// The color the human plays when reconciling.
    #[arg(short, long, value_enum)]
    pub color: Option<SideArg>,
}

/// CLI-friendly stand-in for the rules engine's color type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SideArg {
    White,
    Black,
}

impl From<SideArg> for Color {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::White => Color::White,
            SideArg::Black => Color::Black,
        }
    }
}
