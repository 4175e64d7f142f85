/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{io, sync::mpsc::Sender, thread, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use liveboard::{Cli, Engine, EngineCommand, EngineEvent};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let move_delay = Duration::from_millis(cli.move_delay);

    let (mut engine, events) = if cli.reconcile {
        Engine::with_stream(move_delay, cli.color.map(Into::into))
    } else {
        Engine::new(move_delay)
    };

    // Spawn a separate thread for handling user input
    let sender = engine.sender();
    thread::spawn(|| {
        if let Err(err) = input_handler(sender) {
            eprintln!("Input handler thread stopping after fatal error: {err}");
        }
    });

    // Print recognized moves as they happen
    thread::spawn(move || {
        for event in events {
            match event {
                EngineEvent::NewGame => println!("New game."),
                EngineEvent::MoveRecognized { uci, class, .. } => println!("{uci} ({class})"),
            }
        }
    });

    if let Err(e) = engine.run() {
        eprintln!("{} encountered an error: {e}", env!("CARGO_PKG_NAME"));
    }
}

/// Loops endlessly to await input via `stdin`, sending all successfully-parsed
/// commands and occupancy frames through the supplied `sender`.
fn input_handler(sender: Sender<EngineCommand>) -> Result<()> {
    let mut buffer = String::with_capacity(256);

    loop {
        // Clear the buffer, read input, and trim the trailing newline
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line when parsing commands")?;

        // For ctrl + d
        if 0 == bytes {
            sender
                .send(EngineCommand::Exit)
                .context("Failed to send 'exit' command after receiving empty input")?;

            bail!("Engine received input of 0 bytes and is quitting");
        }

        let buf = buffer.trim();

        // Ignore empty lines
        if buf.is_empty() {
            continue;
        }

        match buf.parse::<EngineCommand>() {
            Ok(cmd) => sender.send(cmd).context("Failed to send command to engine")?,

            // If an invalid command was received, just print the error and continue running
            Err(err) => eprintln!("{err}"),
        }
    }
}
