/*
 *  Crafter, a referee for user-defined chess variants.
 *  Copyright (C) 2024 ToTheAnd
 *
 *  Crafter is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  Crafter is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with Crafter. If not, see <https://www.gnu.org/licenses/>.
 */
//! The command line front end. Everything that touches stdout lives here, the library itself only logs.

use crate::engine::shared::{ProposalError, SharedGame};
use crate::engine::{GameEngine, GameSnapshot};
use crate::general::common::{suggest_names, Res, Side};
use crate::general::moves::VariantMove;
use crate::output::logger::{LogStream, Logger};
use crate::output::pretty::Diagram;
use crate::output::Message;
use crate::players::codec::{CompactTextCodec, JsonCodec, MoveCodec};
use crate::players::random_mover::RandomMover;
use crate::players::MoveProposer;
use crate::variant::store::{available_variants, FileStore, VariantStore};
use crate::variant::VariantDefinition;
use anyhow::{anyhow, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use itertools::Itertools;
use std::io::{stdout, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A referee for user-defined chess variants.
#[derive(Parser, Debug)]
#[command(name = "crafter", author = "ToTheAnd", version, about, long_about = None)]
pub struct CommandLineArgs {
    /// Directory holding one JSON record per variant. Created if it doesn't exist.
    #[arg(long, default_value = "variants")]
    pub store: PathBuf,
    /// Where log lines go: `stderr`, `stdout`, `none`, or a file name.
    #[arg(long, default_value = "stderr")]
    pub log: String,
    /// Also log debug messages.
    #[arg(long)]
    pub debug: bool,
    /// Never color board diagrams, even on a terminal.
    #[arg(long)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Eq, PartialEq)]
pub enum Command {
    /// List all stored variants. Creates the classic variant if it's missing.
    List,
    /// Print the initial board, the piece types and the rules of a variant.
    Show { name: String },
    /// Play the given moves from the initial position, e.g. `play Classic e2e3 e7e6`.
    Play { name: String, moves: Vec<String> },
    /// Let two random movers play against each other.
    Random {
        name: String,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 200)]
        max_moves: usize,
        /// Print the moves as JSON objects instead of compact text.
        #[arg(long)]
        json: bool,
    },
    /// Remove a stored variant.
    Delete { name: String },
}

pub fn run_program() -> Res<()> {
    let args = CommandLineArgs::parse();
    let colored = !args.no_color && stdout().is_terminal();
    run(args, &mut stdout(), colored)
}

pub fn run(args: CommandLineArgs, out: &mut dyn Write, colored: bool) -> Res<()> {
    let threshold = if args.debug { Message::Debug } else { Message::Info };
    let logger = Logger::new(LogStream::from_name(&args.log)?, threshold);
    let store = FileStore::open(&args.store, logger.clone())?;
    let names = available_variants(&store, &logger)?;
    match args.command {
        Command::List => {
            for name in names {
                writeln!(out, "{name}")?;
            }
        }
        Command::Show { name } => {
            let definition = load_variant(&store, &names, &name)?;
            show(&definition, out, colored)?;
        }
        Command::Play { name, moves } => {
            let definition = load_variant(&store, &names, &name)?;
            play(definition, &moves, out, colored)?;
        }
        Command::Random { name, seed, max_moves, json } => {
            let definition = load_variant(&store, &names, &name)?;
            let codec: Box<dyn MoveCodec> = if json { Box::new(JsonCodec) } else { Box::new(CompactTextCodec) };
            random_game(definition, seed, max_moves, codec.as_ref(), &logger, out, colored)?;
        }
        Command::Delete { name } => {
            if !names.contains(&name) {
                bail!("There is no variant named '{}'. {}", name.red(), suggest_names(&name, names.iter().map(String::as_str)));
            }
            store.remove(&name)?;
            writeln!(out, "Deleted '{name}'")?;
        }
    }
    Ok(())
}

fn load_variant(store: &dyn VariantStore, names: &[String], name: &str) -> Res<VariantDefinition> {
    if !names.iter().any(|n| n == name) {
        bail!("There is no variant named '{}'. {}", name.red(), suggest_names(name, names.iter().map(String::as_str)));
    }
    Ok(VariantDefinition::load(store, name)?)
}

fn show(definition: &VariantDefinition, out: &mut dyn Write, colored: bool) -> Res<()> {
    let diagram = Diagram::for_variant(definition).colored(colored);
    writeln!(out, "{}", definition.name().bold())?;
    write!(out, "{}", diagram.as_string(&definition.instantiate()))?;
    writeln!(out, "{}", diagram.legend())?;
    for (name, movement) in definition.piece_types() {
        writeln!(out, "{name}: {movement}")?;
    }
    for side in [Side::White, Side::Black] {
        let rules = definition.rules(side);
        let royal = rules.royal_piece.as_deref().unwrap_or("none");
        writeln!(
            out,
            "{side}: {} pieces, royal piece {royal}, self check {}, mandatory capture {}",
            definition.team(side).len(),
            rules.allow_self_check,
            rules.mandatory_capture
        )?;
        for (piece, targets) in definition.promotions(side).iter() {
            writeln!(out, "{side} {piece} promotes to {}", targets.iter().join(", "))?;
        }
    }
    Ok(())
}

fn print_game(engine: &GameEngine, out: &mut dyn Write, colored: bool) -> Res<()> {
    let diagram = Diagram::for_variant(engine.definition()).colored(colored).highlight(engine.last_move().cloned());
    write!(out, "{}", diagram.as_string(engine.position()))?;
    writeln!(out, "Status: {} ({})", engine.status(), engine.outcome())?;
    Ok(())
}

fn play(definition: VariantDefinition, moves: &[String], out: &mut dyn Write, colored: bool) -> Res<()> {
    let mut engine = GameEngine::new(definition);
    for (idx, text) in moves.iter().enumerate() {
        let mov = VariantMove::from_str(text)?;
        let side = engine.side_to_move();
        _ = engine.apply(side, &mov).map_err(|err| anyhow!("Move {} ('{}') was rejected: {err}", idx + 1, text.red()))?;
    }
    print_game(&engine, out, colored)?;
    let legal = engine.legal_moves();
    if !legal.is_empty() {
        let mut moves = legal.iter().flat_map(|(origin, dests)| dests.iter().map(move |dest| format!("{origin}{dest}")));
        writeln!(out, "Legal moves: {}", moves.join(" "))?;
    }
    Ok(())
}

fn random_game(
    definition: VariantDefinition,
    seed: Option<u64>,
    max_moves: usize,
    codec: &dyn MoveCodec,
    logger: &Logger,
    out: &mut dyn Write,
    colored: bool,
) -> Res<()> {
    let proposer = |side: Side| -> Box<dyn MoveProposer> {
        match seed {
            Some(seed) => Box::new(RandomMover::seeded(seed.wrapping_add(side.idx() as u64))),
            None => Box::new(RandomMover::default()),
        }
    };
    let game = SharedGame::new(GameEngine::new(definition));
    let threads = [Side::White, Side::Black].map(|side| game.spawn_proposer(side, proposer(side), logger.clone()));
    for _ in 0..max_moves {
        let snapshot: GameSnapshot = game.snapshot();
        if snapshot.status.is_terminal() {
            break;
        }
        match threads[snapshot.side_to_move.idx()].play() {
            Some(Ok(_)) => {}
            Some(Err(ProposalError::NoProposal { .. })) | None => break,
            Some(Err(err)) => {
                logger.warning(&format!("Stopping the game: {err}"));
                break;
            }
        }
    }
    drop(threads);
    let history = game.history();
    let encoded = history
        .iter()
        .map(|mov| -> Res<String> { Ok(String::from_utf8_lossy(&codec.encode(mov)?).into_owned()) })
        .collect::<Res<Vec<String>>>()?;
    writeln!(out, "{}", encoded.join(" "))?;
    game.with_engine(|engine| print_game(engine, out, colored))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(test: &str) -> PathBuf {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        std::env::temp_dir().join(format!("crafter_cli_{test}_{}_{nanos}", std::process::id()))
    }

    fn run_args(dir: &Path, command: &[&str]) -> Res<String> {
        let mut argv = vec!["crafter", "--log", "none", "--store", dir.to_str().unwrap()];
        argv.extend_from_slice(command);
        let args = CommandLineArgs::try_parse_from(argv)?;
        let mut out = vec![];
        run(args, &mut out, false)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn parse_args_test() {
        let args = CommandLineArgs::try_parse_from(["crafter", "random", "Classic", "--seed", "3"]).unwrap();
        assert_eq!(args.store, PathBuf::from("variants"));
        assert!(!args.debug);
        assert_eq!(
            args.command,
            Command::Random { name: "Classic".to_string(), seed: Some(3), max_moves: 200, json: false }
        );
        assert!(CommandLineArgs::try_parse_from(["crafter", "frobnicate"]).is_err());
    }

    #[test]
    fn list_and_show_test() {
        let dir = temp_dir("list");
        assert_eq!(run_args(&dir, &["list"]).unwrap(), "Classic\n");
        let shown = run_args(&dir, &["show", "Classic"]).unwrap();
        assert!(shown.contains(" r n b q k b n r 8"));
        assert!(shown.contains("N=Knight"));
        let err = run_args(&dir, &["show", "Clasic"]).unwrap_err();
        assert!(err.to_string().contains("Perhaps"));
    }

    #[test]
    fn play_test() {
        let dir = temp_dir("play");
        let played = run_args(&dir, &["play", "Classic", "e2e3", "e7e6"]).unwrap();
        assert!(played.contains("Status: white to move (*)"));
        assert!(played.contains("Legal moves:"));
        let err = run_args(&dir, &["play", "Classic", "e2e4"]).unwrap_err();
        assert!(err.to_string().contains("Move 1"));
    }

    #[test]
    fn random_and_delete_test() {
        let dir = temp_dir("random");
        let first = run_args(&dir, &["random", "Classic", "--seed", "7", "--max-moves", "6"]).unwrap();
        let second = run_args(&dir, &["random", "Classic", "--seed", "7", "--max-moves", "6"]).unwrap();
        assert!(first.contains("Status:"));
        assert!(!first.lines().next().unwrap().is_empty());
        // seeded movers replay the same game
        assert_eq!(first, second);
        assert_eq!(run_args(&dir, &["delete", "Classic"]).unwrap(), "Deleted 'Classic'\n");
        assert!(run_args(&dir, &["delete", "Nonexistent"]).is_err());
    }
}
