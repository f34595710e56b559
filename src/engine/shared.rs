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
use crate::engine::status::{GameStatus, MoveError, MoveOutcome};
use crate::engine::{GameEngine, GameSnapshot};
use crate::general::common::Side;
use crate::general::moves::VariantMove;
use crate::output::logger::Logger;
use crate::players::MoveProposer;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{spawn, JoinHandle};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ProposalError {
    #[error("The {name} didn't propose a move for {side}")]
    NoProposal { name: String, side: Side },
    #[error(transparent)]
    Rejected(#[from] MoveError),
}

/// A game shared between the local player, computer players and remote peers.
/// All mutating calls are serialized, so every move is validated against a fully applied position.
#[derive(Debug, Clone)]
pub struct SharedGame(Arc<Mutex<GameEngine>>);

impl SharedGame {
    pub fn new(engine: GameEngine) -> Self {
        Self(Arc::new(Mutex::new(engine)))
    }

    fn lock(&self) -> MutexGuard<'_, GameEngine> {
        // engine methods validate before mutating, so a poisoned engine is still consistent
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs `f` on the engine while holding the lock. `f` can't change the game.
    pub fn with_engine<R>(&self, f: impl FnOnce(&GameEngine) -> R) -> R {
        f(&self.lock())
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.lock().snapshot()
    }

    pub fn status(&self) -> GameStatus {
        self.lock().status()
    }

    pub fn history(&self) -> Vec<VariantMove> {
        self.lock().history().to_vec()
    }

    pub fn remaining_time(&self, side: Side) -> Duration {
        self.lock().remaining_time(side)
    }

    pub fn apply(&self, side: Side, mov: &VariantMove) -> Result<MoveOutcome, MoveError> {
        self.lock().apply(side, mov)
    }

    pub fn resign(&self, side: Side) -> GameStatus {
        self.lock().resign(side)
    }

    pub fn on_time_expired(&self, side: Side) -> GameStatus {
        self.lock().on_time_expired(side)
    }

    pub fn agree_draw(&self) -> GameStatus {
        self.lock().agree_draw()
    }

    pub fn undo(&self) -> Result<VariantMove, MoveError> {
        self.lock().undo()
    }

    /// Asks `proposer` for a move of `side` without holding the lock, then applies it.
    /// If the game changed in the meantime, the engine rejects the stale proposal.
    pub fn propose_and_apply(
        &self,
        side: Side,
        proposer: &mut dyn MoveProposer,
    ) -> Result<(VariantMove, MoveOutcome), ProposalError> {
        let snapshot = self.snapshot();
        if snapshot.status.is_terminal() {
            return Err(MoveError::EngineTerminal { status: snapshot.status }.into());
        }
        if snapshot.side_to_move != side {
            return Err(MoveError::illegal(format!("it's {}'s turn, not {side}'s", snapshot.side_to_move)).into());
        }
        let Some(mov) = proposer.propose(&snapshot) else {
            return Err(ProposalError::NoProposal { name: proposer.name().to_string(), side });
        };
        let outcome = self.apply(side, &mov)?;
        Ok((mov, outcome))
    }

    /// Moves `proposer` to a background thread that plays for `side` whenever it receives [`ProposerReceives::Propose`].
    pub fn spawn_proposer(&self, side: Side, mut proposer: Box<dyn MoveProposer>, logger: Logger) -> ProposerThread {
        let (command_sender, command_receiver) = unbounded::<ProposerReceives>();
        let (result_sender, result_receiver) = unbounded();
        let game = self.clone();
        let thread = spawn(move || {
            let name = proposer.name().to_string();
            logger.debug(&format!("Started the {name} for {side}"));
            for command in command_receiver {
                match command {
                    ProposerReceives::Quit => break,
                    ProposerReceives::Propose => {
                        let res = game.propose_and_apply(side, proposer.as_mut());
                        match &res {
                            Ok((mov, outcome)) => {
                                logger.debug(&format!("The {name} played {mov} ({})", outcome.status))
                            }
                            Err(err) => logger.warning(&format!("The {name} couldn't move: {err}")),
                        }
                        if result_sender.send(res).is_err() {
                            break;
                        }
                    }
                }
            }
            logger.debug(&format!("Stopped the {name} for {side}"));
        });
        ProposerThread { commands: command_sender, results: result_receiver, thread: Some(thread) }
    }
}

pub enum ProposerReceives {
    Propose,
    // joins the thread
    Quit,
}

pub type ProposalResult = Result<(VariantMove, MoveOutcome), ProposalError>;

/// The handle of a proposer running in its own thread. Dropping it stops the thread.
#[derive(Debug)]
pub struct ProposerThread {
    commands: Sender<ProposerReceives>,
    results: Receiver<ProposalResult>,
    thread: Option<JoinHandle<()>>,
}

impl ProposerThread {
    /// Asks for a move and waits until it has been applied or rejected.
    pub fn play(&self) -> Option<ProposalResult> {
        self.commands.send(ProposerReceives::Propose).ok()?;
        self.results.recv().ok()
    }

    pub fn stop(mut self) {
        self.join();
    }

    fn join(&mut self) {
        _ = self.commands.send(ProposerReceives::Quit);
        if let Some(thread) = self.thread.take() {
            _ = thread.join();
        }
    }
}

impl Drop for ProposerThread {
    fn drop(&mut self) {
        self.join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Message;
    use crate::players::random_mover::RandomMover;
    use crate::variant::classic::classic;
    use std::str::FromStr;

    fn mov(text: &str) -> VariantMove {
        VariantMove::from_str(text).unwrap()
    }

    #[derive(Debug)]
    struct Scripted(Vec<VariantMove>);

    impl MoveProposer for Scripted {
        fn name(&self) -> &str {
            "script"
        }

        fn propose(&mut self, _snapshot: &GameSnapshot) -> Option<VariantMove> {
            self.0.pop()
        }
    }

    #[test]
    fn stale_proposal_is_rejected_test() {
        let game = SharedGame::new(GameEngine::new(classic().unwrap()));
        let mut script = Scripted(vec![mov("e2e3")]);
        let (played, outcome) = game.propose_and_apply(Side::White, &mut script).unwrap();
        assert_eq!(played, mov("e2e3"));
        assert_eq!(outcome.status, GameStatus::ToMove(Side::Black));
        // white's turn is over, any further white proposal is rejected
        let mut script = Scripted(vec![mov("d2d3")]);
        let err = game.propose_and_apply(Side::White, &mut script).unwrap_err();
        assert!(matches!(err, ProposalError::Rejected(MoveError::IllegalMove { .. })));
        // a proposal computed from a snapshot is rejected if someone else moved first
        let snapshot = game.snapshot();
        let proposal = mov("d7d6");
        assert!(snapshot.destinations_from(proposal.origin).contains(&proposal.destination));
        assert!(game.apply(Side::Black, &mov("d7d6")).is_ok());
        assert!(matches!(game.apply(Side::Black, &proposal), Err(MoveError::IllegalMove { .. })));
        let mut empty = Scripted(vec![]);
        assert!(matches!(game.propose_and_apply(Side::White, &mut empty), Err(ProposalError::NoProposal { .. })));
        assert_eq!(game.history().len(), 2);
    }

    #[test]
    fn concurrent_moves_are_serialized_test() {
        let game = SharedGame::new(GameEngine::new(classic().unwrap()));
        let handles: Vec<_> = ["a2a3", "b2b3", "c2c3", "d2d3"]
            .into_iter()
            .map(|text| {
                let game = game.clone();
                spawn(move || game.apply(Side::White, &mov(text)).is_ok())
            })
            .collect();
        let successes = handles.into_iter().map(|h| h.join().unwrap()).filter(|applied| *applied).count();
        // exactly one of the white moves was applied, the others saw black to move
        assert_eq!(successes, 1);
        assert_eq!(game.history().len(), 1);
        assert_eq!(game.status(), GameStatus::ToMove(Side::Black));
    }

    #[test]
    fn time_expiry_race_test() {
        let game = SharedGame::new(GameEngine::new(classic().unwrap()));
        assert!(game.apply(Side::White, &mov("e2e3")).is_ok());
        assert_eq!(game.on_time_expired(Side::Black), GameStatus::TimeExpired { winner: Side::White });
        assert_eq!(game.on_time_expired(Side::White), GameStatus::TimeExpired { winner: Side::White });
        let err = game.apply(Side::Black, &mov("e7e6")).unwrap_err();
        assert_eq!(err, MoveError::EngineTerminal { status: GameStatus::TimeExpired { winner: Side::White } });
        assert_eq!(game.history(), vec![mov("e2e3")]);
    }

    #[test]
    fn proposer_threads_test() {
        let game = SharedGame::new(GameEngine::new(classic().unwrap()));
        let logger = Logger::captured(Message::Debug);
        let white = game.spawn_proposer(Side::White, Box::new(RandomMover::seeded(1)), logger.clone());
        let black = game.spawn_proposer(Side::Black, Box::new(RandomMover::seeded(2)), logger.clone());
        for _ in 0..10 {
            for proposer in [&white, &black] {
                if !game.status().is_terminal() {
                    assert!(proposer.play().unwrap().is_ok());
                }
            }
        }
        let played = game.history().len();
        assert!(played > 0);
        // white moved first, so after an even number of moves a black proposal is out of turn
        if played % 2 == 0 || game.status().is_terminal() {
            assert!(matches!(black.play(), Some(Err(ProposalError::Rejected(_)))));
        }
        white.stop();
        drop(black);
        let lines = logger.captured_lines();
        assert!(lines.iter().any(|l| l.contains("Stopped the Random Mover for white")));
        assert!(lines.iter().any(|l| l.contains("Stopped the Random Mover for black")));
        assert_eq!(game.with_engine(|engine| engine.history().len()), game.history().len());
    }
}
