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
//! The referee: a turn-based state machine over a [`Position`] that only accepts legal moves.
//!
//! The engine never performs I/O. Callers that share an engine between threads should go through
//! [`SharedGame`](shared::SharedGame), which serializes all mutating calls.

use crate::engine::clock::{GameClock, TimeControl};
use crate::engine::legality::{in_check, legal_moves, MoveMap};
use crate::engine::status::MoveError::{EngineTerminal, PromotionRequired};
use crate::engine::status::{GameStatus, MoveError, MoveOutcome, Outcome};
use crate::general::common::{DimT, Side};
use crate::general::moves::VariantMove;
use crate::general::squares::Square;
use crate::variant::board::Position;
use crate::variant::rules::RuleSet;
use crate::variant::VariantDefinition;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

pub mod clock;
pub mod legality;
pub mod shared;
pub mod status;


/// The promotion targets available to the piece on `origin` when it moves to `destination`,
/// or `None` if that move doesn't promote.
fn promotion_choices_in<'a>(
    position: &'a Position,
    rules: &RuleSet,
    origin: Square,
    destination: Square,
) -> Option<&'a [String]> {
    let piece = position.piece_at(origin)?;
    let board = position.board_of(destination)?;
    let row = rules.promotion_row(piece.side, board.size());
    (piece.is_promotable() && destination.row == row).then_some(piece.promotes_to.as_slice())
}

/// A read-only copy of everything a renderer or a move proposer needs to know about a game.
#[derive(Debug, Clone, Eq, PartialEq)]
#[must_use]
pub struct GameSnapshot {
    pub side_to_move: Side,
    pub status: GameStatus,
    pub position: Position,
    /// Empty once the game is over.
    pub legal_moves: MoveMap,
    pub history: Vec<VariantMove>,
    /// The promotion row of the side to move, per board.
    promotion_rows: Vec<DimT>,
}

impl GameSnapshot {
    pub fn destinations_from(&self, origin: Square) -> BTreeSet<Square> {
        self.legal_moves.get(&origin).cloned().unwrap_or_default()
    }

    /// The names the piece on `origin` may promote to when moving to `destination`. Empty if the move doesn't promote.
    pub fn promotion_choices(&self, origin: Square, destination: Square) -> Vec<String> {
        let Some(piece) = self.position.piece_at(origin) else {
            return vec![];
        };
        let promotes = self.promotion_rows.get(destination.board as usize) == Some(&destination.row);
        if piece.is_promotable() && promotes {
            piece.promotes_to.clone()
        } else {
            vec![]
        }
    }
}

/// One game of a variant. Created from a [`VariantDefinition`], which the engine shares but never modifies.
#[derive(Debug, Clone)]
#[must_use]
pub struct GameEngine {
    definition: Arc<VariantDefinition>,
    position: Position,
    to_move: Side,
    status: GameStatus,
    history: Vec<VariantMove>,
    /// Consecutive half-moves without capture or promotion.
    quiet_moves: u32,
    clock: GameClock,
}

impl GameEngine {
    pub fn new(definition: impl Into<Arc<VariantDefinition>>) -> Self {
        let definition = definition.into();
        let position = definition.instantiate();
        Self {
            definition,
            position,
            to_move: Side::White,
            status: GameStatus::ToMove(Side::White),
            history: vec![],
            quiet_moves: 0,
            clock: GameClock::default(),
        }
    }

    pub fn with_time_control(mut self, white: TimeControl, black: TimeControl) -> Self {
        self.clock = GameClock::new(white, black);
        self
    }

    /// Builds a fresh game and plays `moves` in order, alternating sides starting with white.
    /// Identical definitions and moves always result in identical games.
    pub fn replay(definition: impl Into<Arc<VariantDefinition>>, moves: &[VariantMove]) -> Result<Self, MoveError> {
        let mut engine = Self::new(definition);
        for mov in moves {
            engine.apply(engine.to_move, mov)?;
        }
        Ok(engine)
    }

    pub fn definition(&self) -> &VariantDefinition {
        &self.definition
    }

    pub fn shared_definition(&self) -> Arc<VariantDefinition> {
        Arc::clone(&self.definition)
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn outcome(&self) -> Outcome {
        self.status.outcome()
    }

    pub fn is_over(&self) -> bool {
        self.status.is_terminal()
    }

    /// The side whose turn it is, or would be if the game weren't over.
    pub fn side_to_move(&self) -> Side {
        self.to_move
    }

    pub fn history(&self) -> &[VariantMove] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&VariantMove> {
        self.history.last()
    }

    pub fn rules(&self, side: Side) -> &RuleSet {
        self.definition.rules(side)
    }

    pub fn in_check(&self, side: Side) -> bool {
        in_check(&self.position, side, self.rules(side))
    }

    /// All legal moves of `side` in the current position, whether or not it's that side's turn.
    pub fn legal_moves_of(&self, side: Side) -> MoveMap {
        legal_moves(&self.position, side, self.rules(side))
    }

    /// The legal moves of the side to move. Empty once the game is over.
    pub fn legal_moves(&self) -> MoveMap {
        if self.is_over() {
            return MoveMap::new();
        }
        self.legal_moves_of(self.to_move)
    }

    pub fn destinations_from(&self, origin: Square) -> BTreeSet<Square> {
        self.legal_moves().remove(&origin).unwrap_or_default()
    }

    pub fn time_control(&self, side: Side) -> TimeControl {
        self.clock.time_control(side)
    }

    /// Remaining time of `side`, including the time spent so far on the running turn.
    pub fn remaining_time(&self, side: Side) -> Duration {
        self.clock.remaining(side, self.status.side_to_move())
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let rules = self.rules(self.to_move);
        let promotion_rows =
            self.position.boards().iter().map(|b| rules.promotion_row(self.to_move, b.size())).collect();
        GameSnapshot {
            side_to_move: self.to_move,
            status: self.status,
            position: self.position.clone(),
            legal_moves: self.legal_moves(),
            history: self.history.clone(),
            promotion_rows,
        }
    }

    pub fn apply(&mut self, side: Side, mov: &VariantMove) -> Result<MoveOutcome, MoveError> {
        self.apply_move(side, mov.origin, mov.destination, mov.promotion.as_deref())
    }

    /// Plays a move of `side`. Fails without changing anything if the game is over, it isn't `side`'s turn,
    /// the move isn't legal, or a promoting move lacks a valid promotion choice.
    pub fn apply_move(
        &mut self,
        side: Side,
        origin: Square,
        destination: Square,
        promotion: Option<&str>,
    ) -> Result<MoveOutcome, MoveError> {
        if self.is_over() {
            return Err(EngineTerminal { status: self.status });
        }
        if side != self.to_move {
            return Err(MoveError::illegal(format!("it's {}'s turn, not {side}'s", self.to_move)));
        }
        let Some(piece) = self.position.piece_at(origin).filter(|p| p.side == side) else {
            return Err(MoveError::illegal(format!("there is no {side} piece on {origin}")));
        };
        let legal = self.legal_moves_of(side);
        if !legal.get(&origin).is_some_and(|dests| dests.contains(&destination)) {
            return Err(MoveError::illegal(format!("the {piece} can't move to {destination}")));
        }

        let promotion = match (promotion_choices_in(&self.position, self.rules(side), origin, destination), promotion)
        {
            (Some(choices), Some(choice)) if choices.iter().any(|c| c == choice) => {
                let Some(movement) = self.definition.movement_of(choice) else {
                    return Err(MoveError::illegal(format!("there is no piece type named '{choice}'")));
                };
                Some((choice.to_string(), movement.clone()))
            }
            (Some(choices), _) => {
                return Err(PromotionRequired { piece: piece.to_string(), choices: choices.to_vec() });
            }
            (None, Some(choice)) => {
                return Err(MoveError::illegal(format!("the {piece} can't promote to {choice} on {destination}")));
            }
            (None, None) => None,
        };

        // from here on, nothing can fail
        let captured = self.position.relocate(origin, destination);
        let promoted = promotion.map(|(name, movement)| {
            let promotes_to = self.definition.promotions(side).get(&name).map(<[String]>::to_vec).unwrap_or_default();
            if let Some(piece) = self.position.piece_at_mut(destination) {
                piece.promote(&name, movement, promotes_to);
            }
            name
        });
        if captured.is_some() || promoted.is_some() {
            self.quiet_moves = 0;
        } else {
            self.quiet_moves += 1;
        }
        self.history.push(VariantMove { origin, destination, promotion: promoted.clone() });
        self.clock.charge(side);
        self.to_move = side.other();
        self.status = self.status_after_move_of(side);
        Ok(MoveOutcome { status: self.status, changed: vec![origin, destination], captured, promoted })
    }

    fn status_after_move_of(&self, mover: Side) -> GameStatus {
        let opponent = mover.other();
        let rules = self.rules(opponent);
        if let Some(royal) = &rules.royal_piece {
            if !self.position.pieces_of(opponent).any(|p| &p.name == royal) {
                return GameStatus::Checkmate { winner: mover };
            }
        }
        let attacked = in_check(&self.position, opponent, rules);
        if legal_moves(&self.position, opponent, rules).is_empty() {
            return if attacked { GameStatus::Checkmate { winner: mover } } else { GameStatus::Stalemate };
        }
        let only_royals = self.position.pieces().all(|p| self.rules(p.side).is_royal(&p.name));
        let quiet_limit_reached = self.rules(mover).quiet_move_limit.is_some_and(|limit| self.quiet_moves >= limit);
        if only_royals || quiet_limit_reached {
            GameStatus::Draw
        } else if attacked {
            GameStatus::Check(opponent)
        } else {
            GameStatus::ToMove(opponent)
        }
    }

    fn end(&mut self, status: GameStatus) -> GameStatus {
        if !self.is_over() {
            self.status = status;
        }
        self.status
    }

    /// `side` gives up. Does nothing if the game is already over.
    pub fn resign(&mut self, side: Side) -> GameStatus {
        self.end(GameStatus::Resigned { winner: side.other() })
    }

    /// The clock of `side` ran out. Does nothing if the game is already over, so a move that was applied
    /// before this call stands.
    pub fn on_time_expired(&mut self, side: Side) -> GameStatus {
        self.end(GameStatus::TimeExpired { winner: side.other() })
    }

    pub fn agree_draw(&mut self) -> GameStatus {
        self.end(GameStatus::Draw)
    }

    /// Takes back the last move by replaying all earlier ones. The clocks keep running as they are.
    pub fn undo(&mut self) -> Result<VariantMove, MoveError> {
        if self.is_over() {
            return Err(EngineTerminal { status: self.status });
        }
        let Some((last, earlier)) = self.history.split_last() else {
            return Err(MoveError::illegal("there is no move to take back"));
        };
        let last = last.clone();
        let mut replayed = Self::replay(Arc::clone(&self.definition), earlier)?;
        replayed.clock = self.clock.clone();
        replayed.clock.restart_turn();
        *self = replayed;
        Ok(last)
    }
}
