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
use crate::general::common::Side;
use crate::general::squares::Square;
use crate::variant::piece::PieceInstance;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// The state of a game. Everything except `ToMove` and `Check` is terminal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[must_use]
pub enum GameStatus {
    ToMove(Side),
    /// The given side is in check and has to move.
    Check(Side),
    Checkmate { winner: Side },
    Stalemate,
    Draw,
    Resigned { winner: Side },
    TimeExpired { winner: Side },
}

impl Default for GameStatus {
    fn default() -> Self {
        GameStatus::ToMove(Side::White)
    }
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::ToMove(_) | GameStatus::Check(_))
    }

    pub fn side_to_move(self) -> Option<Side> {
        match self {
            GameStatus::ToMove(side) | GameStatus::Check(side) => Some(side),
            _ => None,
        }
    }

    pub fn outcome(self) -> Outcome {
        match self {
            GameStatus::ToMove(_) | GameStatus::Check(_) => Outcome::Ongoing,
            GameStatus::Checkmate { winner } | GameStatus::TimeExpired { winner } => Outcome::Win(winner),
            GameStatus::Stalemate | GameStatus::Draw => Outcome::Draw,
            GameStatus::Resigned { winner } => Outcome::Resignation { winner },
        }
    }
}

impl Display for GameStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GameStatus::ToMove(side) => write!(f, "{side} to move"),
            GameStatus::Check(side) => write!(f, "{side} is in check"),
            GameStatus::Checkmate { winner } => write!(f, "checkmate, {winner} wins"),
            GameStatus::Stalemate => write!(f, "stalemate"),
            GameStatus::Draw => write!(f, "draw"),
            GameStatus::Resigned { winner } => write!(f, "{} resigned, {winner} wins", winner.other()),
            GameStatus::TimeExpired { winner } => write!(f, "{} ran out of time, {winner} wins", winner.other()),
        }
    }
}

/// The result of a game as seen from outside, without the reason for it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Ongoing,
    Win(Side),
    Draw,
    Resignation { winner: Side },
}

impl Outcome {
    pub fn winner(self) -> Option<Side> {
        match self {
            Outcome::Win(side) | Outcome::Resignation { winner: side } => Some(side),
            Outcome::Ongoing | Outcome::Draw => None,
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Ongoing => write!(f, "*"),
            Outcome::Win(Side::White) | Outcome::Resignation { winner: Side::White } => write!(f, "1-0"),
            Outcome::Win(Side::Black) | Outcome::Resignation { winner: Side::Black } => write!(f, "0-1"),
            Outcome::Draw => write!(f, "1/2-1/2"),
        }
    }
}

/// What a successful move did.
#[derive(Debug, Clone, Eq, PartialEq)]
#[must_use]
pub struct MoveOutcome {
    pub status: GameStatus,
    /// Squares whose occupancy changed, origin first.
    pub changed: Vec<Square>,
    pub captured: Option<PieceInstance>,
    /// The name the moved piece promoted to, if any.
    pub promoted: Option<String>,
}

/// Why the engine rejected a call. A rejected call never changes the game.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum MoveError {
    #[error("Illegal move: {reason}")]
    IllegalMove { reason: String },
    #[error("The {piece} has to promote, choose one of {}", .choices.iter().join(", "))]
    PromotionRequired { piece: String, choices: Vec<String> },
    #[error("The game is already over ({status})")]
    EngineTerminal { status: GameStatus },
}

impl MoveError {
    pub fn illegal(reason: impl Into<String>) -> Self {
        MoveError::IllegalMove { reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_test() {
        assert_eq!(GameStatus::default(), GameStatus::ToMove(Side::White));
        assert!(!GameStatus::Check(Side::Black).is_terminal());
        assert_eq!(GameStatus::Check(Side::Black).side_to_move(), Some(Side::Black));
        for status in [
            GameStatus::Checkmate { winner: Side::White },
            GameStatus::Stalemate,
            GameStatus::Draw,
            GameStatus::Resigned { winner: Side::Black },
            GameStatus::TimeExpired { winner: Side::White },
        ] {
            assert!(status.is_terminal());
            assert_eq!(status.side_to_move(), None);
            assert_ne!(status.outcome(), Outcome::Ongoing);
        }
        assert_eq!(GameStatus::Stalemate.outcome(), Outcome::Draw);
        assert_eq!(GameStatus::TimeExpired { winner: Side::Black }.outcome().winner(), Some(Side::Black));
        assert_eq!(GameStatus::Resigned { winner: Side::Black }.to_string(), "white resigned, black wins");
        assert_eq!(GameStatus::Resigned { winner: Side::White }.outcome().to_string(), "1-0");
    }

    #[test]
    fn error_message_test() {
        let err = MoveError::PromotionRequired { piece: "white Pawn on a7".to_string(), choices: vec!["Queen".to_string(), "Rook".to_string()] };
        assert_eq!(err.to_string(), "The white Pawn on a7 has to promote, choose one of Queen, Rook");
        let err = MoveError::EngineTerminal { status: GameStatus::Draw };
        assert_eq!(err.to_string(), "The game is already over (draw)");
    }
}
