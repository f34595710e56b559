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
//! Crafter is a rules referee for user-defined chess variants.
//!
//! This project is grouped in a few broad modules:
//! - `variant`: describing a variant (movement, boards, rules) and storing it
//! - `engine`: the referee itself, which only ever accepts legal moves
//! - `players`: anything that proposes moves, and the wire format for moves
//! - `output` and `cli`: logging, board diagrams and the command line front end

pub mod cli;
pub mod engine;
pub mod general;
pub mod output;
pub mod players;
pub mod variant;

pub use engine::shared::SharedGame;
pub use engine::status::{GameStatus, MoveError, MoveOutcome, Outcome};
pub use engine::GameEngine;
pub use general::moves::VariantMove;
pub use variant::{VariantBuilder, VariantDefinition, VariantError};
