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
//! Move sources other than a local human: computer players and remote peers.
//! Whatever they produce goes through [`GameEngine::apply`](crate::engine::GameEngine::apply) like any other move.

use crate::engine::GameSnapshot;
use crate::general::moves::VariantMove;
use std::fmt::Debug;

pub mod codec;
pub mod random_mover;

/// A computer player. Proposers only ever see a snapshot of the game, never the engine itself,
/// so a proposal can be stale by the time it's applied; the engine rejects it in that case.
pub trait MoveProposer: Debug + Send {
    fn name(&self) -> &str;

    /// Picks a move for the side to move in `snapshot`, including a promotion choice if the move needs one.
    /// Returns `None` if there is nothing to propose.
    fn propose(&mut self, snapshot: &GameSnapshot) -> Option<VariantMove>;
}
