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
use crate::variant::board::BoardModel;
use crate::variant::movement::MovementSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// A piece standing on a board. Pieces of the same type share a name, and the name is all that
/// promotion maps and royal rules refer to.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[must_use]
pub struct PieceInstance {
    pub name: String,
    pub side: Side,
    pub square: Square,
    pub movement: MovementSpec,
    /// Names this piece may turn into when reaching its promotion row. Empty if it doesn't promote.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub promotes_to: Vec<String>,
}

impl PieceInstance {
    pub fn new(name: &str, side: Side, square: Square, movement: MovementSpec) -> Self {
        Self { name: name.to_string(), side, square, movement, promotes_to: vec![] }
    }

    pub fn with_promotions(mut self, promotes_to: Vec<String>) -> Self {
        self.promotes_to = promotes_to;
        self
    }

    pub fn is_promotable(&self) -> bool {
        !self.promotes_to.is_empty()
    }

    pub fn can_promote_to(&self, name: &str) -> bool {
        self.promotes_to.iter().any(|p| p == name)
    }

    /// Pseudo-legal destinations on the board this piece stands on.
    pub fn destinations(&self, board: &BoardModel) -> BTreeSet<Square> {
        self.movement.destinations(self.square, self.side, board)
    }

    /// Turns this piece into `name`, keeping its side and square.
    pub fn promote(&mut self, name: &str, movement: MovementSpec, promotes_to: Vec<String>) {
        self.name = name.to_string();
        self.movement = movement;
        self.promotes_to = promotes_to;
    }
}

impl Display for PieceInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{0} {1} on {2}", self.side, self.name, self.square)
    }
}
