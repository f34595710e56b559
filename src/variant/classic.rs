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
//! The built-in "Classic" variant, created in the store the first time variants are listed.
//! Classic has no castling, no en passant and no double pawn step; pawns move one square forward
//! and capture the same way.

use crate::general::common::Side;
use crate::general::squares::{Direction, Square};
use crate::variant::movement::{LeapOffset, MovementSpec, Range};
use crate::variant::{VariantBuilder, VariantDefinition, VariantError};

pub const CLASSIC_NAME: &str = "Classic";

const BACK_RANK: [&str; 8] = ["Rook", "Knight", "Bishop", "Queen", "King", "Bishop", "Knight", "Rook"];

const PAWN_PROMOTIONS: [&str; 4] = ["Queen", "Bishop", "Knight", "Rook"];

pub fn pawn() -> MovementSpec {
    MovementSpec::new().ray(Direction::N, Range::ONE)
}

pub fn rook() -> MovementSpec {
    MovementSpec::new().rays(Direction::orthogonal(), Range::Unlimited)
}

pub fn bishop() -> MovementSpec {
    MovementSpec::new().rays(Direction::diagonal(), Range::Unlimited)
}

pub fn queen() -> MovementSpec {
    MovementSpec::new().rays(Direction::all(), Range::Unlimited)
}

pub fn king() -> MovementSpec {
    MovementSpec::new().rays(Direction::all(), Range::ONE)
}

pub fn knight() -> MovementSpec {
    MovementSpec::new().leap(LeapOffset::KNIGHT).leaping(true)
}

/// Builds the 8x8 classic setup with default rules for both sides.
pub fn classic() -> Result<VariantDefinition, VariantError> {
    let mut builder = VariantBuilder::new(CLASSIC_NAME)
        .board(8, 8)
        .piece_type("Pawn", pawn())
        .piece_type("Rook", rook())
        .piece_type("Knight", knight())
        .piece_type("Bishop", bishop())
        .piece_type("Queen", queen())
        .piece_type("King", king())
        .promotion_both("Pawn", &PAWN_PROMOTIONS);
    for (column, name) in BACK_RANK.iter().enumerate() {
        let column = column as u8;
        builder = builder
            .place(Side::White, "Pawn", Square::new(1, column))
            .place(Side::Black, "Pawn", Square::new(6, column))
            .place(Side::White, name, Square::new(0, column))
            .place(Side::Black, name, Square::new(7, column));
    }
    builder.build()
}
