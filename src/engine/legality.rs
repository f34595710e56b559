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
//! Turns pseudo-legal piece movement into legal moves: attack detection, the royal safety filter
//! and mandatory capture.

use crate::general::common::Side;
use crate::general::squares::Square;
use crate::variant::board::Position;
use crate::variant::rules::RuleSet;
use std::collections::{BTreeMap, BTreeSet};

/// Legal destinations per origin square. Origins without any destination are left out.
pub type MoveMap = BTreeMap<Square, BTreeSet<Square>>;

pub fn pseudo_legal_moves(position: &Position, side: Side) -> MoveMap {
    let mut res = MoveMap::new();
    for piece in position.pieces_of(side) {
        let Some(board) = position.board(piece.square.board) else {
            continue;
        };
        let destinations = piece.destinations(board);
        if !destinations.is_empty() {
            res.insert(piece.square, destinations);
        }
    }
    res
}

/// Whether any piece of `by` could move to `square`, ignoring the safety of `by`'s own royal piece.
pub fn is_attacked(position: &Position, square: Square, by: Side) -> bool {
    let Some(board) = position.board(square.board) else {
        return false;
    };
    position.pieces_of(by).filter(|p| p.square.board == square.board).any(|p| p.destinations(board).contains(&square))
}

pub fn royal_squares(position: &Position, side: Side, rules: &RuleSet) -> Vec<Square> {
    position.pieces_of(side).filter(|p| rules.is_royal(&p.name)).map(|p| p.square).collect()
}

/// A side is in check if any of its royal pieces is attacked. Sides without a royal piece are never in check.
pub fn in_check(position: &Position, side: Side, rules: &RuleSet) -> bool {
    royal_squares(position, side, rules).into_iter().any(|sq| is_attacked(position, sq, side.other()))
}

pub fn is_capture(position: &Position, side: Side, destination: Square) -> bool {
    position.side_at(destination) == Some(side.other())
}

/// All legal moves of `side`. Unless `rules` allow self check, a move is only legal if it doesn't leave
/// a royal piece of `side` attacked. With mandatory capture, only captures are legal if there are any.
pub fn legal_moves(position: &Position, side: Side, rules: &RuleSet) -> MoveMap {
    let mut res = pseudo_legal_moves(position, side);
    if !rules.allow_self_check && rules.royal_piece.is_some() {
        for (origin, destinations) in res.iter_mut() {
            destinations.retain(|dest| {
                let mut after = position.clone();
                _ = after.relocate(*origin, *dest);
                !in_check(&after, side, rules)
            });
        }
        res.retain(|_, destinations| !destinations.is_empty());
    }
    if rules.mandatory_capture {
        let has_capture = res.values().flatten().any(|dest| is_capture(position, side, *dest));
        if has_capture {
            for destinations in res.values_mut() {
                destinations.retain(|dest| is_capture(position, side, *dest));
            }
            res.retain(|_, destinations| !destinations.is_empty());
        }
    }
    res
}

pub fn count_moves(moves: &MoveMap) -> usize {
    moves.values().map(BTreeSet::len).sum()
}
