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
//! Generic movement geometry. A piece's movement is the union of directional rays with a range limit
//! and symmetric leaps; there are no per-piece-type movement rules anywhere else.

use crate::general::common::{Res, Side};
use crate::general::squares::{Direction, Square};
use crate::variant::board::BoardModel;
use anyhow::{anyhow, bail};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::num::NonZeroU32;

/// How far a ray extends. `Unlimited` slides until the board edge or the first blocker.
///
/// Stored records encode `Unlimited` as the string `"unlimited"`. Older records used a negative number
/// for the same thing, which is still accepted as an alias when reading.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "RangeRepr", into = "RangeRepr")]
#[must_use]
pub enum Range {
    Limited(NonZeroU32),
    Unlimited,
}

impl Range {
    pub const ONE: Range = Range::Limited(NonZeroU32::MIN);

    pub fn steps(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Range::Limited)
    }

    /// Negative values are the legacy spelling of [`Range::Unlimited`], zero is never a valid range.
    pub fn from_raw(raw: i64) -> Res<Self> {
        if raw < 0 {
            return Ok(Range::Unlimited);
        }
        let steps = u32::try_from(raw).map_err(|_| anyhow!("Ray range {raw} is too large"))?;
        Self::steps(steps).ok_or_else(|| anyhow!("A ray range of 0 isn't allowed"))
    }

    pub fn allows(self, steps: u32) -> bool {
        match self {
            Range::Limited(max) => steps <= max.get(),
            Range::Unlimited => true,
        }
    }
}

impl Display for Range {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Range::Limited(n) => write!(f, "{n}"),
            Range::Unlimited => write!(f, "unlimited"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RangeRepr {
    Steps(i64),
    Named(String),
}

impl TryFrom<RangeRepr> for Range {
    type Error = anyhow::Error;

    fn try_from(value: RangeRepr) -> Result<Self, Self::Error> {
        match value {
            RangeRepr::Steps(raw) => Range::from_raw(raw),
            RangeRepr::Named(name) if name.eq_ignore_ascii_case("unlimited") => Ok(Range::Unlimited),
            RangeRepr::Named(name) => bail!("Unrecognized ray range '{name}'"),
        }
    }
}

impl From<Range> for RangeRepr {
    fn from(value: Range) -> Self {
        match value {
            Range::Limited(n) => RangeRepr::Steps(n.get() as i64),
            Range::Unlimited => RangeRepr::Named("unlimited".to_string()),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[must_use]
pub struct RayMovement {
    pub direction: Direction,
    pub range: Range,
}

impl RayMovement {
    pub fn new(direction: Direction, range: Range) -> Self {
        Self { direction, range }
    }

    pub fn unlimited(direction: Direction) -> Self {
        Self::new(direction, Range::Unlimited)
    }
}

impl Display for RayMovement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.direction, self.range)
    }
}

/// A leap by `(a, b)` squares in any orientation. The offset is normalized on construction so that
/// `(1, 2)`, `(2, 1)` and `(-2, 1)` are the same leap.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "[i32; 2]", into = "[i32; 2]")]
#[must_use]
pub struct LeapOffset {
    near: u32,
    far: u32,
}

impl LeapOffset {
    pub const KNIGHT: LeapOffset = LeapOffset { near: 1, far: 2 };

    pub fn new(row_delta: i32, column_delta: i32) -> Res<Self> {
        let (a, b) = (row_delta.unsigned_abs(), column_delta.unsigned_abs());
        if a == 0 && b == 0 {
            bail!("A leap offset of (0, 0) doesn't move the piece");
        }
        Ok(Self { near: a.min(b), far: a.max(b) })
    }

    pub fn near(self) -> u32 {
        self.near
    }

    pub fn far(self) -> u32 {
        self.far
    }

    /// All distinct `(row_delta, column_delta)` pairs reachable through sign changes and swapping.
    pub fn deltas(self) -> BTreeSet<(isize, isize)> {
        let (a, b) = (self.near as isize, self.far as isize);
        [(a, b), (b, a)]
            .into_iter()
            .flat_map(|(r, c)| [(r, c), (-r, c), (r, -c), (-r, -c)])
            .collect()
    }

    /// The squares a non-leaping piece has to pass through: along the longer axis first,
    /// or along the diagonal if both magnitudes are equal.
    fn path(row_delta: isize, column_delta: isize) -> impl Iterator<Item = (isize, isize)> {
        let (rows, columns) = (row_delta.abs(), column_delta.abs());
        let (row_step, column_step) = (row_delta.signum(), column_delta.signum());
        let (len, step) = if rows == columns {
            (rows, (row_step, column_step))
        } else if rows > columns {
            (rows, (row_step, 0))
        } else {
            (columns, (0, column_step))
        };
        (1..len).map(move |k| (k * step.0, k * step.1))
    }
}

impl TryFrom<[i32; 2]> for LeapOffset {
    type Error = anyhow::Error;

    fn try_from(value: [i32; 2]) -> Result<Self, Self::Error> {
        Self::new(value[0], value[1])
    }
}

impl From<LeapOffset> for [i32; 2] {
    fn from(value: LeapOffset) -> Self {
        [value.near as i32, value.far as i32]
    }
}

impl Display for LeapOffset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.near, self.far)
    }
}

/// Everything a piece type can do geometrically. Directions are written from white's point of view
/// and mirrored for black, so `N` always means "towards the opponent".
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[must_use]
pub struct MovementSpec {
    #[serde(default)]
    pub rays: Vec<RayMovement>,
    #[serde(default)]
    pub leaps: BTreeSet<LeapOffset>,
    /// If set, intervening squares are ignored for both rays and leaps.
    #[serde(default)]
    pub leaps_over_occupants: bool,
}

impl MovementSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ray(mut self, direction: Direction, range: Range) -> Self {
        self.rays.push(RayMovement::new(direction, range));
        self
    }

    pub fn rays<I: IntoIterator<Item = Direction>>(mut self, directions: I, range: Range) -> Self {
        self.rays.extend(directions.into_iter().map(|dir| RayMovement::new(dir, range)));
        self
    }

    pub fn leap(mut self, offset: LeapOffset) -> Self {
        self.leaps.insert(offset);
        self
    }

    pub fn leaping(mut self, leaps_over_occupants: bool) -> Self {
        self.leaps_over_occupants = leaps_over_occupants;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rays.is_empty() && self.leaps.is_empty()
    }

    /// All pseudo-legal destinations of a `side` piece standing on `origin`, ignoring king safety.
    /// Squares holding a friendly piece are never included; opposing pieces can be captured.
    pub fn destinations(&self, origin: Square, side: Side, board: &BoardModel) -> BTreeSet<Square> {
        let mut res = BTreeSet::new();
        for ray in &self.rays {
            self.extend_ray(*ray, origin, side, board, &mut res);
        }
        for leap in &self.leaps {
            for (row_delta, column_delta) in leap.deltas() {
                let Some(dest) = origin.offset(row_delta, column_delta).filter(|sq| board.contains(*sq)) else {
                    continue;
                };
                if !self.leaps_over_occupants
                    && !LeapOffset::path(row_delta, column_delta)
                        .all(|(r, c)| origin.offset(r, c).is_some_and(|sq| board.is_empty(sq)))
                {
                    continue;
                }
                if board.side_at(dest) != Some(side) {
                    res.insert(dest);
                }
            }
        }
        res
    }

    fn extend_ray(&self, ray: RayMovement, origin: Square, side: Side, board: &BoardModel, res: &mut BTreeSet<Square>) {
        let (row_delta, column_delta) = ray.direction.for_side(side).delta();
        let mut current = origin;
        let mut steps = 1;
        while ray.range.allows(steps) {
            let Some(next) = current.offset(row_delta, column_delta).filter(|sq| board.contains(*sq)) else {
                break;
            };
            match board.side_at(next) {
                None => {
                    res.insert(next);
                }
                Some(occupant) => {
                    if occupant != side {
                        res.insert(next);
                    }
                    if !self.leaps_over_occupants {
                        break;
                    }
                }
            }
            current = next;
            steps += 1;
        }
    }
}

impl Display for MovementSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "immobile");
        }
        let parts = self.rays.iter().map(ToString::to_string).chain(self.leaps.iter().map(|l| format!("leap {l}")));
        write!(f, "{}", parts.format(", "))?;
        if self.leaps_over_occupants {
            write!(f, " (jumps)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::piece::PieceInstance;
    use proptest::prelude::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn sq(s: &str) -> Square {
        Square::from_str(s).unwrap()
    }

    fn put(board: &mut BoardModel, side: Side, at: &str) {
        board.put(PieceInstance::new("Blocker", side, sq(at), MovementSpec::new()));
    }

    fn rook() -> MovementSpec {
        MovementSpec::new().rays(Direction::orthogonal(), Range::Unlimited)
    }

    fn knight() -> MovementSpec {
        MovementSpec::new().leap(LeapOffset::new(1, 2).unwrap()).leaping(true)
    }

    fn distance_to_edge(origin: Square, dir: Direction, board: &BoardModel) -> usize {
        let (dr, dc) = dir.delta();
        let mut n = 0;
        let mut current = origin;
        while let Some(next) = current.offset(dr, dc).filter(|s| board.contains(*s)) {
            n += 1;
            current = next;
        }
        n
    }

    #[test]
    fn unlimited_ray_on_empty_board_test() {
        let board = BoardModel::new(8, 8);
        let dests = rook().destinations(sq("a1"), Side::White, &board);
        assert_eq!(dests.len(), 14);
        let dests = MovementSpec::new().ray(Direction::NE, Range::Unlimited).destinations(sq("c1"), Side::White, &board);
        assert_eq!(dests.into_iter().collect_vec(), vec![sq("d2"), sq("e3"), sq("f4"), sq("g5"), sq("h6")]);
    }

    #[test]
    fn limited_ray_test() {
        let board = BoardModel::new(8, 8);
        let two = Range::steps(2).unwrap();
        let dests = MovementSpec::new().ray(Direction::N, two).destinations(sq("e2"), Side::White, &board);
        assert_eq!(dests, BTreeSet::from([sq("e3"), sq("e4")]));
        let dests = MovementSpec::new().ray(Direction::N, two).destinations(sq("e7"), Side::Black, &board);
        assert_eq!(dests, BTreeSet::from([sq("e6"), sq("e5")]));
        let dests = MovementSpec::new().ray(Direction::N, two).destinations(sq("e8"), Side::White, &board);
        assert!(dests.is_empty());
    }

    #[test]
    fn blocked_ray_test() {
        let mut board = BoardModel::new(8, 8);
        put(&mut board, Side::White, "a4");
        put(&mut board, Side::Black, "d1");
        let dests = rook().destinations(sq("a1"), Side::White, &board);
        // a2, a3 upwards, then b1, c1 and the capture on d1
        assert_eq!(dests, BTreeSet::from([sq("a2"), sq("a3"), sq("b1"), sq("c1"), sq("d1")]));
        assert!(!dests.contains(&sq("a4")));
        assert!(!dests.contains(&sq("e1")));
    }

    #[test]
    fn jumping_ray_test() {
        let mut board = BoardModel::new(8, 8);
        put(&mut board, Side::White, "a3");
        put(&mut board, Side::Black, "a5");
        let spec = MovementSpec::new().ray(Direction::N, Range::Unlimited).leaping(true);
        let dests = spec.destinations(sq("a1"), Side::White, &board);
        assert_eq!(dests, BTreeSet::from([sq("a2"), sq("a4"), sq("a5"), sq("a6"), sq("a7"), sq("a8")]));
    }

    #[test]
    fn knight_leap_test() {
        let board = BoardModel::new(8, 8);
        assert_eq!(knight().destinations(sq("d4"), Side::White, &board).len(), 8);
        assert_eq!(knight().destinations(sq("a1"), Side::White, &board).len(), 2);
        assert_eq!(knight().destinations(sq("h8"), Side::Black, &board).len(), 2);
        assert_eq!(knight().destinations(sq("b1"), Side::White, &board).len(), 3);
    }

    #[test]
    fn knight_captures_and_friendly_test() {
        let mut board = BoardModel::new(8, 8);
        put(&mut board, Side::White, "c3");
        put(&mut board, Side::Black, "d2");
        let dests = knight().destinations(sq("b1"), Side::White, &board);
        assert_eq!(dests, BTreeSet::from([sq("a3"), sq("d2")]));
    }

    #[test]
    fn lame_leap_test() {
        let mut board = BoardModel::new(8, 8);
        let horse = MovementSpec::new().leap(LeapOffset::new(2, 1).unwrap());
        assert_eq!(horse.destinations(sq("d4"), Side::White, &board).len(), 8);
        put(&mut board, Side::Black, "d5");
        let dests = horse.destinations(sq("d4"), Side::White, &board);
        assert_eq!(dests.len(), 6);
        assert!(!dests.contains(&sq("c6")));
        assert!(!dests.contains(&sq("e6")));
        let jumping = horse.leaping(true);
        assert_eq!(jumping.destinations(sq("d4"), Side::White, &board).len(), 8);
    }

    #[test]
    fn leap_offset_test() {
        assert_eq!(LeapOffset::new(1, 2).unwrap(), LeapOffset::new(2, 1).unwrap());
        assert_eq!(LeapOffset::new(-2, 1).unwrap(), LeapOffset::new(1, 2).unwrap());
        assert_ne!(LeapOffset::new(1, 1).unwrap(), LeapOffset::new(1, 2).unwrap());
        assert!(LeapOffset::new(0, 0).is_err());
        assert_eq!(LeapOffset::new(1, 2).unwrap().deltas().len(), 8);
        assert_eq!(LeapOffset::new(1, 1).unwrap().deltas().len(), 4);
        assert_eq!(LeapOffset::new(0, 2).unwrap().deltas().len(), 4);
        let spec = MovementSpec::new().leap(LeapOffset::new(1, 2).unwrap()).leap(LeapOffset::new(2, 1).unwrap());
        assert_eq!(spec.leaps.len(), 1);
    }

    #[test]
    fn range_encoding_test() {
        let json = serde_json::to_string(&RayMovement::unlimited(Direction::N)).unwrap();
        assert_eq!(json, r#"{"direction":"N","range":"unlimited"}"#);
        let alias: RayMovement = serde_json::from_str(r#"{"direction":"N","range":-1}"#).unwrap();
        assert_eq!(alias.range, Range::Unlimited);
        let limited: RayMovement = serde_json::from_str(r#"{"direction":"SW","range":3}"#).unwrap();
        assert_eq!(limited.range, Range::steps(3).unwrap());
        assert!(serde_json::from_str::<RayMovement>(r#"{"direction":"N","range":0}"#).is_err());
        assert!(serde_json::from_str::<RayMovement>(r#"{"direction":"N","range":"far"}"#).is_err());
        assert!(serde_json::from_str::<LeapOffset>("[0, 0]").is_err());
        assert_eq!(serde_json::from_str::<LeapOffset>("[2, -1]").unwrap(), LeapOffset::new(1, 2).unwrap());
        assert!(Range::from_raw(0).is_err());
        assert_eq!(Range::from_raw(-7).unwrap(), Range::Unlimited);
    }

    #[test]
    fn display_test() {
        assert_eq!(MovementSpec::new().to_string(), "immobile");
        assert_eq!(knight().to_string(), "leap 1x2 (jumps)");
        assert_eq!(MovementSpec::new().ray(Direction::N, Range::ONE).to_string(), "N:1");
    }

    proptest! {
        #[test]
        fn unlimited_ray_reaches_edge(rows in 1u8..20, columns in 1u8..20, row in 0u8..20, column in 0u8..20) {
            let board = BoardModel::new(rows, columns);
            let origin = Square::new(row % rows, column % columns);
            for dir in Direction::iter() {
                let spec = MovementSpec::new().ray(dir, Range::Unlimited);
                let dests = spec.destinations(origin, Side::White, &board);
                prop_assert_eq!(dests.len(), distance_to_edge(origin, dir, &board));
            }
        }

        #[test]
        fn leaps_stay_on_board(rows in 1u8..12, columns in 1u8..12, a in 0i32..4, b in 1i32..4) {
            let board = BoardModel::new(rows, columns);
            let spec = MovementSpec::new().leap(LeapOffset::new(a, b).unwrap()).leaping(true);
            for row in 0..rows {
                for column in 0..columns {
                    let dests = spec.destinations(Square::new(row, column), Side::Black, &board);
                    prop_assert!(dests.len() <= 8);
                    prop_assert!(dests.iter().all(|d| board.contains(*d)));
                }
            }
        }
    }
}
