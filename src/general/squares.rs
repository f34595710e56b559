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
use crate::general::common::{parse_int_from_str, DimT, Res, Side};
use anyhow::{bail, ensure};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString};

pub fn file_to_char(file: DimT) -> char {
    debug_assert!(file < 26);
    (file + b'a') as char
}

pub fn char_to_file(file: char) -> DimT {
    debug_assert!(file.is_ascii_lowercase());
    file as DimT - b'a'
}

/// A square on one of the boards of a variant.
/// Row 0 is the first rank from white's point of view, column 0 is the `a` file.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize, Deserialize)]
#[must_use]
pub struct Square {
    #[serde(default)]
    pub board: DimT,
    pub row: DimT,
    pub column: DimT,
}

impl Square {
    pub const fn new(row: DimT, column: DimT) -> Self {
        Self { board: 0, row, column }
    }

    pub const fn on_board(board: DimT, row: DimT, column: DimT) -> Self {
        Self { board, row, column }
    }

    /// The square `(row + row_delta, column + column_delta)` on the same board,
    /// or `None` if that would leave the representable range. Doesn't check the board size.
    pub fn offset(self, row_delta: isize, column_delta: isize) -> Option<Self> {
        let row = DimT::try_from(self.row as isize + row_delta).ok()?;
        let column = DimT::try_from(self.column as isize + column_delta).ok()?;
        Some(Self { board: self.board, row, column })
    }

    /// Parses a square from the start of `input` and returns the unparsed remainder.
    /// Accepts `<file><rank>` optionally followed by `@<board>`, e.g. `e4` or `c3@1`.
    pub fn parse_prefix(input: &str) -> Res<(Self, &str)> {
        let mut chars = input.chars();
        let Some(file) = chars.next() else { bail!("Empty square") };
        if !file.is_ascii_alphabetic() {
            bail!("file (column) '{}' must be a valid ascii letter", file.to_string().red());
        }
        let column = char_to_file(file.to_ascii_lowercase());
        let rest = chars.as_str();
        let digits = rest.chars().take_while(char::is_ascii_digit).count();
        ensure!(digits > 0, "Missing rank (row) after file '{file}' in '{}'", input.red());
        let rank: usize = parse_int_from_str(&rest[..digits], "rank (row)")?;
        ensure!(rank > 0 && rank <= DimT::MAX as usize + 1, "Rank {} is out of range", rank.to_string().red());
        let mut rest = &rest[digits..];
        let mut board = 0;
        if let Some(after_at) = rest.strip_prefix('@') {
            let digits = after_at.chars().take_while(char::is_ascii_digit).count();
            board = parse_int_from_str(&after_at[..digits], "board index")?;
            rest = &after_at[digits..];
        }
        Ok((Self { board, row: (rank - 1) as DimT, column }, rest))
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let file = if self.column < 26 { file_to_char(self.column) } else { '?' };
        // output 1-indexed, convert to usize to prevent overflow
        write!(f, "{file}{}", self.row as usize + 1)?;
        if self.board != 0 {
            write!(f, "@{}", self.board)?;
        }
        Ok(())
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (square, rest) = Self::parse_prefix(s.trim())?;
        ensure!(rest.is_empty(), "Unexpected trailing input '{}' after square {square}", rest.red());
        Ok(square)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize, derive_more::Display)]
#[display("{rows}x{columns}")]
#[must_use]
pub struct GridSize {
    pub rows: DimT,
    pub columns: DimT,
}

impl GridSize {
    pub fn new(rows: DimT, columns: DimT) -> Self {
        Self { rows, columns }
    }

    pub fn num_squares(self) -> usize {
        self.rows as usize * self.columns as usize
    }

    pub fn contains(self, square: Square) -> bool {
        square.row < self.rows && square.column < self.columns
    }

    pub fn internal_key(self, square: Square) -> usize {
        debug_assert!(self.contains(square));
        square.row as usize * self.columns as usize + square.column as usize
    }

    /// The row furthest away from the given side, which is where its pieces usually promote.
    pub fn far_row(self, side: Side) -> DimT {
        match side {
            Side::White => self.rows - 1,
            Side::Black => 0,
        }
    }
}

/// Compass directions, seen from white's side of the board: `N` increases the row.
#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    StrumDisplay,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[must_use]
pub enum Direction {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl Direction {
    /// `(row_delta, column_delta)` of a single step.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::N => (1, 0),
            Direction::S => (-1, 0),
            Direction::E => (0, 1),
            Direction::W => (0, -1),
            Direction::NE => (1, 1),
            Direction::NW => (1, -1),
            Direction::SE => (-1, 1),
            Direction::SW => (-1, -1),
        }
    }

    /// Swaps north and south. Black's pieces use mirrored directions, so `N` always means "forward".
    pub fn mirrored(self) -> Self {
        match self {
            Direction::N => Direction::S,
            Direction::S => Direction::N,
            Direction::NE => Direction::SE,
            Direction::NW => Direction::SW,
            Direction::SE => Direction::NE,
            Direction::SW => Direction::NW,
            horizontal => horizontal,
        }
    }

    pub fn for_side(self, side: Side) -> Self {
        match side {
            Side::White => self,
            Side::Black => self.mirrored(),
        }
    }

    pub fn orthogonal() -> [Direction; 4] {
        [Direction::N, Direction::S, Direction::E, Direction::W]
    }

    pub fn diagonal() -> [Direction; 4] {
        [Direction::NE, Direction::NW, Direction::SE, Direction::SW]
    }

    pub fn all() -> [Direction; 8] {
        [Direction::N, Direction::S, Direction::E, Direction::W, Direction::NE, Direction::NW, Direction::SE, Direction::SW]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn square_text_test() {
        let sq = Square::from_str("e2").unwrap();
        assert_eq!(sq, Square::new(1, 4));
        assert_eq!(sq.to_string(), "e2");
        let sq = Square::from_str("c10@2").unwrap();
        assert_eq!(sq, Square::on_board(2, 9, 2));
        assert_eq!(sq.to_string(), "c10@2");
        let (sq, rest) = Square::parse_prefix("a7a8=Queen").unwrap();
        assert_eq!(sq, Square::new(6, 0));
        assert_eq!(rest, "a8=Queen");
        assert!(Square::from_str("").is_err());
        assert!(Square::from_str("4e").is_err());
        assert!(Square::from_str("e0").is_err());
        assert!(Square::from_str("e4x").is_err());
    }

    #[test]
    fn offset_test() {
        let sq = Square::new(0, 0);
        assert_eq!(sq.offset(-1, 0), None);
        assert_eq!(sq.offset(2, 1), Some(Square::new(2, 1)));
        assert_eq!(Square::on_board(3, 1, 1).offset(1, -1), Some(Square::on_board(3, 2, 0)));
    }

    #[test]
    fn direction_test() {
        for dir in Direction::iter() {
            assert_eq!(dir.mirrored().mirrored(), dir);
            let (dr, dc) = dir.delta();
            let (mr, mc) = dir.mirrored().delta();
            assert_eq!((dr, dc), (-mr, mc));
            assert_eq!(Direction::from_str(&dir.to_string()).unwrap(), dir);
        }
        assert_eq!(Direction::N.for_side(Side::Black), Direction::S);
        assert_eq!(Direction::E.for_side(Side::Black), Direction::E);
        assert_eq!(Direction::all().len(), Direction::iter().count());
    }

    #[test]
    fn grid_size_test() {
        let size = GridSize::new(8, 10);
        assert_eq!(size.num_squares(), 80);
        assert!(size.contains(Square::new(7, 9)));
        assert!(!size.contains(Square::new(8, 0)));
        assert_eq!(size.internal_key(Square::new(1, 2)), 12);
        assert_eq!(size.far_row(Side::White), 7);
        assert_eq!(size.far_row(Side::Black), 0);
        assert_eq!(size.to_string(), "8x10");
    }
}
