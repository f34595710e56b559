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
use crate::general::common::{DimT, Side};
use crate::general::squares::{Direction, GridSize, Square};
use crate::variant::piece::PieceInstance;
use serde::{Deserialize, Serialize};

/// A rectangular grid of squares, each holding at most one piece.
///
/// Only the geometry is persisted; pieces are stored per team in the variant definition
/// and placed when a game starts.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "BoardShape", into = "BoardShape")]
#[must_use]
pub struct BoardModel {
    size: GridSize,
    /// Reserved for non-rectangular variant shapes, movement currently ignores it.
    special_topology: bool,
    cells: Vec<Option<PieceInstance>>,
}

#[derive(Serialize, Deserialize)]
struct BoardShape {
    rows: DimT,
    columns: DimT,
    #[serde(default)]
    special_topology: bool,
}

impl From<BoardShape> for BoardModel {
    fn from(shape: BoardShape) -> Self {
        Self::new(shape.rows, shape.columns).with_special_topology(shape.special_topology)
    }
}

impl From<BoardModel> for BoardShape {
    fn from(board: BoardModel) -> Self {
        BoardShape { rows: board.size.rows, columns: board.size.columns, special_topology: board.special_topology }
    }
}

impl BoardModel {
    pub fn new(rows: DimT, columns: DimT) -> Self {
        let size = GridSize::new(rows, columns);
        Self { size, special_topology: false, cells: vec![None; size.num_squares()] }
    }

    pub fn with_special_topology(mut self, special_topology: bool) -> Self {
        self.special_topology = special_topology;
        self
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn rows(&self) -> DimT {
        self.size.rows
    }

    pub fn columns(&self) -> DimT {
        self.size.columns
    }

    pub fn has_special_topology(&self) -> bool {
        self.special_topology
    }

    /// Bounds check. The board index of `square` is not looked at; callers route squares to boards.
    pub fn contains(&self, square: Square) -> bool {
        self.size.contains(square)
    }

    pub fn piece_at(&self, square: Square) -> Option<&PieceInstance> {
        if !self.contains(square) {
            return None;
        }
        self.cells[self.size.internal_key(square)].as_ref()
    }

    pub fn side_at(&self, square: Square) -> Option<Side> {
        self.piece_at(square).map(|p| p.side)
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.piece_at(square).is_none()
    }

    pub fn pieces(&self) -> impl Iterator<Item = &PieceInstance> {
        self.cells.iter().flatten()
    }

    pub fn is_cleared(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// In-bounds squares adjacent to `square`, including diagonally adjacent ones.
    pub fn neighbors(&self, square: Square) -> impl Iterator<Item = Square> + '_ {
        Direction::all().into_iter().filter_map(move |dir| {
            let (dr, dc) = dir.delta();
            square.offset(dr, dc).filter(|sq| self.contains(*sq))
        })
    }

    /// Places `piece` on its square and returns the previous occupant. Pieces off the board are dropped.
    pub(crate) fn put(&mut self, piece: PieceInstance) -> Option<PieceInstance> {
        if !self.contains(piece.square) {
            return None;
        }
        let key = self.size.internal_key(piece.square);
        self.cells[key].replace(piece)
    }

    pub(crate) fn take(&mut self, square: Square) -> Option<PieceInstance> {
        if !self.contains(square) {
            return None;
        }
        let key = self.size.internal_key(square);
        self.cells[key].take()
    }

    pub(crate) fn piece_at_mut(&mut self, square: Square) -> Option<&mut PieceInstance> {
        if !self.contains(square) {
            return None;
        }
        let key = self.size.internal_key(square);
        self.cells[key].as_mut()
    }

    pub(crate) fn cleared(&self) -> Self {
        Self::new(self.rows(), self.columns()).with_special_topology(self.special_topology)
    }
}

/// The occupancy of all boards of a running game. Every piece is on exactly one board.
#[derive(Debug, Clone, Eq, PartialEq)]
#[must_use]
pub struct Position {
    boards: Vec<BoardModel>,
}

impl Position {
    /// Creates a position with the geometry of `boards` and no pieces.
    pub fn empty(boards: &[BoardModel]) -> Self {
        Self { boards: boards.iter().map(BoardModel::cleared).collect() }
    }

    pub fn boards(&self) -> &[BoardModel] {
        &self.boards
    }

    pub fn board(&self, idx: DimT) -> Option<&BoardModel> {
        self.boards.get(idx as usize)
    }

    /// The board that `square` belongs to, if any.
    pub fn board_of(&self, square: Square) -> Option<&BoardModel> {
        self.board(square.board).filter(|b| b.contains(square))
    }

    pub fn contains(&self, square: Square) -> bool {
        self.board_of(square).is_some()
    }

    pub fn piece_at(&self, square: Square) -> Option<&PieceInstance> {
        self.board(square.board)?.piece_at(square)
    }

    pub fn side_at(&self, square: Square) -> Option<Side> {
        self.piece_at(square).map(|p| p.side)
    }

    pub fn pieces(&self) -> impl Iterator<Item = &PieceInstance> {
        self.boards.iter().flat_map(BoardModel::pieces)
    }

    pub fn pieces_of(&self, side: Side) -> impl Iterator<Item = &PieceInstance> {
        self.pieces().filter(move |p| p.side == side)
    }

    pub(crate) fn put(&mut self, piece: PieceInstance) -> Option<PieceInstance> {
        self.boards.get_mut(piece.square.board as usize)?.put(piece)
    }

    pub(crate) fn piece_at_mut(&mut self, square: Square) -> Option<&mut PieceInstance> {
        self.boards.get_mut(square.board as usize)?.piece_at_mut(square)
    }

    /// Moves the piece on `origin` to `destination` and returns the captured occupant, if any.
    /// Does nothing if `origin` is empty or `destination` isn't on a board.
    pub(crate) fn relocate(&mut self, origin: Square, destination: Square) -> Option<PieceInstance> {
        if !self.contains(destination) {
            return None;
        }
        let mut piece = self.boards.get_mut(origin.board as usize)?.take(origin)?;
        piece.square = destination;
        self.put(piece)
    }
}
