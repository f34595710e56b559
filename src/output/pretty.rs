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
use crate::general::moves::VariantMove;
use crate::general::squares::{file_to_char, Square};
use crate::variant::board::{BoardModel, Position};
use crate::variant::VariantDefinition;
use colored::{Color, Colorize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

/// Picks a one-letter symbol for each piece name: the first letter of the name that isn't taken yet,
/// in sorted name order, so `King` gets `K` and `Knight` gets `N`.
pub fn piece_symbols<'a, I: IntoIterator<Item = &'a str>>(names: I) -> BTreeMap<String, char> {
    let names: BTreeSet<&str> = names.into_iter().collect();
    let mut used = BTreeSet::new();
    let mut res = BTreeMap::new();
    for name in names {
        let symbol = name
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_uppercase())
            .chain('A'..='Z')
            .find(|c| !used.contains(c))
            .unwrap_or('?');
        used.insert(symbol);
        res.insert(name.to_string(), symbol);
    }
    res
}

/// Renders positions as text diagrams, one block per board, with white at the bottom.
/// White pieces use upper case symbols and black pieces lower case ones.
#[derive(Debug, Clone)]
#[must_use]
pub struct Diagram {
    symbols: BTreeMap<String, char>,
    colored: bool,
    last_move: Option<VariantMove>,
}

impl Diagram {
    pub fn for_variant(definition: &VariantDefinition) -> Self {
        let symbols = piece_symbols(definition.piece_types().keys().map(String::as_str));
        Self { symbols, colored: false, last_move: None }
    }

    pub fn colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    pub fn highlight(mut self, last_move: Option<VariantMove>) -> Self {
        self.last_move = last_move;
        self
    }

    pub fn symbol(&self, name: &str, side: Side) -> char {
        let symbol = self.symbols.get(name).copied().unwrap_or('?');
        match side {
            Side::White => symbol,
            Side::Black => symbol.to_ascii_lowercase(),
        }
    }

    pub fn legend(&self) -> String {
        self.symbols.iter().map(|(name, symbol)| format!("{symbol}={name}")).collect::<Vec<_>>().join(" ")
    }

    fn cell(&self, board: &BoardModel, square: Square) -> String {
        let text = match board.piece_at(square) {
            None => ". ".to_string(),
            Some(piece) => format!("{} ", self.symbol(&piece.name, piece.side)),
        };
        if !self.colored {
            return text;
        }
        let highlighted = self.last_move.as_ref().is_some_and(|m| m.origin == square || m.destination == square);
        let background = if highlighted {
            Color::Red
        } else if (square.row as usize + square.column as usize) % 2 == 0 {
            Color::Black
        } else {
            Color::White
        };
        let foreground = match board.side_at(square) {
            Some(Side::White) => Color::Green,
            Some(Side::Black) => Color::Cyan,
            None => background,
        };
        text.color(foreground).on_color(background).to_string()
    }

    pub fn as_string(&self, position: &Position) -> String {
        let mut res = String::new();
        let multiple = position.boards().len() > 1;
        for (idx, board) in position.boards().iter().enumerate() {
            if multiple {
                _ = writeln!(res, "Board {idx} ({})", board.size());
            }
            for row in (0..board.rows()).rev() {
                res.push(' ');
                for column in 0..board.columns() {
                    let square = Square::on_board(idx as u8, row, column);
                    res += &self.cell(board, square);
                }
                _ = writeln!(res, "{}", row as usize + 1);
            }
            let files = (0..board.columns()).map(|c| if c < 26 { file_to_char(c) } else { '?' });
            _ = writeln!(res, " {}", itertools::intersperse(files, ' ').collect::<String>());
        }
        res
    }
}
