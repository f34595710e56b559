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
use anyhow::anyhow;
use colored::Colorize;
use edit_distance::edit_distance;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumIter};

pub type Res<T> = anyhow::Result<T>;

/// Board dimensions and coordinates. No variant board is larger than 255 squares in either direction.
pub type DimT = u8;

pub const NUM_SIDES: usize = 2;

#[derive(
    Debug, Default, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Display, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[must_use]
pub enum Side {
    #[default]
    White,
    Black,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    pub fn idx(self) -> usize {
        self as usize
    }

    pub fn from_idx(idx: usize) -> Self {
        if idx == 0 {
            Side::White
        } else {
            Side::Black
        }
    }
}

impl FromStr for Side {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(Side::White),
            "black" | "b" => Ok(Side::Black),
            _ => Err(anyhow!("Unrecognized side '{}', expected 'white' or 'black'", s.red())),
        }
    }
}

pub fn parse_int_from_str<T: FromStr>(as_str: &str, name: &str) -> Res<T> {
    // parse::<T>() returns an unbounded Err on failure, so we just write the error message ourselves
    as_str.parse::<T>().map_err(|_err| anyhow!("Couldn't parse {name} ('{}')", as_str.red()))
}

/// Explains which names would have been valid, preferring near misses over the full list.
pub fn suggest_names<'a, I: Iterator<Item = &'a str> + Clone>(name: &str, candidates: I) -> String {
    let lowercase = name.to_ascii_lowercase();
    let near_matches =
        candidates.clone().filter(|c| edit_distance(&c.to_ascii_lowercase(), &lowercase) <= 3).collect_vec();
    if near_matches.is_empty() {
        match candidates.clone().count() {
            0 => "There are no stored variants".to_string(),
            _ => format!("Valid names are {}", candidates.map(|c| c.bold()).join(", ")),
        }
    } else {
        format!("Perhaps you meant: {}", near_matches.iter().map(|c| c.bold()).join(", "))
    }
}
