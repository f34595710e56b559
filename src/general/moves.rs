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
use crate::general::squares::Square;
use anyhow::{bail, ensure};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A move as it is exchanged between the engine and its callers: human input, proposers and network peers.
/// The compact text representation is `<from><to>[=<promotion>]`, e.g. `e2e3` or `a7a8=Queen`.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[must_use]
pub struct VariantMove {
    pub origin: Square,
    pub destination: Square,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
}

impl VariantMove {
    pub fn new(origin: Square, destination: Square) -> Self {
        Self { origin, destination, promotion: None }
    }

    pub fn promoting(origin: Square, destination: Square, promotion: &str) -> Self {
        Self { origin, destination, promotion: Some(promotion.to_string()) }
    }
}

impl Display for VariantMove {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.origin, self.destination)?;
        if let Some(promo) = &self.promotion {
            write!(f, "={promo}")?;
        }
        Ok(())
    }
}

impl FromStr for VariantMove {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (origin, rest) = Square::parse_prefix(s)?;
        let (destination, rest) = Square::parse_prefix(rest)?;
        let promotion = match rest.strip_prefix('=') {
            Some(name) => {
                ensure!(!name.trim().is_empty(), "Missing promotion piece name in '{}'", s.red());
                Some(name.trim().to_string())
            }
            None if rest.is_empty() => None,
            None => bail!("Unexpected trailing input '{}' in move '{}'", rest.red(), s.bold()),
        };
        Ok(Self { origin, destination, promotion })
    }
}
