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
use crate::general::squares::GridSize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_ROYAL_PIECE: &str = "King";

/// Optional legality constraints for one side. Each game has one `RuleSet` per side.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(default)]
#[must_use]
pub struct RuleSet {
    /// The piece that must not be left attacked. `None` means this side can't be checked.
    pub royal_piece: Option<String>,
    /// Skip the king safety filter: moves may leave the royal piece attacked, and it can be captured.
    pub allow_self_check: bool,
    /// If any capture is legal, only captures are legal.
    pub mandatory_capture: bool,
    /// Row on which promotable pieces promote. Defaults to the row furthest from this side.
    pub promotion_row: Option<DimT>,
    /// The game is drawn once this many consecutive half-moves without capture or promotion have been played.
    pub quiet_move_limit: Option<u32>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            royal_piece: Some(DEFAULT_ROYAL_PIECE.to_string()),
            allow_self_check: false,
            mandatory_capture: false,
            promotion_row: None,
            quiet_move_limit: None,
        }
    }
}

impl RuleSet {
    pub fn with_royal_piece(mut self, royal_piece: Option<&str>) -> Self {
        self.royal_piece = royal_piece.map(str::to_string);
        self
    }

    pub fn with_self_check(mut self, allow_self_check: bool) -> Self {
        self.allow_self_check = allow_self_check;
        self
    }

    pub fn with_mandatory_capture(mut self, mandatory_capture: bool) -> Self {
        self.mandatory_capture = mandatory_capture;
        self
    }

    pub fn with_promotion_row(mut self, row: DimT) -> Self {
        self.promotion_row = Some(row);
        self
    }

    pub fn with_quiet_move_limit(mut self, limit: u32) -> Self {
        self.quiet_move_limit = Some(limit);
        self
    }

    pub fn is_royal(&self, name: &str) -> bool {
        self.royal_piece.as_deref() == Some(name)
    }

    pub fn promotion_row(&self, side: Side, size: GridSize) -> DimT {
        self.promotion_row.unwrap_or_else(|| size.far_row(side))
    }
}

/// Which piece names may turn into which, for one side.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[must_use]
pub struct PromotionMap(BTreeMap<String, Vec<String>>);

impl PromotionMap {
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    /// Replaces the entry for `name`.
    pub fn insert(&mut self, name: &str, targets: Vec<String>) {
        self.0.insert(name.to_string(), targets);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_set_test() {
        let rules = RuleSet::default();
        assert!(rules.is_royal("King"));
        assert!(!rules.is_royal("Queen"));
        let size = GridSize::new(10, 8);
        assert_eq!(rules.promotion_row(Side::White, size), 9);
        assert_eq!(rules.promotion_row(Side::Black, size), 0);
        let rules = rules.with_promotion_row(5).with_royal_piece(None);
        assert_eq!(rules.promotion_row(Side::Black, size), 5);
        assert!(!rules.is_royal("King"));
    }

    #[test]
    fn rule_set_defaults_when_reading_test() {
        let rules: RuleSet = serde_json::from_str(r#"{"mandatory_capture":true}"#).unwrap();
        assert!(rules.mandatory_capture);
        assert_eq!(rules.royal_piece.as_deref(), Some(DEFAULT_ROYAL_PIECE));
        assert_eq!(rules, RuleSet::default().with_mandatory_capture(true));
    }

    #[test]
    fn promotion_map_test() {
        let mut map = PromotionMap::default();
        assert!(map.is_empty());
        map.insert("Pawn", vec!["Queen".to_string()]);
        map.insert("Pawn", vec!["Rook".to_string(), "Bishop".to_string()]);
        assert_eq!(map.get("Pawn"), Some(["Rook".to_string(), "Bishop".to_string()].as_slice()));
        assert_eq!(map.get("Rook"), None);
        assert_eq!(map.iter().count(), 1);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"Pawn":["Rook","Bishop"]}"#);
    }
}
