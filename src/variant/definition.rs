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
use crate::general::squares::Square;
use crate::variant::board::{BoardModel, Position};
use crate::variant::movement::MovementSpec;
use crate::variant::piece::PieceInstance;
use crate::variant::rules::{PromotionMap, RuleSet};
use crate::variant::store::VariantStore;
use crate::variant::VariantError;
use crate::variant::VariantError::{CorruptVariant, Encoding, InvalidVariant};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The persisted form of a variant. Only ever turned into a [`VariantDefinition`] after validation.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
struct VariantRecord {
    name: String,
    boards: Vec<BoardModel>,
    /// Every piece type that can appear in a game, including promotion targets that don't start on the board.
    piece_types: BTreeMap<String, MovementSpec>,
    white_team: Vec<PieceInstance>,
    black_team: Vec<PieceInstance>,
    #[serde(default)]
    white_rules: RuleSet,
    #[serde(default)]
    black_rules: RuleSet,
    #[serde(default)]
    white_promotions: PromotionMap,
    #[serde(default)]
    black_promotions: PromotionMap,
}

impl VariantRecord {
    fn team(&self, side: Side) -> &[PieceInstance] {
        match side {
            Side::White => &self.white_team,
            Side::Black => &self.black_team,
        }
    }

    fn team_mut(&mut self, side: Side) -> &mut Vec<PieceInstance> {
        match side {
            Side::White => &mut self.white_team,
            Side::Black => &mut self.black_team,
        }
    }

    fn promotions_mut(&mut self, side: Side) -> &mut PromotionMap {
        match side {
            Side::White => &mut self.white_promotions,
            Side::Black => &mut self.black_promotions,
        }
    }

    fn rules_mut(&mut self, side: Side) -> &mut RuleSet {
        match side {
            Side::White => &mut self.white_rules,
            Side::Black => &mut self.black_rules,
        }
    }

    /// A side's promotion map entry for a piece name overrides the list of every piece with that name.
    fn apply_promotion_maps(&mut self) {
        for side in [Side::White, Side::Black] {
            let promotions = match side {
                Side::White => self.white_promotions.clone(),
                Side::Black => self.black_promotions.clone(),
            };
            for piece in self.team_mut(side) {
                if let Some(targets) = promotions.get(&piece.name) {
                    piece.promotes_to = targets.to_vec();
                }
            }
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("the variant needs a name".to_string());
        }
        if self.boards.is_empty() {
            return Err("a variant needs at least one board".to_string());
        }
        if self.boards.len() > DimT::MAX as usize + 1 {
            return Err(format!("too many boards ({})", self.boards.len()));
        }
        for (idx, board) in self.boards.iter().enumerate() {
            if board.rows() == 0 || board.columns() == 0 {
                return Err(format!("board {idx} has no squares ({})", board.size()));
            }
        }
        let known = |name: &str| self.piece_types.contains_key(name);
        let mut occupied = BTreeSet::new();
        for side in [Side::White, Side::Black] {
            for piece in self.team(side) {
                if piece.side != side {
                    return Err(format!("the {piece} is listed in the {side} team"));
                }
                if !known(&piece.name) {
                    return Err(format!("the {piece} has no piece type definition"));
                }
                let on_board = self.boards.get(piece.square.board as usize).is_some_and(|b| b.contains(piece.square));
                if !on_board {
                    return Err(format!("the {piece} isn't on any board"));
                }
                if !occupied.insert(piece.square) {
                    return Err(format!("more than one piece stands on {}", piece.square));
                }
                if let Some(missing) = piece.promotes_to.iter().find(|p| !known(p)) {
                    return Err(format!("the {piece} promotes to the unknown piece '{missing}'"));
                }
            }
            let promotions = match side {
                Side::White => &self.white_promotions,
                Side::Black => &self.black_promotions,
            };
            for (from, targets) in promotions.iter() {
                if let Some(missing) = targets.iter().find(|p| !known(p)) {
                    return Err(format!("{side} '{from}' promotes to the unknown piece '{missing}'"));
                }
            }
            let rules = match side {
                Side::White => &self.white_rules,
                Side::Black => &self.black_rules,
            };
            if let Some(royal) = &rules.royal_piece {
                if !self.team(side).iter().any(|p| &p.name == royal) {
                    return Err(format!("{side} has no '{royal}' on the board, but it's the royal piece"));
                }
            }
        }
        Ok(())
    }
}

/// A complete, validated variant: boards, both teams, both rule sets and both promotion maps.
/// Definitions are immutable; use a [`VariantBuilder`] to derive a changed copy.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VariantRecord", into = "VariantRecord")]
#[must_use]
pub struct VariantDefinition(VariantRecord);

impl TryFrom<VariantRecord> for VariantDefinition {
    type Error = String;

    /// Applies both promotion maps to the teams, then validates. Records built in code and records
    /// read from a store end up with the same promotion lists.
    fn try_from(mut record: VariantRecord) -> Result<Self, Self::Error> {
        record.apply_promotion_maps();
        record.validate()?;
        Ok(Self(record))
    }
}

impl From<VariantDefinition> for VariantRecord {
    fn from(value: VariantDefinition) -> Self {
        value.0
    }
}

impl VariantDefinition {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn boards(&self) -> &[BoardModel] {
        &self.0.boards
    }

    pub fn piece_types(&self) -> &BTreeMap<String, MovementSpec> {
        &self.0.piece_types
    }

    pub fn movement_of(&self, name: &str) -> Option<&MovementSpec> {
        self.0.piece_types.get(name)
    }

    pub fn team(&self, side: Side) -> &[PieceInstance] {
        self.0.team(side)
    }

    pub fn rules(&self, side: Side) -> &RuleSet {
        match side {
            Side::White => &self.0.white_rules,
            Side::Black => &self.0.black_rules,
        }
    }

    pub fn promotions(&self, side: Side) -> &PromotionMap {
        match side {
            Side::White => &self.0.white_promotions,
            Side::Black => &self.0.black_promotions,
        }
    }

    /// A fresh position with both teams on their starting squares. Each call returns an independent copy.
    pub fn instantiate(&self) -> Position {
        let mut position = Position::empty(self.boards());
        for piece in self.team(Side::White).iter().chain(self.team(Side::Black)) {
            position.put(piece.clone());
        }
        position
    }

    /// Writes this definition to `store` under its name, replacing any previous record with that name.
    pub fn save(&self, store: &dyn VariantStore) -> Result<(), VariantError> {
        let record =
            serde_json::to_vec_pretty(self).map_err(|source| Encoding { name: self.name().to_string(), source })?;
        store.write(self.name(), &record)
    }

    pub fn load(store: &dyn VariantStore, name: &str) -> Result<Self, VariantError> {
        let record = store.read(name)?;
        let definition: Self = serde_json::from_slice(&record)
            .map_err(|err| CorruptVariant { name: name.to_string(), reason: err.to_string() })?;
        if definition.name() != name {
            return Err(CorruptVariant {
                name: name.to_string(),
                reason: format!("the record describes the variant '{}'", definition.name()),
            });
        }
        Ok(definition)
    }
}

/// Collects the parts of a variant and validates them all at once in [`VariantBuilder::build`],
/// so there is never a partially constructed [`VariantDefinition`].
#[derive(Debug, Clone)]
#[must_use]
pub struct VariantBuilder {
    record: VariantRecord,
    placements: Vec<(Side, String, Square)>,
}

impl VariantBuilder {
    pub fn new(name: &str) -> Self {
        Self { record: VariantRecord { name: name.to_string(), ..Default::default() }, placements: vec![] }
    }

    /// Starts from an existing definition, e.g. to edit and save it under a new name.
    pub fn from_definition(definition: &VariantDefinition) -> Self {
        Self { record: definition.0.clone(), placements: vec![] }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.record.name = name.to_string();
        self
    }

    pub fn board(self, rows: DimT, columns: DimT) -> Self {
        self.board_model(BoardModel::new(rows, columns))
    }

    pub fn board_model(mut self, board: BoardModel) -> Self {
        self.record.boards.push(board);
        self
    }

    /// Adds or replaces a piece type.
    pub fn piece_type(mut self, name: &str, movement: MovementSpec) -> Self {
        self.record.piece_types.insert(name.to_string(), movement);
        self
    }

    pub fn place(mut self, side: Side, name: &str, square: Square) -> Self {
        self.placements.push((side, name.to_string(), square));
        self
    }

    pub fn remove_piece(mut self, square: Square) -> Self {
        self.placements.retain(|(_, _, sq)| *sq != square);
        self.record.white_team.retain(|p| p.square != square);
        self.record.black_team.retain(|p| p.square != square);
        self
    }

    /// Sets the promotion targets of `name` for one side only.
    pub fn promotion(mut self, side: Side, name: &str, targets: &[&str]) -> Self {
        let targets = targets.iter().map(|t| t.to_string()).collect();
        self.record.promotions_mut(side).insert(name, targets);
        self
    }

    /// Sets the promotion targets of `name` for both sides.
    pub fn promotion_both(self, name: &str, targets: &[&str]) -> Self {
        self.promotion(Side::White, name, targets).promotion(Side::Black, name, targets)
    }

    pub fn rules(mut self, side: Side, rules: RuleSet) -> Self {
        *self.record.rules_mut(side) = rules;
        self
    }

    pub fn build(self) -> Result<VariantDefinition, VariantError> {
        let mut record = self.record;
        for (side, name, square) in self.placements {
            let Some(movement) = record.piece_types.get(&name) else {
                return Err(InvalidVariant {
                    name: record.name,
                    reason: format!("can't place a {side} '{name}' on {square}, there is no such piece type"),
                });
            };
            let piece = PieceInstance::new(&name, side, square, movement.clone());
            record.team_mut(side).push(piece);
        }
        VariantDefinition::try_from(record.clone())
            .map_err(|reason| InvalidVariant { name: record.name.clone(), reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::general::squares::Direction;
    use crate::variant::movement::{LeapOffset, Range};
    use crate::variant::store::MemoryStore;
    use std::str::FromStr;

    fn sq(s: &str) -> Square {
        Square::from_str(s).unwrap()
    }

    fn king() -> MovementSpec {
        MovementSpec::new().rays(Direction::all(), Range::ONE)
    }

    fn mini() -> VariantBuilder {
        VariantBuilder::new("Mini")
            .board(5, 5)
            .piece_type("King", king())
            .piece_type("Pawn", MovementSpec::new().ray(Direction::N, Range::ONE))
            .piece_type("Camel", MovementSpec::new().leap(LeapOffset::new(1, 3).unwrap()).leaping(true))
            .place(Side::White, "King", sq("c1"))
            .place(Side::Black, "King", sq("c5"))
            .place(Side::White, "Pawn", sq("a2"))
            .place(Side::Black, "Pawn", sq("e4"))
            .promotion_both("Pawn", &["Camel"])
    }

    #[test]
    fn build_test() {
        let def = mini().build().unwrap();
        assert_eq!(def.name(), "Mini");
        assert_eq!(def.boards().len(), 1);
        assert_eq!(def.team(Side::White).len(), 2);
        assert_eq!(def.team(Side::Black).len(), 2);
        let pawn = def.team(Side::Black).iter().find(|p| p.name == "Pawn").unwrap();
        assert_eq!(pawn.promotes_to, vec!["Camel".to_string()]);
        assert_eq!(def.promotions(Side::White).get("Pawn"), def.promotions(Side::Black).get("Pawn"));
        let pos = def.instantiate();
        assert_eq!(pos.pieces().count(), 4);
        assert_eq!(pos.piece_at(sq("e4")).map(|p| p.side), Some(Side::Black));
        assert!(def.instantiate() == pos);
        assert!(def.boards()[0].is_cleared());
    }

    #[test]
    fn one_sided_promotion_test() {
        let def = mini().promotion(Side::White, "Pawn", &["King", "Camel"]).build().unwrap();
        assert_eq!(def.promotions(Side::White).get("Pawn").unwrap().len(), 2);
        assert_eq!(def.promotions(Side::Black).get("Pawn").unwrap().len(), 1);
    }

    #[test]
    fn invalid_builds_test() {
        let invalid = |builder: VariantBuilder| matches!(builder.build(), Err(VariantError::InvalidVariant { .. }));
        assert!(invalid(mini().place(Side::White, "Dragon", sq("b1"))));
        assert!(invalid(mini().place(Side::White, "Pawn", sq("c5"))));
        assert!(invalid(mini().place(Side::White, "Pawn", sq("f1"))));
        assert!(invalid(mini().place(Side::White, "Pawn", Square::on_board(1, 0, 0))));
        assert!(invalid(mini().promotion(Side::Black, "Pawn", &["Dragon"])));
        assert!(invalid(mini().remove_piece(sq("c5"))));
        assert!(invalid(mini().name(" ")));
        assert!(invalid(VariantBuilder::new("Empty")));
        assert!(invalid(mini().board(0, 3)));
        // without a royal piece, a side doesn't need a king
        let rules = RuleSet::default().with_royal_piece(None);
        assert!(mini().remove_piece(sq("c5")).rules(Side::Black, rules).build().is_ok());
    }

    #[test]
    fn derive_from_definition_test() {
        let def = mini().build().unwrap();
        let bigger = VariantBuilder::from_definition(&def)
            .name("Mini plus")
            .board(3, 3)
            .place(Side::White, "Camel", Square::on_board(1, 1, 1))
            .build()
            .unwrap();
        assert_eq!(bigger.boards().len(), 2);
        assert_eq!(bigger.team(Side::White).len(), 3);
        assert_eq!(def.team(Side::White).len(), 2);
    }

    #[test]
    fn save_load_round_trip_test() {
        let store = MemoryStore::default();
        let def = mini().rules(Side::Black, RuleSet::default().with_mandatory_capture(true)).build().unwrap();
        def.save(&store).unwrap();
        let loaded = VariantDefinition::load(&store, "Mini").unwrap();
        assert_eq!(loaded, def);
        assert!(loaded.rules(Side::Black).mandatory_capture);
        assert!(matches!(VariantDefinition::load(&store, "Maxi"), Err(VariantError::VariantNotFound { .. })));
    }

    #[test]
    fn corrupt_records_test() {
        let store = MemoryStore::default();
        let def = mini().build().unwrap();
        let json = serde_json::to_string(&def).unwrap();

        store.write("Broken", b"{ not json").unwrap();
        assert!(matches!(VariantDefinition::load(&store, "Broken"), Err(CorruptVariant { .. })));

        let missing_type = json.replace(r#""Camel":"#, r#""Horse":"#);
        store.write("Mini", missing_type.as_bytes()).unwrap();
        let err = VariantDefinition::load(&store, "Mini").unwrap_err();
        assert!(matches!(err, CorruptVariant { .. }), "{err}");

        store.write("Other", json.as_bytes()).unwrap();
        assert!(matches!(VariantDefinition::load(&store, "Other"), Err(CorruptVariant { .. })));
    }

    #[test]
    fn load_applies_promotion_maps_test() {
        let store = MemoryStore::default();
        let def = mini().build().unwrap();
        let json = serde_json::to_string(&def).unwrap().replace(r#","promotes_to":["Camel"]"#, "");
        assert!(!json.contains("promotes_to"));
        store.write("Mini", json.as_bytes()).unwrap();
        let loaded = VariantDefinition::load(&store, "Mini").unwrap();
        for side in [Side::White, Side::Black] {
            let pawn = loaded.team(side).iter().find(|p| p.name == "Pawn").unwrap();
            assert_eq!(pawn.promotes_to, vec!["Camel".to_string()]);
        }
        assert_eq!(loaded, def);

        // a map entry also replaces a stale list in the record
        let stale = serde_json::to_string(&def).unwrap().replace(r#""promotes_to":["Camel"]"#, r#""promotes_to":["King"]"#);
        store.write("Mini", stale.as_bytes()).unwrap();
        assert_eq!(VariantDefinition::load(&store, "Mini").unwrap(), def);
    }
}
