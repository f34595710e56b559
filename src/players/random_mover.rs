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
use crate::engine::GameSnapshot;
use crate::general::moves::VariantMove;
use crate::players::MoveProposer;
use itertools::Itertools;
use rand::prelude::SliceRandom;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::{Debug, Formatter};

/// Plays a uniformly random legal move, and a random promotion if the move promotes.
pub struct RandomMover<R: Rng> {
    rng: R,
}

impl<R: Rng> Debug for RandomMover<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("random mover")
    }
}

impl Default for RandomMover<StdRng> {
    fn default() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl RandomMover<StdRng> {
    /// A reproducible mover: the same seed and the same games give the same moves.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomMover<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send> MoveProposer for RandomMover<R> {
    fn name(&self) -> &str {
        "Random Mover"
    }

    fn propose(&mut self, snapshot: &GameSnapshot) -> Option<VariantMove> {
        let moves = snapshot
            .legal_moves
            .iter()
            .flat_map(|(origin, destinations)| destinations.iter().map(|dest| (*origin, *dest)))
            .collect_vec();
        let &(origin, destination) = moves.choose(&mut self.rng)?;
        let promotion = snapshot.promotion_choices(origin, destination).choose(&mut self.rng).cloned();
        Some(VariantMove { origin, destination, promotion })
    }
}
