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
//! Everything needed to describe a variant: movement geometry, boards, pieces, per-side rules,
//! and the persisted [`VariantDefinition`] that ties them together.

pub mod board;
pub mod classic;
pub mod definition;
pub mod movement;
pub mod piece;
pub mod rules;
pub mod store;

pub use definition::{VariantBuilder, VariantDefinition};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VariantError {
    #[error("There is no variant named '{name}'")]
    VariantNotFound { name: String },
    /// A stored record can't be turned back into a definition. Re-author or delete the variant.
    #[error("The stored variant '{name}' is corrupt: {reason}")]
    CorruptVariant { name: String, reason: String },
    #[error("The variant '{name}' is invalid: {reason}")]
    InvalidVariant { name: String, reason: String },
    #[error("Couldn't encode the variant '{name}': {source}")]
    Encoding { name: String, source: serde_json::Error },
    #[error("The variant store is unavailable: {0}")]
    StoreUnavailable(#[from] std::io::Error),
}
