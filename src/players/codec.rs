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
//! Turning moves into bytes and back, for sending them to a remote peer. The transport itself
//! is someone else's business; received moves are applied like local ones.

use crate::general::common::Res;
use crate::general::moves::VariantMove;
use anyhow::anyhow;
use std::fmt::Debug;
use std::str::FromStr;

pub trait MoveCodec: Debug + Send + Sync {
    fn encode(&self, mov: &VariantMove) -> Res<Vec<u8>>;

    fn decode(&self, bytes: &[u8]) -> Res<VariantMove>;
}

/// The compact text form, e.g. `e2e3` or `a7a8=Queen`, as UTF-8.
#[derive(Debug, Default, Copy, Clone)]
pub struct CompactTextCodec;

impl MoveCodec for CompactTextCodec {
    fn encode(&self, mov: &VariantMove) -> Res<Vec<u8>> {
        Ok(mov.to_string().into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> Res<VariantMove> {
        let text = std::str::from_utf8(bytes).map_err(|err| anyhow!("A move must be valid UTF-8: {err}"))?;
        VariantMove::from_str(text)
    }
}

#[derive(Debug, Default, Copy, Clone)]
pub struct JsonCodec;

impl MoveCodec for JsonCodec {
    fn encode(&self, mov: &VariantMove) -> Res<Vec<u8>> {
        Ok(serde_json::to_vec(mov)?)
    }

    fn decode(&self, bytes: &[u8]) -> Res<VariantMove> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
