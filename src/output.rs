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
//! Human-facing output: levelled log lines and board diagrams.

use colored::{ColoredString, Colorize};
use strum_macros::{Display, EnumIter};

pub mod logger;
pub mod pretty;

/// Log levels, ordered from most to least important.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Display, EnumIter)]
pub enum Message {
    Error,
    Warning,
    Info,
    Debug,
}

impl Message {
    pub fn message_prefix(self) -> &'static str {
        match self {
            Message::Info => "INFO",
            Message::Warning => "WARN",
            Message::Error => "ERROR",
            Message::Debug => "DEBUG",
        }
    }

    /// The prefix highlighted for terminals. Files get the plain prefix.
    pub fn colored_prefix(self) -> ColoredString {
        let prefix = self.message_prefix();
        match self {
            Message::Info => prefix.green(),
            Message::Warning => prefix.yellow(),
            Message::Error => prefix.red().bold(),
            Message::Debug => prefix.dimmed(),
        }
    }
}
