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
//! Durable storage of variant records. A store only knows about opaque bytes under a name;
//! encoding and validation live in [`VariantDefinition`](crate::variant::VariantDefinition).

use crate::output::logger::Logger;
use crate::variant::classic::{classic, CLASSIC_NAME};
use crate::variant::VariantError;
use crate::variant::VariantError::VariantNotFound;
use std::collections::BTreeMap;
use std::fmt::{Debug, Write};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const EXTENSION: &str = "json";

/// Named records, one per variant. Implementations must be usable from several threads.
pub trait VariantStore: Debug + Send + Sync {
    /// Creates or overwrites the record `name`.
    fn write(&self, name: &str, record: &[u8]) -> Result<(), VariantError>;

    fn read(&self, name: &str) -> Result<Vec<u8>, VariantError>;

    /// All stored names, sorted.
    fn names(&self) -> Result<Vec<String>, VariantError>;

    fn remove(&self, name: &str) -> Result<(), VariantError>;

    fn contains(&self, name: &str) -> Result<bool, VariantError> {
        Ok(self.names()?.iter().any(|n| n == name))
    }
}

fn is_plain(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b' ' | b'_' | b'-')
}

/// Turns a variant name into a file stem. Every byte outside `[A-Za-z0-9 _-]` is percent-encoded,
/// so distinct names never share a file and the name can be recovered from the stem.
pub fn sanitize_name(name: &str) -> String {
    let mut res = String::with_capacity(name.len());
    for byte in name.bytes() {
        if is_plain(byte) {
            res.push(byte as char);
        } else {
            // writing to a String can't fail
            _ = write!(res, "%{byte:02X}");
        }
    }
    res
}

/// Inverse of [`sanitize_name`]. Returns `None` for stems that [`sanitize_name`] can't produce.
pub fn unsanitize_name(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let mut res = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = stem.get(i + 1..i + 3).filter(|h| h.bytes().all(|b| b.is_ascii_hexdigit()))?;
            res.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else if is_plain(bytes[i]) {
            res.push(bytes[i]);
            i += 1;
        } else {
            return None;
        }
    }
    String::from_utf8(res).ok()
}

/// Stores each variant as `<sanitized name>.json` in a directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    logger: Logger,
}

impl FileStore {
    /// Opens the store in `dir`, creating the directory if needed.
    pub fn open(dir: &Path, logger: Logger) -> Result<Self, VariantError> {
        fs::create_dir_all(dir)?;
        logger.debug(&format!("Using the variant store in '{}'", dir.display()));
        Ok(Self { dir: dir.to_path_buf(), logger })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{EXTENSION}", sanitize_name(name)))
    }
}

impl VariantStore for FileStore {
    fn write(&self, name: &str, record: &[u8]) -> Result<(), VariantError> {
        let path = self.path_of(name);
        if path.exists() {
            self.logger.info(&format!("Overwriting the stored variant '{name}'"));
        }
        // readers never see a partially written record
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, record)?;
        fs::rename(&tmp, &path)?;
        self.logger.debug(&format!("Saved variant '{name}' to '{}'", path.display()));
        Ok(())
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, VariantError> {
        fs::read(self.path_of(name)).map_err(|err| match err.kind() {
            ErrorKind::NotFound => VariantNotFound { name: name.to_string() },
            _ => err.into(),
        })
    }

    fn names(&self) -> Result<Vec<String>, VariantError> {
        let mut names = vec![];
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()).and_then(unsanitize_name) {
                Some(name) => names.push(name),
                None => self.logger.warning(&format!("Ignoring the unexpected file '{}'", path.display())),
            }
        }
        names.sort();
        Ok(names)
    }

    fn remove(&self, name: &str) -> Result<(), VariantError> {
        fs::remove_file(self.path_of(name)).map_err(|err| match err.kind() {
            ErrorKind::NotFound => VariantNotFound { name: name.to_string() },
            _ => err.into(),
        })?;
        self.logger.info(&format!("Deleted the variant '{name}'"));
        Ok(())
    }
}

/// A store that lives only as long as the process, for tests and throwaway games.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    fn records(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl VariantStore for MemoryStore {
    fn write(&self, name: &str, record: &[u8]) -> Result<(), VariantError> {
        self.records().insert(name.to_string(), record.to_vec());
        Ok(())
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, VariantError> {
        self.records().get(name).cloned().ok_or_else(|| VariantNotFound { name: name.to_string() })
    }

    fn names(&self) -> Result<Vec<String>, VariantError> {
        Ok(self.records().keys().cloned().collect())
    }

    fn remove(&self, name: &str) -> Result<(), VariantError> {
        self.records().remove(name).map(|_| ()).ok_or_else(|| VariantNotFound { name: name.to_string() })
    }
}

/// Lists all stored variant names. If the classic variant is missing, it is created first,
/// so it is always available.
pub fn available_variants(store: &dyn VariantStore, logger: &Logger) -> Result<Vec<String>, VariantError> {
    let names = store.names()?;
    if names.iter().any(|n| n == CLASSIC_NAME) {
        return Ok(names);
    }
    logger.info(&format!("There is no '{CLASSIC_NAME}' variant yet, creating it"));
    classic()?.save(store)?;
    store.names()
}
