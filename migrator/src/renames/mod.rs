//! Rename tables ("graph diffs") - old field id → new field id.
//!
//! Each table is a flat JSON object produced by an external graph-diff tool:
//!
//! ```json
//! {
//!     "NAME.E41": "Resource Name",
//!     "ADDRESS_LINE.E45": null
//! }
//! ```
//!
//! A string is an explicit rename, `null` asks for a fuzzy match against the
//! model's fields, and a missing key marks a field removed in v4.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::transform::matcher::{Match, Matcher};

/// What a rename table says about one old field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rename<'a> {
    /// Use this v4 field name as-is.
    Explicit(&'a str),
    /// Derive the v4 name by fuzzy matching.
    Derive,
}

/// Renames for one source resource type.
#[derive(Debug, Clone, Default)]
pub struct RenameTable {
    name: String,
    entries: HashMap<String, Option<String>>,
}

impl RenameTable {
    /// Build a table from `(old id, new id or None)` pairs.
    pub fn new(
        name: impl Into<String>,
        entries: impl IntoIterator<Item = (String, Option<String>)>,
    ) -> Self {
        Self {
            name: name.into(),
            entries: entries.into_iter().collect(),
        }
    }

    /// Load a table from a JSON file; the file stem becomes the table name.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let entries: HashMap<String, Option<String>> =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidRenameTable {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(Self { name, entries })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` when the old field is unknown (dropped between versions).
    pub fn lookup(&self, old_id: &str) -> Option<Rename<'_>> {
        self.entries.get(old_id).map(|entry| match entry {
            Some(new_id) => Rename::Explicit(new_id),
            None => Rename::Derive,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All rename tables of a run, keyed by file stem.
#[derive(Debug, Clone, Default)]
pub struct RenameRegistry {
    dir: PathBuf,
    tables: BTreeMap<String, RenameTable>,
}

impl RenameRegistry {
    /// Load every `*.json` file in `dir`.
    pub fn load_dir(dir: impl AsRef<Path>) -> ConfigResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        let entries = fs::read_dir(&dir).map_err(|e| ConfigError::io(&dir, e))?;

        let mut registry = Self {
            dir: dir.clone(),
            tables: BTreeMap::new(),
        };

        for entry in entries {
            let path = entry.map_err(|e| ConfigError::io(&dir, e))?.path();
            if path.extension().is_some_and(|e| e == "json") {
                let table = RenameTable::from_file(&path)?;
                debug!(table = table.name(), entries = table.len(), "loaded rename table");
                registry.insert(table);
            }
        }

        if registry.tables.is_empty() {
            return Err(ConfigError::NoRenameTables(dir));
        }
        info!(count = registry.tables.len(), dir = %registry.dir.display(), "rename tables loaded");
        Ok(registry)
    }

    pub fn insert(&mut self, table: RenameTable) {
        self.tables.insert(table.name().to_string(), table);
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Pick the table for a source type.
    ///
    /// A table named after the source type (case-insensitive) wins outright;
    /// otherwise the table whose name best matches the target model name.
    pub fn table_for(
        &self,
        source_type: &str,
        model: &str,
        matcher: &dyn Matcher,
    ) -> Option<(&RenameTable, u8)> {
        if let Some(table) = self
            .tables
            .values()
            .find(|t| t.name().eq_ignore_ascii_case(source_type))
        {
            return Some((table, 100));
        }

        let names: Vec<String> = self.tables.keys().cloned().collect();
        let Match { choice, score } = matcher.best_match(model, &names)?;
        self.tables.get(choice).map(|table| (table, score))
    }
}
