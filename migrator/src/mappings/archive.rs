//! Reading `.zip` mapping archives exported by the v4 resource designer.
//!
//! An archive `<name>.zip` holds `<name>.mapping` and, usually,
//! `<name>_concepts.json`. When the entry names do not follow the archive
//! name, the first entry with the right suffix is used.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::Value;
use zip::ZipArchive;

use crate::error::{ConfigError, ConfigResult};

const MAPPING_SUFFIX: &str = ".mapping";
const CONCEPTS_SUFFIX: &str = "_concepts.json";

/// Raw documents read from one archive.
#[derive(Debug, Clone)]
pub struct ArchiveContents {
    pub mapping: Value,
    pub concepts: Option<Value>,
}

/// Read the mapping (required) and concept table (optional) of an archive.
pub fn read_archive(path: &Path) -> ConfigResult<ArchiveContents> {
    let file = File::open(path).map_err(|e| ConfigError::io(path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| ConfigError::archive(path, e.to_string()))?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    let mapping_entry = entry_name(&archive, &format!("{stem}{MAPPING_SUFFIX}"), MAPPING_SUFFIX)
        .ok_or_else(|| ConfigError::archive(path, "no .mapping entry"))?;
    let mapping = read_json_entry(&mut archive, &mapping_entry, path)?;

    let concepts = match entry_name(&archive, &format!("{stem}{CONCEPTS_SUFFIX}"), CONCEPTS_SUFFIX) {
        Some(name) => Some(read_json_entry(&mut archive, &name, path)?),
        None => None,
    };

    Ok(ArchiveContents { mapping, concepts })
}

fn entry_name(archive: &ZipArchive<File>, preferred: &str, suffix: &str) -> Option<String> {
    let mut fallback = None;
    for name in archive.file_names() {
        if name == preferred {
            return Some(name.to_string());
        }
        if fallback.is_none() && name.ends_with(suffix) {
            fallback = Some(name.to_string());
        }
    }
    fallback
}

fn read_json_entry(archive: &mut ZipArchive<File>, name: &str, path: &Path) -> ConfigResult<Value> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| ConfigError::archive(path, format!("{name}: {e}")))?;
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| ConfigError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| ConfigError::json(path.join(name), e))
}
