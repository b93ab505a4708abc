//! Output files for the v4 importer.
//!
//! - `<model>.csv` - `ResourceID` then the model's declared fields
//! - `<model>.mapping` - the mapping document, 4-space indent, keys sorted
//!
//! Files are written to a temp file next to the target and renamed into
//! place, so an interrupted run never leaves a truncated file behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::error::{OutputError, OutputResult};
use crate::mappings::Mapping;
use crate::models::{OutputRow, RESOURCE_ID_COLUMN};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSV header: identifier column, then declared field order.
pub fn csv_header(mapping: &Mapping) -> Vec<&str> {
    std::iter::once(RESOURCE_ID_COLUMN)
        .chain(mapping.fields().iter().map(String::as_str))
        .collect()
}

/// Write `<model>.csv` into `dir`.
pub fn write_model_csv(
    dir: &Path,
    mapping: &Mapping,
    rows: &[OutputRow],
    bom: bool,
) -> OutputResult<PathBuf> {
    let header = csv_header(mapping);
    let path = dir.join(format!("{}.csv", mapping.name()));

    write_atomically(dir, &path, |file| {
        if bom {
            file.write_all(UTF8_BOM)?;
        }
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(&header)?;
        for row in rows {
            writer.write_record(header.iter().map(|column| row.cell(column)))?;
        }
        writer.flush()?;
        Ok(())
    })?;

    Ok(path)
}

/// Write `<model>.mapping` into `dir`.
pub fn write_mapping(dir: &Path, mapping: &Mapping) -> OutputResult<PathBuf> {
    let path = dir.join(format!("{}.mapping", mapping.name()));
    let sorted = sort_keys(mapping.raw());

    write_atomically(dir, &path, |file| {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut *file, formatter);
        sorted.serialize(&mut serializer)?;
        file.write_all(b"\n")?;
        Ok(())
    })?;

    Ok(path)
}

fn write_atomically<F>(dir: &Path, path: &Path, write: F) -> OutputResult<()>
where
    F: FnOnce(&mut fs::File) -> OutputResult<()>,
{
    let mut tmp = NamedTempFile::new_in(dir)?;
    write(tmp.as_file_mut())?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|e| OutputError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

/// Recursively rebuild objects with keys in sorted order.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_keys(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
