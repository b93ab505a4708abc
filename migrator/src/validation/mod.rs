//! Input and output checks.
//!
//! # Input documents
//!
//! JSON Schema Draft 7 validation, schemas embedded at compile time from
//! `schemas/`:
//! - `v3-export.json` - the v3 resource export
//! - `v4-mapping.json` - one resource model mapping
//!
//! # Output rows
//!
//! The v4 import format is only checked for column presence: every column
//! of every row must be the identifier or a field declared by the model.
//!
//! ```rust,ignore
//! use serde_json::json;
//! use arches_migrate::validation::validate_mapping_document;
//!
//! let doc = json!({"resource_model_name": "Activity", "nodes": []});
//! assert!(validate_mapping_document(&doc).is_ok());
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::mappings::Mapping;
use crate::models::OutputRow;

static V3_EXPORT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/v3-export.json"))
        .expect("Invalid embedded schema")
});

static V4_MAPPING_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/v4-mapping.json"))
        .expect("Invalid embedded schema")
});

/// Validate a JSON document against a schema.
///
/// Returns every validation error as text.
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick true/false check.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate a v3 export document.
pub fn validate_source_export(data: &Value) -> Result<(), Vec<String>> {
    validate(&V3_EXPORT_SCHEMA, data)
}

/// Validate a v4 mapping document.
pub fn validate_mapping_document(data: &Value) -> Result<(), Vec<String>> {
    validate(&V4_MAPPING_SCHEMA, data)
}

/// Every column of every row must be declared by the model.
pub fn check_columns(mapping: &Mapping, rows: &[OutputRow]) -> Result<(), Vec<String>> {
    let errors: Vec<String> = rows
        .iter()
        .flat_map(|row| {
            row.fields()
                .filter(|field| !mapping.has_field(field))
                .map(move |field| {
                    format!(
                        "resource {}: column '{}' is not declared by '{}'",
                        row.resource_id,
                        field,
                        mapping.name()
                    )
                })
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
