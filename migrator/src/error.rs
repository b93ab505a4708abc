//! Error types for the migration pipeline.
//!
//! One enum per layer, converted upward with `From` so `?` works across
//! boundaries:
//!
//! - [`SourceError`] - reading, decoding and validating the v3 export
//! - [`ConfigError`] - mappings, rename tables and model resolution (fatal)
//! - [`FormatError`] - a single value that cannot be formatted (skipped)
//! - [`OutputError`] - writing CSV and mapping files
//! - [`ModelError`] - failure of one resource model (isolated)
//! - [`MigrationError`] - top-level run errors

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Source Errors
// =============================================================================

/// Errors while reading the v3 JSON export.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to read file.
    #[error("Failed to read source export: {0}")]
    Io(#[from] std::io::Error),

    /// Bytes could not be decoded as text.
    #[error("Failed to decode source export: {0}")]
    Encoding(String),

    /// Not a JSON document.
    #[error("Invalid source JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON document does not have the v3 export shape.
    #[error("Source export does not match the v3 export schema: {}", .errors.join("; "))]
    Schema { errors: Vec<String> },
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Fatal configuration errors. Any of these aborts the whole run.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Mapping directory holds no usable mapping.
    #[error("No mapping files found in {}", .0.display())]
    NoMappings(PathBuf),

    /// Mapping document failed schema validation.
    #[error("Invalid mapping {}: {}", .path.display(), .errors.join("; "))]
    InvalidMapping { path: PathBuf, errors: Vec<String> },

    /// Mapping declares a datatype the formatter does not know.
    #[error("Unknown datatype '{datatype}' for field '{field}' in resource model '{model}'")]
    UnknownDatatype {
        model: String,
        field: String,
        datatype: String,
    },

    /// Archive could not be opened or lacks its mapping entry.
    #[error("Mapping archive {}: {message}", .path.display())]
    Archive { path: PathBuf, message: String },

    /// Resolved resource model has no loaded mapping.
    #[error("No mapping loaded for resource model '{0}'")]
    MissingMapping(String),

    /// Model filter names a model that is not loaded.
    #[error("Unknown resource model '{name}' (loaded: {})", .available.join(", "))]
    UnknownModel { name: String, available: Vec<String> },

    /// Source resource type could not be paired with any model.
    #[error("Cannot resolve a resource model for source type '{0}'")]
    UnresolvedResourceType(String),

    /// Rename table directory holds no table.
    #[error("No rename tables found in {}", .0.display())]
    NoRenameTables(PathBuf),

    /// Rename table is not a flat object of strings or nulls.
    #[error("Invalid rename table {}: {message}", .path.display())]
    InvalidRenameTable { path: PathBuf, message: String },

    /// No rename table could be selected for a source type.
    #[error("No rename table for source type '{source_type}' (model '{model}')")]
    MissingRenameTable { source_type: String, model: String },

    /// IO error while loading configuration files.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON error while loading configuration files.
    #[error("JSON error in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Create an Io error tagged with the offending path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a Json error tagged with the offending path.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        ConfigError::Json {
            path: path.into(),
            source,
        }
    }

    /// Create an Archive error.
    pub fn archive(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::Archive {
            path: path.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Format Errors
// =============================================================================

/// A raw value that does not fit its declared datatype.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Date is neither empty nor `YYYY-MM-DDTHH:MM:SS`.
    #[error("Invalid date '{0}': expected YYYY-MM-DDTHH:MM:SS")]
    InvalidDate(String),
}

// =============================================================================
// Output Errors
// =============================================================================

/// Errors while writing a model's output files.
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error.
    #[error("Output IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON write error: {0}")]
    Json(#[from] serde_json::Error),

    /// Temp file could not be moved into place.
    #[error("Failed to persist {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// Model Errors
// =============================================================================

/// Failure of one resource model. Other models keep going.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Writing failed.
    #[error(transparent)]
    Output(#[from] OutputError),

    /// A row carries a column outside the model schema.
    #[error("Column check failed: {}", .0.join("; "))]
    Columns(Vec<String>),
}

// =============================================================================
// Migration Errors (top-level)
// =============================================================================

/// Top-level errors returned by [`crate::transform::pipeline::MigrationDriver`].
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Source export error.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Output directory could not be prepared.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for output operations.
pub type OutputResult<T> = Result<T, OutputError>;

/// Result type for a whole migration run.
pub type MigrationResult<T> = Result<T, MigrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let config_err = ConfigError::MissingMapping("Heritage Resource".into());
        let migration_err: MigrationError = config_err.into();
        assert!(migration_err.to_string().contains("Heritage Resource"));

        let source_err = SourceError::Schema {
            errors: vec!["missing resources".into()],
        };
        let migration_err: MigrationError = source_err.into();
        assert!(migration_err.to_string().contains("missing resources"));
    }

    #[test]
    fn test_unknown_datatype_format() {
        let err = ConfigError::UnknownDatatype {
            model: "Activity".into(),
            field: "Name".into(),
            datatype: "edtf".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("edtf"));
        assert!(msg.contains("'Name'"));
        assert!(msg.contains("'Activity'"));
    }

    #[test]
    fn test_unknown_model_lists_available() {
        let err = ConfigError::UnknownModel {
            name: "Ships".into(),
            available: vec!["Activity".into(), "Heritage Resource".into()],
        };
        assert!(err.to_string().contains("Activity, Heritage Resource"));
    }

    #[test]
    fn test_model_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: ModelError = OutputError::from(io).into();
        assert!(err.to_string().contains("disk full"));
    }
}
