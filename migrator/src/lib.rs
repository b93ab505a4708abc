//! # arches-migrate - Arches v3 to v4 resource migration
//!
//! Reads a v3 JSON resource export and writes, for every v4 resource model,
//! a bulk-import CSV plus the model's `.mapping` file.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  v3 export  │────▶│   Parser    │────▶│  Transform  │────▶│  <model>    │
//! │   (JSON)    │     │  (auto-enc) │     │ (per model) │     │ .csv/.mapping│
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                                ▲
//!                           mappings/*.zip ──────┤
//!                  resources/graphdiffs/*.json ──┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use arches_migrate::{parse_source_file, MigrationDriver, MigrationOptions};
//!
//! fn main() -> arches_migrate::MigrationResult<()> {
//!     let parsed = parse_source_file("export.json")?;
//!     let driver = MigrationDriver::from_options(MigrationOptions::default())?;
//!     let summary = driver.run(parsed.export.resources)?;
//!     println!("Wrote {} rows", summary.total_rows());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - v3 entities, v4 datatypes and output rows
//! - [`parser`] - Export reading with encoding detection
//! - [`mappings`] - v4 mapping archives and concept tables
//! - [`renames`] - Graph-diff rename tables
//! - [`transform`] - Flatten, resolve, format, condense, drive
//! - [`validation`] - JSON schema and column checks
//! - [`output`] - Atomic CSV and mapping writers
//! - [`config`] - Run options

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Inputs
pub mod mappings;
pub mod parser;
pub mod renames;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// Outputs
pub mod output;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{
    ConfigError,
    FormatError,
    MigrationError,
    MigrationResult,
    ModelError,
    OutputError,
    SourceError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    ChildEntity,
    Datatype,
    FieldValue,
    FlatField,
    OutputRow,
    SourceExport,
    SourceResource,
    RESOURCE_ID_COLUMN,
};

// =============================================================================
// Re-exports - Config
// =============================================================================

pub use config::{MatchStrategy, MigrationOptions};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode_content,
    detect_encoding,
    parse_source_bytes,
    parse_source_file,
    parse_source_str,
    ParseResult,
};

// =============================================================================
// Re-exports - Inputs
// =============================================================================

pub use mappings::{ConceptTable, Mapping, MappingStore};
pub use renames::{Rename, RenameRegistry, RenameTable};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    MigrationDriver,
    ModelReport,
    ModelState,
    ResourceOutcome,
    RunSummary,
};

// =============================================================================
// Re-exports - Validation & Output
// =============================================================================

pub use validation::{check_columns, is_valid, validate};
pub use output::{csv_header, write_mapping, write_model_csv};
