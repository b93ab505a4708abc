//! Transformation module.
//!
//! This module turns v3 resources into v4 rows:
//! - Flatten: entity tree to data leaves
//! - Resolver + Matcher: old field ids to v4 field names
//! - Formatter: per-datatype value rules
//! - Condenser: fields to CSV rows
//! - Pipeline: per-model driver

pub mod condenser;
pub mod flatten;
pub mod formatter;
pub mod matcher;
pub mod pipeline;
pub mod resolver;

pub use condenser::condense;
pub use flatten::flatten;
pub use formatter::DatatypeFormatter;
pub use matcher::{normalize_identifier, similarity, ExactMatcher, FuzzyMatcher, Match, Matcher};
pub use pipeline::*;
pub use resolver::{resolve_model, FieldNameResolver, Resolution, ResolutionMethod};
