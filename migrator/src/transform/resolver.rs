//! Old field id → new field id, and source type → resource model.
//!
//! Field names resolve in two tiers:
//!
//! 1. The rename table says explicitly → that name, verbatim.
//! 2. The rename table says "derive" → the model field that best matches the
//!    normalized old id (`ADDRESS_LINE.E45` → `Address Line`).
//!
//! Ids absent from the rename table were removed in v4 and resolve to
//! nothing. Every resolution carries its score so weak guesses can be
//! logged.
//!
//! A resolver serves one (rename table, model) pair, so derived matches are
//! memoized per old id for the resolver's lifetime.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::mappings::Mapping;
use crate::renames::{Rename, RenameTable};
use crate::transform::matcher::{normalize_identifier, Matcher};

/// How a name was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionMethod {
    Explicit,
    Derived,
}

/// A resolved name and the confidence behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub name: String,
    pub score: u8,
    pub method: ResolutionMethod,
}

/// Field-name resolver for one (source type, resource model) pair.
pub struct FieldNameResolver<'a> {
    mapping: &'a Mapping,
    table: &'a RenameTable,
    matcher: &'a dyn Matcher,
    derived: RefCell<HashMap<String, Option<Resolution>>>,
}

impl<'a> FieldNameResolver<'a> {
    pub fn new(mapping: &'a Mapping, table: &'a RenameTable, matcher: &'a dyn Matcher) -> Self {
        Self {
            mapping,
            table,
            matcher,
            derived: RefCell::new(HashMap::new()),
        }
    }

    /// `None` when the field is obsolete, or when a derived match finds no
    /// candidate at all.
    pub fn resolve(&self, old_field_id: &str) -> Option<Resolution> {
        match self.table.lookup(old_field_id)? {
            Rename::Explicit(name) => Some(Resolution {
                name: name.to_string(),
                score: 100,
                method: ResolutionMethod::Explicit,
            }),
            Rename::Derive => {
                if let Some(cached) = self.derived.borrow().get(old_field_id) {
                    return cached.clone();
                }
                let resolution = self.derive(old_field_id);
                self.derived
                    .borrow_mut()
                    .insert(old_field_id.to_string(), resolution.clone());
                resolution
            }
        }
    }

    fn derive(&self, old_field_id: &str) -> Option<Resolution> {
        let query = normalize_identifier(old_field_id);
        let found = self.matcher.best_match(&query, self.mapping.fields())?;
        Some(Resolution {
            name: found.choice.to_string(),
            score: found.score,
            method: ResolutionMethod::Derived,
        })
    }

    pub fn mapping(&self) -> &'a Mapping {
        self.mapping
    }
}

/// Pair a v3 resource type with the most similar loaded model name.
pub fn resolve_model(source_type: &str, models: &[String], matcher: &dyn Matcher) -> Option<Resolution> {
    let query = normalize_identifier(source_type);
    matcher.best_match(&query, models).map(|found| Resolution {
        name: found.choice.to_string(),
        score: found.score,
        method: ResolutionMethod::Derived,
    })
}
