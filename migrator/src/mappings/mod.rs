//! v4 resource model mappings.
//!
//! A mapping names a resource model and lists its nodes with their
//! datatypes. Mappings come from `.zip` archives (see [`archive`]) or from
//! already-extracted `.mapping` files, each optionally paired with a concept
//! table used to swap concept labels for UUIDs.
//!
//! ```text
//! mappings/
//! ├── Heritage Resource.zip        # Heritage Resource.mapping + _concepts.json
//! ├── Activity.mapping
//! └── Activity_concepts.json
//! ```

pub mod archive;

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ConfigError, ConfigResult};
use crate::models::Datatype;
use crate::validation::validate_mapping_document;

// =============================================================================
// Concept Table
// =============================================================================

/// Concept label → concept UUID for one resource model.
#[derive(Debug, Clone, Default)]
pub struct ConceptTable {
    labels: HashMap<String, Uuid>,
}

impl ConceptTable {
    /// Build from a `{collection: {uuid: label}}` document.
    ///
    /// Collections given as plain strings and keys that are not UUIDs are
    /// skipped.
    pub fn from_value(doc: &Value) -> Self {
        let mut labels = HashMap::new();
        let Some(collections) = doc.as_object() else {
            return Self { labels };
        };

        for (collection, concepts) in collections {
            let Some(concepts) = concepts.as_object() else {
                debug!(collection = %collection, "skipping non-object concept collection");
                continue;
            };
            for (id, label) in concepts {
                match (Uuid::parse_str(id), label.as_str()) {
                    (Ok(uuid), Some(label)) => {
                        labels.insert(label.to_string(), uuid);
                    }
                    _ => debug!(collection = %collection, key = %id, "skipping concept entry"),
                }
            }
        }

        Self { labels }
    }

    /// UUID of the concept with this preferred label.
    pub fn identifier_for(&self, label: &str) -> Option<Uuid> {
        self.labels.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

// =============================================================================
// Mapping
// =============================================================================

#[derive(Debug, Deserialize)]
struct MappingDocument {
    resource_model_name: String,
    nodes: Vec<MappingNode>,
}

#[derive(Debug, Deserialize)]
struct MappingNode {
    arches_node_name: String,
    data_type: String,
}

/// Field schema of one v4 resource model.
#[derive(Debug, Clone)]
pub struct Mapping {
    name: String,
    fields: Vec<String>,
    datatypes: HashMap<String, Datatype>,
    concepts: ConceptTable,
    raw: Value,
}

impl Mapping {
    /// Parse a mapping document. Unknown datatypes are rejected here.
    pub fn from_value(raw: Value) -> ConfigResult<Self> {
        let doc: MappingDocument =
            serde_json::from_value(raw.clone()).map_err(|e| ConfigError::InvalidMapping {
                path: PathBuf::new(),
                errors: vec![e.to_string()],
            })?;

        check_model_name(&doc.resource_model_name).map_err(|message| ConfigError::InvalidMapping {
            path: PathBuf::new(),
            errors: vec![message],
        })?;

        let mut fields = Vec::with_capacity(doc.nodes.len());
        let mut datatypes = HashMap::with_capacity(doc.nodes.len());
        for node in doc.nodes {
            let datatype: Datatype =
                node.data_type
                    .parse()
                    .map_err(|datatype| ConfigError::UnknownDatatype {
                        model: doc.resource_model_name.clone(),
                        field: node.arches_node_name.clone(),
                        datatype,
                    })?;
            if datatypes.insert(node.arches_node_name.clone(), datatype).is_none() {
                fields.push(node.arches_node_name);
            }
        }

        Ok(Self {
            name: doc.resource_model_name,
            fields,
            datatypes,
            concepts: ConceptTable::default(),
            raw,
        })
    }

    /// Attach the model's concept table.
    pub fn with_concepts(mut self, concepts: ConceptTable) -> Self {
        self.concepts = concepts;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field names in declared order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn datatype(&self, field: &str) -> Option<Datatype> {
        self.datatypes.get(field).copied()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.datatypes.contains_key(field)
    }

    pub fn concepts(&self) -> &ConceptTable {
        &self.concepts
    }

    /// The document as loaded, for the passthrough `.mapping` output.
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

/// The model name becomes `<name>.csv` and `<name>.mapping` in the output
/// directory, so it must be a single plain path component.
fn check_model_name(name: &str) -> Result<(), String> {
    let unsafe_name = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if unsafe_name {
        Err(format!("resource_model_name '{name}' is not usable as a file name"))
    } else {
        Ok(())
    }
}

// =============================================================================
// Mapping Store
// =============================================================================

/// Every loaded mapping, keyed by resource model name.
#[derive(Debug, Clone, Default)]
pub struct MappingStore {
    models: BTreeMap<String, Mapping>,
}

impl MappingStore {
    /// Load all `.zip` archives and loose `.mapping` files in `dir`.
    pub fn load_dir(dir: impl AsRef<Path>) -> ConfigResult<Self> {
        let dir = dir.as_ref();
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|e| ConfigError::io(dir, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        paths.sort();

        let mut store = Self::default();
        for path in paths {
            let (raw, concepts) = match path.extension().and_then(|e| e.to_str()) {
                Some("zip") => {
                    let contents = archive::read_archive(&path)?;
                    (contents.mapping, contents.concepts)
                }
                Some("mapping") => (read_json(&path)?, read_sibling_concepts(&path)?),
                _ => continue,
            };

            let mapping = load_mapping(&path, raw, concepts)?;
            debug!(
                model = mapping.name(),
                fields = mapping.fields().len(),
                concepts = mapping.concepts().len(),
                path = %path.display(),
                "loaded mapping"
            );
            store.insert(mapping);
        }

        if store.is_empty() {
            return Err(ConfigError::NoMappings(dir.to_path_buf()));
        }
        info!(count = store.len(), dir = %dir.display(), "mappings loaded");
        Ok(store)
    }

    pub fn insert(&mut self, mapping: Mapping) {
        let name = mapping.name().to_string();
        if self.models.insert(name.clone(), mapping).is_some() {
            warn!(model = %name, "duplicate mapping, keeping the last one loaded");
        }
    }

    pub fn get(&self, name: &str) -> Option<&Mapping> {
        self.models.get(name)
    }

    /// Model names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.models.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

fn load_mapping(path: &Path, raw: Value, concepts: Option<Value>) -> ConfigResult<Mapping> {
    validate_mapping_document(&raw).map_err(|errors| ConfigError::InvalidMapping {
        path: path.to_path_buf(),
        errors,
    })?;
    let mapping = Mapping::from_value(raw).map_err(|err| match err {
        ConfigError::InvalidMapping { errors, .. } => ConfigError::InvalidMapping {
            path: path.to_path_buf(),
            errors,
        },
        other => other,
    })?;
    Ok(match concepts {
        Some(doc) => mapping.with_concepts(ConceptTable::from_value(&doc)),
        None => mapping,
    })
}

fn read_json(path: &Path) -> ConfigResult<Value> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| ConfigError::json(path, e))
}

fn read_sibling_concepts(mapping_path: &Path) -> ConfigResult<Option<Value>> {
    let stem = mapping_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let path = mapping_path.with_file_name(format!("{stem}_concepts.json"));
    if path.is_file() {
        read_json(&path).map(Some)
    } else {
        Ok(None)
    }
}
