//! Domain models for the migration pipeline.
//!
//! - [`SourceExport`] / [`SourceResource`] / [`ChildEntity`] - the v3 export
//! - [`Datatype`] - v4 field datatypes the formatter understands
//! - [`FlatField`] - one (old field id, raw value) leaf of a resource
//! - [`FieldValue`] - one (new field id, formatted value) pair
//! - [`OutputRow`] - one flat CSV record for the v4 importer

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Name of the identifier column that leads every v4 CSV.
pub const RESOURCE_ID_COLUMN: &str = "ResourceID";

// =============================================================================
// v3 Export
// =============================================================================

/// Top-level v3 JSON export document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceExport {
    pub resources: Vec<SourceResource>,
}

/// One v3 resource: an identifier plus its tree of child entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceResource {
    /// Source resource type, e.g. `HERITAGE_RESOURCE.E18`.
    #[serde(rename = "entitytypeid")]
    pub entity_type_id: String,

    /// Resource identifier, carried into the `ResourceID` column.
    #[serde(rename = "entityid")]
    pub entity_id: String,

    #[serde(rename = "child_entities", default)]
    pub children: Vec<ChildEntity>,
}

/// A node of a resource tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildEntity {
    /// Old field identifier, e.g. `NAME.E41`.
    #[serde(rename = "entitytypeid")]
    pub entity_type_id: String,

    /// Raw value as text. Numbers and booleans keep their JSON spelling.
    #[serde(default, deserialize_with = "value_as_text")]
    pub value: String,

    /// Backing table; empty or missing for structural nodes.
    #[serde(rename = "businesstablename", default)]
    pub business_table: Option<String>,

    #[serde(rename = "child_entities", default)]
    pub children: Vec<ChildEntity>,
}

impl ChildEntity {
    /// Structural nodes only group other nodes and carry no data.
    pub fn is_structural(&self) -> bool {
        self.business_table.as_deref().map_or(true, str::is_empty)
    }
}

fn value_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

// =============================================================================
// Datatypes
// =============================================================================

/// v4 node datatypes with a formatting rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Datatype {
    String,
    Number,
    Date,
    GeojsonFeatureCollection,
    Concept,
    ConceptList,
    DomainValue,
    DomainValueList,
    FileList,
}

impl Datatype {
    /// Every supported datatype.
    pub const ALL: [Datatype; 9] = [
        Datatype::String,
        Datatype::Number,
        Datatype::Date,
        Datatype::GeojsonFeatureCollection,
        Datatype::Concept,
        Datatype::ConceptList,
        Datatype::DomainValue,
        Datatype::DomainValueList,
        Datatype::FileList,
    ];

    /// Name as written in mapping files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Datatype::String => "string",
            Datatype::Number => "number",
            Datatype::Date => "date",
            Datatype::GeojsonFeatureCollection => "geojson-feature-collection",
            Datatype::Concept => "concept",
            Datatype::ConceptList => "concept-list",
            Datatype::DomainValue => "domain-value",
            Datatype::DomainValueList => "domain-value-list",
            Datatype::FileList => "file-list",
        }
    }

    /// Single-concept datatypes, whose values may be swapped for concept UUIDs.
    pub fn is_concept(&self) -> bool {
        matches!(self, Datatype::Concept | Datatype::DomainValue)
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Datatype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Datatype::ALL
            .iter()
            .copied()
            .find(|dt| dt.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

// =============================================================================
// Pipeline Values
// =============================================================================

/// One data leaf of a flattened resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatField {
    pub old_id: String,
    pub value: String,
}

/// A renamed, formatted field ready for condensing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    pub field: String,
    pub value: String,
}

impl FieldValue {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// One CSV record. Holds at most one value per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    pub resource_id: String,
    values: HashMap<String, String>,
}

impl OutputRow {
    /// Row holding only the resource identifier.
    pub fn new(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            values: HashMap::new(),
        }
    }

    /// Whether this row already has a value for `field`.
    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Value for a field column, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Cell text for a CSV column, including the identifier column.
    pub fn cell(&self, column: &str) -> &str {
        if column == RESOURCE_ID_COLUMN {
            &self.resource_id
        } else {
            self.get(column).unwrap_or("")
        }
    }

    /// Field columns carrying a value (identifier excluded).
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of field values (identifier excluded).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Callers check [`OutputRow::contains`] first; the row never overwrites.
    pub(crate) fn insert(&mut self, field: FieldValue) {
        debug_assert!(!self.contains(&field.field));
        self.values.entry(field.field).or_insert(field.value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_export() {
        let doc = json!({
            "resources": [{
                "entitytypeid": "HERITAGE_RESOURCE.E18",
                "entityid": "b3d1c2a0-0000-4000-8000-000000000001",
                "child_entities": [{
                    "entitytypeid": "NAME.E41",
                    "value": "Old Mill",
                    "businesstablename": "strings",
                    "child_entities": []
                }]
            }]
        });

        let export: SourceExport = serde_json::from_value(doc).unwrap();
        let resource = &export.resources[0];
        assert_eq!(resource.entity_type_id, "HERITAGE_RESOURCE.E18");
        assert_eq!(resource.children[0].value, "Old Mill");
        assert!(!resource.children[0].is_structural());
    }

    #[test]
    fn test_value_as_text() {
        let child: ChildEntity = serde_json::from_value(json!({
            "entitytypeid": "HEIGHT.E54",
            "value": 12.5,
            "businesstablename": "numbers"
        }))
        .unwrap();
        assert_eq!(child.value, "12.5");

        let child: ChildEntity = serde_json::from_value(json!({
            "entitytypeid": "PHASE.E55",
            "value": null,
            "businesstablename": null
        }))
        .unwrap();
        assert_eq!(child.value, "");
        assert!(child.is_structural());
    }

    #[test]
    fn test_datatype_names() {
        for dt in Datatype::ALL {
            assert_eq!(dt.as_str().parse::<Datatype>(), Ok(dt));
        }
        assert_eq!("edtf".parse::<Datatype>(), Err("edtf".to_string()));
        assert_eq!(
            serde_json::to_value(Datatype::GeojsonFeatureCollection).unwrap(),
            json!("geojson-feature-collection")
        );
    }

    #[test]
    fn test_row_cells() {
        let mut row = OutputRow::new("r1");
        row.insert(FieldValue::new("Name", "Old Mill"));

        assert_eq!(row.cell(RESOURCE_ID_COLUMN), "r1");
        assert_eq!(row.cell("Name"), "Old Mill");
        assert_eq!(row.cell("Address"), "");
        assert!(row.contains("Name"));
        assert_eq!(row.len(), 1);
    }
}
