//! Migration driver: v3 export → per-model v4 CSV + mapping files.
//!
//! ```text
//! ┌──────────────┐   ┌──────────┐   ┌─────────┐   ┌────────┐   ┌──────────┐
//! │ v3 resources │──▶│ flatten  │──▶│ resolve │──▶│ format │──▶│ condense │──▶ <model>.csv
//! │ (by type)    │   │ (leaves) │   │ (names) │   │ (dtype)│   │ (rows)   │
//! └──────────────┘   └──────────┘   └─────────┘   └────────┘   └──────────┘
//! ```
//!
//! Resources are classified by source type, each type is paired with a
//! resource model and a rename table, then models are processed one at a
//! time:
//!
//! `PENDING → LOADING_SCHEMA → PROCESSING_RESOURCES → WRITING → DONE`
//!
//! Any model may end in `FAILED` instead; the others carry on.
//!
//! Every loaded model (or only the filtered one) gets its `.mapping`
//! passthrough; a `.csv` is written only for models that received resources.
//!
//! Values that do not fit their datatype are skipped with a warning and
//! counted in the model report.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, error, info, info_span, warn};

use super::condenser::condense;
use super::flatten::flatten;
use super::formatter::DatatypeFormatter;
use super::matcher::Matcher;
use super::resolver::{resolve_model, FieldNameResolver, ResolutionMethod};
use crate::config::MigrationOptions;
use crate::error::{ConfigError, MigrationResult, ModelError};
use crate::mappings::{Mapping, MappingStore};
use crate::models::{FieldValue, OutputRow, SourceResource};
use crate::output::{write_mapping, write_model_csv};
use crate::renames::{RenameRegistry, RenameTable};
use crate::validation::check_columns;

// =============================================================================
// Model State
// =============================================================================

/// Lifecycle of one resource model within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelState {
    Pending,
    LoadingSchema,
    ProcessingResources,
    Writing,
    Done,
    Failed,
}

impl fmt::Display for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelState::Pending => "PENDING",
            ModelState::LoadingSchema => "LOADING_SCHEMA",
            ModelState::ProcessingResources => "PROCESSING_RESOURCES",
            ModelState::Writing => "WRITING",
            ModelState::Done => "DONE",
            ModelState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Reports
// =============================================================================

/// Outcome of one resource model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelReport {
    pub model: String,
    pub state: ModelState,
    /// Source types that resolved to this model
    pub source_types: Vec<String>,
    pub resources: usize,
    pub rows: usize,
    /// Fields absent from the rename table or outside the model schema
    pub dropped_fields: usize,
    /// Values skipped because they did not fit their datatype
    pub format_errors: usize,
    pub csv_path: Option<PathBuf>,
    pub mapping_path: Option<PathBuf>,
    pub error: Option<String>,
}

impl ModelReport {
    fn new(model: &str, source_types: Vec<String>) -> Self {
        Self {
            model: model.to_string(),
            state: ModelState::Pending,
            source_types,
            resources: 0,
            rows: 0,
            dropped_fields: 0,
            format_errors: 0,
            csv_path: None,
            mapping_path: None,
            error: None,
        }
    }

    fn advance(&mut self, next: ModelState) {
        debug!(model = %self.model, from = %self.state, to = %next, "model state");
        self.state = next;
    }

    fn fail(&mut self, err: &ModelError) {
        error!(model = %self.model, state = %self.state, error = %err, "model failed");
        self.error = Some(err.to_string());
        self.state = ModelState::Failed;
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub models: Vec<ModelReport>,
}

impl RunSummary {
    pub fn succeeded(&self) -> impl Iterator<Item = &ModelReport> {
        self.models.iter().filter(|m| m.state == ModelState::Done)
    }

    pub fn failed(&self) -> impl Iterator<Item = &ModelReport> {
        self.models.iter().filter(|m| m.state == ModelState::Failed)
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }

    pub fn total_rows(&self) -> usize {
        self.models.iter().map(|m| m.rows).sum()
    }
}

/// What one resource contributed.
#[derive(Debug, Clone)]
pub struct ResourceOutcome {
    pub rows: Vec<OutputRow>,
    pub dropped_fields: usize,
    pub format_errors: usize,
}

// =============================================================================
// Plan
// =============================================================================

/// Resources of one source type, with the rename table chosen for it.
struct SourceGroup<'a> {
    source_type: String,
    table: &'a RenameTable,
    resources: Vec<SourceResource>,
}

/// Everything one model needs; consumed while processing.
struct ModelPlan<'a> {
    mapping: &'a Mapping,
    groups: Vec<SourceGroup<'a>>,
}

/// Rows of one model, held until written.
#[derive(Default)]
struct ModelAccumulator {
    rows: Vec<OutputRow>,
}

// =============================================================================
// Driver
// =============================================================================

/// Runs the migration for a set of loaded mappings and rename tables.
pub struct MigrationDriver {
    options: MigrationOptions,
    mappings: MappingStore,
    renames: RenameRegistry,
    matcher: Box<dyn Matcher>,
    formatter: DatatypeFormatter,
}

impl MigrationDriver {
    pub fn new(options: MigrationOptions, mappings: MappingStore, renames: RenameRegistry) -> Self {
        let matcher = options.match_strategy.matcher();
        let formatter = DatatypeFormatter::new(options.quote_strings);
        Self {
            options,
            mappings,
            renames,
            matcher,
            formatter,
        }
    }

    /// Load mappings and rename tables from the configured directories.
    pub fn from_options(options: MigrationOptions) -> MigrationResult<Self> {
        let mappings = MappingStore::load_dir(&options.mappings_dir)?;
        let renames = RenameRegistry::load_dir(&options.graph_diffs_dir)?;
        Ok(Self::new(options, mappings, renames))
    }

    pub fn options(&self) -> &MigrationOptions {
        &self.options
    }

    pub fn mappings(&self) -> &MappingStore {
        &self.mappings
    }

    /// Migrate every resource, one model at a time.
    ///
    /// Configuration problems abort before anything is written; failures
    /// while processing or writing a model only fail that model.
    pub fn run(&self, resources: Vec<SourceResource>) -> MigrationResult<RunSummary> {
        let plans = self.plan(resources)?;
        fs::create_dir_all(&self.options.output_dir)?;

        let mut summary = RunSummary::default();
        for plan in plans {
            summary.models.push(self.process_model(plan));
        }

        info!(
            models = summary.models.len(),
            failed = summary.failed().count(),
            rows = summary.total_rows(),
            "migration finished"
        );
        Ok(summary)
    }

    /// Classify resources and pair each source type with a model and table.
    fn plan(&self, resources: Vec<SourceResource>) -> Result<Vec<ModelPlan<'_>>, ConfigError> {
        let model_names = self.mappings.names();

        if let Some(filter) = &self.options.model_filter {
            if self.mappings.get(filter).is_none() {
                return Err(ConfigError::UnknownModel {
                    name: filter.clone(),
                    available: model_names,
                });
            }
        }

        let mut by_type: BTreeMap<String, Vec<SourceResource>> = BTreeMap::new();
        for resource in resources {
            by_type
                .entry(resource.entity_type_id.clone())
                .or_default()
                .push(resource);
        }

        let mut plans: BTreeMap<String, ModelPlan<'_>> = BTreeMap::new();
        for (source_type, resources) in by_type {
            let resolved = resolve_model(&source_type, &model_names, self.matcher.as_ref())
                .ok_or_else(|| ConfigError::UnresolvedResourceType(source_type.clone()))?;
            self.log_confidence("resource model", &source_type, &resolved.name, resolved.score);

            if self
                .options
                .model_filter
                .as_ref()
                .is_some_and(|filter| filter != &resolved.name)
            {
                debug!(source_type = %source_type, model = %resolved.name, "skipped by model filter");
                continue;
            }

            let mapping = self
                .mappings
                .get(&resolved.name)
                .ok_or_else(|| ConfigError::MissingMapping(resolved.name.clone()))?;

            let (table, score) = self
                .renames
                .table_for(&source_type, mapping.name(), self.matcher.as_ref())
                .ok_or_else(|| ConfigError::MissingRenameTable {
                    source_type: source_type.clone(),
                    model: mapping.name().to_string(),
                })?;
            self.log_confidence("rename table", &source_type, table.name(), score);

            info!(
                source_type = %source_type,
                model = mapping.name(),
                table = table.name(),
                resources = resources.len(),
                "source type planned"
            );

            plans
                .entry(mapping.name().to_string())
                .or_insert_with(|| ModelPlan {
                    mapping,
                    groups: Vec::new(),
                })
                .groups
                .push(SourceGroup {
                    source_type,
                    table,
                    resources,
                });
        }

        // Models without resources still get their mapping passthrough.
        for name in &model_names {
            if plans.contains_key(name)
                || self.options.model_filter.as_ref().is_some_and(|filter| filter != name)
            {
                continue;
            }
            if let Some(mapping) = self.mappings.get(name) {
                debug!(model = %name, "no resources, mapping only");
                plans.insert(
                    name.clone(),
                    ModelPlan {
                        mapping,
                        groups: Vec::new(),
                    },
                );
            }
        }

        Ok(plans.into_values().collect())
    }

    /// Run one model to completion. Never fails the run.
    fn process_model(&self, plan: ModelPlan<'_>) -> ModelReport {
        let mapping = plan.mapping;
        let span = info_span!("model", name = mapping.name());
        let _enter = span.enter();

        let source_types = plan.groups.iter().map(|g| g.source_type.clone()).collect();
        let mut report = ModelReport::new(mapping.name(), source_types);

        report.advance(ModelState::LoadingSchema);
        debug!(fields = mapping.fields().len(), "schema ready");

        report.advance(ModelState::ProcessingResources);
        let mut acc = ModelAccumulator::default();
        for group in plan.groups {
            let resolver = FieldNameResolver::new(mapping, group.table, self.matcher.as_ref());
            for resource in group.resources {
                let outcome = self.process_resource(&resolver, &resource);
                report.resources += 1;
                report.dropped_fields += outcome.dropped_fields;
                report.format_errors += outcome.format_errors;
                acc.rows.extend(outcome.rows);
            }
        }
        report.rows = acc.rows.len();

        report.advance(ModelState::Writing);
        let result = if report.source_types.is_empty() {
            write_mapping(&self.options.output_dir, mapping)
                .map(|path| (None, path))
                .map_err(ModelError::from)
        } else {
            self.write_model(mapping, &acc)
                .map(|(csv_path, mapping_path)| (Some(csv_path), mapping_path))
        };
        match result {
            Ok((csv_path, mapping_path)) => {
                report.csv_path = csv_path;
                report.mapping_path = Some(mapping_path);
                report.advance(ModelState::Done);
                info!(
                    resources = report.resources,
                    rows = report.rows,
                    dropped = report.dropped_fields,
                    format_errors = report.format_errors,
                    "model written"
                );
            }
            Err(err) => report.fail(&err),
        }

        report
    }

    fn write_model(&self, mapping: &Mapping, acc: &ModelAccumulator) -> Result<(PathBuf, PathBuf), ModelError> {
        check_columns(mapping, &acc.rows).map_err(ModelError::Columns)?;
        let dir = &self.options.output_dir;
        let csv_path = write_model_csv(dir, mapping, &acc.rows, self.options.write_bom)?;
        let mapping_path = write_mapping(dir, mapping)?;
        Ok((csv_path, mapping_path))
    }

    /// Flatten, rename, format and condense one resource.
    pub fn process_resource(&self, resolver: &FieldNameResolver<'_>, resource: &SourceResource) -> ResourceOutcome {
        let mapping = resolver.mapping();
        let mut fields = Vec::new();
        let mut dropped_fields = 0;
        let mut format_errors = 0;

        for leaf in flatten(resource) {
            let Some(resolution) = resolver.resolve(&leaf.old_id) else {
                debug!(resource = %resource.entity_id, field = %leaf.old_id, "field not in rename table, dropped");
                dropped_fields += 1;
                continue;
            };

            let Some(datatype) = mapping.datatype(&resolution.name) else {
                warn!(
                    resource = %resource.entity_id,
                    field = %leaf.old_id,
                    target = %resolution.name,
                    "target field not declared by model, dropped"
                );
                dropped_fields += 1;
                continue;
            };

            if resolution.method == ResolutionMethod::Derived {
                self.log_confidence("field", &leaf.old_id, &resolution.name, resolution.score);
            }

            let raw = if self.options.concept_identifiers && datatype.is_concept() {
                match mapping.concepts().identifier_for(&leaf.value) {
                    Some(uuid) => uuid.to_string(),
                    None => leaf.value,
                }
            } else {
                leaf.value
            };

            match self.formatter.format(datatype, &raw) {
                Ok(value) => fields.push(FieldValue::new(resolution.name, value)),
                Err(err) => {
                    warn!(
                        resource = %resource.entity_id,
                        field = %resolution.name,
                        value = %raw,
                        error = %err,
                        "value skipped"
                    );
                    format_errors += 1;
                }
            }
        }

        ResourceOutcome {
            rows: condense(&resource.entity_id, fields),
            dropped_fields,
            format_errors,
        }
    }

    fn log_confidence(&self, kind: &str, from: &str, to: &str, score: u8) {
        if score < self.options.low_confidence_threshold {
            warn!(kind, from, to, score, "low-confidence match");
        } else {
            debug!(kind, from, to, score, "matched");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MigrationError;
    use crate::models::SourceExport;
    use serde_json::{json, Value};
    use std::io::Write;
    use tempfile::{tempdir, TempDir};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const CONCEPT_ID: &str = "5c7a0d0e-2a4b-4c3e-9f0a-1b2c3d4e5f60";

    fn write_archive(dir: &std::path::Path, stem: &str, mapping: Value, concepts: Value) {
        let file = fs::File::create(dir.join(format!("{stem}.zip"))).unwrap();
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        zip.start_file(format!("{stem}.mapping"), options).unwrap();
        zip.write_all(mapping.to_string().as_bytes()).unwrap();
        zip.start_file(format!("{stem}_concepts.json"), options).unwrap();
        zip.write_all(concepts.to_string().as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    struct Fixture {
        _root: TempDir,
        options: MigrationOptions,
    }

    fn fixture() -> Fixture {
        let root = tempdir().unwrap();
        let mappings = root.path().join("mappings");
        let diffs = root.path().join("graphdiffs");
        fs::create_dir_all(&mappings).unwrap();
        fs::create_dir_all(&diffs).unwrap();

        write_archive(
            &mappings,
            "Heritage Resource",
            json!({
                "resource_model_name": "Heritage Resource",
                "nodes": [
                    {"arches_node_name": "Name", "data_type": "string"},
                    {"arches_node_name": "Address", "data_type": "string"},
                    {"arches_node_name": "Construction Date", "data_type": "date"},
                    {"arches_node_name": "Type", "data_type": "concept"},
                    {"arches_node_name": "Images", "data_type": "file-list"}
                ]
            }),
            json!({"Type": {"5c7a0d0e-2a4b-4c3e-9f0a-1b2c3d4e5f60": "Mill"}}),
        );
        write_archive(
            &mappings,
            "Activity",
            json!({
                "resource_model_name": "Activity",
                "nodes": [{"arches_node_name": "Activity Name", "data_type": "string"}]
            }),
            json!({}),
        );

        fs::write(
            diffs.join("HERITAGE_RESOURCE.E18.json"),
            json!({
                "NAME.E41": "Name",
                "ADDRESS.E45": null,
                "CONSTRUCTION_DATE.E49": null,
                "TYPE.E55": "Type",
                "IMAGE.E38": "Images",
                "OLD_NOTE.E62": "Note"
            })
            .to_string(),
        )
        .unwrap();
        fs::write(
            diffs.join("ACTIVITY.E7.json"),
            json!({"NAME.E41": "Activity Name"}).to_string(),
        )
        .unwrap();

        let options = MigrationOptions {
            output_dir: root.path().join("out"),
            mappings_dir: mappings,
            graph_diffs_dir: diffs,
            ..MigrationOptions::default()
        };
        Fixture { _root: root, options }
    }

    fn leaf(id: &str, value: &str) -> Value {
        json!({"entitytypeid": id, "value": value, "businesstablename": "strings", "child_entities": []})
    }

    fn resources() -> Vec<SourceResource> {
        let export: SourceExport = serde_json::from_value(json!({
            "resources": [
                {
                    "entitytypeid": "HERITAGE_RESOURCE.E18",
                    "entityid": "hr-1",
                    "child_entities": [leaf("NAME.E41", "Old Mill"), leaf("ADDRESS.E45", "1 Mill Lane")]
                },
                {
                    "entitytypeid": "HERITAGE_RESOURCE.E18",
                    "entityid": "hr-2",
                    "child_entities": [
                        leaf("NAME.E41", "New Mill"),
                        {
                            "entitytypeid": "PLACE.E53",
                            "value": "",
                            "businesstablename": "",
                            "child_entities": [leaf("ADDRESS.E45", "2 Mill Lane"), leaf("ADDRESS.E45", "3 Mill Lane")]
                        },
                        leaf("CONSTRUCTION_DATE.E49", "1820-01-01T00:00:00"),
                        leaf("TYPE.E55", "Mill"),
                        leaf("IMAGE.E38", "/uploads/2019/photo.jpg"),
                        leaf("OBSOLETE.E1", "gone"),
                        leaf("OLD_NOTE.E62", "not in v4")
                    ]
                },
                {
                    "entitytypeid": "HERITAGE_RESOURCE.E18",
                    "entityid": "hr-3",
                    "child_entities": [leaf("CONSTRUCTION_DATE.E49", "05-14-2003")]
                },
                {
                    "entitytypeid": "ACTIVITY.E7",
                    "entityid": "act-1",
                    "child_entities": [leaf("NAME.E41", "Survey")]
                }
            ]
        }))
        .unwrap();
        export.resources
    }

    fn read_csv(path: &std::path::Path) -> (Vec<String>, Vec<Vec<String>>) {
        let mut reader = csv::Reader::from_path(path).unwrap();
        let header = reader.headers().unwrap().iter().map(String::from).collect();
        let rows = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        (header, rows)
    }

    #[test]
    fn test_end_to_end() {
        let fx = fixture();
        let driver = MigrationDriver::from_options(fx.options.clone()).unwrap();
        let summary = driver.run(resources()).unwrap();

        assert_eq!(summary.models.len(), 2);
        assert!(!summary.has_failures());

        let heritage = summary.models.iter().find(|m| m.model == "Heritage Resource").unwrap();
        assert_eq!(heritage.state, ModelState::Done);
        assert_eq!(heritage.resources, 3);
        assert_eq!(heritage.dropped_fields, 2);
        assert_eq!(heritage.format_errors, 1);

        let (header, rows) = read_csv(heritage.csv_path.as_ref().unwrap());
        assert_eq!(
            header,
            vec!["ResourceID", "Name", "Address", "Construction Date", "Type", "Images"]
        );

        let hr1: Vec<_> = rows.iter().filter(|r| r[0] == "hr-1").collect();
        assert_eq!(hr1.len(), 1);
        assert_eq!(hr1[0][1], "Old Mill");
        assert_eq!(hr1[0][2], "1 Mill Lane");

        let hr2: Vec<_> = rows.iter().filter(|r| r[0] == "hr-2").collect();
        assert_eq!(hr2.len(), 2);
        assert_eq!(hr2[0][2], "2 Mill Lane");
        assert_eq!(hr2[1][2], "3 Mill Lane");
        assert_eq!(hr2[0][1], "New Mill");
        assert_eq!(hr2[0][3], "1820-01-01");
        assert_eq!(hr2[0][4], "Mill");
        assert_eq!(hr2[0][5], "photo.jpg");
        assert!(hr2[1][1..].iter().filter(|c| !c.is_empty()).count() == 1);

        // Bad date skipped, identifier row kept.
        let hr3: Vec<_> = rows.iter().filter(|r| r[0] == "hr-3").collect();
        assert_eq!(hr3.len(), 1);
        assert!(hr3[0][1..].iter().all(|c| c.is_empty()));

        let mapping_path = heritage.mapping_path.as_ref().unwrap();
        let mapping: Value = serde_json::from_str(&fs::read_to_string(mapping_path).unwrap()).unwrap();
        assert_eq!(mapping["resource_model_name"], "Heritage Resource");
    }

    #[test]
    fn test_concept_identifiers() {
        let fx = fixture();
        let options = MigrationOptions {
            concept_identifiers: true,
            ..fx.options.clone()
        };
        let driver = MigrationDriver::from_options(options).unwrap();
        let summary = driver.run(resources()).unwrap();

        let heritage = summary.models.iter().find(|m| m.model == "Heritage Resource").unwrap();
        let (_, rows) = read_csv(heritage.csv_path.as_ref().unwrap());
        let hr2 = rows.iter().find(|r| r[0] == "hr-2").unwrap();
        assert_eq!(hr2[4], CONCEPT_ID);
    }

    #[test]
    fn test_model_filter() {
        let fx = fixture();
        let options = MigrationOptions {
            model_filter: Some("Activity".to_string()),
            ..fx.options.clone()
        };
        let driver = MigrationDriver::from_options(options).unwrap();
        let summary = driver.run(resources()).unwrap();

        assert_eq!(summary.models.len(), 1);
        assert_eq!(summary.models[0].model, "Activity");
        assert!(!fx.options.output_dir.join("Heritage Resource.csv").exists());
    }

    #[test]
    fn test_unknown_model_filter_is_fatal() {
        let fx = fixture();
        let options = MigrationOptions {
            model_filter: Some("Ships".to_string()),
            ..fx.options.clone()
        };
        let driver = MigrationDriver::from_options(options).unwrap();
        let err = driver.run(resources()).unwrap_err();
        assert!(matches!(err, MigrationError::Config(ConfigError::UnknownModel { .. })));
        assert!(!fx.options.output_dir.exists());
    }

    #[test]
    fn test_every_column_is_declared() {
        let fx = fixture();
        let driver = MigrationDriver::from_options(fx.options.clone()).unwrap();
        let mapping = driver.mappings().get("Heritage Resource").unwrap();
        let table = RenameTable::new(
            "t",
            vec![
                ("NAME.E41".to_string(), Some("Name".to_string())),
                ("NOTE.E62".to_string(), Some("Note".to_string())),
            ],
        );
        let resolver = FieldNameResolver::new(mapping, &table, driver.matcher.as_ref());

        for resource in resources() {
            let outcome = driver.process_resource(&resolver, &resource);
            assert!(!outcome.rows.is_empty());
            for row in &outcome.rows {
                assert_eq!(row.resource_id, resource.entity_id);
                assert!(row.fields().all(|f| mapping.has_field(f)));
            }
        }
    }

    #[test]
    fn test_mapping_written_for_models_without_resources() {
        let fx = fixture();
        fs::write(
            fx.options.mappings_dir.join("Place.mapping"),
            json!({
                "resource_model_name": "Place",
                "nodes": [{"arches_node_name": "Place Name", "data_type": "string"}]
            })
            .to_string(),
        )
        .unwrap();

        let driver = MigrationDriver::from_options(fx.options.clone()).unwrap();
        let summary = driver.run(resources()).unwrap();
        assert_eq!(summary.models.len(), 3);

        let place = summary.models.iter().find(|m| m.model == "Place").unwrap();
        assert_eq!(place.state, ModelState::Done);
        assert_eq!(place.resources, 0);
        assert!(place.csv_path.is_none());
        assert!(fx.options.output_dir.join("Place.mapping").is_file());
        assert!(!fx.options.output_dir.join("Place.csv").exists());
    }

    #[test]
    fn test_filter_limits_mapping_passthrough() {
        let fx = fixture();
        let options = MigrationOptions {
            model_filter: Some("Activity".to_string()),
            ..fx.options.clone()
        };
        let driver = MigrationDriver::from_options(options).unwrap();
        driver.run(Vec::new()).unwrap();

        assert!(fx.options.output_dir.join("Activity.mapping").is_file());
        assert!(!fx.options.output_dir.join("Heritage Resource.mapping").exists());
    }

    #[test]
    fn test_write_failure_is_isolated() {
        let fx = fixture();
        let driver = MigrationDriver::from_options(fx.options.clone()).unwrap();
        fs::create_dir_all(&fx.options.output_dir).unwrap();
        // A directory squatting on the CSV path makes the rename fail.
        fs::create_dir_all(fx.options.output_dir.join("Activity.csv").join("blocker")).unwrap();

        let summary = driver.run(resources()).unwrap();
        let activity = summary.models.iter().find(|m| m.model == "Activity").unwrap();
        assert_eq!(activity.state, ModelState::Failed);
        assert!(activity.error.is_some());

        let heritage = summary.models.iter().find(|m| m.model == "Heritage Resource").unwrap();
        assert_eq!(heritage.state, ModelState::Done);
        assert!(summary.has_failures());
    }
}
