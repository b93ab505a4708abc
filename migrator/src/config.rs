//! Run configuration.
//!
//! [`MigrationOptions`] is built by the CLI (flags or `ARCHES_MIGRATE_*`
//! environment variables, `.env` honoured) and handed to the driver.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::transform::matcher::{ExactMatcher, FuzzyMatcher, Matcher};

/// How derived names are matched against candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Best similarity score, however weak.
    #[default]
    Fuzzy,
    /// Only names equal after normalization.
    Exact,
}

impl MatchStrategy {
    pub fn matcher(&self) -> Box<dyn Matcher> {
        match self {
            MatchStrategy::Fuzzy => Box::new(FuzzyMatcher),
            MatchStrategy::Exact => Box::new(ExactMatcher),
        }
    }
}

/// Options for a migration run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationOptions {
    /// Directory receiving `<model>.csv` and `<model>.mapping`
    pub output_dir: PathBuf,

    /// Directory of mapping archives / `.mapping` files
    pub mappings_dir: PathBuf,

    /// Directory of rename tables
    pub graph_diffs_dir: PathBuf,

    /// Only migrate this resource model
    pub model_filter: Option<String>,

    /// Quote strings holding `<`, `>` or `,`
    pub quote_strings: bool,

    /// Replace concept labels with concept UUIDs
    pub concept_identifiers: bool,

    /// Prefix CSV files with a UTF-8 byte order mark
    pub write_bom: bool,

    /// Matching strategy for derived names
    pub match_strategy: MatchStrategy,

    /// Scores below this are logged as low-confidence guesses
    pub low_confidence_threshold: u8,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            mappings_dir: PathBuf::from("mappings"),
            graph_diffs_dir: PathBuf::from("resources/graphdiffs"),
            model_filter: None,
            quote_strings: false,
            concept_identifiers: false,
            write_bom: false,
            match_strategy: MatchStrategy::Fuzzy,
            low_confidence_threshold: 80,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = MigrationOptions::default();
        assert_eq!(opts.match_strategy, MatchStrategy::Fuzzy);
        assert!(!opts.quote_strings);
        assert!(!opts.write_bom);
        assert!(opts.model_filter.is_none());
        assert_eq!(opts.low_confidence_threshold, 80);
    }

    #[test]
    fn test_strategy_matchers() {
        let choices = vec!["Heritage Resource".to_string()];
        assert!(MatchStrategy::Fuzzy.matcher().best_match("Heritage", &choices).is_some());
        assert!(MatchStrategy::Exact.matcher().best_match("Heritage", &choices).is_none());
    }

    #[test]
    fn test_options_roundtrip_names() {
        let json = serde_json::to_value(MigrationOptions::default()).unwrap();
        assert_eq!(json["match_strategy"], "fuzzy");
    }
}
