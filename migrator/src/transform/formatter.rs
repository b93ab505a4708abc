//! Per-datatype value formatting for the v4 CSV importer.
//!
//! | Datatype | Rule |
//! |----------|------|
//! | `string` | unchanged; optionally `"`-quoted when it holds `<`, `>` or `,` |
//! | `number` | thousands separators removed |
//! | `date` | `YYYY-MM-DDTHH:MM:SS` → `YYYY-MM-DD`, empty stays empty |
//! | `geojson-feature-collection` | unchanged |
//! | `concept`, `domain-value` | unchanged |
//! | `concept-list`, `domain-value-list` | `'`-quoted when it has several tokens |
//! | `file-list` | last path segment |

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::FormatError;
use crate::models::Datatype;

const SOURCE_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S";
const RESERVED: [char; 3] = ['<', '>', ','];

/// chrono alone accepts padding, signs and single-digit fields.
static SOURCE_TIMESTAMP_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}$").unwrap());

/// Formats raw v3 values according to their v4 datatype.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatatypeFormatter {
    quote_strings: bool,
}

impl DatatypeFormatter {
    pub fn new(quote_strings: bool) -> Self {
        Self { quote_strings }
    }

    /// Format one value. Only `date` can fail.
    pub fn format(&self, datatype: Datatype, raw: &str) -> Result<String, FormatError> {
        Ok(match datatype {
            Datatype::String => self.format_string(raw),
            Datatype::Number => format_number(raw),
            Datatype::Date => format_date(raw)?,
            Datatype::GeojsonFeatureCollection => raw.to_string(),
            Datatype::Concept | Datatype::DomainValue => raw.to_string(),
            Datatype::ConceptList | Datatype::DomainValueList => format_list(raw),
            Datatype::FileList => format_file_list(raw),
        })
    }

    fn format_string(&self, raw: &str) -> String {
        if self.quote_strings && raw.contains(RESERVED) {
            format!("\"{}\"", raw.replace('"', "\"\""))
        } else {
            raw.to_string()
        }
    }
}

fn format_number(raw: &str) -> String {
    raw.replace(',', "")
}

fn format_date(raw: &str) -> Result<String, FormatError> {
    if raw.is_empty() {
        return Ok(String::new());
    }
    if !SOURCE_TIMESTAMP_SHAPE.is_match(raw) {
        return Err(FormatError::InvalidDate(raw.to_string()));
    }
    NaiveDateTime::parse_from_str(raw, SOURCE_TIMESTAMP)
        .map(|ts| ts.date().format("%Y-%m-%d").to_string())
        .map_err(|_| FormatError::InvalidDate(raw.to_string()))
}

fn format_list(raw: &str) -> String {
    if raw.split_whitespace().nth(1).is_some() {
        format!("'{}'", raw)
    } else {
        raw.to_string()
    }
}

fn format_file_list(raw: &str) -> String {
    let trimmed = raw.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(datatype: Datatype, raw: &str) -> String {
        DatatypeFormatter::default().format(datatype, raw).unwrap()
    }

    #[test]
    fn test_date() {
        assert_eq!(fmt(Datatype::Date, "2003-05-14T00:00:00"), "2003-05-14");
        assert_eq!(fmt(Datatype::Date, "1999-01-02T13:45:10"), "1999-01-02");
        assert_eq!(fmt(Datatype::Date, ""), "");
    }

    #[test]
    fn test_date_rejects_other_layouts() {
        let formatter = DatatypeFormatter::default();
        assert_eq!(
            formatter.format(Datatype::Date, "05-14-2003"),
            Err(FormatError::InvalidDate("05-14-2003".into()))
        );
        assert!(formatter.format(Datatype::Date, "2003-05-14").is_err());
    }

    #[test]
    fn test_date_requires_exact_layout() {
        let formatter = DatatypeFormatter::default();
        for raw in [
            " 2003-05-14T00:00:00",
            "+2003-05-14T00:00:00",
            "2003-5-4T0:0:0",
            "2003-05-14T00:00:00 ",
            "12003-05-14T00:00:00",
        ] {
            assert_eq!(
                formatter.format(Datatype::Date, raw),
                Err(FormatError::InvalidDate(raw.to_string())),
                "{raw:?}"
            );
        }
        // Right shape, impossible calendar date.
        assert!(formatter.format(Datatype::Date, "2003-02-30T00:00:00").is_err());
    }

    #[test]
    fn test_number() {
        assert_eq!(fmt(Datatype::Number, "1,234"), "1234");
        assert_eq!(fmt(Datatype::Number, "1,234,567.5"), "1234567.5");
        assert_eq!(fmt(Datatype::Number, "42"), "42");
    }

    #[test]
    fn test_lists() {
        assert_eq!(fmt(Datatype::ConceptList, "Slate Thatch"), "'Slate Thatch'");
        assert_eq!(fmt(Datatype::ConceptList, "Slate"), "Slate");
        assert_eq!(fmt(Datatype::DomainValueList, "Good Fair"), "'Good Fair'");
        assert_eq!(fmt(Datatype::DomainValueList, ""), "");
    }

    #[test]
    fn test_file_list_basename() {
        assert_eq!(fmt(Datatype::FileList, "/uploads/2019/photo.jpg"), "photo.jpg");
        assert_eq!(fmt(Datatype::FileList, "photo.jpg"), "photo.jpg");
        assert_eq!(fmt(Datatype::FileList, "uploads/scans/"), "scans");
    }

    #[test]
    fn test_passthrough() {
        let wkt = "POINT (-0.12 51.5)";
        assert_eq!(fmt(Datatype::GeojsonFeatureCollection, wkt), wkt);
        assert_eq!(fmt(Datatype::Concept, "Listed Building"), "Listed Building");
        assert_eq!(fmt(Datatype::DomainValue, "Good"), "Good");
    }

    #[test]
    fn test_string_quoting_policy() {
        assert_eq!(fmt(Datatype::String, "Mill, Lower"), "Mill, Lower");

        let quoting = DatatypeFormatter::new(true);
        assert_eq!(
            quoting.format(Datatype::String, "Mill, Lower").unwrap(),
            "\"Mill, Lower\""
        );
        assert_eq!(
            quoting.format(Datatype::String, "<p>\"Old\" Mill</p>").unwrap(),
            "\"<p>\"\"Old\"\" Mill</p>\""
        );
        assert_eq!(quoting.format(Datatype::String, "Old Mill").unwrap(), "Old Mill");
    }
}
