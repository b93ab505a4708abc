//! v3 JSON export reader with encoding auto-detection.
//!
//! Exports produced by older installations are not always UTF-8, so the raw
//! bytes are decoded first, then the document is checked against the v3
//! export schema and deserialized.

use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{SourceError, SourceResult};
use crate::models::SourceExport;
use crate::validation::validate_source_export;

const UTF8_BOM: char = '\u{feff}';

/// Parsed export plus the encoding it was read with.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub export: SourceExport,
    pub encoding: String,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "iso-8859-15" | "latin-9" | "latin9" => "iso-8859-15".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> SourceResult<String> {
    let text = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(e) => return Err(SourceError::Encoding(e.to_string())),
        },
        // Every Latin-1 byte is the code point of the same value.
        "iso-8859-1" | "latin-1" | "latin1" => bytes.iter().map(|&b| char::from(b)).collect(),
        "iso-8859-15" | "latin-9" | "latin9" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };
    Ok(text.trim_start_matches(UTF8_BOM).to_string())
}

/// Parse an export held in memory.
pub fn parse_source_bytes(bytes: &[u8]) -> SourceResult<ParseResult> {
    // Valid UTF-8 wins over the detector, which misreads short samples.
    let encoding = if std::str::from_utf8(bytes).is_ok() {
        "utf-8".to_string()
    } else {
        detect_encoding(bytes)
    };
    debug!(encoding = %encoding, bytes = bytes.len(), "decoding source export");

    let content = decode_content(bytes, &encoding)?;
    let export = parse_source_str(&content)?;
    Ok(ParseResult { export, encoding })
}

/// Parse an export from text.
pub fn parse_source_str(content: &str) -> SourceResult<SourceExport> {
    let document: Value = serde_json::from_str(content)?;
    validate_source_export(&document).map_err(|errors| SourceError::Schema { errors })?;
    Ok(serde_json::from_value(document)?)
}

/// Read and parse an export file.
pub fn parse_source_file<P: AsRef<Path>>(path: P) -> SourceResult<ParseResult> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let result = parse_source_bytes(&bytes)?;
    info!(
        path = %path.display(),
        encoding = %result.encoding,
        resources = result.export.resources.len(),
        "source export loaded"
    );
    Ok(result)
}
