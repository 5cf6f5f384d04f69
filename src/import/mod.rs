mod csv_format;
mod detect;

use crate::errors::{JarError, Result};
use crate::models::Jar;
use crate::store::{encode_jars, legacy};

pub(crate) use detect::detect_format;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub(crate) fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ImportStrategy {
    /// Add the imported jars after the existing ones, duplicates and all.
    Append,
    /// Throw the existing jars away.
    Replace,
}

/// Result of an import: the collection to adopt and the per-record tally.
#[derive(Debug)]
pub(crate) struct ImportOutcome {
    pub(crate) jars: Vec<Jar>,
    pub(crate) imported: usize,
    pub(crate) skipped: usize,
}

/// Serialize the whole collection, history included.
pub(crate) fn export_all(jars: &[Jar], format: ExportFormat) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Json => encode_jars(jars),
        ExportFormat::Csv => csv_format::export(jars),
    }
}

/// Parse `bytes` and combine the result with `existing` according to
/// `strategy`. Bad records are skipped; the import only fails when the
/// payload has the wrong shape or not a single record could be used.
pub(crate) fn import_all(
    existing: &[Jar],
    bytes: &[u8],
    strategy: ImportStrategy,
) -> Result<ImportOutcome> {
    let decoded = match detect_format(bytes) {
        Some(ExportFormat::Json) => legacy::decode_bytes(bytes).map_err(JarError::ImportFormat)?,
        Some(ExportFormat::Csv) => csv_format::parse(bytes)?,
        None => {
            return Err(JarError::import_format(
                "file is neither a JSON jar export nor a jar CSV",
            ))
        }
    };

    if decoded.nothing_salvaged() {
        return Err(JarError::import_format(format!(
            "none of the {} records could be read",
            decoded.skipped
        )));
    }

    let imported = decoded.jars.len();
    let jars = match strategy {
        ImportStrategy::Append => existing.iter().cloned().chain(decoded.jars).collect(),
        ImportStrategy::Replace => decoded.jars,
    };
    Ok(ImportOutcome {
        jars,
        imported,
        skipped: decoded.skipped,
    })
}
