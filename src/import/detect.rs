use super::csv_format::HEADER;
use super::ExportFormat;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Guess the interchange format of an import payload from its first bytes.
/// Returns None when it is neither a JSON document nor our CSV layout.
pub(crate) fn detect_format(bytes: &[u8]) -> Option<ExportFormat> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let first = bytes.iter().find(|b| !b.is_ascii_whitespace())?;
    if matches!(first, b'[' | b'{') {
        return Some(ExportFormat::Json);
    }

    let text = std::str::from_utf8(bytes).ok()?;
    let first_line = text.trim_start().lines().next()?;
    let columns: Vec<String> = first_line
        .split(',')
        .map(|c| c.trim().trim_matches('"').to_lowercase())
        .collect();
    let expected = HEADER.iter().map(|h| h.to_lowercase());
    if columns.len() >= 3 && expected.zip(&columns).take(3).all(|(h, c)| h == *c) {
        return Some(ExportFormat::Csv);
    }
    None
}
