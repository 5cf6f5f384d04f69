use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Format a decimal amount with thousand separators and 2 decimal places.
/// e.g. `1234567.89` → `"$1,234,567.89"`
pub(crate) fn format_amount(val: Decimal) -> String {
    let abs = val.abs();
    let formatted = format!("{abs:.2}");
    let mut parts = formatted.split('.');
    let int_part = parts.next().unwrap_or("0");
    let dec_part = parts.next().unwrap_or("00");

    let with_commas: String = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    if val < Decimal::ZERO {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Format a `[0, 1]` ratio as a percentage with at most one decimal.
/// e.g. `0.325` → `"32.5%"`
pub(crate) fn format_percent(ratio: Decimal) -> String {
    let pct = (ratio * Decimal::ONE_HUNDRED).round_dp(1).normalize();
    format!("{pct}%")
}

/// Text progress bar `width` cells wide.
pub(crate) fn progress_bar(ratio: Decimal, width: usize) -> String {
    let ratio = ratio.clamp(Decimal::ZERO, Decimal::ONE);
    let filled = (ratio * Decimal::from(width))
        .floor()
        .to_usize()
        .unwrap_or(0)
        .min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Truncate a string to `max` visible characters, appending "…" if truncated.
/// The result is guaranteed to be at most `max` characters (counting "…" as one).
/// Safe for multi-byte UTF-8 characters.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let char_count = s.chars().count();
    if char_count <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{truncated}…")
}

/// First block of a jar id, enough to refer to it on the command line.
pub(crate) fn short_id(id: &uuid::Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
