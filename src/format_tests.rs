#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;

// ── truncate ──────────────────────────────────────────────────

#[test]
fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
}

#[test]
fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 5), "hell…");
}

#[test]
fn test_truncate_zero_max() {
    assert_eq!(truncate("hello", 0), "");
}

#[test]
fn test_truncate_emoji() {
    assert_eq!(truncate("🎉🎊🎈🎁", 3), "🎉🎊…");
}

#[test]
fn test_truncate_mixed_unicode() {
    assert_eq!(truncate("café résumé", 5), "café…");
}

// ── format_amount ─────────────────────────────────────────────

#[test]
fn test_format_amount_basic() {
    assert_eq!(format_amount(dec!(1234.56)), "$1,234.56");
}

#[test]
fn test_format_amount_zero() {
    assert_eq!(format_amount(dec!(0)), "$0.00");
}

#[test]
fn test_format_amount_negative() {
    assert_eq!(format_amount(dec!(-42.50)), "-$42.50");
}

#[test]
fn test_format_amount_large() {
    assert_eq!(format_amount(dec!(1234567.89)), "$1,234,567.89");
}

#[test]
fn test_format_amount_rounds_to_two_decimals() {
    assert_eq!(format_amount(dec!(1.5)), "$1.50");
}

// ── format_percent ────────────────────────────────────────────

#[test]
fn test_format_percent() {
    assert_eq!(format_percent(dec!(0.325)), "32.5%");
    assert_eq!(format_percent(Decimal::ONE), "100%");
    assert_eq!(format_percent(Decimal::ZERO), "0%");
    assert_eq!(format_percent(dec!(0.33333)), "33.3%");
}

// ── progress_bar ──────────────────────────────────────────────

#[test]
fn test_progress_bar_widths() {
    assert_eq!(progress_bar(Decimal::ZERO, 4), "░░░░");
    assert_eq!(progress_bar(dec!(0.5), 4), "██░░");
    assert_eq!(progress_bar(Decimal::ONE, 4), "████");
}

#[test]
fn test_progress_bar_clamps() {
    assert_eq!(progress_bar(dec!(3), 3), "███");
    assert_eq!(progress_bar(dec!(-1), 3), "░░░");
}

#[test]
fn test_short_id() {
    let id = uuid::Uuid::parse_str("0f8fad5b-d9cb-469f-a165-70867728950e").unwrap();
    assert_eq!(short_id(&id), "0f8fad5b");
}
