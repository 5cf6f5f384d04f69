#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;
use crate::errors::JarError;
use crate::models::NewJar;

fn header_line() -> String {
    HEADER.join(",")
}

#[test]
fn test_export_quotes_commas_and_quotes() {
    let mut jar = Jar::new(NewJar {
        name: "Rent, \"deposit\"".into(),
        target_amount: dec!(1200),
        color: JarColor::Purple,
        icon: JarIcon::House,
    })
    .unwrap();
    jar.deposit(dec!(300), "first").unwrap();
    jar.deposit(dec!(25.5), "second").unwrap();

    let bytes = export(std::slice::from_ref(&jar)).unwrap();
    let text = String::from_utf8(bytes.clone()).unwrap();
    assert!(text.starts_with(&header_line()));
    assert!(text.contains("\"Rent, \"\"deposit\"\"\""));

    let decoded = parse(&bytes).unwrap();
    let back = &decoded.jars[0];
    assert_eq!(back.name, jar.name);
    assert_eq!(back.color, JarColor::Purple);
    assert_eq!(back.current_amount, dec!(325.5));
    assert_eq!(back.transactions[1].amount, dec!(25.5));
    assert!(back.transactions[0].note.is_empty());
}

#[test]
fn test_parse_rejects_foreign_header() {
    let err = parse(b"Date,Description,Amount\n2024-01-01,Coffee,-4.50\n").unwrap_err();
    assert!(matches!(err, JarError::ImportFormat(_)));
}

#[test]
fn test_parse_skips_bad_rows() {
    let id = uuid::Uuid::new_v4();
    let csv = format!(
        "{}\n\
         {id},Good,100,10,green,star,2024-01-01,10|2024-01-02T00:00:00Z\n\
         not-a-uuid,Bad,100,0,,,,\n\
         {},Bad target,lots,0,,,,\n",
        header_line(),
        uuid::Uuid::new_v4()
    );
    let decoded = parse(csv.as_bytes()).unwrap();
    assert_eq!(decoded.jars.len(), 1);
    assert_eq!(decoded.skipped, 2);
    assert_eq!(decoded.jars[0].id, id);
    assert_eq!(decoded.jars[0].icon, JarIcon::Star);
}

#[test]
fn test_parse_defaults_empty_tags_and_reconciles() {
    let csv = format!(
        "{}\n{},Drifted,50,30,,,2024-01-01,10|2024-01-02\n",
        header_line(),
        uuid::Uuid::new_v4()
    );
    let decoded = parse(csv.as_bytes()).unwrap();
    let jar = &decoded.jars[0];
    assert_eq!(jar.color, JarColor::Blue);
    assert_eq!(jar.icon, JarIcon::Banknote);
    assert_eq!(jar.current_amount, dec!(30));
    assert_eq!(jar.transactions.len(), 2);
    assert!(jar.is_balanced());
}

#[test]
fn test_parse_decimal_scientific() {
    assert_eq!(parse_decimal("1.5e2").unwrap(), dec!(150));
    assert!(parse_decimal("").is_err());
}

#[test]
fn test_parse_skips_row_whose_history_overflows() {
    let csv = format!(
        "{}\n\
         {},Huge,1,0,,,2024-01-01,5e28|2024-01-01;5e28|2024-01-02\n\
         {},Fine,10,4,,,2024-01-01,4|2024-01-01\n",
        header_line(),
        uuid::Uuid::new_v4(),
        uuid::Uuid::new_v4()
    );
    let decoded = parse(csv.as_bytes()).unwrap();
    assert_eq!(decoded.skipped, 1);
    assert_eq!(decoded.jars.len(), 1);
    assert_eq!(decoded.jars[0].name, "Fine");
}

#[test]
fn test_export_keeps_every_digit() {
    let mut jar = Jar::new(NewJar {
        name: "Treasury".into(),
        target_amount: dec!(99999999999999.9999),
        color: JarColor::Blue,
        icon: JarIcon::Banknote,
    })
    .unwrap();
    jar.deposit(dec!(12345678901234.5678), "").unwrap();

    let decoded = parse(&export(std::slice::from_ref(&jar)).unwrap()).unwrap();
    assert_eq!(decoded.jars[0].current_amount, dec!(12345678901234.5678));
    assert_eq!(decoded.jars[0].transactions[0].amount, dec!(12345678901234.5678));
}
