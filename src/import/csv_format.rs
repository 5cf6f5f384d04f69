use chrono::Utc;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::{JarError, Result};
use crate::models::{Jar, JarColor, JarIcon, Transaction};
use crate::store::legacy::{self, Decoded};

pub(crate) const HEADER: [&str; 8] = [
    "id",
    "name",
    "targetAmount",
    "currentAmount",
    "color",
    "icon",
    "creationDate",
    "transactions",
];

const ENTRY_SEPARATOR: char = ';';
const FIELD_SEPARATOR: char = '|';

/// Write jars as CSV. Transactions collapse into one `amount|date;...` cell,
/// so ids and notes of individual transactions are not carried.
pub(crate) fn export(jars: &[Jar]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(HEADER).map_err(csv_error)?;

    for jar in jars {
        let transactions = jar
            .transactions
            .iter()
            .map(|t| format!("{}{FIELD_SEPARATOR}{}", t.amount, t.date.to_rfc3339()))
            .collect::<Vec<_>>()
            .join(&ENTRY_SEPARATOR.to_string());
        wtr.write_record([
            jar.id.to_string(),
            jar.name.clone(),
            jar.target_amount.to_string(),
            jar.current_amount.to_string(),
            jar.color.to_string(),
            jar.icon.to_string(),
            jar.creation_date.to_rfc3339(),
            transactions,
        ])
        .map_err(csv_error)?;
    }

    wtr.into_inner()
        .map_err(|e| JarError::Persistence(format!("Failed to finish CSV export: {e}")))
}

/// Read jars back from CSV. Rows that fail validation are skipped and
/// counted; a missing or foreign header rejects the whole file.
pub(crate) fn parse(bytes: &[u8]) -> Result<Decoded> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(bytes);

    let headers = rdr
        .headers()
        .map_err(|e| JarError::import_format(format!("Failed to read CSV header: {e}")))?;
    let matches_header = headers.len() >= HEADER.len()
        && HEADER
            .iter()
            .zip(headers.iter())
            .all(|(expected, found)| expected.eq_ignore_ascii_case(found.trim()));
    if !matches_header {
        return Err(JarError::import_format(format!(
            "CSV header must be '{}'",
            HEADER.join(",")
        )));
    }

    let mut decoded = Decoded::default();
    for (i, result) in rdr.records().enumerate() {
        let row = result
            .map_err(|e| e.to_string())
            .and_then(|record| parse_row(&record));
        match row {
            Ok(jar) => decoded.jars.push(jar),
            Err(reason) => {
                tracing::warn!(row = i + 2, %reason, "skipping CSV row");
                decoded.skipped += 1;
            }
        }
    }
    Ok(decoded)
}

fn parse_row(record: &csv::StringRecord) -> std::result::Result<Jar, String> {
    let field = |i: usize| record.get(i).map(str::trim).unwrap_or("");

    let id = Uuid::parse_str(field(0)).map_err(|e| format!("bad id '{}': {e}", field(0)))?;
    let name = field(1).to_string();
    if name.is_empty() {
        return Err(format!("jar {id} has an empty name"));
    }
    let target_amount = parse_decimal(field(2))?;
    if target_amount < Decimal::ZERO {
        return Err(format!("jar {id} has a negative target"));
    }
    let current_amount = parse_decimal(field(3))?;
    let creation_date = match field(6) {
        "" => Utc::now(),
        raw => legacy::parse_date(raw).ok_or_else(|| format!("bad creation date '{raw}'"))?,
    };

    let mut transactions = Vec::new();
    for entry in field(7).split(ENTRY_SEPARATOR).map(str::trim) {
        if entry.is_empty() {
            continue;
        }
        let (amount, date) = entry
            .split_once(FIELD_SEPARATOR)
            .ok_or_else(|| format!("bad transaction entry '{entry}'"))?;
        let date = legacy::parse_date(date)
            .ok_or_else(|| format!("bad transaction date '{date}'"))?;
        transactions.push(Transaction::at(parse_decimal(amount)?, date, ""));
    }

    let mut jar = Jar {
        id,
        name,
        target_amount,
        current_amount: Decimal::ZERO,
        color: match field(4) {
            "" => JarColor::default(),
            tag => JarColor::parse(tag),
        },
        icon: match field(5) {
            "" => JarIcon::default(),
            tag => JarIcon::parse(tag),
        },
        creation_date,
        transactions,
    };
    jar.current_amount = jar
        .transaction_total()
        .ok_or_else(|| format!("jar {id} history overflows"))?;
    legacy::reconcile(&mut jar, current_amount)?;
    Ok(jar)
}

fn parse_decimal(s: &str) -> std::result::Result<Decimal, String> {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|_| format!("'{s}' is not a number"))
}

fn csv_error(e: csv::Error) -> JarError {
    JarError::Persistence(format!("Failed to write CSV: {e}"))
}

#[cfg(test)]
#[path = "csv_format_tests.rs"]
mod tests;
