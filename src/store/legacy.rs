//! Tolerant decoding of stored and imported jar data.
//!
//! Everything read from disk or an import file passes through here, never
//! through the domain types directly. Older writers used epoch-second dates,
//! an `isDeposit` flag next to unsigned amounts, and sometimes a balance that
//! no longer matched the history; all of that is normalized on the way in.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use serde_json::value::RawValue;
use uuid::Uuid;

use crate::models::{amount, Jar, JarColor, JarIcon, Transaction};

pub(crate) const ADJUSTMENT_NOTE: &str = "Balance adjustment";

/// A timestamp that was written either as a string or as epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FlexibleDate(pub(crate) DateTime<Utc>);

impl<'de> Deserialize<'de> for FlexibleDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FlexibleDateVisitor).map(FlexibleDate)
    }
}

struct FlexibleDateVisitor;

impl Visitor<'_> for FlexibleDateVisitor {
    type Value = DateTime<Utc>;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("an ISO-8601 date string or epoch seconds")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        parse_date(v).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        DateTime::from_timestamp(v, 0).ok_or_else(|| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        from_epoch_seconds(v).ok_or_else(|| E::invalid_value(de::Unexpected::Float(v), &self))
    }
}

/// Parse a date string in any of the shapes older files used.
pub(crate) fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(d) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(d.and_utc());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|d| d.and_utc());
    }
    s.parse::<f64>().ok().and_then(from_epoch_seconds)
}

pub(crate) fn from_epoch_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTransaction {
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    #[serde(deserialize_with = "amount::deserialize")]
    amount: Decimal,
    #[serde(default)]
    date: Option<FlexibleDate>,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    is_deposit: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredJar {
    id: Uuid,
    name: String,
    #[serde(deserialize_with = "amount::deserialize")]
    target_amount: Decimal,
    #[serde(default, deserialize_with = "amount::deserialize_opt")]
    current_amount: Option<Decimal>,
    #[serde(default)]
    color: Option<JarColor>,
    #[serde(default)]
    icon: Option<JarIcon>,
    #[serde(default)]
    creation_date: Option<FlexibleDate>,
    #[serde(default)]
    transactions: Vec<StoredTransaction>,
}

impl StoredTransaction {
    fn into_transaction(self, fallback_date: DateTime<Utc>) -> Transaction {
        // Legacy records kept the sign in a separate flag.
        let amount = match self.is_deposit {
            Some(false) if self.amount > Decimal::ZERO => -self.amount,
            _ => self.amount,
        };
        Transaction {
            id: self.id,
            amount,
            date: self.date.map_or(fallback_date, |d| d.0),
            note: self.note.unwrap_or_default(),
        }
    }
}

/// Outcome of decoding a collection: the jars that made it, and how many
/// records were dropped.
#[derive(Debug, Default)]
pub(crate) struct Decoded {
    pub(crate) jars: Vec<Jar>,
    pub(crate) skipped: usize,
}

impl Decoded {
    /// True when there were records but none of them could be used.
    pub(crate) fn nothing_salvaged(&self) -> bool {
        self.jars.is_empty() && self.skipped > 0
    }
}

/// Decode a top-level array of jar records, skipping the ones that fail.
///
/// Records are kept as raw JSON text until each is decoded, so amounts are
/// parsed from their literal digits.
pub(crate) fn decode_bytes(bytes: &[u8]) -> Result<Decoded, String> {
    let records: Vec<Box<RawValue>> = serde_json::from_slice(bytes)
        .map_err(|e| format!("expected a top-level array of jars: {e}"))?;

    let mut decoded = Decoded::default();
    for (i, record) in records.iter().enumerate() {
        match decode_jar(record.get()) {
            Ok(jar) => decoded.jars.push(jar),
            Err(reason) => {
                tracing::warn!(record = i, %reason, "skipping jar record");
                decoded.skipped += 1;
            }
        }
    }
    Ok(decoded)
}

pub(crate) fn decode_jar(record: &str) -> Result<Jar, String> {
    let stored: StoredJar = serde_json::from_str(record).map_err(|e| e.to_string())?;

    let name = stored.name.trim().to_string();
    if name.is_empty() {
        return Err(format!("jar {} has an empty name", stored.id));
    }
    if stored.target_amount < Decimal::ZERO {
        return Err(format!("jar {} has a negative target", stored.id));
    }

    let creation_date = stored.creation_date.map_or_else(Utc::now, |d| d.0);
    let transactions: Vec<Transaction> = stored
        .transactions
        .into_iter()
        .map(|t| t.into_transaction(creation_date))
        .collect();

    let mut jar = Jar {
        id: stored.id,
        name,
        target_amount: stored.target_amount,
        current_amount: Decimal::ZERO,
        color: stored.color.unwrap_or_default(),
        icon: stored.icon.unwrap_or_default(),
        creation_date,
        transactions,
    };
    jar.current_amount = jar
        .transaction_total()
        .ok_or_else(|| format!("jar {} history overflows", jar.id))?;

    if let Some(recorded) = stored.current_amount {
        reconcile(&mut jar, recorded)?;
    }
    Ok(jar)
}

/// Make the history add up to `recorded` by appending an adjustment entry,
/// never by editing existing transactions.
pub(crate) fn reconcile(jar: &mut Jar, recorded: Decimal) -> Result<(), String> {
    if recorded == jar.current_amount {
        return Ok(());
    }
    let difference = recorded
        .checked_sub(jar.current_amount)
        .ok_or_else(|| format!("jar {} balance overflows", jar.id))?;
    tracing::warn!(
        jar = %jar.id,
        %recorded,
        history = %jar.current_amount,
        "balance does not match history, appending adjustment"
    );
    jar.apply(Transaction::new(difference, ADJUSTMENT_NOTE))
        .map_err(|e| e.to_string())
}
