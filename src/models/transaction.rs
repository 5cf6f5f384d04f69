use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// A signed balance change recorded against a jar. Deposits are positive,
/// withdrawals negative. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Transaction {
    pub(crate) id: Uuid,
    #[serde(serialize_with = "super::amount::serialize")]
    pub(crate) amount: Decimal,
    pub(crate) date: DateTime<Utc>,
    pub(crate) note: String,
}

impl Transaction {
    pub(crate) fn new(amount: Decimal, note: impl Into<String>) -> Self {
        Self::at(amount, Utc::now(), note)
    }

    pub(crate) fn at(amount: Decimal, date: DateTime<Utc>, note: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            date,
            note: note.into(),
        }
    }

    pub(crate) fn is_deposit(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub(crate) fn is_withdrawal(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    pub(crate) fn abs_amount(&self) -> Decimal {
        self.amount.abs()
    }
}
