use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::{JarColor, JarIcon, Transaction};
use crate::errors::{JarError, Result};

/// A named savings goal. `current_amount` always equals the sum of
/// `transactions`; the only ways to change it are [`Jar::apply`] and the
/// history compaction, which folds entries without changing the sum.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Jar {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    #[serde(serialize_with = "super::amount::serialize")]
    pub(crate) target_amount: Decimal,
    #[serde(serialize_with = "super::amount::serialize")]
    pub(crate) current_amount: Decimal,
    pub(crate) color: JarColor,
    pub(crate) icon: JarIcon,
    pub(crate) creation_date: DateTime<Utc>,
    pub(crate) transactions: Vec<Transaction>,
}

/// Fields supplied by the user when creating a jar.
#[derive(Debug, Clone)]
pub(crate) struct NewJar {
    pub(crate) name: String,
    pub(crate) target_amount: Decimal,
    pub(crate) color: JarColor,
    pub(crate) icon: JarIcon,
}

/// Partial metadata edit. `None` leaves the field as it is.
#[derive(Debug, Clone, Default)]
pub(crate) struct JarUpdate {
    pub(crate) name: Option<String>,
    pub(crate) target_amount: Option<Decimal>,
    pub(crate) color: Option<JarColor>,
    pub(crate) icon: Option<JarIcon>,
}

impl Jar {
    pub(crate) fn new(new_jar: NewJar) -> Result<Self> {
        let name = validate_name(&new_jar.name)?;
        validate_target(new_jar.target_amount)?;
        validate_appearance(&new_jar.color, &new_jar.icon)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            target_amount: new_jar.target_amount,
            current_amount: Decimal::ZERO,
            color: new_jar.color,
            icon: new_jar.icon,
            creation_date: Utc::now(),
            transactions: Vec::new(),
        })
    }

    /// Append a transaction and move the balance by its amount.
    pub(crate) fn apply(&mut self, transaction: Transaction) -> Result<()> {
        let balance = self
            .current_amount
            .checked_add(transaction.amount)
            .ok_or_else(|| JarError::validation("amount overflows the jar balance"))?;
        self.current_amount = balance;
        self.transactions.push(transaction);
        Ok(())
    }

    pub(crate) fn deposit(&mut self, amount: Decimal, note: &str) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(JarError::validation("deposit amount must be positive"));
        }
        self.apply(Transaction::new(amount, note))
    }

    /// Withdraw `amount` (given as a positive number). The jar is untouched
    /// when the balance does not cover it.
    pub(crate) fn withdraw(&mut self, amount: Decimal, note: &str) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(JarError::validation("withdrawal amount must be positive"));
        }
        if amount > self.current_amount {
            return Err(JarError::InsufficientFunds {
                jar: self.name.clone(),
                requested: amount,
                available: self.current_amount,
            });
        }
        self.apply(Transaction::new(-amount, note))
    }

    /// Apply a metadata edit. Every supplied field is validated before any
    /// of them is written, so a rejected update leaves the jar unchanged.
    pub(crate) fn update_metadata(&mut self, update: JarUpdate) -> Result<()> {
        let name = update.name.as_deref().map(validate_name).transpose()?;
        if let Some(target) = update.target_amount {
            validate_target(target)?;
        }
        // Only supplied tags are checked; a legacy tag already on the jar stays.
        validate_appearance(
            update.color.as_ref().unwrap_or(&JarColor::Blue),
            update.icon.as_ref().unwrap_or(&JarIcon::Banknote),
        )?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(target) = update.target_amount {
            self.target_amount = target;
        }
        if let Some(color) = update.color {
            self.color = color;
        }
        if let Some(icon) = update.icon {
            self.icon = icon;
        }
        Ok(())
    }

    /// Share of the target reached, clamped to `[0, 1]`.
    pub(crate) fn progress_percentage(&self) -> Decimal {
        ratio(self.current_amount, self.target_amount)
    }

    pub(crate) fn remaining(&self) -> Decimal {
        self.target_amount
            .saturating_sub(self.current_amount)
            .max(Decimal::ZERO)
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.target_amount > Decimal::ZERO && self.current_amount >= self.target_amount
    }

    /// Sum of the history, or `None` when it does not fit in a `Decimal`.
    pub(crate) fn transaction_total(&self) -> Option<Decimal> {
        checked_sum(self.transactions.iter().map(|t| t.amount))
    }

    pub(crate) fn is_balanced(&self) -> bool {
        self.transaction_total() == Some(self.current_amount)
    }

    /// Fold the oldest transactions into a single carried-forward entry so
    /// that at most `limit` remain. Returns how many entries were folded.
    pub(crate) fn compact_history(&mut self, limit: usize) -> usize {
        let limit = limit.max(1);
        if self.transactions.len() <= limit {
            return 0;
        }
        let fold = self.transactions.len() - limit + 1;
        // A prefix that cannot be summed is left alone.
        let Some(amount) = checked_sum(self.transactions[..fold].iter().map(|t| t.amount)) else {
            return 0;
        };
        let folded: Vec<Transaction> = self.transactions.drain(..fold).collect();
        let date = folded.last().map_or(self.creation_date, |t| t.date);
        self.transactions.insert(
            0,
            Transaction::at(amount, date, format!("Carried forward ({fold} transactions)")),
        );
        fold
    }
}

/// Sum of all balances, saturating at `Decimal::MAX`.
pub(crate) fn total_saved(jars: &[Jar]) -> Decimal {
    saturating_sum(jars.iter().map(|j| j.current_amount))
}

pub(crate) fn total_target(jars: &[Jar]) -> Decimal {
    saturating_sum(jars.iter().map(|j| j.target_amount))
}

fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
}

pub(crate) fn saturating_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts
        .into_iter()
        .fold(Decimal::ZERO, |acc, amount| acc.saturating_add(amount))
}

pub(crate) fn total_progress(jars: &[Jar]) -> Decimal {
    ratio(total_saved(jars), total_target(jars))
}

pub(crate) fn ratio(current: Decimal, target: Decimal) -> Decimal {
    if target <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    match current.checked_div(target) {
        Some(p) => p.clamp(Decimal::ZERO, Decimal::ONE),
        None if current > Decimal::ZERO => Decimal::ONE,
        None => Decimal::ZERO,
    }
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(JarError::validation("name must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn validate_target(target: Decimal) -> Result<()> {
    if target <= Decimal::ZERO {
        return Err(JarError::validation(format!(
            "target amount must be greater than zero (got {target})"
        )));
    }
    Ok(())
}

fn validate_appearance(color: &JarColor, icon: &JarIcon) -> Result<()> {
    if !color.is_known() {
        return Err(JarError::validation(format!("unknown color '{color}'")));
    }
    if !icon.is_known() {
        return Err(JarError::validation(format!("unknown icon '{icon}'")));
    }
    Ok(())
}
