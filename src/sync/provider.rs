use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::models::{ratio, saturating_sum, JarSummary, WidgetSnapshot};

/// How often the widget recomputes its entry when nothing asks it to.
pub(crate) const REFRESH_INTERVAL_MINUTES: i64 = 15;

/// What the widget shows at a given moment, derived from the last snapshot.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WidgetEntry {
    pub(crate) featured: Option<JarSummary>,
    pub(crate) jar_count: usize,
    pub(crate) total_saved: Decimal,
    pub(crate) total_target: Decimal,
    pub(crate) total_progress: Decimal,
    pub(crate) last_updated: Option<DateTime<Utc>>,
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) next_refresh: DateTime<Utc>,
}

impl WidgetEntry {
    pub(crate) fn from_snapshot(snapshot: Option<&WidgetSnapshot>, now: DateTime<Utc>) -> Self {
        let Some(snapshot) = snapshot else {
            return Self::placeholder(now);
        };
        let total_saved = saturating_sum(snapshot.all_jars.iter().map(|j| j.current_amount));
        let total_target = saturating_sum(snapshot.all_jars.iter().map(|j| j.target_amount));
        Self {
            featured: snapshot.featured().cloned(),
            jar_count: snapshot.all_jars.len(),
            total_saved,
            total_target,
            total_progress: ratio(total_saved, total_target),
            last_updated: Some(snapshot.last_updated),
            generated_at: now,
            next_refresh: now + Duration::minutes(REFRESH_INTERVAL_MINUTES),
        }
    }

    /// Entry shown before the app has published anything.
    pub(crate) fn placeholder(now: DateTime<Utc>) -> Self {
        Self {
            featured: None,
            jar_count: 0,
            total_saved: Decimal::ZERO,
            total_target: Decimal::ZERO,
            total_progress: Decimal::ZERO,
            last_updated: None,
            generated_at: now,
            next_refresh: now + Duration::minutes(REFRESH_INTERVAL_MINUTES),
        }
    }

    /// Time since the app last published, if it ever has.
    pub(crate) fn age(&self) -> Option<Duration> {
        self.last_updated.map(|t| self.generated_at - t)
    }
}
