use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::{JarColor, JarIcon, Jar};

/// Reduced view of a jar published for the widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JarSummary {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    #[serde(serialize_with = "super::amount::serialize")]
    pub(crate) current_amount: Decimal,
    #[serde(serialize_with = "super::amount::serialize")]
    pub(crate) target_amount: Decimal,
    pub(crate) color: JarColor,
    pub(crate) icon: JarIcon,
    #[serde(serialize_with = "super::amount::serialize")]
    pub(crate) progress_percentage: Decimal,
}

impl From<&Jar> for JarSummary {
    fn from(jar: &Jar) -> Self {
        Self {
            id: jar.id,
            name: jar.name.clone(),
            current_amount: jar.current_amount,
            target_amount: jar.target_amount,
            color: jar.color.clone(),
            icon: jar.icon.clone(),
            progress_percentage: jar.progress_percentage(),
        }
    }
}

/// The blob shared with the widget process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct WidgetSnapshot {
    #[serde(rename = "selectedJarID")]
    pub(crate) selected_jar_id: Option<Uuid>,
    #[serde(rename = "allJars")]
    pub(crate) all_jars: Vec<JarSummary>,
    #[serde(rename = "lastUpdated")]
    pub(crate) last_updated: DateTime<Utc>,
}

impl WidgetSnapshot {
    pub(crate) fn new(jars: &[Jar], selected_jar_id: Option<Uuid>) -> Self {
        Self {
            selected_jar_id,
            all_jars: jars.iter().map(JarSummary::from).collect(),
            last_updated: Utc::now(),
        }
    }

    /// The featured jar: the selected one if it still exists, otherwise the
    /// first jar, otherwise nothing.
    pub(crate) fn featured(&self) -> Option<&JarSummary> {
        self.selected_jar_id
            .and_then(|id| self.jar_by_id(id))
            .or_else(|| self.all_jars.first())
    }

    pub(crate) fn jar_by_id(&self, id: Uuid) -> Option<&JarSummary> {
        self.all_jars.iter().find(|j| j.id == id)
    }

    /// Rewrite `selected_jar_id` so it always names a jar in `all_jars`.
    pub(crate) fn revalidate_selection(&mut self) {
        self.selected_jar_id = self.featured().map(|j| j.id);
    }
}
