use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::{REFRESH_FILE, SNAPSHOT_FILE};
use crate::errors::Result;
use crate::models::{amount, ratio, JarColor, JarIcon, JarSummary, WidgetSnapshot};
use crate::store::legacy::FlexibleDate;
use crate::store::write_atomic;

/// Read-only view of the shared container, as used by the widget.
///
/// Nothing here touches jar data. The only write is
/// [`WidgetReader::request_refresh`], which asks the app to publish again.
pub(crate) struct WidgetReader {
    dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSummary {
    id: Uuid,
    name: String,
    #[serde(deserialize_with = "amount::deserialize")]
    current_amount: Decimal,
    #[serde(deserialize_with = "amount::deserialize")]
    target_amount: Decimal,
    #[serde(default)]
    color: Option<JarColor>,
    #[serde(default)]
    icon: Option<JarIcon>,
}

#[derive(Debug, Deserialize)]
struct StoredSnapshot {
    #[serde(rename = "selectedJarID", alias = "selectedJarId", default)]
    selected_jar_id: Option<Uuid>,
    #[serde(rename = "allJars", default)]
    all_jars: Vec<StoredSummary>,
    #[serde(rename = "lastUpdated", default)]
    last_updated: Option<FlexibleDate>,
}

impl From<StoredSummary> for JarSummary {
    fn from(s: StoredSummary) -> Self {
        Self {
            id: s.id,
            progress_percentage: ratio(s.current_amount, s.target_amount),
            name: s.name,
            current_amount: s.current_amount,
            target_amount: s.target_amount,
            color: s.color.unwrap_or_default(),
            icon: s.icon.unwrap_or_default(),
        }
    }
}

impl WidgetReader {
    pub(crate) fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// The published snapshot with its selection checked against its own
    /// jar list. `None` when nothing readable has been published.
    pub(crate) fn read_snapshot(&self) -> Option<WidgetSnapshot> {
        let mut snapshot = self.read_raw()?;
        snapshot.revalidate_selection();
        Some(snapshot)
    }

    pub(crate) fn all_jars(&self) -> Vec<JarSummary> {
        self.read_snapshot()
            .map(|s| s.all_jars)
            .unwrap_or_default()
    }

    pub(crate) fn jar_by_id(&self, id: Uuid) -> Option<JarSummary> {
        self.read_snapshot()?.jar_by_id(id).cloned()
    }

    pub(crate) fn featured_jar(&self) -> Option<JarSummary> {
        self.read_snapshot()?.featured().cloned()
    }

    pub(crate) fn request_refresh(&self) -> Result<()> {
        write_atomic(
            &self.dir.join(REFRESH_FILE),
            Utc::now().to_rfc3339().as_bytes(),
        )
    }

    pub(crate) fn read_raw(&self) -> Option<WidgetSnapshot> {
        let path = self.dir.join(SNAPSHOT_FILE);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no widget snapshot published yet");
                return None;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read widget snapshot");
                return None;
            }
        };
        match serde_json::from_slice::<StoredSnapshot>(&bytes) {
            Ok(stored) => Some(WidgetSnapshot {
                selected_jar_id: stored.selected_jar_id,
                all_jars: stored.all_jars.into_iter().map(JarSummary::from).collect(),
                last_updated: stored.last_updated.map_or_else(Utc::now, |d| d.0),
            }),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "widget snapshot is unreadable");
                None
            }
        }
    }
}
