use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::{WidgetReader, REFRESH_FILE, SNAPSHOT_FILE};
use crate::errors::Result;
use crate::models::{Jar, WidgetSnapshot};
use crate::store::write_atomic;

/// Receives the reduced view of the jars after every successful save.
pub(crate) trait SnapshotSink {
    fn publish_snapshot(&self, jars: &[Jar], selected: Option<Uuid>) -> Result<()>;

    /// Consume a pending "please refresh" signal from the reader.
    fn take_refresh_request(&self) -> bool;

    /// The featured jar recorded by the last publish, if any.
    fn last_selection(&self) -> Option<Uuid>;
}

/// Directory shared with the widget process. Only the writer side lives here;
/// the widget goes through [`WidgetReader`].
pub(crate) struct SharedContainer {
    dir: PathBuf,
}

impl SharedContainer {
    pub(crate) fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub(crate) fn snapshot_path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE)
    }

    fn refresh_path(&self) -> PathBuf {
        self.dir.join(REFRESH_FILE)
    }
}

impl SnapshotSink for SharedContainer {
    fn publish_snapshot(&self, jars: &[Jar], selected: Option<Uuid>) -> Result<()> {
        let snapshot = WidgetSnapshot::new(jars, selected);
        let bytes = serde_json::to_vec(&snapshot)?;
        write_atomic(&self.snapshot_path(), &bytes)?;
        tracing::debug!(
            path = %self.snapshot_path().display(),
            jars = jars.len(),
            selected = ?selected,
            "published widget snapshot"
        );
        Ok(())
    }

    fn take_refresh_request(&self) -> bool {
        match std::fs::remove_file(self.refresh_path()) {
            Ok(()) => {
                tracing::info!("widget requested a refresh");
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!(error = %e, "failed to clear refresh request");
                false
            }
        }
    }

    fn last_selection(&self) -> Option<Uuid> {
        WidgetReader::new(&self.dir)
            .read_raw()
            .and_then(|snapshot| snapshot.selected_jar_id)
    }
}
