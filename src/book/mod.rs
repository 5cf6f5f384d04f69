use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::{JarError, Result};
use crate::import::{self, ExportFormat, ImportStrategy};
use crate::models::{self, Jar, JarUpdate, NewJar, Transaction};
use crate::store::JarStore;
use crate::sync::SnapshotSink;

#[derive(Debug, Clone, Default)]
pub(crate) struct BookOptions {
    /// Keep at most this many transactions per jar, folding older ones into
    /// a carried-forward entry. `None` keeps everything.
    pub(crate) history_limit: Option<usize>,
}

/// Counts reported back to the user after an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ImportSummary {
    pub(crate) imported: usize,
    pub(crate) skipped: usize,
}

/// The active jar collection and the services it is persisted through.
///
/// Every mutation is written to the store before it returns and then pushed
/// to the snapshot sink. A failed save is reported, but the in-memory
/// collection keeps the change and the next successful save carries it.
pub(crate) struct JarBook {
    jars: Vec<Jar>,
    selected: Option<Uuid>,
    store: Box<dyn JarStore>,
    sink: Box<dyn SnapshotSink>,
    options: BookOptions,
}

impl JarBook {
    pub(crate) fn open(
        store: Box<dyn JarStore>,
        sink: Box<dyn SnapshotSink>,
        options: BookOptions,
    ) -> Self {
        let mut book = Self {
            jars: Vec::new(),
            selected: sink.last_selection(),
            store,
            sink,
            options,
        };
        book.resume();
        book
    }

    pub(crate) fn jars(&self) -> &[Jar] {
        &self.jars
    }

    pub(crate) fn jar(&self, id: Uuid) -> Option<&Jar> {
        self.jars.iter().find(|j| j.id == id)
    }

    /// Resolve a user-typed reference: full id, unambiguous id prefix, or
    /// case-insensitive name.
    pub(crate) fn find_jar(&self, query: &str) -> Option<&Jar> {
        let query = query.trim();
        if let Ok(id) = Uuid::parse_str(query) {
            return self.jar(id);
        }
        let lower = query.to_lowercase();
        if lower.len() >= 4 {
            let mut by_prefix = self
                .jars
                .iter()
                .filter(|j| j.id.to_string().starts_with(&lower));
            if let (Some(jar), None) = (by_prefix.next(), by_prefix.next()) {
                return Some(jar);
            }
        }
        self.jars.iter().find(|j| j.name.to_lowercase() == lower)
    }

    pub(crate) fn selected(&self) -> Option<Uuid> {
        self.selected
    }

    /// The jar the widget features: the selection, else the first jar.
    pub(crate) fn featured(&self) -> Option<&Jar> {
        self.selected
            .and_then(|id| self.jar(id))
            .or_else(|| self.jars.first())
    }

    pub(crate) fn total_saved(&self) -> Decimal {
        models::total_saved(&self.jars)
    }

    pub(crate) fn total_target(&self) -> Decimal {
        models::total_target(&self.jars)
    }

    pub(crate) fn total_progress(&self) -> Decimal {
        models::total_progress(&self.jars)
    }

    // ── Mutations ─────────────────────────────────────────────

    pub(crate) fn create_jar(&mut self, new_jar: NewJar) -> Result<&Jar> {
        let jar = Jar::new(new_jar)?;
        tracing::info!(jar = %jar.id, name = %jar.name, "created jar");
        self.jars.push(jar);
        let idx = self.jars.len() - 1;
        self.commit()?;
        Ok(&self.jars[idx])
    }

    pub(crate) fn add_transaction(&mut self, id: Uuid, transaction: Transaction) -> Result<&Jar> {
        let idx = self.position(id)?;
        tracing::info!(jar = %id, amount = %transaction.amount, "recording transaction");
        self.jars[idx].apply(transaction)?;
        self.after_append(idx);
        self.commit()?;
        Ok(&self.jars[idx])
    }

    pub(crate) fn deposit(&mut self, id: Uuid, amount: Decimal, note: &str) -> Result<&Jar> {
        let idx = self.position(id)?;
        self.jars[idx].deposit(amount, note)?;
        tracing::info!(jar = %id, %amount, "deposit");
        self.after_append(idx);
        self.commit()?;
        Ok(&self.jars[idx])
    }

    pub(crate) fn withdraw(&mut self, id: Uuid, amount: Decimal, note: &str) -> Result<&Jar> {
        let idx = self.position(id)?;
        self.jars[idx].withdraw(amount, note)?;
        tracing::info!(jar = %id, %amount, "withdrawal");
        self.after_append(idx);
        self.commit()?;
        Ok(&self.jars[idx])
    }

    pub(crate) fn update_jar_metadata(&mut self, id: Uuid, update: JarUpdate) -> Result<&Jar> {
        let idx = self.position(id)?;
        self.jars[idx].update_metadata(update)?;
        tracing::info!(jar = %id, "updated jar");
        self.commit()?;
        Ok(&self.jars[idx])
    }

    pub(crate) fn delete_jar(&mut self, id: Uuid) -> Result<Jar> {
        let idx = self.position(id)?;
        let removed = self.jars.remove(idx);
        if self.selected == Some(id) {
            self.selected = None;
        }
        tracing::info!(jar = %id, name = %removed.name, "deleted jar");
        self.commit()?;
        Ok(removed)
    }

    /// Feature a jar in the widget, or clear the choice with `None`.
    pub(crate) fn select_jar(&mut self, id: Option<Uuid>) -> Result<()> {
        if let Some(id) = id {
            self.position(id)?;
        }
        self.selected = id;
        self.commit()
    }

    pub(crate) fn import_all(&mut self, bytes: &[u8], strategy: ImportStrategy) -> Result<ImportSummary> {
        let outcome = import::import_all(&self.jars, bytes, strategy)?;
        tracing::info!(
            imported = outcome.imported,
            skipped = outcome.skipped,
            ?strategy,
            "imported jars"
        );
        self.jars = outcome.jars;
        self.revalidate_selection();
        self.commit()?;
        Ok(ImportSummary {
            imported: outcome.imported,
            skipped: outcome.skipped,
        })
    }

    pub(crate) fn export_all(&self, format: ExportFormat) -> Result<Vec<u8>> {
        import::export_all(&self.jars, format)
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Flush before the process goes away.
    pub(crate) fn suspend(&self) -> Result<()> {
        self.commit()
    }

    /// Pick up whatever is in the store now, and republish if the widget
    /// asked for it. Returns whether a publish happened.
    pub(crate) fn resume(&mut self) -> bool {
        self.jars = self.store.load();
        tracing::info!(count = self.jars.len(), location = %self.store.location(), "loaded jars");
        self.revalidate_selection();
        if self.sink.take_refresh_request() {
            self.publish();
            return true;
        }
        false
    }

    pub(crate) fn publish(&self) {
        if let Err(e) = self.sink.publish_snapshot(&self.jars, self.selected) {
            tracing::warn!(error = %e, "failed to publish widget snapshot");
        }
    }

    fn commit(&self) -> Result<()> {
        self.store.save(&self.jars)?;
        self.publish();
        Ok(())
    }

    fn after_append(&mut self, idx: usize) {
        if let Some(limit) = self.options.history_limit {
            let folded = self.jars[idx].compact_history(limit);
            if folded > 0 {
                tracing::debug!(jar = %self.jars[idx].id, folded, limit, "compacted history");
            }
        }
    }

    fn position(&self, id: Uuid) -> Result<usize> {
        self.jars
            .iter()
            .position(|j| j.id == id)
            .ok_or(JarError::NotFound { id })
    }

    fn revalidate_selection(&mut self) {
        if let Some(id) = self.selected {
            if self.jar(id).is_none() {
                tracing::debug!(jar = %id, "featured jar no longer exists, clearing");
                self.selected = None;
            }
        }
    }
}
