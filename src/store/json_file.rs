use std::path::{Path, PathBuf};

use super::{encode_jars, legacy, write_atomic, JarStore};
use crate::errors::Result;
use crate::models::Jar;

pub(crate) const FILE_NAME: &str = "jars.json";
const BACKUP_SUFFIX: &str = "bak";

/// Jars stored as a JSON array in a single file, with a copy of the last
/// successful write kept alongside as a fallback.
pub(crate) struct JsonFileStore {
    path: PathBuf,
}

enum ReadOutcome {
    Loaded(Vec<Jar>),
    Missing,
    Corrupt,
}

impl JsonFileStore {
    pub(crate) fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self::at(dir.join(FILE_NAME)))
    }

    pub(crate) fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn backup_path(&self) -> PathBuf {
        self.path.with_extension(format!("json.{BACKUP_SUFFIX}"))
    }

    fn read(path: &Path) -> ReadOutcome {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return ReadOutcome::Missing,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read jar file");
                return ReadOutcome::Corrupt;
            }
        };
        match legacy::decode_bytes(&bytes) {
            Ok(decoded) if decoded.nothing_salvaged() => {
                tracing::warn!(path = %path.display(), "no readable jars in file");
                ReadOutcome::Corrupt
            }
            Ok(decoded) => ReadOutcome::Loaded(decoded.jars),
            Err(reason) => {
                tracing::warn!(path = %path.display(), %reason, "jar file is not valid JSON");
                ReadOutcome::Corrupt
            }
        }
    }
}

impl JarStore for JsonFileStore {
    fn load(&self) -> Vec<Jar> {
        match Self::read(&self.path) {
            ReadOutcome::Loaded(jars) => jars,
            ReadOutcome::Missing => {
                tracing::debug!(path = %self.path.display(), "no jar file yet, starting empty");
                Vec::new()
            }
            ReadOutcome::Corrupt => match Self::read(&self.backup_path()) {
                ReadOutcome::Loaded(jars) => {
                    tracing::warn!(
                        path = %self.backup_path().display(),
                        "recovered jars from last known good copy"
                    );
                    jars
                }
                _ => Vec::new(),
            },
        }
    }

    fn save(&self, jars: &[Jar]) -> Result<()> {
        let bytes = encode_jars(jars)?;
        write_atomic(&self.path, &bytes)?;
        if let Err(e) = write_atomic(&self.backup_path(), &bytes) {
            tracing::warn!(error = %e, "failed to refresh jar backup");
        }
        tracing::debug!(path = %self.path.display(), count = jars.len(), "saved jars");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
