mod json_file;
mod kv;
pub(crate) mod legacy;
#[cfg(test)]
mod memory;
mod schema;

use std::io::Write;
use std::path::Path;

use crate::errors::Result;
use crate::models::Jar;

pub(crate) use json_file::JsonFileStore;
pub(crate) use kv::KvStore;
#[cfg(test)]
pub(crate) use memory::MemoryStore;

/// Durable home of the jar collection.
///
/// `load` never fails: a missing store is a first run, and unreadable data is
/// logged and replaced by the best collection the backend can recover.
pub(crate) trait JarStore {
    fn load(&self) -> Vec<Jar>;
    fn save(&self, jars: &[Jar]) -> Result<()>;
    fn location(&self) -> String;
}

pub(crate) fn encode_jars(jars: &[Jar]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(jars)?)
}

/// Write `bytes` next to `path` and rename over it, so readers only ever see
/// the previous file or the complete new one.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::Builder::new().prefix(".tmp-").tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

#[cfg(test)]
mod tests;
