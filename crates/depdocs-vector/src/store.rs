//! Project-scoped JSON record store.
//!
//! One file per project at `<project>/<index_dir>/<index_file>`, holding
//! `{"entries": [...]}`. Every update loads the whole file, modifies it and
//! rewrites it through a uniquely named temporary sibling that is renamed into
//! place, so a reader sees either the old or the new contents. Updates to the
//! same file are serialized by a process-wide async mutex keyed by the
//! canonical store path, whichever `Store` instance issues them.

use std::collections::{BTreeMap, HashMap};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex};

use serde::{Deserialize, Serialize};
use tracing::debug;

use depdocs_core::config::CoreConfig;
use depdocs_core::types::Record;
use depdocs_core::{Error, Result};

type PathLock = Arc<tokio::sync::Mutex<()>>;

static LOCKS: LazyLock<Mutex<HashMap<PathBuf, PathLock>>> = LazyLock::new(|| Mutex::new(HashMap::new()));

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    entries: Vec<Record>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub records: usize,
    pub dimension: Option<usize>,
    pub dependencies: BTreeMap<String, usize>,
}

#[derive(Debug, Clone)]
pub struct Store {
    index_dir: String,
    index_file: String,
}

impl Default for Store {
    fn default() -> Self { Self::from_config(&CoreConfig::default()) }
}

impl Store {
    pub fn new(index_dir: impl Into<String>, index_file: impl Into<String>) -> Self {
        Self { index_dir: index_dir.into(), index_file: index_file.into() }
    }

    pub fn from_config(config: &CoreConfig) -> Self { Self::new(&config.index_dir, &config.index_file) }

    pub fn path_for(&self, project: &Path) -> PathBuf {
        project.join(&self.index_dir).join(&self.index_file)
    }

    pub async fn exists(&self, project: &Path) -> Result<bool> {
        let path = self.path_for(project);
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| Error::StorageRead(format!("{}: {e}", path.display())))
    }

    /// All records for `project`; empty when nothing has been indexed yet.
    pub async fn load(&self, project: &Path) -> Result<Vec<Record>> {
        read_records(&self.path_for(project)).await
    }

    /// Append `new_records` and return the total record count afterwards.
    pub async fn append(&self, project: &Path, new_records: Vec<Record>) -> Result<usize> {
        let added = new_records.len();
        self.update(project, move |records| {
            check_records(records, &new_records)?;
            records.extend(new_records);
            debug!(added, total = records.len(), "appending records");
            Ok(())
        })
        .await
    }

    /// Drop every record of `dependency`, then append `new_records`.
    pub async fn replace_dependency(&self, project: &Path, dependency: &str, new_records: Vec<Record>) -> Result<usize> {
        self.update(project, move |records| {
            let before = records.len();
            records.retain(|r| r.metadata.dependency_name != dependency);
            check_records(records, &new_records)?;
            debug!(dependency, removed = before - records.len(), added = new_records.len(), "replacing dependency records");
            records.extend(new_records);
            Ok(())
        })
        .await
    }

    pub async fn stats(&self, project: &Path) -> Result<StoreStats> {
        let records = self.load(project).await?;
        let mut stats = StoreStats {
            records: records.len(),
            dimension: records.first().map(|r| r.embedding.len()),
            dependencies: BTreeMap::new(),
        };
        for r in &records {
            *stats.dependencies.entry(r.metadata.dependency_name.clone()).or_default() += 1;
        }
        Ok(stats)
    }

    /// Locked load-modify-write cycle; returns the record count written.
    async fn update<F>(&self, project: &Path, modify: F) -> Result<usize>
    where
        F: FnOnce(&mut Vec<Record>) -> Result<()>,
    {
        let path = canonical_store_path(&self.path_for(project)).await?;
        let lock = acquire(&path);
        let result: Result<usize> = async {
            let _guard = lock.lock().await;
            let mut records = read_records(&path).await?;
            modify(&mut records)?;
            write_atomic(&path, &records).await?;
            debug!(path = %path.display(), total = records.len(), "store written");
            Ok(records.len())
        }
        .await;
        release(&path, lock);
        result
    }
}

/// Creates the index directory and resolves it, so every spelling of a
/// project path maps to the same lock and file.
async fn canonical_store_path(path: &Path) -> Result<PathBuf> {
    let (Some(parent), Some(file_name)) = (path.parent(), path.file_name()) else {
        return Err(write_err(path, "store path has no file name"));
    };
    tokio::fs::create_dir_all(parent).await.map_err(|e| write_err(path, e))?;
    let dir = match tokio::fs::canonicalize(parent).await {
        Ok(dir) => dir,
        Err(_) => std::path::absolute(parent).map_err(|e| write_err(path, e))?,
    };
    Ok(dir.join(file_name))
}

fn acquire(path: &Path) -> PathLock {
    let mut locks = LOCKS.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    Arc::clone(locks.entry(path.to_path_buf()).or_default())
}

/// Drops the registry entry once no other task holds or waits on it.
fn release(path: &Path, lock: PathLock) {
    let mut locks = LOCKS.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    // One reference in the map, one in `lock`.
    if Arc::strong_count(&lock) == 2 {
        locks.remove(path);
    }
}

#[cfg(test)]
fn is_tracked(path: &Path) -> bool {
    LOCKS.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).contains_key(path)
}

fn check_records(existing: &[Record], incoming: &[Record]) -> Result<()> {
    if let Some(bad) = incoming.iter().find(|r| r.embedding.iter().any(|x| !x.is_finite())) {
        return Err(Error::InvalidInput(format!(
            "embedding for '{}' contains non-finite values",
            bad.metadata.file_path
        )));
    }
    let Some(expected) = existing.first().or(incoming.first()).map(|r| r.embedding.len()) else {
        return Ok(());
    };
    match incoming.iter().find(|r| r.embedding.len() != expected) {
        Some(bad) => Err(Error::DimensionMismatch { expected, actual: bad.embedding.len() }),
        None => Ok(()),
    }
}

async fn read_records(path: &Path) -> Result<Vec<Record>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::StorageRead(format!("{}: {e}", path.display()))),
    };
    let file: StoreFile = serde_json::from_slice(&bytes)
        .map_err(|e| Error::StorageRead(format!("{}: {e}", path.display())))?;
    debug!(path = %path.display(), records = file.entries.len(), "loaded store");
    Ok(file.entries)
}

/// Write to a fresh temp file beside `path`, fsync, then rename over `path`.
/// The temp file is removed if anything fails before the rename.
async fn write_atomic(path: &Path, records: &[Record]) -> Result<()> {
    #[derive(Serialize)]
    struct StoreFileRef<'a> {
        entries: &'a [Record],
    }
    let json = serde_json::to_vec(&StoreFileRef { entries: records }).map_err(|e| write_err(path, e))?;

    let target = path.to_path_buf();
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        let mut temp = tempfile::Builder::new().prefix(".depdocs-").suffix(".tmp").tempfile_in(&dir)?;
        temp.write_all(&json)?;
        temp.as_file().sync_all()?;
        temp.persist(&target).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(|e| write_err(path, e))?
    .map_err(|e| write_err(path, e))
}

fn write_err(path: &Path, e: impl std::fmt::Display) -> Error {
    Error::StorageWrite(format!("{}: {e}", path.display()))
}
