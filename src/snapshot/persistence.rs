//! `PersistenceController` — atomic save/load with backup rotation and
//! recovery, grounded on the teacher's append-only writer conventions
//! (temp-file-then-rename, explicit failure kinds).

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::graph::GraphStore;
use crate::types::{GraphError, GraphResult};

use super::codec::{SnapshotCodec, SnapshotDocument};

/// Coordinates snapshot persistence for a single graph path.
pub struct PersistenceController;

fn backup_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".backup");
    PathBuf::from(s)
}

fn timestamped_backup_path(path: &Path) -> PathBuf {
    let stamp = Utc::now().format("%Y-%m-%dT%H-%M-%S");
    let mut s = path.as_os_str().to_owned();
    s.push(format!(".backup.{stamp}"));
    PathBuf::from(s)
}

impl PersistenceController {
    /// Serialize `store` and write it atomically to `path`: serialize to a
    /// temporary sibling file, then rename over the destination. Creates
    /// parent directories as needed.
    pub fn save(store: &GraphStore, path: &Path) -> GraphResult<()> {
        let doc = SnapshotCodec::encode(store);
        Self::save_document(&doc, path)
    }

    fn save_document(doc: &SnapshotDocument, path: &Path) -> GraphResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = SnapshotCodec::to_json(doc)?;
        let tmp_path = {
            let mut s = path.as_os_str().to_owned();
            s.push(".tmp");
            PathBuf::from(s)
        };
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;
        log::info!("saved snapshot to {path:?} ({} nodes, {} edges)", doc.nodes.len(), doc.edges.len());
        Ok(())
    }

    /// Like [`Self::save`], but first copies any existing file at `path` to
    /// `<path>.backup`.
    pub fn save_with_backup(store: &GraphStore, path: &Path) -> GraphResult<()> {
        if path.exists() {
            let backup = backup_path(path);
            fs::copy(path, &backup)?;
            log::info!("backed up {path:?} to {backup:?} before save");
        }
        Self::save(store, path)
    }

    /// Copy `path` to a freshly UTC-timestamped backup file and return its
    /// path.
    pub fn create_backup(path: &Path) -> GraphResult<PathBuf> {
        let backup = timestamped_backup_path(path);
        fs::copy(path, &backup)?;
        log::info!("created backup {backup:?}");
        Ok(backup)
    }

    /// List all timestamped backups of `path`, newest first.
    pub fn list_backups(path: &Path) -> GraphResult<Vec<PathBuf>> {
        let parent = path.parent().filter(|p| !p.as_os_str().is_empty()).map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| GraphError::InvalidData("path has no file name".into()))?;
        let prefix = format!("{file_name}.backup.");

        let mut backups: Vec<PathBuf> = Vec::new();
        if parent.is_dir() {
            for entry in fs::read_dir(&parent)? {
                let entry = entry?;
                if let Some(name) = entry.file_name().to_str() {
                    if name.starts_with(&prefix) {
                        backups.push(entry.path());
                    }
                }
            }
        }
        backups.sort();
        backups.reverse();
        Ok(backups)
    }

    /// Delete all but the newest `keep_n` timestamped backups of `path`.
    pub fn cleanup_old_backups(path: &Path, keep_n: usize) -> GraphResult<usize> {
        let backups = Self::list_backups(path)?;
        let mut removed = 0;
        for stale in backups.into_iter().skip(keep_n) {
            fs::remove_file(&stale)?;
            removed += 1;
        }
        Ok(removed)
    }

    /// Load and fully validate a snapshot document from `path`.
    pub fn load(path: &Path) -> GraphResult<SnapshotDocument> {
        if !path.exists() {
            return Err(GraphError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("snapshot not found at {path:?}"),
            )));
        }
        let text = fs::read_to_string(path)?;
        SnapshotCodec::from_json(&text)
    }

    /// Load `path`; on any failure, fall back to `<path>.backup`. Fails
    /// with `NoBackup` if neither loads.
    pub fn load_with_recovery(path: &Path) -> GraphResult<SnapshotDocument> {
        match Self::load(path) {
            Ok(doc) => Ok(doc),
            Err(primary_err) => {
                let backup = backup_path(path);
                log::warn!("primary snapshot {path:?} failed ({primary_err}), trying backup {backup:?}");
                Self::load(&backup).map_err(|_| {
                    GraphError::NoBackup(format!("no usable backup for {path:?}"))
                })
            }
        }
    }

    /// Load a snapshot and apply it into a fresh [`GraphStore`].
    pub fn load_into_new_store(path: &Path) -> GraphResult<GraphStore> {
        let doc = Self::load(path)?;
        let mut store = GraphStore::new();
        SnapshotCodec::apply(&mut store, doc)?;
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Content, Information, Relationship};
    use tempfile::tempdir;

    fn sample_store() -> GraphStore {
        let mut store = GraphStore::new();
        store
            .add_node(Information::new("a", Content::String("x".into()), "fact").unwrap(), None)
            .unwrap();
        store
            .add_node(Information::new("b", Content::Null, "fact").unwrap(), None)
            .unwrap();
        store
            .add_edge(Relationship::new("a", "b", "related_to", 0.5).unwrap(), None)
            .unwrap();
        store
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.json");
        let store = sample_store();
        PersistenceController::save(&store, &path).unwrap();
        let loaded = PersistenceController::load_into_new_store(&path).unwrap();
        assert_eq!(loaded.node_count(), 2);
        assert_eq!(loaded.edge_count(), 1);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let err = PersistenceController::load(&path).unwrap_err();
        assert!(matches!(err, GraphError::Io(_)));
    }

    #[test]
    fn save_with_backup_preserves_prior_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.json");
        let first = GraphStore::new();
        PersistenceController::save(&first, &path).unwrap();
        let second = sample_store();
        PersistenceController::save_with_backup(&second, &path).unwrap();
        assert!(backup_path(&path).exists());
        let backup_doc = PersistenceController::load(&backup_path(&path)).unwrap();
        assert_eq!(backup_doc.nodes.len(), 0);
    }

    #[test]
    fn load_with_recovery_falls_back_to_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.json");
        let store = sample_store();
        PersistenceController::save(&store, &path).unwrap();
        let backup = backup_path(&path);
        fs::copy(&path, &backup).unwrap();
        fs::write(&path, "{not valid json").unwrap();
        let recovered = PersistenceController::load_with_recovery(&path).unwrap();
        assert_eq!(recovered.nodes.len(), 2);
    }

    #[test]
    fn load_with_recovery_fails_with_no_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.json");
        fs::write(&path, "{not valid json").unwrap();
        let err = PersistenceController::load_with_recovery(&path).unwrap_err();
        assert!(matches!(err, GraphError::NoBackup(_)));
    }

    #[test]
    fn cleanup_old_backups_keeps_newest_n() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.json");
        for _ in 0..3 {
            PersistenceController::create_backup(&{
                let store = sample_store();
                PersistenceController::save(&store, &path).unwrap();
                path.clone()
            })
            .unwrap();
            std::thread::sleep(std::time::Duration::from_millis(1100));
        }
        let removed = PersistenceController::cleanup_old_backups(&path, 1).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(PersistenceController::list_backups(&path).unwrap().len(), 1);
    }
}
