//! Durable media for constraint logs.
//!
//! The store never touches files directly. It reads and writes whole JSON
//! documents through a [`ConstraintStorage`], one document per [`Slot`]:
//! one snapshot per role, overwritten on every change, and the cumulative
//! merged log.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use crate::{Constraint, Role, schema::ConstraintFile};

/// A named document in a storage medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum Slot {
    #[display("{_0} snapshot")]
    Role(Role),
    #[display("merged log")]
    Merged,
}

impl Slot {
    /// File name used by [`JsonDirStorage`].
    #[must_use]
    pub fn file_name(self) -> String {
        match self {
            Slot::Role(role) => format!("constraints_{role}.json"),
            Slot::Merged => "constraints_merged.json".to_owned(),
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum StorageError {
    #[display("failed to access {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("malformed {slot}: {source}")]
    Json {
        slot: Slot,
        source: serde_json::Error,
    },
}

/// Whole-document storage for constraint logs.
pub trait ConstraintStorage {
    /// Returns the document in `slot`, or `None` if it does not exist.
    fn read(&self, slot: Slot) -> Result<Option<String>, StorageError>;

    /// Replaces the document in `slot`.
    fn write(&mut self, slot: Slot, contents: &str) -> Result<(), StorageError>;

    /// Deletes the document in `slot`; deleting a missing document succeeds.
    fn remove(&mut self, slot: Slot) -> Result<(), StorageError>;
}

impl<S> ConstraintStorage for &mut S
where
    S: ConstraintStorage + ?Sized,
{
    fn read(&self, slot: Slot) -> Result<Option<String>, StorageError> {
        (**self).read(slot)
    }

    fn write(&mut self, slot: Slot, contents: &str) -> Result<(), StorageError> {
        (**self).write(slot, contents)
    }

    fn remove(&mut self, slot: Slot) -> Result<(), StorageError> {
        (**self).remove(slot)
    }
}

/// Reads the document in `slot` without decoding its records. A missing
/// document is an empty file.
pub fn load_file<S>(storage: &S, slot: Slot) -> Result<ConstraintFile, StorageError>
where
    S: ConstraintStorage + ?Sized,
{
    let Some(contents) = storage.read(slot)? else {
        return Ok(ConstraintFile::default());
    };
    serde_json::from_str(&contents).map_err(|source| StorageError::Json { slot, source })
}

/// Like [`load_file`], but a malformed document is logged and treated as empty.
pub fn load_file_or_empty<S>(storage: &S, slot: Slot) -> Result<ConstraintFile, StorageError>
where
    S: ConstraintStorage + ?Sized,
{
    match load_file(storage, slot) {
        Err(StorageError::Json { source, .. }) => {
            tracing::warn!(%slot, error = %source, "discarding unreadable constraint log");
            Ok(ConstraintFile::default())
        }
        result => result,
    }
}

/// Reads and decodes the log in `slot`. A missing document is an empty log.
pub fn load<S>(storage: &S, slot: Slot) -> Result<Vec<Constraint>, StorageError>
where
    S: ConstraintStorage + ?Sized,
{
    Ok(load_file(storage, slot)?.into_constraints())
}

/// Like [`load`], but a malformed document is logged and treated as empty.
pub fn load_or_empty<S>(storage: &S, slot: Slot) -> Result<Vec<Constraint>, StorageError>
where
    S: ConstraintStorage + ?Sized,
{
    Ok(load_file_or_empty(storage, slot)?.into_constraints())
}

/// Writes `file` to `slot` as is, replacing what was there.
pub fn save_file<S>(storage: &mut S, slot: Slot, file: &ConstraintFile) -> Result<(), StorageError>
where
    S: ConstraintStorage + ?Sized,
{
    let contents =
        serde_json::to_string_pretty(file).map_err(|source| StorageError::Json { slot, source })?;
    storage.write(slot, &contents)
}

/// Encodes and writes `constraints` to `slot`, replacing what was there.
pub fn save<S>(storage: &mut S, slot: Slot, constraints: &[Constraint]) -> Result<(), StorageError>
where
    S: ConstraintStorage + ?Sized,
{
    save_file(storage, slot, &ConstraintFile::from_constraints(constraints))
}

/// Stores each slot as a JSON file inside one directory.
#[derive(Debug, Clone)]
pub struct JsonDirStorage {
    dir: PathBuf,
}

impl JsonDirStorage {
    /// The directory is created lazily on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path(&self, slot: Slot) -> PathBuf {
        self.dir.join(slot.file_name())
    }
}

impl ConstraintStorage for JsonDirStorage {
    fn read(&self, slot: Slot) -> Result<Option<String>, StorageError> {
        let path = self.path(slot);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn write(&mut self, slot: Slot, contents: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path(slot);
        fs::write(&path, contents).map_err(|source| StorageError::Io { path, source })
    }

    fn remove(&mut self, slot: Slot) -> Result<(), StorageError> {
        let path = self.path(slot);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

/// In-process storage, mainly for tests and embedding hosts that persist
/// elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    documents: BTreeMap<Slot, String>,
    writes: usize,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds `slot` with raw contents, which need not be valid JSON.
    #[must_use]
    pub fn with_document(mut self, slot: Slot, contents: impl Into<String>) -> Self {
        self.documents.insert(slot, contents.into());
        self
    }

    #[must_use]
    pub fn document(&self, slot: Slot) -> Option<&str> {
        self.documents.get(&slot).map(String::as_str)
    }

    /// Number of successful writes so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl ConstraintStorage for MemoryStorage {
    fn read(&self, slot: Slot) -> Result<Option<String>, StorageError> {
        Ok(self.documents.get(&slot).cloned())
    }

    fn write(&mut self, slot: Slot, contents: &str) -> Result<(), StorageError> {
        self.documents.insert(slot, contents.to_owned());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, slot: Slot) -> Result<(), StorageError> {
        self.documents.remove(&slot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Action, StateVector};

    fn sample() -> Vec<Constraint> {
        vec![
            Constraint::new(StateVector::new([0.1, 1.0, 0.0, 0.0, 0.5]), Action::Laser, 1.0),
            Constraint::new(StateVector::new([0.9, 0.0, 0.0, 1.0, 0.2]), Action::Escaping, 2.0)
                .with_epsilon(0.05),
        ]
    }

    #[test]
    fn test_slot_file_names() {
        assert_eq!(Slot::Role(Role::Server).file_name(), "constraints_server.json");
        assert_eq!(Slot::Role(Role::Client).file_name(), "constraints_client.json");
        assert_eq!(Slot::Merged.file_name(), "constraints_merged.json");
    }

    mod memory {
        use super::*;

        #[test]
        fn test_missing_is_empty() {
            let storage = MemoryStorage::new();
            assert!(load(&storage, Slot::Merged).unwrap().is_empty());
        }

        #[test]
        fn test_save_then_load() {
            let mut storage = MemoryStorage::new();
            save(&mut storage, Slot::Merged, &sample()).unwrap();
            assert_eq!(load(&storage, Slot::Merged).unwrap(), sample());
            assert_eq!(storage.write_count(), 1);
        }

        #[test]
        fn test_corrupt_document() {
            let storage = MemoryStorage::new().with_document(Slot::Merged, "{not json");
            assert!(matches!(
                load(&storage, Slot::Merged),
                Err(StorageError::Json {
                    slot: Slot::Merged,
                    ..
                })
            ));
            assert!(load_or_empty(&storage, Slot::Merged).unwrap().is_empty());
        }

        #[test]
        fn test_raw_file_keeps_undecodable_records() {
            let storage = MemoryStorage::new().with_document(
                Slot::Merged,
                r#"{"constraints":[
                    {"state":[0,0,0,0,0],"chosenAction":"dodge","timestamp":1},
                    {"state":[0,0,0,0,0],"chosenAction":"Laser","timestamp":2}
                ]}"#,
            );
            let file = load_file(&storage, Slot::Merged).unwrap();
            assert_eq!(file.constraints.len(), 2);
            assert_eq!(file.constraints[0].chosen_action, "dodge");
            assert_eq!(load(&storage, Slot::Merged).unwrap().len(), 1);
        }
    }

    mod json_dir {
        use super::*;

        #[test]
        fn test_roundtrip_and_remove() {
            let dir = tempfile::tempdir().unwrap();
            let mut storage = JsonDirStorage::new(dir.path().join("data"));
            let slot = Slot::Role(Role::Client);

            assert!(storage.read(slot).unwrap().is_none());
            save(&mut storage, slot, &sample()).unwrap();
            assert!(storage.path(slot).exists());
            assert_eq!(load(&storage, slot).unwrap(), sample());

            storage.remove(slot).unwrap();
            assert!(!storage.path(slot).exists());
            // removing twice is fine
            storage.remove(slot).unwrap();
        }

        #[test]
        fn test_reads_legacy_file() {
            let dir = tempfile::tempdir().unwrap();
            let storage = JsonDirStorage::new(dir.path());
            fs::write(
                storage.path(Slot::Merged),
                r#"{"constraints":[{"state":[0,1,0,0,1],"chosenAction":"showing up","timestamp":4.0}]}"#,
            )
            .unwrap();
            let constraints = load(&storage, Slot::Merged).unwrap();
            assert_eq!(constraints.len(), 1);
            assert_eq!(constraints[0].action(), Action::ShowingUp);
        }
    }
}
