//! Record store.
//!
//! The store owns the authoritative identifier to record mapping and keeps a
//! [`PrefixIndex`] in step with it: every insert is mirrored into the index and
//! every removal deletes from it. Exact lookups go to the map, prefix queries
//! go to the index.
//!
//! Each successful mutation rewrites the persisted data through the store's
//! [`RecordRepository`]. If that write fails the in-memory change is kept and
//! the error is returned to the caller.

pub mod codec;
pub mod record;
pub mod repository;

use crate::data_structures::PrefixIndex;
use crate::error::StoreError;
use hashbrown::HashMap;
use tracing::{debug, info};

pub use record::{Record, RecordUpdate};
pub use repository::{FlatFileRepository, RecordRepository};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of resolving a user query against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'a> {
    /// The query is a stored identifier.
    Exact(&'a Record),
    /// The query is a prefix of these stored identifiers, sorted.
    Suggestions(Vec<String>),
    /// Nothing matches.
    NotFound,
}

/// Records keyed by identifier, with prefix lookup over the identifiers.
pub struct RecordStore {
    records: HashMap<String, Record>,
    index: PrefixIndex,
    repository: Box<dyn RecordRepository>,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("records", &self.records.len())
            .field("index", &self.index.len())
            .finish_non_exhaustive()
    }
}

impl RecordStore {
    /// Creates an empty store persisting through `repository`.
    ///
    /// Nothing is read until [`RecordStore::load`] is called.
    pub fn new<R: RecordRepository + 'static>(repository: R) -> Self {
        Self {
            records: HashMap::new(),
            index: PrefixIndex::new(),
            repository: Box::new(repository),
        }
    }

    /// Replaces the in-memory state with the persisted records.
    ///
    /// When the same identifier appears more than once the last occurrence
    /// wins. On error the store is left empty.
    ///
    /// # Returns
    ///
    /// The number of distinct records loaded.
    pub fn load(&mut self) -> StoreResult<usize> {
        self.records.clear();
        self.index.clear();

        for record in self.repository.load()? {
            self.index.insert(&record.id);
            self.records.insert(record.id.clone(), record);
        }

        info!(count = self.records.len(), "Record store loaded");
        Ok(self.records.len())
    }

    /// Adds a new record.
    ///
    /// # Errors
    ///
    /// * `EmptyIdentifier` / `EmptyName` for blank required fields
    /// * `InvalidScore` for a score that is not finite
    /// * `InvalidField` for a value the repository cannot store unchanged
    /// * `DuplicateIdentifier` if the identifier is already stored
    /// * `Io` if the record was added but could not be persisted
    pub fn add(&mut self, record: Record) -> StoreResult<()> {
        if record.id.trim().is_empty() {
            return Err(StoreError::EmptyIdentifier);
        }
        if record.name.trim().is_empty() {
            return Err(StoreError::EmptyName);
        }
        if !record.score.is_finite() {
            return Err(StoreError::InvalidScore(record.score.to_string()));
        }
        self.repository.validate(&record)?;
        if self.records.contains_key(&record.id) {
            return Err(StoreError::DuplicateIdentifier(record.id));
        }

        debug!(id = %record.id, "Adding record");
        self.index.insert(&record.id);
        self.records.insert(record.id.clone(), record);
        self.persist()
    }

    /// Returns the record stored under exactly `id`.
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    /// Returns `true` if `id` is stored.
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Resolves a full identifier or a prefix.
    pub fn lookup(&self, query: &str) -> Lookup<'_> {
        if let Some(record) = self.records.get(query) {
            return Lookup::Exact(record);
        }

        let suggestions = self.suggestions(query);
        if suggestions.is_empty() {
            Lookup::NotFound
        } else {
            Lookup::Suggestions(suggestions)
        }
    }

    /// Stored identifiers beginning with `prefix`, sorted.
    ///
    /// Only identifiers that are still present in the record map are
    /// returned.
    pub fn suggestions(&self, prefix: &str) -> Vec<String> {
        if !self.index.starts_with(prefix) {
            return Vec::new();
        }

        let mut suggestions = self.index.enumerate_with_prefix(prefix);
        suggestions.sort();
        suggestions.retain(|id| self.records.contains_key(id));
        suggestions
    }

    /// Changes the fields present in `update` on the record stored under `id`.
    ///
    /// # Errors
    ///
    /// * `NotFound` if `id` is not stored
    /// * `EmptyName` / `InvalidScore` / `InvalidField` for invalid new values
    /// * `Io` if the change was applied but could not be persisted
    pub fn update(&mut self, id: &str, update: RecordUpdate) -> StoreResult<&Record> {
        if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(StoreError::EmptyName);
        }
        if let Some(score) = update.score.filter(|s| !s.is_finite()) {
            return Err(StoreError::InvalidScore(score.to_string()));
        }

        let mut updated = self
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        updated.apply(update);
        self.repository.validate(&updated)?;
        self.records.insert(id.to_string(), updated);
        debug!(id, "Updated record");

        self.persist()?;
        self.records
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Removes the record stored under `id`.
    ///
    /// # Errors
    ///
    /// * `NotFound` if `id` is not stored
    /// * `Io` if the record was removed but the removal could not be persisted
    pub fn remove(&mut self, id: &str) -> StoreResult<Record> {
        let record = self
            .records
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.index.delete(id);
        debug!(id, "Removed record");

        self.persist()?;
        Ok(record)
    }

    /// All records, sorted by identifier.
    pub fn list(&self) -> Vec<&Record> {
        let mut all: Vec<&Record> = self.records.values().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no record is stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The identifier index backing prefix queries.
    pub fn index(&self) -> &PrefixIndex {
        &self.index
    }

    /// Writes the current state through the repository.
    pub fn flush(&self) -> StoreResult<()> {
        self.persist()
    }

    fn persist(&self) -> StoreResult<()> {
        let snapshot: Vec<Record> = self.list().into_iter().cloned().collect();
        self.repository.save(&snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::repository::MockRecordRepository;
    use super::*;

    fn seeded_repository(records: Vec<Record>) -> MockRecordRepository {
        let mut repository = MockRecordRepository::new();
        repository
            .expect_load()
            .times(1)
            .returning(move || Ok(records.clone()));
        repository
    }

    #[test]
    fn test_load_rebuilds_index() {
        let repository = seeded_repository(vec![
            Record::new("12A", "Ada", "Maths", 17.5),
            Record::new("12B", "Bo", "Art", 11.0),
            Record::new("12A", "Ada L.", "Maths", 18.0),
        ]);
        let mut store = RecordStore::new(repository);

        assert_eq!(store.load().unwrap(), 2);
        assert_eq!(store.get("12A").unwrap().name, "Ada L.");
        assert_eq!(store.index().len(), 2);
        assert!(store.index().search("12B"));
    }

    #[test]
    fn test_failed_load_leaves_store_empty() {
        let mut repository = MockRecordRepository::new();
        repository.expect_load().returning(|| {
            Err(StoreError::io(
                "students.csv",
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            ))
        });
        let mut store = RecordStore::new(repository);

        assert!(store.load().unwrap_err().is_io());
        assert!(store.is_empty());
        assert!(store.index().is_empty());
    }

    #[test]
    fn test_every_mutation_persists_sorted_snapshot() {
        let mut repository = MockRecordRepository::new();
        repository.expect_validate().times(3).returning(|_| Ok(()));
        let mut seq = mockall::Sequence::new();
        repository
            .expect_save()
            .withf(|records| records.len() == 1)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        repository
            .expect_save()
            .withf(|records| {
                records.iter().map(|r| r.id.as_str()).collect::<Vec<_>>() == ["12A", "12B"]
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        repository
            .expect_save()
            .withf(|records| records.len() == 2 && records[1].score == 15.0)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        repository
            .expect_save()
            .withf(|records| records.len() == 1 && records[0].id == "12B")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let mut store = RecordStore::new(repository);
        store.add(Record::new("12B", "Bo", "Art", 11.0)).unwrap();
        store.add(Record::new("12A", "Ada", "Maths", 17.5)).unwrap();
        store
            .update(
                "12B",
                RecordUpdate {
                    score: Some(15.0),
                    ..Default::default()
                },
            )
            .unwrap();
        store.remove("12A").unwrap();
    }

    #[test]
    fn test_rejected_mutations_do_not_persist() {
        let mut repository = MockRecordRepository::new();
        repository.expect_validate().returning(|_| Ok(()));
        repository.expect_save().times(1).returning(|_| Ok(()));
        let mut store = RecordStore::new(repository);

        store.add(Record::new("12A", "Ada", "Maths", 17.5)).unwrap();

        assert!(matches!(
            store.add(Record::new("12A", "Other", "Art", 1.0)),
            Err(StoreError::DuplicateIdentifier(id)) if id == "12A"
        ));
        assert!(matches!(
            store.add(Record::new("", "Nobody", "Art", 1.0)),
            Err(StoreError::EmptyIdentifier)
        ));
        assert!(matches!(
            store.add(Record::new("13C", "  ", "Art", 1.0)),
            Err(StoreError::EmptyName)
        ));
        assert!(matches!(
            store.add(Record::new("13C", "Cy", "Art", f64::NAN)),
            Err(StoreError::InvalidScore(_))
        ));
        assert!(matches!(
            store.update("99", RecordUpdate::default()),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.update(
                "12A",
                RecordUpdate {
                    name: Some(String::new()),
                    ..Default::default()
                }
            ),
            Err(StoreError::EmptyName)
        ));
        assert!(matches!(store.remove("99"), Err(StoreError::NotFound(_))));
        assert_eq!(store.get("12A").unwrap().name, "Ada");
    }

    #[test]
    fn test_failed_save_keeps_in_memory_change() {
        let mut repository = MockRecordRepository::new();
        repository.expect_validate().returning(|_| Ok(()));
        repository.expect_save().returning(|_| {
            Err(StoreError::io(
                "students.csv",
                std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            ))
        });
        let mut store = RecordStore::new(repository);

        assert!(store
            .add(Record::new("12A", "Ada", "Maths", 17.5))
            .unwrap_err()
            .is_io());
        assert!(store.contains("12A"));
        assert!(store.index().search("12A"));
    }

    #[test]
    fn test_unstorable_values_are_refused_before_mutating() {
        let mut repository = seeded_repository(vec![Record::new("12A", "Ada", "Maths", 17.5)]);
        repository
            .expect_validate()
            .withf(|record| record.name.contains(';'))
            .returning(|_| {
                Err(StoreError::InvalidField {
                    field: "name",
                    reason: "cannot contain the delimiter ';'".to_string(),
                })
            });
        repository.expect_save().never();
        let mut store = RecordStore::new(repository);
        store.load().unwrap();

        assert!(matches!(
            store.add(Record::new("12B", "Smith; Jr", "Art", 1.0)),
            Err(StoreError::InvalidField { field: "name", .. })
        ));
        assert!(matches!(
            store.update(
                "12A",
                RecordUpdate {
                    name: Some("Ada; L".to_string()),
                    ..Default::default()
                }
            ),
            Err(StoreError::InvalidField { .. })
        ));
        assert!(!store.contains("12B"));
        assert!(!store.index().search("12B"));
        assert_eq!(store.get("12A").unwrap().name, "Ada");
    }

    #[test]
    fn test_lookup_exact_prefix_and_missing() {
        let repository = seeded_repository(vec![
            Record::new("12A", "Ada", "Maths", 17.5),
            Record::new("12B", "Bo", "Art", 11.0),
            Record::new("13C", "Cy", "Music", 12.0),
        ]);
        let mut store = RecordStore::new(repository);
        store.load().unwrap();

        assert!(matches!(store.lookup("12A"), Lookup::Exact(r) if r.name == "Ada"));
        assert_eq!(
            store.lookup("12"),
            Lookup::Suggestions(vec!["12A".to_string(), "12B".to_string()])
        );
        assert_eq!(store.lookup("14"), Lookup::NotFound);
        assert_eq!(store.lookup(""), Lookup::NotFound);
        assert_eq!(store.suggestions("1").len(), 3);
    }

    #[test]
    fn test_remove_keeps_index_in_step() {
        let mut repository = seeded_repository(vec![
            Record::new("ab", "A", "X", 1.0),
            Record::new("abc", "B", "X", 2.0),
        ]);
        repository.expect_save().returning(|_| Ok(()));
        let mut store = RecordStore::new(repository);
        store.load().unwrap();

        let removed = store.remove("ab").unwrap();
        assert_eq!(removed.name, "A");
        assert!(!store.index().search("ab"));
        assert!(store.index().search("abc"));
        assert_eq!(store.lookup("ab"), Lookup::Suggestions(vec!["abc".to_string()]));
    }
}
