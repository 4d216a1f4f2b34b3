use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document};

use super::error::StoreError;
use super::filter::{Filter, lookup};
use super::traits::{DocumentStore, IndexSpec};

/// Name MongoDB gives the implicit primary-key index.
const ID_INDEX: &str = "_id_";

#[derive(Debug, Default)]
struct Collection {
    documents: Vec<Document>,
    indexes: Vec<IndexSpec>,
}

type Databases = HashMap<String, BTreeMap<String, Collection>>;

/// In-process document store.
///
/// Handles created with [`MemoryStore::with_database`] share state, the same
/// way two `Database` handles from one MongoDB client see the same server.
/// Unique indexes are enforced, missing fields index as `null` unless the
/// index is sparse, and documents without `_id` get a fresh `ObjectId`.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    database: String,
    databases: Arc<Mutex<Databases>>,
}

impl MemoryStore {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            databases: Arc::default(),
        }
    }

    /// Another logical database on the same in-process server.
    pub fn with_database(&self, database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            databases: Arc::clone(&self.databases),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Databases>, StoreError> {
        self.databases
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }
}

fn index_key(document: &Document, index: &IndexSpec) -> Option<Bson> {
    match lookup(document, &index.field) {
        Some(value) => Some(value.clone()),
        None if index.sparse => None,
        None => Some(Bson::Null),
    }
}

fn duplicate(index: &IndexSpec, key: &Bson) -> StoreError {
    StoreError::DuplicateKey(format!(
        "index {} dup key: {{ {}: {} }}",
        index.name(),
        index.field,
        key
    ))
}

impl Collection {
    fn insert(&mut self, mut document: Document) -> Result<(), StoreError> {
        if !document.contains_key("_id") {
            document.insert("_id", ObjectId::new());
        }

        let id = document.get("_id").cloned().unwrap_or(Bson::Null);
        if self.documents.iter().any(|d| d.get("_id") == Some(&id)) {
            return Err(StoreError::DuplicateKey(format!(
                "index {ID_INDEX} dup key: {{ _id: {id} }}"
            )));
        }

        for index in self.indexes.iter().filter(|i| i.unique) {
            let Some(key) = index_key(&document, index) else {
                continue;
            };
            let clash = self
                .documents
                .iter()
                .any(|existing| index_key(existing, index).as_ref() == Some(&key));
            if clash {
                return Err(duplicate(index, &key));
            }
        }

        self.documents.push(document);
        Ok(())
    }

    fn add_index(&mut self, index: &IndexSpec) -> Result<(), StoreError> {
        if self.indexes.iter().any(|i| i.name() == index.name()) {
            return Ok(());
        }

        if index.unique {
            let mut seen: Vec<Bson> = Vec::new();
            for key in self.documents.iter().filter_map(|d| index_key(d, index)) {
                if seen.contains(&key) {
                    return Err(duplicate(index, &key));
                }
                seen.push(key);
            }
        }

        self.indexes.push(index.clone());
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn database_name(&self) -> &str {
        &self.database
    }

    async fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        let databases = self.lock()?;
        Ok(databases
            .get(&self.database)
            .map(|collections| collections.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn create_collection(&self, name: &str) -> Result<(), StoreError> {
        let mut databases = self.lock()?;
        let collections = databases.entry(self.database.clone()).or_default();
        if collections.contains_key(name) {
            return Err(StoreError::Backend(format!(
                "collection {}.{name} already exists",
                self.database
            )));
        }
        collections.insert(name.to_string(), Collection::default());
        Ok(())
    }

    async fn index_names(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        let databases = self.lock()?;
        let Some(found) = databases
            .get(&self.database)
            .and_then(|collections| collections.get(collection))
        else {
            return Ok(Vec::new());
        };
        let mut names = vec![ID_INDEX.to_string()];
        names.extend(found.indexes.iter().map(IndexSpec::name));
        Ok(names)
    }

    async fn create_index(
        &self,
        collection: &str,
        index: &IndexSpec,
    ) -> Result<String, StoreError> {
        let mut databases = self.lock()?;
        databases
            .entry(self.database.clone())
            .or_default()
            .entry(collection.to_string())
            .or_default()
            .add_index(index)?;
        Ok(index.name())
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        let mut databases = self.lock()?;
        databases
            .entry(self.database.clone())
            .or_default()
            .entry(collection.to_string())
            .or_default()
            .insert(document)
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<usize, StoreError> {
        let mut databases = self.lock()?;
        let target = databases
            .entry(self.database.clone())
            .or_default()
            .entry(collection.to_string())
            .or_default();

        let mut inserted = 0;
        for document in documents {
            target.insert(document)?;
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError> {
        let databases = self.lock()?;
        let Some(found) = databases
            .get(&self.database)
            .and_then(|collections| collections.get(collection))
        else {
            return Ok(Vec::new());
        };
        Ok(found
            .documents
            .iter()
            .filter(|d| filter.matches(d))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let databases = self.lock()?;
        Ok(databases
            .get(&self.database)
            .and_then(|collections| collections.get(collection))
            .map(|found| found.documents.iter().filter(|d| filter.matches(d)).count() as u64)
            .unwrap_or(0))
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let mut databases = self.lock()?;
        let Some(found) = databases
            .get_mut(&self.database)
            .and_then(|collections| collections.get_mut(collection))
        else {
            return Ok(0);
        };
        let before = found.documents.len();
        found.documents.retain(|d| !filter.matches(d));
        Ok((before - found.documents.len()) as u64)
    }

    async fn distinct_strings(
        &self,
        collection: &str,
        field: &str,
    ) -> Result<Vec<String>, StoreError> {
        let databases = self.lock()?;
        let Some(found) = databases
            .get(&self.database)
            .and_then(|collections| collections.get(collection))
        else {
            return Ok(Vec::new());
        };

        let mut values: Vec<String> = Vec::new();
        let mut push = |value: &str| {
            if !values.iter().any(|v| v == value) {
                values.push(value.to_string());
            }
        };
        for document in &found.documents {
            match lookup(document, field) {
                Some(Bson::String(s)) => push(s),
                Some(Bson::Array(items)) => {
                    for item in items {
                        if let Bson::String(s) = item {
                            push(s);
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(values)
    }
}
