use async_trait::async_trait;
use bson::Document;

use super::error::StoreError;
use super::filter::Filter;

/// A single-field ascending index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub field: String,
    pub unique: bool,
    /// Skip documents that lack the field (only meaningful with `unique`).
    pub sparse: bool,
}

impl IndexSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            unique: false,
            sparse: false,
        }
    }

    pub fn unique(field: impl Into<String>) -> Self {
        Self {
            unique: true,
            ..Self::ascending(field)
        }
    }

    pub fn sparse(mut self) -> Self {
        self.sparse = true;
        self
    }

    /// The name the store derives for this index, e.g. `slug_1`.
    pub fn name(&self) -> String {
        format!("{}_1", self.field)
    }
}

/// A handle to one logical database inside a document store.
///
/// Collections are addressed by name. Backends create a collection implicitly
/// on first insert, matching MongoDB.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Name of the logical database this handle is scoped to.
    fn database_name(&self) -> &str;

    async fn collection_names(&self) -> Result<Vec<String>, StoreError>;

    /// Create an empty collection. Fails if it already exists.
    async fn create_collection(&self, name: &str) -> Result<(), StoreError>;

    /// Names of the indexes on `collection`; empty if the collection does not
    /// exist yet.
    async fn index_names(&self, collection: &str) -> Result<Vec<String>, StoreError>;

    /// Create an index and return its name.
    async fn create_index(&self, collection: &str, index: &IndexSpec)
    -> Result<String, StoreError>;

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError>;

    /// Insert a batch in order, stopping at the first failure.
    ///
    /// Returns the number of documents inserted.
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<usize, StoreError>;

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError>;

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self.find(collection, filter, Some(1)).await?.into_iter().next())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    /// Delete all matching documents and return how many were removed.
    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    /// Distinct string values of a field across the collection.
    async fn distinct_strings(
        &self,
        collection: &str,
        field: &str,
    ) -> Result<Vec<String>, StoreError>;
}
