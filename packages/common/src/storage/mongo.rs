use std::future::IntoFuture;
use std::time::Duration;

use async_trait::async_trait;
use bson::{Bson, Document, doc};
use futures::TryStreamExt;
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use tracing::{debug, info};

use super::error::StoreError;
use super::filter::Filter;
use super::traits::{DocumentStore, IndexSpec};

const DUPLICATE_KEY: i32 = 11000;
const NAMESPACE_NOT_FOUND: i32 = 26;

/// Connection parameters for [`MongoStore::connect`].
#[derive(Debug, Clone)]
pub struct MongoOptions {
    pub uri: String,
    pub database: String,
    pub app_name: Option<String>,
    /// Bounds both TCP connect and server selection.
    pub connect_timeout: Duration,
    /// Bounds every individual store call.
    pub operation_timeout: Duration,
}

/// MongoDB-backed document store scoped to one database.
///
/// Release the connection with [`MongoStore::shutdown`]; dropping the handle
/// also closes it, but without waiting for in-flight work.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    db: Database,
    operation_timeout: Duration,
}

impl MongoStore {
    /// Connect and verify the server answers a ping.
    pub async fn connect(options: &MongoOptions) -> Result<Self, StoreError> {
        let mut client_options = ClientOptions::parse(&options.uri)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        client_options.connect_timeout = Some(options.connect_timeout);
        client_options.server_selection_timeout = Some(options.connect_timeout);
        client_options.app_name = options.app_name.clone();

        let client = Client::with_options(client_options)
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let store = Self {
            db: client.database(&options.database),
            client,
            operation_timeout: options.operation_timeout,
        };

        store
            .timed("ping", store.db.run_command(doc! { "ping": 1 }))
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        info!(database = %options.database, "Connected to MongoDB");
        Ok(store)
    }

    /// Another database on the same client.
    pub fn with_database(&self, name: &str) -> Self {
        Self {
            client: self.client.clone(),
            db: self.client.database(name),
            operation_timeout: self.operation_timeout,
        }
    }

    /// Close the underlying client, waiting for outstanding operations.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
        debug!("MongoDB client shut down");
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }

    async fn timed<T, F>(&self, operation: &'static str, call: F) -> Result<T, StoreError>
    where
        F: IntoFuture<Output = Result<T, MongoError>>,
    {
        match tokio::time::timeout(self.operation_timeout, call).await {
            Ok(result) => result.map_err(into_store_error),
            Err(_) => Err(StoreError::Timeout {
                operation,
                after: self.operation_timeout,
            }),
        }
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::InsertMany(e) => e
            .write_errors
            .as_ref()
            .is_some_and(|errs| errs.iter().any(|w| w.code == DUPLICATE_KEY)),
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn is_namespace_not_found(err: &MongoError) -> bool {
    matches!(err.kind.as_ref(), ErrorKind::Command(e) if e.code == NAMESPACE_NOT_FOUND)
}

fn into_store_error(err: MongoError) -> StoreError {
    if is_duplicate_key(&err) {
        StoreError::DuplicateKey(err.to_string())
    } else {
        StoreError::Backend(err.to_string())
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn database_name(&self) -> &str {
        self.db.name()
    }

    async fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        self.timed("listCollections", self.db.list_collection_names())
            .await
    }

    async fn create_collection(&self, name: &str) -> Result<(), StoreError> {
        self.timed("create", self.db.create_collection(name)).await
    }

    async fn index_names(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        let coll = self.collection(collection);
        self.timed("listIndexes", async move {
            match coll.list_index_names().await {
                Err(e) if is_namespace_not_found(&e) => Ok(Vec::new()),
                other => other,
            }
        })
        .await
    }

    async fn create_index(
        &self,
        collection: &str,
        index: &IndexSpec,
    ) -> Result<String, StoreError> {
        let mut keys = Document::new();
        keys.insert(index.field.clone(), 1);
        let options = IndexOptions::builder()
            .name(index.name())
            .unique(index.unique.then_some(true))
            .sparse(index.sparse.then_some(true))
            .build();
        let model = IndexModel::builder().keys(keys).options(options).build();

        let created = self
            .timed("createIndexes", self.collection(collection).create_index(model))
            .await?;
        Ok(created.index_name)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        self.timed("insert", self.collection(collection).insert_one(document))
            .await?;
        Ok(())
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<usize, StoreError> {
        if documents.is_empty() {
            return Ok(0);
        }
        let result = self
            .timed("insert", self.collection(collection).insert_many(documents))
            .await?;
        Ok(result.inserted_ids.len())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError> {
        let coll = self.collection(collection);
        let query = filter.to_document();
        self.timed("find", async move {
            let mut action = coll.find(query);
            if let Some(limit) = limit {
                action = action.limit(i64::try_from(limit).unwrap_or(i64::MAX));
            }
            action.await?.try_collect::<Vec<Document>>().await
        })
        .await
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        self.timed(
            "count",
            self.collection(collection).count_documents(filter.to_document()),
        )
        .await
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let result = self
            .timed(
                "delete",
                self.collection(collection).delete_many(filter.to_document()),
            )
            .await?;
        Ok(result.deleted_count)
    }

    async fn distinct_strings(
        &self,
        collection: &str,
        field: &str,
    ) -> Result<Vec<String>, StoreError> {
        let values = self
            .timed(
                "distinct",
                self.collection(collection).distinct(field, Document::new()),
            )
            .await?;
        Ok(values
            .into_iter()
            .filter_map(|value| match value {
                Bson::String(s) => Some(s),
                _ => None,
            })
            .collect())
    }
}
