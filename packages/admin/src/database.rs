use common::storage::StoreError;
use common::storage::mongo::{MongoOptions, MongoStore};

use crate::config::DatabaseConfig;

const APP_NAME: &str = "folio";

pub async fn connect(config: &DatabaseConfig) -> Result<MongoStore, StoreError> {
    let options = MongoOptions {
        uri: config.uri.clone(),
        database: config.name.clone(),
        app_name: Some(APP_NAME.to_string()),
        connect_timeout: config.connect_timeout(),
        operation_timeout: config.operation_timeout(),
    };
    MongoStore::connect(&options).await
}

/// Open a store with `open`, run `op` against it, then hand the store to
/// `close`, whether `op` succeeded or not.
pub async fn with_store<S, T, E, O, C, F>(open: O, close: C, op: F) -> Result<T, E>
where
    O: AsyncFnOnce() -> Result<S, StoreError>,
    C: AsyncFnOnce(S),
    F: AsyncFnOnce(&S) -> Result<T, E>,
    E: From<StoreError>,
{
    let store = open().await?;
    let result = op(&store).await;
    close(store).await;
    result
}

/// Run `op` against a fresh MongoDB connection and shut the connection down
/// afterwards.
pub async fn scoped<T, E, F>(config: &DatabaseConfig, op: F) -> Result<T, E>
where
    F: AsyncFnOnce(&MongoStore) -> Result<T, E>,
    E: From<StoreError>,
{
    with_store(
        async || connect(config).await,
        async |store: MongoStore| store.shutdown().await,
        op,
    )
    .await
}
