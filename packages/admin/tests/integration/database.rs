use std::sync::atomic::{AtomicBool, Ordering};

use admin::database;
use admin::error::AdminError;
use common::storage::memory::MemoryStore;
use common::storage::{DocumentStore, Filter, StoreError};

#[tokio::test]
async fn closes_the_store_after_success() {
    let closed = AtomicBool::new(false);

    let count = database::with_store(
        async || Ok(MemoryStore::new("Portfolio")),
        async |_store: MemoryStore| closed.store(true, Ordering::SeqCst),
        async |store: &MemoryStore| -> Result<u64, AdminError> {
            Ok(store.count("users", &Filter::All).await?)
        },
    )
    .await
    .unwrap();

    assert_eq!(count, 0);
    assert!(closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn closes_the_store_when_the_operation_fails() {
    let closed = AtomicBool::new(false);

    let err = database::with_store(
        async || Ok(MemoryStore::new("Portfolio")),
        async |_store: MemoryStore| closed.store(true, Ordering::SeqCst),
        async |_store: &MemoryStore| -> Result<(), AdminError> {
            Err(AdminError::NotFound("projcts".into()))
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AdminError::NotFound(_)));
    assert!(closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn failed_open_skips_the_operation() {
    let ran = AtomicBool::new(false);

    let err = database::with_store(
        async || Err::<MemoryStore, _>(StoreError::Connection("refused".into())),
        async |_store: MemoryStore| {},
        async |_store: &MemoryStore| -> Result<(), AdminError> {
            ran.store(true, Ordering::SeqCst);
            Ok(())
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AdminError::Store(StoreError::Connection(_))));
    assert!(!ran.load(Ordering::SeqCst));
}
