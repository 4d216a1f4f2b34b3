use std::fmt;

use common::storage::{DocumentStore, Filter};
use tracing::{info, warn};

use crate::entity::EntityKind;
use crate::error::{AdminError, Result};

/// Whether a purge only counts or actually deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeMode {
    DryRun,
    Confirmed,
}

impl PurgeMode {
    /// A dry run needs no confirmation; anything else does.
    pub fn from_flags(dry_run: bool, confirmed: bool) -> Result<Self> {
        match (dry_run, confirmed) {
            (true, _) => Ok(Self::DryRun),
            (false, true) => Ok(Self::Confirmed),
            (false, false) => Err(AdminError::NotConfirmed(
                "deleting every document requires --yes or an interactive confirmation".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeReport {
    pub collection: String,
    pub before: u64,
    /// `None` for a dry run.
    pub deleted: Option<u64>,
    pub after: u64,
}

impl fmt::Display for PurgeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Found {} documents in {}", self.before, self.collection)?;
        let Some(deleted) = self.deleted else {
            return write!(f, "Dry run: {} documents would be deleted", self.before);
        };
        writeln!(f, "Deleted {deleted} documents")?;
        write!(f, "Remaining: {} documents", self.after)?;
        if self.after == 0 {
            write!(f, "\nCollection is now empty!")?;
        }
        Ok(())
    }
}

/// Delete every document in `collection`, reporting counts before and after.
///
/// The collection must exist, so a mistyped name fails instead of
/// reporting an empty purge.
pub async fn purge(
    store: &dyn DocumentStore,
    collection: &str,
    mode: PurgeMode,
) -> Result<PurgeReport> {
    if !store
        .collection_names()
        .await?
        .iter()
        .any(|name| name == collection)
    {
        return Err(AdminError::NotFound(format!(
            "collection {}.{collection}",
            store.database_name()
        )));
    }

    let before = store.count(collection, &Filter::All).await?;
    if mode == PurgeMode::DryRun {
        return Ok(PurgeReport {
            collection: collection.to_string(),
            before,
            deleted: None,
            after: before,
        });
    }

    let deleted = store.delete_many(collection, &Filter::All).await?;
    let after = store.count(collection, &Filter::All).await?;
    if after > 0 {
        warn!(collection, after, "Documents remain after purge");
    }
    info!(collection, deleted, "Purged collection");

    Ok(PurgeReport {
        collection: collection.to_string(),
        before,
        deleted: Some(deleted),
        after,
    })
}

/// Delete documents in the entity's collection that lack its generated identifier.
pub async fn clean_samples(store: &dyn DocumentStore, kind: EntityKind) -> Result<u64> {
    let removed = store
        .delete_many(kind.collection(), &Filter::missing(kind.ident_field()))
        .await?;
    info!(collection = kind.collection(), removed, "Cleaned sample documents");
    Ok(removed)
}
