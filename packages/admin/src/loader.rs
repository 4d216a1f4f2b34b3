use std::collections::HashSet;
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;

use bson::{DateTime, Document};
use common::IdentAllocator;
use common::storage::{DocumentStore, StoreError};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::entity::{Blog, EntityKind, PreviewLine, Project, SeedEntity};
use crate::error::{AdminError, Result};

/// How many inserted documents the report previews.
const PREVIEW_LEN: usize = 3;

/// Read and parse the input file. Nothing touches the store on failure.
pub fn read_source(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AdminError::Input(format!("{} file not found", path.display())),
        _ => AdminError::Input(format!("cannot read {}: {e}", path.display())),
    })?;
    serde_json::from_str(&raw)
        .map_err(|e| AdminError::Input(format!("invalid JSON in {}: {e}", path.display())))
}

/// An input record that was left out of the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug)]
pub struct Built<E> {
    pub entities: Vec<E>,
    pub skipped: Vec<SkippedRecord>,
}

/// Turn the entity array of `source` into documents ready to insert.
///
/// A missing array yields nothing; an array field of the wrong type is an
/// input error. Records that fail to decode or validate are skipped.
pub fn build_entities<E: SeedEntity>(
    source: &Value,
    allocator: &mut IdentAllocator,
    now: DateTime,
) -> Result<Built<E>> {
    let field = E::KIND.source_field();
    let records = match source.get(field) {
        None | Some(Value::Null) => &[][..],
        Some(Value::Array(records)) => records.as_slice(),
        Some(_) => {
            return Err(AdminError::Input(format!("`{field}` must be an array")));
        }
    };

    let mut built = Built {
        entities: Vec::with_capacity(records.len()),
        skipped: Vec::new(),
    };
    for (index, record) in records.iter().enumerate() {
        let entity = serde_json::from_value::<E::Input>(record.clone())
            .map_err(|e| e.to_string())
            .and_then(|input| E::from_input(input, allocator.allocate(), now));
        match entity {
            Ok(entity) => built.entities.push(entity),
            Err(reason) => {
                warn!(index, "Skipping {} record: {}", E::KIND.singular(), reason);
                built.skipped.push(SkippedRecord { index, reason });
            }
        }
    }
    Ok(built)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub kind: EntityKind,
    pub inserted: usize,
    pub placeholders_removed: u64,
    pub preview: Vec<PreviewLine>,
    pub skipped: Vec<SkippedRecord>,
    /// Slugs shared by more than one document after the load.
    pub slug_collisions: Vec<String>,
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.placeholders_removed > 0 {
            writeln!(f, "Removed {} sample document(s)", self.placeholders_removed)?;
        }
        for skipped in &self.skipped {
            writeln!(f, "Skipped record #{}: {}", skipped.index, skipped.reason)?;
        }
        for slug in &self.slug_collisions {
            writeln!(
                f,
                "Warning: slug '{slug}' is used by more than one {}",
                self.kind.singular()
            )?;
        }

        if self.inserted == 0 {
            return write!(f, "No {} found to insert", self.kind);
        }
        writeln!(
            f,
            "Successfully inserted {} {} into MongoDB",
            self.inserted, self.kind
        )?;
        write!(f, "\nSample {} IDs created:", self.kind.singular())?;
        for (i, line) in self.preview.iter().enumerate() {
            write!(f, "\n{}. {line}", i + 1)?;
        }
        Ok(())
    }
}

/// Slugs that the new batch shares with itself or with stored documents.
fn slug_collisions<E: SeedEntity>(entities: &[E], stored: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = stored.into_iter().collect();
    let mut collisions = Vec::new();
    for entity in entities {
        let slug = entity.slug();
        if !seen.insert(slug.to_string()) && !collisions.iter().any(|c| c == slug) {
            collisions.push(slug.to_string());
        }
    }
    collisions
}

/// Load every record of the input file at `path` into the entity's collection.
///
/// Placeholder documents are removed first, then all built documents go in as
/// one batch. Generated identifiers never repeat one already stored.
pub async fn load<E: SeedEntity>(store: &dyn DocumentStore, path: &Path) -> Result<LoadReport> {
    let kind = E::KIND;
    let collection = kind.collection();
    let source = read_source(path)?;

    let existing_ids = store.distinct_strings(collection, kind.ident_field()).await?;
    let mut allocator = IdentAllocator::new(existing_ids);
    let built = build_entities::<E>(&source, &mut allocator, DateTime::now())?;

    let slug_collisions = if built.entities.is_empty() {
        Vec::new()
    } else {
        let stored_slugs = store.distinct_strings(collection, "slug").await?;
        slug_collisions(&built.entities, stored_slugs)
    };
    for slug in &slug_collisions {
        warn!(%collection, %slug, "Slug already in use");
    }

    let placeholders_removed = store
        .delete_many(collection, &kind.placeholder_filter())
        .await?;
    debug!(%collection, placeholders_removed, "Removed placeholder documents");

    let preview = built
        .entities
        .iter()
        .take(PREVIEW_LEN)
        .map(E::preview)
        .collect();

    let inserted = if built.entities.is_empty() {
        0
    } else {
        let documents = built
            .entities
            .iter()
            .map(bson::to_document)
            .collect::<std::result::Result<Vec<Document>, _>>()
            .map_err(StoreError::from)?;
        store.insert_many(collection, documents).await?
    };
    info!(%collection, inserted, skipped = built.skipped.len(), "Load finished");

    Ok(LoadReport {
        kind,
        inserted,
        placeholders_removed,
        preview,
        skipped: built.skipped,
        slug_collisions,
    })
}

/// [`load`] for the entity type behind `kind`.
pub async fn load_kind(
    store: &dyn DocumentStore,
    kind: EntityKind,
    path: &Path,
) -> Result<LoadReport> {
    match kind {
        EntityKind::Blogs => load::<Blog>(store, path).await,
        EntityKind::Projects => load::<Project>(store, path).await,
    }
}
