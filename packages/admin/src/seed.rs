use std::fmt;

use bson::{DateTime, Document, doc};
use common::storage::{DocumentStore, IndexSpec, StoreError};
use tracing::{info, warn};

use crate::entity::PLACEHOLDER_FIELD;

/// Collections whose placeholder document also gets a slug.
const SLUGGED: &[&str] = &["blogs", "documentation", "projects"];

/// A collection the bootstrapper ensures, with its single-field indexes.
#[derive(Debug, Clone)]
pub struct CollectionDescriptor {
    pub name: String,
    pub indexes: Vec<IndexSpec>,
    /// Insert a placeholder document when the collection is first created.
    pub placeholder: bool,
}

impl CollectionDescriptor {
    pub fn new(name: impl Into<String>, indexes: Vec<IndexSpec>) -> Self {
        Self {
            name: name.into(),
            indexes,
            placeholder: true,
        }
    }

    pub fn without_placeholder(mut self) -> Self {
        self.placeholder = false;
        self
    }
}

/// The collections and indexes the portfolio site expects.
pub fn default_collections() -> Vec<CollectionDescriptor> {
    let asc = IndexSpec::ascending;
    vec![
        CollectionDescriptor::new(
            "blogs",
            vec![
                asc("slug"),
                asc("created_at"),
                IndexSpec::unique("blogId").sparse(),
                asc("datetime"),
                asc("subject"),
                asc("tags"),
            ],
        ),
        CollectionDescriptor::new("documentation", vec![asc("slug"), asc("created_at")]),
        CollectionDescriptor::new(
            "projects",
            vec![
                asc("slug"),
                asc("created_at"),
                IndexSpec::unique("projectId").sparse(),
                asc("featured"),
                asc("tags"),
            ],
        ),
        CollectionDescriptor::new("notes", vec![asc("created_at")]),
        CollectionDescriptor::new("portfolio", vec![asc("created_at")]),
        CollectionDescriptor::new("users", vec![IndexSpec::unique("username")])
            .without_placeholder(),
    ]
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The document inserted into a freshly created collection.
pub fn placeholder_document(collection: &str, now: DateTime) -> Document {
    let mut document = doc! {
        "title": format!("Sample {}", capitalize(collection)),
        PLACEHOLDER_FIELD: true,
        "content": "Initial document",
        "created_at": now,
        "updated_at": now,
    };
    if SLUGGED.contains(&collection) {
        document.insert("slug", format!("sample-{collection}"));
    }
    document
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexFailure {
    pub field: String,
    pub error: String,
}

/// What the bootstrapper did to one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionOutcome {
    pub name: String,
    pub created: bool,
    pub placeholder_inserted: bool,
    pub indexes_created: Vec<String>,
    pub indexes_skipped: Vec<String>,
    pub index_failures: Vec<IndexFailure>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub collections: Vec<CollectionOutcome>,
}

impl BootstrapReport {
    pub fn collections_created(&self) -> usize {
        self.collections.iter().filter(|c| c.created).count()
    }

    pub fn indexes_created(&self) -> usize {
        self.collections.iter().map(|c| c.indexes_created.len()).sum()
    }

    pub fn indexes_skipped(&self) -> usize {
        self.collections.iter().map(|c| c.indexes_skipped.len()).sum()
    }

    pub fn indexes_failed(&self) -> usize {
        self.collections.iter().map(|c| c.index_failures.len()).sum()
    }
}

impl fmt::Display for BootstrapReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for collection in &self.collections {
            if collection.created {
                writeln!(f, "Created collection: {}", collection.name)?;
            } else {
                writeln!(f, "Collection already exists: {}", collection.name)?;
            }
            if collection.placeholder_inserted {
                writeln!(f, "  Added sample document")?;
            }
            for field in &collection.indexes_created {
                writeln!(f, "  Index created on '{field}'")?;
            }
            for failure in &collection.index_failures {
                writeln!(
                    f,
                    "  Error creating index on '{}': {}",
                    failure.field, failure.error
                )?;
            }
        }
        write!(
            f,
            "Collections: {} created, {} existing. Indexes: {} created, {} already present, {} failed",
            self.collections_created(),
            self.collections.len() - self.collections_created(),
            self.indexes_created(),
            self.indexes_skipped(),
            self.indexes_failed(),
        )
    }
}

/// Ensure every described collection and index exists.
///
/// New collections get their indexes and, unless disabled, one placeholder
/// document. Existing collections only get missing indexes. Index failures
/// are logged and recorded in the report; any other store failure aborts.
pub async fn bootstrap(
    store: &dyn DocumentStore,
    descriptors: &[CollectionDescriptor],
) -> Result<BootstrapReport, StoreError> {
    let existing = store.collection_names().await?;
    let mut report = BootstrapReport::default();

    for descriptor in descriptors {
        let mut outcome = CollectionOutcome {
            name: descriptor.name.clone(),
            ..CollectionOutcome::default()
        };

        if existing.contains(&descriptor.name) {
            info!(collection = %descriptor.name, "Collection already exists");
        } else {
            store.create_collection(&descriptor.name).await?;
            outcome.created = true;
            info!(collection = %descriptor.name, "Created collection");
        }

        ensure_indexes(store, descriptor, &mut outcome).await;

        if outcome.created && descriptor.placeholder {
            store
                .insert_one(
                    &descriptor.name,
                    placeholder_document(&descriptor.name, DateTime::now()),
                )
                .await?;
            outcome.placeholder_inserted = true;
        }

        report.collections.push(outcome);
    }

    Ok(report)
}

/// Create each index whose derived name is not already present.
async fn ensure_indexes(
    store: &dyn DocumentStore,
    descriptor: &CollectionDescriptor,
    outcome: &mut CollectionOutcome,
) {
    let present = match store.index_names(&descriptor.name).await {
        Ok(names) => names,
        Err(e) => {
            warn!(collection = %descriptor.name, "Failed to list indexes: {}", e);
            outcome.index_failures.extend(descriptor.indexes.iter().map(|index| {
                IndexFailure {
                    field: index.field.clone(),
                    error: e.to_string(),
                }
            }));
            return;
        }
    };

    for index in &descriptor.indexes {
        if present.contains(&index.name()) {
            outcome.indexes_skipped.push(index.field.clone());
            continue;
        }
        match store.create_index(&descriptor.name, index).await {
            Ok(name) => {
                info!(collection = %descriptor.name, index = %name, "Ensured index exists");
                outcome.indexes_created.push(index.field.clone());
            }
            Err(e) => {
                warn!(
                    collection = %descriptor.name,
                    "Failed to create index on {}: {}", index.field, e
                );
                outcome.index_failures.push(IndexFailure {
                    field: index.field.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
}
