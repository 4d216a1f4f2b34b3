use std::fmt;

use bson::{Bson, Document};
use common::storage::{DocumentStore, Filter};

use crate::entity::{EntityKind, Reference};
use crate::error::Result;

const SAMPLE_LEN: usize = 3;

fn title_of(document: &Document) -> String {
    document
        .get_str("title")
        .map(str::to_string)
        .unwrap_or_else(|_| "<untitled>".to_string())
}

fn array_len(document: &Document, field: &str) -> usize {
    document.get_array(field).map(Vec::len).unwrap_or(0)
}

/// Render a stored reference the way it was written in the input file.
fn describe(value: &Bson) -> String {
    match bson::from_bson::<Reference>(value.clone()) {
        Ok(reference) => reference.to_string(),
        Err(_) => value.to_string(),
    }
}

fn references(document: &Document, field: &str) -> Vec<String> {
    document
        .get_array(field)
        .map(|values| values.iter().map(describe).collect())
        .unwrap_or_default()
}

/// A stored document summarised for the verification report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleEntry {
    pub title: String,
    pub ident: String,
    pub details: Vec<String>,
}

impl SampleEntry {
    fn from_document(kind: EntityKind, document: &Document) -> Self {
        let mut details = Vec::new();
        match kind {
            EntityKind::Blogs => {
                let subject = document.get_str("subject").unwrap_or("N/A");
                details.push(format!("Subject: {subject}"));
                details.push(format!("Assets: {} items", array_len(document, "assets")));
                let has_cover = document
                    .get_str("coverImage")
                    .is_ok_and(|cover| !cover.is_empty());
                details.push(format!(
                    "Cover Image: {}",
                    if has_cover { "Yes" } else { "No" }
                ));
            }
            EntityKind::Projects => {
                details.push(format!("Assets: {} items", array_len(document, "assets")));
                details.push(format!(
                    "Cardassets: {} items",
                    array_len(document, "cardasset")
                ));
                match document.get_array("cardasset").ok().and_then(|a| a.first()) {
                    Some(first) => details.push(format!("First cardasset: {}", describe(first))),
                    None => details.push("No cardasset found".to_string()),
                }
            }
        }

        Self {
            title: title_of(document),
            ident: document
                .get_str(kind.ident_field())
                .unwrap_or_default()
                .to_string(),
            details,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    pub kind: EntityKind,
    pub total: u64,
    /// Documents carrying the generated identifier.
    pub real: u64,
    pub samples: Vec<SampleEntry>,
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total {} in database: {}", self.kind, self.total)?;
        write!(
            f,
            "Real {} (with {}): {}",
            self.kind,
            self.kind.ident_field(),
            self.real
        )?;
        write!(f, "\n\nFirst {} {}:", self.samples.len(), self.kind)?;
        for (i, sample) in self.samples.iter().enumerate() {
            write!(f, "\n\n{}. {}", i + 1, sample.title)?;
            write!(f, "\n   ID: {}", sample.ident)?;
            for detail in &sample.details {
                write!(f, "\n   {detail}")?;
            }
        }
        Ok(())
    }
}

/// Count stored documents and summarise the first few real ones. Read-only.
pub async fn verify(store: &dyn DocumentStore, kind: EntityKind) -> Result<VerifyReport> {
    let collection = kind.collection();
    let real_filter = Filter::exists(kind.ident_field());

    let total = store.count(collection, &Filter::All).await?;
    let real = store.count(collection, &real_filter).await?;
    let samples = store
        .find(collection, &real_filter, Some(SAMPLE_LEN))
        .await?
        .iter()
        .map(|document| SampleEntry::from_document(kind, document))
        .collect();

    Ok(VerifyReport {
        kind,
        total,
        real,
        samples,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEntry {
    pub title: String,
    pub assets: Vec<String>,
    pub card_assets: Vec<String>,
}

/// Field analysis of a collection: which documents carry images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateReport {
    pub kind: EntityKind,
    pub total: usize,
    pub with_assets: usize,
    pub with_card_assets: usize,
    pub entries: Vec<StateEntry>,
}

impl fmt::Display for StateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total documents: {}", self.total)?;
        writeln!(f, "\nField analysis:")?;
        writeln!(f, "{} with non-empty assets: {}", capitalized(self.kind), self.with_assets)?;
        write!(
            f,
            "{} with non-empty cardasset: {}",
            capitalized(self.kind),
            self.with_card_assets
        )?;
        write!(f, "\n\nSample entries:")?;
        for (i, entry) in self.entries.iter().enumerate() {
            write!(f, "\n\n{}. {}", i + 1, entry.title)?;
            write!(f, "\n   Assets: [{}]", entry.assets.join(", "))?;
            write!(f, "\n   Cardasset: [{}]", entry.card_assets.join(", "))?;
        }
        Ok(())
    }
}

fn capitalized(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Blogs => "Blogs",
        EntityKind::Projects => "Projects",
    }
}

/// Analyse every document in the collection, placeholders included. Read-only.
pub async fn inspect_state(store: &dyn DocumentStore, kind: EntityKind) -> Result<StateReport> {
    let documents = store.find(kind.collection(), &Filter::All, None).await?;

    Ok(StateReport {
        kind,
        total: documents.len(),
        with_assets: documents
            .iter()
            .filter(|d| array_len(d, "assets") > 0)
            .count(),
        with_card_assets: documents
            .iter()
            .filter(|d| array_len(d, "cardasset") > 0)
            .count(),
        entries: documents
            .iter()
            .take(SAMPLE_LEN)
            .map(|d| StateEntry {
                title: title_of(d),
                assets: references(d, "assets"),
                card_assets: references(d, "cardasset"),
            })
            .collect(),
    })
}
