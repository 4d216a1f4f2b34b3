pub mod blog;
pub mod project;
pub mod reference;
pub mod user;

use std::fmt;

use bson::DateTime;
use common::storage::Filter;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

pub use blog::{Blog, BlogInput};
pub use project::{Project, ProjectInput};
pub use reference::{Link, Reference};
pub use user::UserRecord;

/// Field that marks a bootstrap placeholder document.
pub const PLACEHOLDER_FIELD: &str = "placeholder";

/// The kinds of entity the bulk loader knows how to seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EntityKind {
    Blogs,
    Projects,
}

impl EntityKind {
    pub fn collection(self) -> &'static str {
        match self {
            Self::Blogs => "blogs",
            Self::Projects => "projects",
        }
    }

    /// Top-level array in the input JSON.
    pub fn source_field(self) -> &'static str {
        match self {
            Self::Blogs => "blogs",
            Self::Projects => "featuredProjects",
        }
    }

    /// Generated short identifier; its presence marks a real (non-placeholder) document.
    pub fn ident_field(self) -> &'static str {
        match self {
            Self::Blogs => "blogId",
            Self::Projects => "projectId",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            Self::Blogs => "blog",
            Self::Projects => "project",
        }
    }

    /// Matches placeholder documents: the explicit marker, or the title
    /// convention used by stores seeded before the marker existed.
    pub fn placeholder_filter(self) -> Filter {
        let marker = Filter::eq(PLACEHOLDER_FIELD, true);
        match self {
            Self::Blogs => marker.or(Filter::starts_with("title", "Sample")),
            Self::Projects => marker.or(Filter::eq("title", "Sample Projects")),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

/// One line of the post-insert preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewLine {
    pub title: String,
    pub ident: String,
    pub detail: Option<String>,
}

impl fmt::Display for PreviewLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.ident)?;
        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}

/// A document type the bulk loader builds from one input record.
pub trait SeedEntity: Serialize + Sized {
    type Input: DeserializeOwned;

    const KIND: EntityKind;

    /// Build the stored document. `Err` carries the reason the record is skipped.
    fn from_input(input: Self::Input, ident: String, now: DateTime) -> Result<Self, String>;

    fn title(&self) -> &str;

    fn ident(&self) -> &str;

    fn slug(&self) -> &str;

    fn preview(&self) -> PreviewLine {
        PreviewLine {
            title: self.title().to_string(),
            ident: self.ident().to_string(),
            detail: None,
        }
    }
}

/// Reject titles that are empty once trimmed.
pub(crate) fn require_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("title must not be empty".into());
    }
    Ok(())
}

/// Treat an explicit JSON `null` like an absent field.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
