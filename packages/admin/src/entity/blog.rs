use bson::DateTime;
use chrono::NaiveDate;
use common::{SlugRules, slugify};
use serde::{Deserialize, Serialize};

use super::{EntityKind, Reference, SeedEntity, nullable, require_title};

/// Format of the optional publication date in the input file.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One element of the `blogs` array in the input file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogInput {
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub tagline: String,
    #[serde(default, deserialize_with = "nullable")]
    pub subject: String,
    #[serde(default, deserialize_with = "nullable")]
    pub short_description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub assets: Vec<Reference>,
    #[serde(default, deserialize_with = "nullable")]
    pub md_files: Vec<Reference>,
    #[serde(default, deserialize_with = "nullable")]
    pub cover_image: String,
    #[serde(default, deserialize_with = "nullable")]
    pub footer: String,
    #[serde(default, deserialize_with = "nullable")]
    pub blog_links: Vec<Reference>,
}

/// A blog post as stored in the `blogs` collection.
#[derive(Debug, Clone, Serialize)]
pub struct Blog {
    #[serde(rename = "blogId")]
    pub blog_id: String,
    pub title: String,
    pub slug: String,
    pub tagline: String,
    pub subject: String,
    #[serde(rename = "shortDescription")]
    pub short_description: String,
    pub tags: Vec<String>,
    pub datetime: DateTime,
    pub assets: Vec<Reference>,
    #[serde(rename = "mdFiles")]
    pub md_files: Vec<Reference>,
    #[serde(rename = "coverImage")]
    pub cover_image: String,
    pub footer: String,
    #[serde(rename = "blogLinks")]
    pub blog_links: Vec<Reference>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub featured: bool,
}

/// Parse a `YYYY-MM-DD` date as midnight UTC.
fn parse_date(raw: &str) -> Result<DateTime, String> {
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| format!("invalid datetime {raw:?}: {e}"))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| format!("invalid datetime {raw:?}"))?;
    Ok(DateTime::from_chrono(midnight.and_utc()))
}

impl SeedEntity for Blog {
    type Input = BlogInput;

    const KIND: EntityKind = EntityKind::Blogs;

    fn from_input(input: BlogInput, ident: String, now: DateTime) -> Result<Self, String> {
        require_title(&input.title)?;
        let datetime = match input.datetime.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_date(raw)?,
            _ => now,
        };

        Ok(Self {
            blog_id: ident,
            slug: slugify(&input.title, SlugRules::Standard),
            title: input.title,
            tagline: input.tagline,
            subject: input.subject,
            short_description: input.short_description,
            tags: input.tags,
            datetime,
            assets: input.assets,
            md_files: input.md_files,
            cover_image: input.cover_image,
            footer: input.footer,
            blog_links: input.blog_links,
            created_at: now,
            updated_at: now,
            featured: false,
        })
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn ident(&self) -> &str {
        &self.blog_id
    }

    fn slug(&self) -> &str {
        &self.slug
    }
}
