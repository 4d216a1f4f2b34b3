use bson::DateTime;
use common::{SlugRules, slugify};
use serde::{Deserialize, Serialize};

use super::{EntityKind, PreviewLine, Reference, SeedEntity, nullable, require_title};

/// One element of the `featuredProjects` array in the input file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub tagline: String,
    #[serde(default, deserialize_with = "nullable")]
    pub footer: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub links: Vec<Reference>,
    #[serde(default, deserialize_with = "nullable")]
    pub md_files: Vec<Reference>,
    #[serde(default, deserialize_with = "nullable")]
    pub assets: Vec<Reference>,
    /// Images shown on the project card.
    #[serde(default, deserialize_with = "nullable", rename = "cardasset")]
    pub card_assets: Vec<Reference>,
}

/// A featured project as stored in the `projects` collection.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    #[serde(rename = "projectId")]
    pub project_id: String,
    pub title: String,
    pub slug: String,
    pub tagline: String,
    pub footer: String,
    pub description: String,
    pub tags: Vec<String>,
    pub links: Vec<Reference>,
    #[serde(rename = "mdFiles")]
    pub md_files: Vec<Reference>,
    pub assets: Vec<Reference>,
    #[serde(rename = "cardasset")]
    pub card_assets: Vec<Reference>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub featured: bool,
}

impl SeedEntity for Project {
    type Input = ProjectInput;

    const KIND: EntityKind = EntityKind::Projects;

    fn from_input(input: ProjectInput, ident: String, now: DateTime) -> Result<Self, String> {
        require_title(&input.title)?;

        Ok(Self {
            project_id: ident,
            slug: slugify(&input.title, SlugRules::SpellPlus),
            title: input.title,
            tagline: input.tagline,
            footer: input.footer,
            description: input.description,
            tags: input.tags,
            links: input.links,
            md_files: input.md_files,
            assets: input.assets,
            card_assets: input.card_assets,
            created_at: now,
            updated_at: now,
            featured: true,
        })
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn ident(&self) -> &str {
        &self.project_id
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn preview(&self) -> PreviewLine {
        let card = self
            .card_assets
            .first()
            .map(ToString::to_string)
            .unwrap_or_else(|| "No image".to_string());
        PreviewLine {
            title: self.title.clone(),
            ident: self.project_id.clone(),
            detail: Some(format!("Card: {card}")),
        }
    }
}
