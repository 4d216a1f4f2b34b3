use std::fmt;

use serde::{Deserialize, Serialize};

/// An asset, markdown file or outbound link attached to an entity.
///
/// Input files use both shapes: a bare URL string, or an object such as
/// `{"name": "hero", "url": "...", "filename": "hero.png"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    Url(String),
    Link(Link),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Link(link) => {
                let label = link
                    .url
                    .as_deref()
                    .or(link.filename.as_deref())
                    .or(link.name.as_deref())
                    .unwrap_or("<empty link>");
                f.write_str(label)
            }
        }
    }
}
