use bson::{Bson, Document, doc};

/// Query predicate understood by every [`DocumentStore`](super::DocumentStore) backend.
///
/// Backends that speak the MongoDB query language render it with
/// [`Filter::to_document`]; in-process backends evaluate it with
/// [`Filter::matches`].
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document.
    All,
    /// Field equals the value. A field holding an array matches when any element equals.
    Eq(String, Bson),
    /// Field is present (`true`) or absent (`false`).
    Exists(String, bool),
    /// String field begins with the prefix.
    StartsWith(String, String),
    /// Any of the inner filters matches.
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    pub fn exists(field: impl Into<String>) -> Self {
        Self::Exists(field.into(), true)
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::Exists(field.into(), false)
    }

    pub fn starts_with(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::StartsWith(field.into(), prefix.into())
    }

    /// Combine two filters with logical OR, flattening nested ORs.
    pub fn or(self, other: Filter) -> Self {
        let mut branches = match self {
            Self::Or(inner) => inner,
            single => vec![single],
        };
        match other {
            Self::Or(inner) => branches.extend(inner),
            single => branches.push(single),
        }
        Self::Or(branches)
    }

    /// Render as a MongoDB query document.
    pub fn to_document(&self) -> Document {
        let mut query = Document::new();
        match self {
            Self::All => {}
            Self::Eq(field, value) => {
                query.insert(field.clone(), value.clone());
            }
            Self::Exists(field, present) => {
                query.insert(field.clone(), doc! { "$exists": *present });
            }
            Self::StartsWith(field, prefix) => {
                query.insert(
                    field.clone(),
                    doc! { "$regex": format!("^{}", escape_regex(prefix)) },
                );
            }
            Self::Or(branches) => {
                let rendered: Vec<Bson> = branches
                    .iter()
                    .map(|b| Bson::Document(b.to_document()))
                    .collect();
                query.insert("$or", rendered);
            }
        }
        query
    }

    /// Evaluate against a document held in memory.
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Self::All => true,
            Self::Eq(field, expected) => match lookup(document, field) {
                Some(Bson::Array(items)) if !matches!(expected, Bson::Array(_)) => {
                    items.contains(expected)
                }
                Some(actual) => actual == expected,
                None => matches!(expected, Bson::Null),
            },
            Self::Exists(field, present) => lookup(document, field).is_some() == *present,
            Self::StartsWith(field, prefix) => {
                matches!(lookup(document, field), Some(Bson::String(s)) if s.starts_with(prefix.as_str()))
            }
            Self::Or(branches) => branches.iter().any(|b| b.matches(document)),
        }
    }
}

/// Resolve a dotted field path inside a document.
pub(crate) fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = document.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Bson::Document(inner) => inner.get(part)?,
            _ => return None,
        };
    }
    Some(current)
}

fn escape_regex(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if "\\.+*?()|[]{}^$".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
