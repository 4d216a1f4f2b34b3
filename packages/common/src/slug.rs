//! URL slugs derived from entity titles.

/// Which substitutions apply on top of the base rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugRules {
    /// Lowercase, spaces and periods become `-`, parentheses are dropped.
    Standard,
    /// [`SlugRules::Standard`] plus `+` becomes `-plus` (used for projects, e.g. "C++").
    SpellPlus,
}

/// Derive a slug from a title.
///
/// Deterministic and not unique: two titles that differ only in case or in
/// the replaced punctuation produce the same slug.
pub fn slugify(title: &str, rules: SlugRules) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.to_lowercase().chars() {
        match c {
            ' ' | '.' => slug.push('-'),
            '(' | ')' => {}
            '+' if rules == SlugRules::SpellPlus => slug.push_str("-plus"),
            other => slug.push(other),
        }
    }
    slug
}
