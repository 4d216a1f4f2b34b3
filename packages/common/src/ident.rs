//! Short random identifiers (`blogId`, `projectId`).

use std::collections::HashSet;

use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of every generated identifier.
pub const IDENT_LEN: usize = 10;

/// Draw an identifier of [`IDENT_LEN`] characters from `[A-Za-z0-9]`.
pub fn generate() -> String {
    generate_with(&mut rand::rng())
}

pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..IDENT_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}

/// Hands out identifiers that do not collide with a known set.
///
/// Seed it with the identifiers already present in the target collection;
/// every identifier it returns is added to the set, so one allocator also
/// keeps a batch free of internal duplicates.
#[derive(Debug, Default)]
pub struct IdentAllocator {
    taken: HashSet<String>,
}

impl IdentAllocator {
    pub fn new(existing: impl IntoIterator<Item = String>) -> Self {
        Self {
            taken: existing.into_iter().collect(),
        }
    }

    pub fn allocate(&mut self) -> String {
        self.allocate_with(&mut rand::rng())
    }

    pub fn allocate_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> String {
        loop {
            let candidate = generate_with(rng);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            tracing::debug!(%candidate, "identifier collision, drawing again");
        }
    }

    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}
