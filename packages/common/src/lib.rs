pub mod ident;
pub mod slug;
pub mod storage;

pub use ident::IdentAllocator;
pub use slug::{SlugRules, slugify};
