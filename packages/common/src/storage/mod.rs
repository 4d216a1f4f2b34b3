mod error;
mod filter;
mod traits;

pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongo;

pub use error::StoreError;
pub use filter::Filter;
pub use traits::{DocumentStore, IndexSpec};
