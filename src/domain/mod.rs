//! Domain layer: the taxonomy tree engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).
//! A `Taxonomy` is single-threaded by construction: every mutation takes
//! `&mut self`, so no read can overlap a structural change.

pub mod builder;
pub mod error;
pub mod item;
pub mod mutation;
pub mod record;
pub mod scoring;
pub mod search;
pub mod taxonomy;

pub use builder::{TaxonomyBuilder, ROOT_ID};
pub use error::{DomainError, DomainResult};
pub use item::{ItemId, Metadata, Scalar, TaxonomyItem};
pub use mutation::{Insertion, ParentRef};
pub use record::{ItemRecord, Nested, NestedRecord};
pub use scoring::{DisplayRow, TaxonomySummary};
pub use taxonomy::{PostOrderIterator, PreOrderIterator, Taxonomy, DEFAULT_LABEL, DEFAULT_VERSION};

pub use generational_arena::Index;
