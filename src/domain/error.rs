//! Domain-level errors (no external dependencies)

use itertools::Itertools;
use thiserror::Error;

use crate::domain::item::ItemId;

/// Domain errors represent violations of the tree engine's contracts.
/// These are independent of I/O concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("taxonomy is empty")]
    EmptyTaxonomy,

    /// Carries exactly the ids that were missing, in request order.
    #[error("ids not found in taxonomy: {}", .0.iter().join(", "))]
    IdNotFound(Vec<ItemId>),

    #[error("level {level} out of range, taxonomy has {depth} levels")]
    LevelOutOfRange { level: usize, depth: usize },

    #[error("item is no longer part of the taxonomy")]
    ItemNotInTaxonomy,

    #[error("duplicate item id: {0}")]
    DuplicateId(ItemId),

    #[error("invalid record {id}: {reason}")]
    InvalidRecord { id: ItemId, reason: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
