//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent invalid input or lookups against a tree.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("invalid number '{token}' at position {position}")]
    InvalidNumber { token: String, position: usize },

    #[error("empty number at position {position}")]
    EmptyNumber { position: usize },

    #[error("no node with value {0} in tree")]
    NodeNotFound(String),

    #[error("invalid canvas: {0}")]
    InvalidCanvas(String),
}
