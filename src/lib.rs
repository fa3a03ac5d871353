//! Astrolabe - reference resolution and validation for identity-tagged record graphs.
//!
//! This library is the engine behind tools that manage specification items,
//! tasks, traits, and meta-entities (agents, workflows, conventions,
//! observations) stored as structured text files and cross-referenced by a
//! compact `@token` syntax. It provides:
//!
//! - `models` - entity structs, kinds, statuses, and the in-memory snapshot
//! - `reference` - reference normalization and short-id display helpers
//! - `index` - the reference index that resolves `@token` strings to identities
//! - `traits` - trait inheritance resolution and cycle detection
//! - `schema` - recursive schema checking for raw record structures
//! - `coverage` - test-annotation coverage collaborator and scanner
//! - `validate` - the multi-pass validator and automation assessment
//! - `merge` - identity-aware three-way array merge for record collections
//!
//! The engine performs no I/O and holds no global state: callers load a
//! [`models::Snapshot`] from wherever records live, build the index and
//! trait graph, and invoke the validator. Persistence, the CLI surface, and
//! the HTTP daemon are downstream consumers of these results.

pub mod coverage;
pub mod index;
pub mod merge;
pub mod models;
pub mod reference;
pub mod schema;
pub mod traits;
pub mod validate;

/// Library-level error type for Astrolabe operations.
///
/// Reference-resolution failures are *not* represented here; they are
/// expected outcomes returned as [`index::ResolveError`] values.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Astrolabe operations.
pub type Result<T> = std::result::Result<T, Error>;
