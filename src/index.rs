//! Reference index: resolves `@token` strings against a loaded entity set.
//!
//! The index is built once per snapshot and then queried read-only. The
//! resolution order is fixed:
//!
//! 1. Exact identity match (always unambiguous, wins over everything)
//! 2. Identity-prefix match (unique, or `Ambiguous` with candidates)
//! 3. Alias match (unique, or `DuplicateAlias` with candidates)
//! 4. `NotFound`
//!
//! Resolution failures are expected outcomes and are returned as typed
//! values, never raised through [`crate::Error`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{EntityKind, Snapshot};
use crate::reference::normalize_ref;

/// One entity visible to the index.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    /// Full 26-character identity
    pub identity: String,

    /// Declared aliases, in declared order
    pub aliases: Vec<String>,

    /// Entity kind, for wrong-kind reference warnings
    pub kind: EntityKind,

    /// Title or name, for findings
    pub title: String,
}

/// Why a reference failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("reference does not match any entity")]
    NotFound,

    #[error("reference is an ambiguous prefix of {} identities", .0.len())]
    Ambiguous(Vec<String>),

    #[error("alias is declared by {} entities", .0.len())]
    DuplicateAlias(Vec<String>),
}

impl ResolveError {
    /// Stable wire code for this failure kind.
    pub fn code(&self) -> &'static str {
        match self {
            ResolveError::NotFound => "not_found",
            ResolveError::Ambiguous(_) => "ambiguous",
            ResolveError::DuplicateAlias(_) => "duplicate_slug",
        }
    }

    /// Candidate identities, when the failure carries them.
    pub fn candidates(&self) -> Option<&[String]> {
        match self {
            ResolveError::NotFound => None,
            ResolveError::Ambiguous(c) | ResolveError::DuplicateAlias(c) => Some(c),
        }
    }
}

/// Wire shape of a resolution, forwarded verbatim by the CLI and HTTP layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub ok: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<String>>,
}

impl From<Result<String, ResolveError>> for ResolutionResult {
    fn from(result: Result<String, ResolveError>) -> Self {
        match result {
            Ok(identity) => Self {
                ok: true,
                identity: Some(identity),
                error: None,
                candidates: None,
            },
            Err(err) => Self {
                ok: false,
                identity: None,
                error: Some(err.code().to_string()),
                candidates: err.candidates().map(|c| c.to_vec()),
            },
        }
    }
}

/// Lookup structure over one loaded entity set.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    /// Entries in insertion order (load order of the snapshot)
    entries: Vec<IndexEntry>,

    /// Exact-identity lookup
    by_id: HashMap<String, usize>,
}

impl ReferenceIndex {
    /// Build an index over every entity in the snapshot: spec items (nested
    /// children included), tasks, and meta-entities when present.
    pub fn build(snapshot: &Snapshot) -> Self {
        let mut index = Self::default();

        for item in snapshot.all_items() {
            index.push(IndexEntry {
                identity: item.id.clone(),
                aliases: item.aliases.clone(),
                kind: EntityKind::Item(item.kind),
                title: item.title.clone(),
            });
        }

        for task in &snapshot.tasks {
            index.push(IndexEntry {
                identity: task.id.clone(),
                aliases: task.aliases.clone(),
                kind: EntityKind::Task(task.kind),
                title: task.title.clone(),
            });
        }

        if let Some(meta) = &snapshot.meta {
            for agent in &meta.agents {
                index.push(IndexEntry {
                    identity: agent.id.clone(),
                    aliases: agent.aliases.clone(),
                    kind: EntityKind::Agent,
                    title: agent.name.clone(),
                });
            }
            for workflow in &meta.workflows {
                index.push(IndexEntry {
                    identity: workflow.id.clone(),
                    aliases: workflow.aliases.clone(),
                    kind: EntityKind::Workflow,
                    title: workflow.name.clone(),
                });
            }
            for convention in &meta.conventions {
                index.push(IndexEntry {
                    identity: convention.id.clone(),
                    aliases: convention.aliases.clone(),
                    kind: EntityKind::Convention,
                    title: convention.title.clone(),
                });
            }
            for observation in &meta.observations {
                index.push(IndexEntry {
                    identity: observation.id.clone(),
                    aliases: observation.aliases.clone(),
                    kind: EntityKind::Observation,
                    title: observation.title.clone(),
                });
            }
            for inbox in &meta.inbox {
                index.push(IndexEntry {
                    identity: inbox.id.clone(),
                    aliases: inbox.aliases.clone(),
                    kind: EntityKind::Inbox,
                    title: inbox.title.clone(),
                });
            }
        }

        tracing::debug!(entries = index.entries.len(), "built reference index");
        index
    }

    fn push(&mut self, entry: IndexEntry) {
        debug_assert!(!entry.identity.is_empty(), "entity with empty identity");
        // First entry wins on identity collision; the schema pass reports
        // duplicate ids.
        self.by_id
            .entry(entry.identity.clone())
            .or_insert(self.entries.len());
        self.entries.push(entry);
    }

    /// Resolve a reference token to a full identity.
    pub fn resolve(&self, reference: &str) -> Result<String, ResolveError> {
        let token = normalize_ref(reference);
        if token.is_empty() {
            return Err(ResolveError::NotFound);
        }

        // Exact identity match always wins.
        if let Some(&idx) = self.by_id.get(token) {
            return Ok(self.entries[idx].identity.clone());
        }

        // Identity-prefix match, candidates in insertion order.
        let prefix_matches: Vec<&IndexEntry> = self
            .entries
            .iter()
            .filter(|e| e.identity.starts_with(token))
            .collect();
        match prefix_matches.len() {
            0 => {}
            1 => return Ok(prefix_matches[0].identity.clone()),
            _ => {
                return Err(ResolveError::Ambiguous(
                    prefix_matches.iter().map(|e| e.identity.clone()).collect(),
                ));
            }
        }

        // Alias match, verbatim comparison.
        let alias_matches: Vec<&IndexEntry> = self
            .entries
            .iter()
            .filter(|e| e.aliases.iter().any(|a| a == token))
            .collect();
        match alias_matches.len() {
            0 => Err(ResolveError::NotFound),
            1 => Ok(alias_matches[0].identity.clone()),
            _ => Err(ResolveError::DuplicateAlias(
                alias_matches.iter().map(|e| e.identity.clone()).collect(),
            )),
        }
    }

    /// Resolve and wrap into the wire shape.
    pub fn resolve_wire(&self, reference: &str) -> ResolutionResult {
        self.resolve(reference).into()
    }

    /// Write-time alias-uniqueness check for add/update flows.
    ///
    /// Fails when the alias is already held by an entity other than the one
    /// being excluded (the entity under edit).
    pub fn alias_is_unique(&self, alias: &str, exclude_identity: Option<&str>) -> bool {
        if alias.is_empty() {
            return true;
        }
        !self.entries.iter().any(|e| {
            e.aliases.iter().any(|a| a == alias) && Some(e.identity.as_str()) != exclude_identity
        })
    }

    /// Look up an entry by full identity.
    pub fn entry(&self, identity: &str) -> Option<&IndexEntry> {
        self.by_id.get(identity).map(|&idx| &self.entries[idx])
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }

    /// Number of indexed entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
