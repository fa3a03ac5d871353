//! Data models for Astrolabe entities.
//!
//! This module defines the core data structures:
//! - `SpecItem` - Specification records with criteria, traits, and children
//! - `Task` - Work items with status, references, and automation marking
//! - `AcceptanceCriterion` - A given/when/then clause owned by one record
//! - `Agent` / `Workflow` / `Convention` / `Observation` / `InboxItem` - Meta-entities
//! - `Snapshot` - The in-memory entity set handed to the engine for one call
//!
//! Every entity carries a 26-character lexicographically time-sortable
//! identity, assigned once by its constructor and immutable afterwards.
//! Entities are edited by whole-record replacement; there is no partial
//! field update primitive at this layer.

pub mod snapshot;

pub use snapshot::{FileKind, MetaSet, Snapshot, SourceFile};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Generate a fresh 26-character time-sortable identity.
pub fn new_identity() -> String {
    Ulid::new().to_string()
}

fn default_priority() -> u8 {
    2
}

/// Status of a specification item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    NotStarted,
    InProgress,
    Implemented,
    Deprecated,
}

/// Task status in the workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
    Blocked,
    Cancelled,
}

/// Kind of a specification item.
///
/// Entry-point kinds (`module`, `task`, `epic`, `bug`, `spike`, `infra`) are
/// self-justifying for orphan detection: they are roots of the graph rather
/// than things other records must point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Module,
    Feature,
    Requirement,
    /// Reusable acceptance-criteria template other items inherit by reference.
    Trait,
    /// Task-shaped entry recorded inline in a manifest.
    Task,
    Epic,
    Bug,
    Spike,
    Infra,
}

impl ItemKind {
    /// Returns true if items of this kind are reusable criteria templates.
    pub fn is_trait(&self) -> bool {
        matches!(self, ItemKind::Trait)
    }

    /// Returns true if items of this kind justify their own existence and
    /// are never flagged as orphans.
    pub fn is_entry_point(&self) -> bool {
        matches!(
            self,
            ItemKind::Module
                | ItemKind::Task
                | ItemKind::Epic
                | ItemKind::Bug
                | ItemKind::Spike
                | ItemKind::Infra
        )
    }

    /// Get all item kinds.
    pub fn all() -> &'static [ItemKind] {
        &[
            ItemKind::Module,
            ItemKind::Feature,
            ItemKind::Requirement,
            ItemKind::Trait,
            ItemKind::Task,
            ItemKind::Epic,
            ItemKind::Bug,
            ItemKind::Spike,
            ItemKind::Infra,
        ]
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemKind::Module => "module",
            ItemKind::Feature => "feature",
            ItemKind::Requirement => "requirement",
            ItemKind::Trait => "trait",
            ItemKind::Task => "task",
            ItemKind::Epic => "epic",
            ItemKind::Bug => "bug",
            ItemKind::Spike => "spike",
            ItemKind::Infra => "infra",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "module" => Ok(ItemKind::Module),
            "feature" => Ok(ItemKind::Feature),
            "requirement" => Ok(ItemKind::Requirement),
            "trait" => Ok(ItemKind::Trait),
            "task" => Ok(ItemKind::Task),
            "epic" => Ok(ItemKind::Epic),
            "bug" => Ok(ItemKind::Bug),
            "spike" => Ok(ItemKind::Spike),
            "infra" => Ok(ItemKind::Infra),
            _ => Err(format!("Unknown item kind: {}", s)),
        }
    }
}

/// Kind of a standalone task record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    #[default]
    Task,
    /// Exploratory work; never eligible for automation.
    Spike,
}

/// Kind tag for any entity visible to the reference index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Item(ItemKind),
    Task(TaskKind),
    Agent,
    Workflow,
    Convention,
    Observation,
    Inbox,
}

impl EntityKind {
    /// Returns true for the meta-entity kinds (agents, workflows,
    /// conventions, observations, inbox items).
    pub fn is_meta(&self) -> bool {
        matches!(
            self,
            EntityKind::Agent
                | EntityKind::Workflow
                | EntityKind::Convention
                | EntityKind::Observation
                | EntityKind::Inbox
        )
    }

    /// Returns true for specification items of any kind.
    pub fn is_item(&self) -> bool {
        matches!(self, EntityKind::Item(_))
    }

    /// Returns true for trait items specifically.
    pub fn is_trait(&self) -> bool {
        matches!(self, EntityKind::Item(ItemKind::Trait))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Item(kind) => write!(f, "{}", kind),
            EntityKind::Task(TaskKind::Task) => write!(f, "task"),
            EntityKind::Task(TaskKind::Spike) => write!(f, "spike"),
            EntityKind::Agent => write!(f, "agent"),
            EntityKind::Workflow => write!(f, "workflow"),
            EntityKind::Convention => write!(f, "convention"),
            EntityKind::Observation => write!(f, "observation"),
            EntityKind::Inbox => write!(f, "inbox"),
        }
    }
}

/// A single given/when/then acceptance criterion.
///
/// Owned by exactly one item or trait; immutable once loaded (edits replace
/// the whole owning record).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceCriterion {
    /// Short local identifier, unique within the owning record (e.g. "ac-1")
    pub id: String,

    /// Precondition clause
    pub given: String,

    /// Action clause
    pub when: String,

    /// Expected-outcome clause
    pub then: String,
}

impl AcceptanceCriterion {
    /// Create a criterion with the given local id and clauses.
    pub fn new(
        id: impl Into<String>,
        given: impl Into<String>,
        when: impl Into<String>,
        then: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            given: given.into(),
            when: when.into(),
            then: then.into(),
        }
    }
}

/// A specification record tracked by Astrolabe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecItem {
    /// Unique 26-character identity, assigned at creation
    pub id: String,

    /// Human-chosen short names; should be unique across the graph
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Item kind
    pub kind: ItemKind,

    /// Item title
    pub title: String,

    /// Detailed description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Current status
    #[serde(default)]
    pub status: ItemStatus,

    /// Priority level (0-4, lower is higher priority)
    #[serde(default = "default_priority")]
    pub priority: u8,

    /// References to traits whose criteria this item inherits, in order
    #[serde(default)]
    pub traits: Vec<String>,

    /// References to items this item depends on
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// References to items this item implements
    #[serde(default)]
    pub implements: Vec<String>,

    /// Informational cross-links
    #[serde(default)]
    pub relates_to: Vec<String>,

    /// References to items this item replaces
    #[serde(default)]
    pub supersedes: Vec<String>,

    /// Own acceptance criteria, in declared order
    #[serde(default)]
    pub criteria: Vec<AcceptanceCriterion>,

    /// Positionally nested child items
    #[serde(default)]
    pub children: Vec<SpecItem>,

    /// Structural-nesting marker: this item is owned by its parent record
    /// and is not expected to be independently referenced
    #[serde(default)]
    pub nested: bool,

    /// Tags for categorization
    #[serde(default)]
    pub tags: Vec<String>,

    /// Source file this item was loaded from, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl SpecItem {
    /// Create a new item of the given kind, assigning a fresh identity.
    pub fn new(kind: ItemKind, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_identity(),
            aliases: Vec::new(),
            kind,
            title: title.into(),
            description: None,
            status: ItemStatus::default(),
            priority: default_priority(),
            traits: Vec::new(),
            depends_on: Vec::new(),
            implements: Vec::new(),
            relates_to: Vec::new(),
            supersedes: Vec::new(),
            criteria: Vec::new(),
            children: Vec::new(),
            nested: false,
            tags: Vec::new(),
            file: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a trait item: a reusable acceptance-criteria template.
    pub fn new_trait(title: impl Into<String>) -> Self {
        Self::new(ItemKind::Trait, title)
    }

    /// Preferred display reference for this item.
    pub fn display_ref(&self) -> String {
        crate::reference::display_ref(&self.id, &self.aliases)
    }
}

/// A standalone work item tracked by Astrolabe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique 26-character identity, assigned at creation
    pub id: String,

    /// Human-chosen short names; should be unique across the graph
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Task title
    pub title: String,

    /// Detailed description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Task kind (task or spike)
    #[serde(default)]
    pub kind: TaskKind,

    /// Current status
    #[serde(default)]
    pub status: TaskStatus,

    /// Priority level (0-4, lower is higher priority)
    #[serde(default = "default_priority")]
    pub priority: u8,

    /// Reference to the spec item this task implements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_ref: Option<String>,

    /// Reference to a meta-entity providing context (agent, workflow, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_ref: Option<String>,

    /// References to records this task depends on
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// References to records blocking this task
    #[serde(default)]
    pub blocked_by: Vec<String>,

    /// References to records verifying this task
    #[serde(default)]
    pub tests: Vec<String>,

    /// Additional context references
    #[serde(default)]
    pub context: Vec<String>,

    /// Marked as eligible for automated execution
    #[serde(default)]
    pub automation_eligible: bool,

    /// Tags for categorization
    #[serde(default)]
    pub tags: Vec<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Closure timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,

    /// Reason for closing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_reason: Option<String>,
}

impl Task {
    /// Create a new task with a fresh identity.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_identity(),
            aliases: Vec::new(),
            title: title.into(),
            description: None,
            kind: TaskKind::default(),
            status: TaskStatus::default(),
            priority: default_priority(),
            spec_ref: None,
            meta_ref: None,
            depends_on: Vec::new(),
            blocked_by: Vec::new(),
            tests: Vec::new(),
            context: Vec::new(),
            automation_eligible: false,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
            closed_at: None,
            closed_reason: None,
        }
    }

    /// Create a new spike: exploratory work that is never automated.
    pub fn new_spike(title: impl Into<String>) -> Self {
        let mut task = Self::new(title);
        task.kind = TaskKind::Spike;
        task
    }

    /// Preferred display reference for this task.
    pub fn display_ref(&self) -> String {
        crate::reference::display_ref(&self.id, &self.aliases)
    }
}

/// An agent definition tracked in the meta-manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Unique 26-character identity, assigned at creation
    pub id: String,

    /// Human-chosen short names
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Agent name
    pub name: String,

    /// Role description (e.g. "reviewer", "implementer")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Detailed description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Agent {
    /// Create a new agent with a fresh identity.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_identity(),
            aliases: Vec::new(),
            name: name.into(),
            role: None,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A workflow definition tracked in the meta-manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    /// Unique 26-character identity, assigned at creation
    pub id: String,

    /// Human-chosen short names
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Workflow name
    pub name: String,

    /// Ordered steps
    #[serde(default)]
    pub steps: Vec<String>,

    /// Detailed description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    /// Create a new workflow with a fresh identity.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_identity(),
            aliases: Vec::new(),
            name: name.into(),
            steps: Vec::new(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A project convention tracked in the meta-manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Convention {
    /// Unique 26-character identity, assigned at creation
    pub id: String,

    /// Human-chosen short names
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Convention title
    pub title: String,

    /// Why the convention exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,

    /// Detailed description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Convention {
    /// Create a new convention with a fresh identity.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_identity(),
            aliases: Vec::new(),
            title: title.into(),
            rationale: None,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A recorded observation tracked in the meta-manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Unique 26-character identity, assigned at creation
    pub id: String,

    /// Human-chosen short names
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Observation title
    pub title: String,

    /// Where the observation came from (agent, review, incident, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Detailed description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Observation {
    /// Create a new observation with a fresh identity.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_identity(),
            aliases: Vec::new(),
            title: title.into(),
            source: None,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// An unsorted inbox item awaiting triage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxItem {
    /// Unique 26-character identity, assigned at creation
    pub id: String,

    /// Human-chosen short names
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Item title
    pub title: String,

    /// Whether the item has been triaged
    #[serde(default)]
    pub resolved: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl InboxItem {
    /// Create a new inbox item with a fresh identity.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_identity(),
            aliases: Vec::new(),
            title: title.into(),
            resolved: false,
            created_at: now,
            updated_at: now,
        }
    }
}
