//! The in-memory entity set the engine operates on.
//!
//! A `Snapshot` is loaded by the persistence collaborator and handed to the
//! engine for the duration of one call. The engine never mutates or persists
//! it; repeated runs over the same snapshot produce identical results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Agent, Convention, InboxItem, Observation, SpecItem, Task, Workflow};

/// Kind of a loaded source file, which decides its expected top-level shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Spec-item manifest: `{ "items": [...] }`
    Manifest,
    /// Task collection: `{ "tasks": [...] }`
    Tasks,
    /// Meta-entity manifest: `{ "agents": [...], "workflows": [...], ... }`
    MetaManifest,
}

/// One loaded file: its path, declared kind, and raw structure.
///
/// The raw value is kept alongside the typed entities so the schema pass can
/// report authoring errors the typed load had to paper over.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path the file was loaded from, for findings
    pub path: String,

    /// Declared file kind
    pub kind: FileKind,

    /// Raw parsed structure
    pub raw: Value,
}

impl SourceFile {
    /// Create a source file record.
    pub fn new(path: impl Into<String>, kind: FileKind, raw: Value) -> Self {
        Self {
            path: path.into(),
            kind,
            raw,
        }
    }
}

/// Meta-entities loaded from the meta-manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetaSet {
    #[serde(default)]
    pub agents: Vec<Agent>,

    #[serde(default)]
    pub workflows: Vec<Workflow>,

    #[serde(default)]
    pub conventions: Vec<Convention>,

    #[serde(default)]
    pub observations: Vec<Observation>,

    #[serde(default)]
    pub inbox: Vec<InboxItem>,
}

/// A loaded entity set: the unit the engine validates, resolves against, and
/// reports on.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Raw loaded files, in load order
    pub files: Vec<SourceFile>,

    /// Top-level spec items, in load order (children are nested inside)
    pub items: Vec<SpecItem>,

    /// Tasks, in load order
    pub tasks: Vec<Task>,

    /// Meta-entities, when the meta-manifest was loaded
    pub meta: Option<MetaSet>,
}

impl Snapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// All spec items in deterministic depth-first order, nested children
    /// included.
    pub fn all_items(&self) -> Vec<&SpecItem> {
        fn walk<'a>(item: &'a SpecItem, out: &mut Vec<&'a SpecItem>) {
            out.push(item);
            for child in &item.children {
                walk(child, out);
            }
        }

        let mut out = Vec::new();
        for item in &self.items {
            walk(item, &mut out);
        }
        out
    }

    /// Find a spec item (nested children included) by full identity.
    pub fn find_item(&self, identity: &str) -> Option<&SpecItem> {
        self.all_items().into_iter().find(|i| i.id == identity)
    }

    /// Find a task by full identity.
    pub fn find_task(&self, identity: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemKind;

    #[test]
    fn test_all_items_flattens_depth_first() {
        let mut root = SpecItem::new(ItemKind::Module, "Auth");
        let mut child = SpecItem::new(ItemKind::Feature, "Login");
        child.nested = true;
        let mut grandchild = SpecItem::new(ItemKind::Requirement, "Rate limit");
        grandchild.nested = true;
        let sibling = SpecItem::new(ItemKind::Module, "Billing");

        let grandchild_id = grandchild.id.clone();
        child.children.push(grandchild);
        let child_id = child.id.clone();
        root.children.push(child);
        let root_id = root.id.clone();
        let sibling_id = sibling.id.clone();

        let snapshot = Snapshot {
            items: vec![root, sibling],
            ..Default::default()
        };

        let ids: Vec<String> = snapshot.all_items().iter().map(|i| i.id.clone()).collect();
        assert_eq!(ids, vec![root_id, child_id, grandchild_id, sibling_id]);
    }

    #[test]
    fn test_find_item_reaches_nested_children() {
        let mut root = SpecItem::new(ItemKind::Module, "Auth");
        let child = SpecItem::new(ItemKind::Feature, "Login");
        let child_id = child.id.clone();
        root.children.push(child);

        let snapshot = Snapshot {
            items: vec![root],
            ..Default::default()
        };

        assert!(snapshot.find_item(&child_id).is_some());
        assert!(snapshot.find_item("01ARZ3NDEKTSV4RRFFQ69G5FAV").is_none());
    }

    #[test]
    fn test_find_task() {
        let task = crate::models::Task::new("T");
        let id = task.id.clone();
        let snapshot = Snapshot {
            tasks: vec![task],
            ..Default::default()
        };
        assert_eq!(snapshot.find_task(&id).unwrap().title, "T");
    }
}
