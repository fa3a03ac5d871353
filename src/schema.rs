//! Schema conformance checking for raw record structures.
//!
//! The validator consumes a schema-checking capability through the
//! [`SchemaCheck`] trait; [`RecordSchema`] is the default implementation: an
//! explicit recursive visitor over `serde_json::Value` keyed on a fixed set
//! of known child-collection field names. Every violation is reported with a
//! dotted/indexed path (e.g. `tasks[3].priority`). A file whose top-level
//! shape is unusable produces a single issue rather than aborting the pass.

use serde_json::Value;

use crate::models::{FileKind, SourceFile};
use crate::reference::IDENTITY_LEN;

/// One schema violation in one raw structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    /// Dotted/indexed path to the offending location, when one exists
    pub path: Option<String>,

    /// What is wrong
    pub message: String,
}

impl SchemaIssue {
    fn at(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            message: message.into(),
        }
    }

    fn top_level(message: impl Into<String>) -> Self {
        Self {
            path: None,
            message: message.into(),
        }
    }
}

/// Schema-checking capability consumed by the validator.
pub trait SchemaCheck {
    /// Check one loaded file's raw structure, accumulating one issue per
    /// violation. Must never panic on malformed input.
    fn check(&self, file: &SourceFile) -> Vec<SchemaIssue>;
}

const ITEM_KINDS: &[&str] = &[
    "module",
    "feature",
    "requirement",
    "trait",
    "task",
    "epic",
    "bug",
    "spike",
    "infra",
];

const ITEM_STATUSES: &[&str] = &["not_started", "in_progress", "implemented", "deprecated"];

const TASK_STATUSES: &[&str] = &["pending", "in_progress", "done", "blocked", "cancelled"];

/// Reference-bearing fields on a spec item that hold lists of tokens.
const ITEM_REF_LISTS: &[&str] = &["traits", "depends_on", "implements", "relates_to", "supersedes"];

/// Reference-bearing list fields on a task.
const TASK_REF_LISTS: &[&str] = &["depends_on", "blocked_by", "tests", "context"];

/// Child-collection field names that nest further items.
const CHILD_COLLECTIONS: &[&str] = &["children", "subitems"];

/// Meta-manifest collections and the record shape each holds.
const META_COLLECTIONS: &[&str] = &["agents", "workflows", "conventions", "observations", "inbox"];

/// Default recursive schema checker for manifest, task, and meta-manifest
/// files.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordSchema;

impl RecordSchema {
    /// Create a checker.
    pub fn new() -> Self {
        Self
    }

    fn check_manifest(&self, root: &Value, issues: &mut Vec<SchemaIssue>) {
        let Some(object) = root.as_object() else {
            issues.push(SchemaIssue::top_level("manifest root must be an object"));
            return;
        };
        match object.get("items") {
            Some(Value::Array(items)) => {
                for (idx, item) in items.iter().enumerate() {
                    self.check_item(item, &format!("items[{}]", idx), issues);
                }
            }
            Some(_) => issues.push(SchemaIssue::at("items", "must be an array")),
            None => issues.push(SchemaIssue::top_level("manifest is missing `items`")),
        }
    }

    fn check_tasks_file(&self, root: &Value, issues: &mut Vec<SchemaIssue>) {
        let Some(object) = root.as_object() else {
            issues.push(SchemaIssue::top_level("tasks root must be an object"));
            return;
        };
        match object.get("tasks") {
            Some(Value::Array(tasks)) => {
                for (idx, task) in tasks.iter().enumerate() {
                    self.check_task(task, &format!("tasks[{}]", idx), issues);
                }
            }
            Some(_) => issues.push(SchemaIssue::at("tasks", "must be an array")),
            None => issues.push(SchemaIssue::top_level("tasks file is missing `tasks`")),
        }
    }

    fn check_meta_manifest(&self, root: &Value, issues: &mut Vec<SchemaIssue>) {
        let Some(object) = root.as_object() else {
            issues.push(SchemaIssue::top_level("meta-manifest root must be an object"));
            return;
        };
        for collection in META_COLLECTIONS {
            match object.get(*collection) {
                None => {}
                Some(Value::Array(records)) => {
                    for (idx, record) in records.iter().enumerate() {
                        self.check_meta_record(record, &format!("{}[{}]", collection, idx), issues);
                    }
                }
                Some(_) => issues.push(SchemaIssue::at(*collection, "must be an array")),
            }
        }
    }

    fn check_item(&self, value: &Value, path: &str, issues: &mut Vec<SchemaIssue>) {
        let Some(object) = value.as_object() else {
            issues.push(SchemaIssue::at(path, "item must be an object"));
            return;
        };

        self.check_identity(object.get("id"), path, issues);
        self.check_required_string(object.get("title"), path, "title", issues);

        match object.get("kind") {
            Some(Value::String(kind)) if ITEM_KINDS.contains(&kind.as_str()) => {}
            Some(Value::String(kind)) => issues.push(SchemaIssue::at(
                format!("{}.kind", path),
                format!("unknown item kind `{}`", kind),
            )),
            Some(_) => issues.push(SchemaIssue::at(format!("{}.kind", path), "must be a string")),
            None => issues.push(SchemaIssue::at(format!("{}.kind", path), "is required")),
        }

        self.check_status(object.get("status"), path, ITEM_STATUSES, issues);
        self.check_priority(object.get("priority"), path, issues);
        self.check_string_list(object.get("aliases"), path, "aliases", issues);
        for field in ITEM_REF_LISTS {
            self.check_string_list(object.get(*field), path, field, issues);
        }

        if let Some(criteria) = object.get("criteria") {
            match criteria {
                Value::Array(entries) => {
                    for (idx, entry) in entries.iter().enumerate() {
                        self.check_criterion(entry, &format!("{}.criteria[{}]", path, idx), issues);
                    }
                }
                _ => issues.push(SchemaIssue::at(format!("{}.criteria", path), "must be an array")),
            }
        }

        if let Some(nested) = object.get("nested") {
            if !nested.is_boolean() {
                issues.push(SchemaIssue::at(format!("{}.nested", path), "must be a boolean"));
            }
        }

        // Recurse into positionally nested children.
        for collection in CHILD_COLLECTIONS {
            match object.get(*collection) {
                None => {}
                Some(Value::Array(children)) => {
                    for (idx, child) in children.iter().enumerate() {
                        self.check_item(child, &format!("{}.{}[{}]", path, collection, idx), issues);
                    }
                }
                Some(_) => issues.push(SchemaIssue::at(
                    format!("{}.{}", path, collection),
                    "must be an array",
                )),
            }
        }
    }

    fn check_task(&self, value: &Value, path: &str, issues: &mut Vec<SchemaIssue>) {
        let Some(object) = value.as_object() else {
            issues.push(SchemaIssue::at(path, "task must be an object"));
            return;
        };

        self.check_identity(object.get("id"), path, issues);
        self.check_required_string(object.get("title"), path, "title", issues);
        self.check_status(object.get("status"), path, TASK_STATUSES, issues);
        self.check_priority(object.get("priority"), path, issues);
        self.check_string_list(object.get("aliases"), path, "aliases", issues);

        match object.get("kind") {
            None => {}
            Some(Value::String(kind)) if kind == "task" || kind == "spike" => {}
            Some(Value::String(kind)) => issues.push(SchemaIssue::at(
                format!("{}.kind", path),
                format!("unknown task kind `{}`", kind),
            )),
            Some(_) => issues.push(SchemaIssue::at(format!("{}.kind", path), "must be a string")),
        }

        for field in ["spec_ref", "meta_ref"] {
            if let Some(value) = object.get(field) {
                if !value.is_string() {
                    issues.push(SchemaIssue::at(format!("{}.{}", path, field), "must be a string"));
                }
            }
        }

        for field in TASK_REF_LISTS {
            self.check_string_list(object.get(*field), path, field, issues);
        }

        if let Some(eligible) = object.get("automation_eligible") {
            if !eligible.is_boolean() {
                issues.push(SchemaIssue::at(
                    format!("{}.automation_eligible", path),
                    "must be a boolean",
                ));
            }
        }
    }

    fn check_meta_record(&self, value: &Value, path: &str, issues: &mut Vec<SchemaIssue>) {
        let Some(object) = value.as_object() else {
            issues.push(SchemaIssue::at(path, "record must be an object"));
            return;
        };

        self.check_identity(object.get("id"), path, issues);

        // Agents and workflows carry `name`; the rest carry `title`.
        if object.contains_key("name") {
            self.check_required_string(object.get("name"), path, "name", issues);
        } else {
            self.check_required_string(object.get("title"), path, "title", issues);
        }

        self.check_string_list(object.get("aliases"), path, "aliases", issues);
        self.check_string_list(object.get("steps"), path, "steps", issues);
    }

    fn check_criterion(&self, value: &Value, path: &str, issues: &mut Vec<SchemaIssue>) {
        let Some(object) = value.as_object() else {
            issues.push(SchemaIssue::at(path, "criterion must be an object"));
            return;
        };
        for field in ["id", "given", "when", "then"] {
            match object.get(field) {
                Some(Value::String(_)) => {}
                Some(_) => {
                    issues.push(SchemaIssue::at(format!("{}.{}", path, field), "must be a string"))
                }
                None => issues.push(SchemaIssue::at(format!("{}.{}", path, field), "is required")),
            }
        }
    }

    fn check_identity(&self, value: Option<&Value>, path: &str, issues: &mut Vec<SchemaIssue>) {
        match value {
            Some(Value::String(id)) if id.len() == IDENTITY_LEN => {}
            Some(Value::String(id)) => issues.push(SchemaIssue::at(
                format!("{}.id", path),
                format!("must be a {}-character identity, got {} characters", IDENTITY_LEN, id.len()),
            )),
            Some(_) => issues.push(SchemaIssue::at(format!("{}.id", path), "must be a string")),
            None => issues.push(SchemaIssue::at(format!("{}.id", path), "is required")),
        }
    }

    fn check_required_string(
        &self,
        value: Option<&Value>,
        path: &str,
        field: &str,
        issues: &mut Vec<SchemaIssue>,
    ) {
        match value {
            Some(Value::String(s)) if !s.is_empty() => {}
            Some(Value::String(_)) => {
                issues.push(SchemaIssue::at(format!("{}.{}", path, field), "must not be empty"))
            }
            Some(_) => issues.push(SchemaIssue::at(format!("{}.{}", path, field), "must be a string")),
            None => issues.push(SchemaIssue::at(format!("{}.{}", path, field), "is required")),
        }
    }

    fn check_status(
        &self,
        value: Option<&Value>,
        path: &str,
        allowed: &[&str],
        issues: &mut Vec<SchemaIssue>,
    ) {
        match value {
            None => {}
            Some(Value::String(status)) if allowed.contains(&status.as_str()) => {}
            Some(Value::String(status)) => issues.push(SchemaIssue::at(
                format!("{}.status", path),
                format!("unknown status `{}`", status),
            )),
            Some(_) => issues.push(SchemaIssue::at(format!("{}.status", path), "must be a string")),
        }
    }

    fn check_priority(&self, value: Option<&Value>, path: &str, issues: &mut Vec<SchemaIssue>) {
        match value {
            None => {}
            Some(Value::Number(n)) if n.as_u64().is_some_and(|p| p <= 4) => {}
            Some(_) => issues.push(SchemaIssue::at(
                format!("{}.priority", path),
                "must be an integer between 0 and 4",
            )),
        }
    }

    fn check_string_list(
        &self,
        value: Option<&Value>,
        path: &str,
        field: &str,
        issues: &mut Vec<SchemaIssue>,
    ) {
        match value {
            None => {}
            Some(Value::Array(entries)) => {
                for (idx, entry) in entries.iter().enumerate() {
                    if !entry.is_string() {
                        issues.push(SchemaIssue::at(
                            format!("{}.{}[{}]", path, field, idx),
                            "must be a string",
                        ));
                    }
                }
            }
            Some(_) => {
                issues.push(SchemaIssue::at(format!("{}.{}", path, field), "must be an array"))
            }
        }
    }
}

impl SchemaCheck for RecordSchema {
    fn check(&self, file: &SourceFile) -> Vec<SchemaIssue> {
        let mut issues = Vec::new();
        match file.kind {
            FileKind::Manifest => self.check_manifest(&file.raw, &mut issues),
            FileKind::Tasks => self.check_tasks_file(&file.raw, &mut issues),
            FileKind::MetaManifest => self.check_meta_manifest(&file.raw, &mut issues),
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest(raw: serde_json::Value) -> SourceFile {
        SourceFile::new("specs/manifest.json", FileKind::Manifest, raw)
    }

    const GOOD_ID: &str = "01ARZ3NDEKTSV4RRFFQ69G5FAV";

    #[test]
    fn test_well_formed_manifest_passes() {
        let file = manifest(json!({
            "items": [{
                "id": GOOD_ID,
                "kind": "feature",
                "title": "Login",
                "status": "in_progress",
                "priority": 1,
                "aliases": ["login"],
                "criteria": [
                    {"id": "ac-1", "given": "a user", "when": "they log in", "then": "a session exists"}
                ],
                "children": []
            }]
        }));
        assert!(RecordSchema::new().check(&file).is_empty());
    }

    #[test]
    fn test_unparseable_top_level_is_one_finding() {
        let file = manifest(json!("not an object"));
        let issues = RecordSchema::new().check(&file);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].path.is_none());
    }

    #[test]
    fn test_bad_priority_path_is_indexed() {
        let file = SourceFile::new(
            "tasks.json",
            FileKind::Tasks,
            json!({"tasks": [
                {"id": GOOD_ID, "title": "ok"},
                {"id": GOOD_ID, "title": "ok"},
                {"id": GOOD_ID, "title": "ok"},
                {"id": GOOD_ID, "title": "bad", "priority": 9}
            ]}),
        );
        let issues = RecordSchema::new().check(&file);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path.as_deref(), Some("tasks[3].priority"));
    }

    #[test]
    fn test_short_id_reported() {
        let file = manifest(json!({"items": [{"id": "abc", "kind": "module", "title": "M"}]}));
        let issues = RecordSchema::new().check(&file);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path.as_deref(), Some("items[0].id"));
        assert!(issues[0].message.contains("26-character"));
    }

    #[test]
    fn test_violations_accumulate() {
        let file = manifest(json!({"items": [
            {"kind": "widget", "title": "", "status": "wat", "priority": "high"}
        ]}));
        let issues = RecordSchema::new().check(&file);
        let paths: Vec<&str> = issues.iter().filter_map(|i| i.path.as_deref()).collect();
        assert!(paths.contains(&"items[0].id"));
        assert!(paths.contains(&"items[0].kind"));
        assert!(paths.contains(&"items[0].title"));
        assert!(paths.contains(&"items[0].status"));
        assert!(paths.contains(&"items[0].priority"));
    }

    #[test]
    fn test_nested_children_are_visited() {
        let file = manifest(json!({"items": [{
            "id": GOOD_ID,
            "kind": "module",
            "title": "M",
            "children": [{"id": GOOD_ID, "kind": "feature", "title": "F",
                          "subitems": [{"id": "nope", "kind": "requirement", "title": "R"}]}]
        }]}));
        let issues = RecordSchema::new().check(&file);
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].path.as_deref(),
            Some("items[0].children[0].subitems[0].id")
        );
    }

    #[test]
    fn test_criterion_clauses_required() {
        let file = manifest(json!({"items": [{
            "id": GOOD_ID,
            "kind": "feature",
            "title": "F",
            "criteria": [{"id": "ac-1", "given": "g", "when": "w"}]
        }]}));
        let issues = RecordSchema::new().check(&file);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path.as_deref(), Some("items[0].criteria[0].then"));
    }

    #[test]
    fn test_meta_manifest_collections() {
        let file = SourceFile::new(
            "meta.json",
            FileKind::MetaManifest,
            json!({
                "agents": [{"id": GOOD_ID, "name": "planner"}],
                "workflows": [{"id": GOOD_ID, "name": "review", "steps": ["a", 3]}],
                "conventions": "nope"
            }),
        );
        let issues = RecordSchema::new().check(&file);
        let paths: Vec<&str> = issues.iter().filter_map(|i| i.path.as_deref()).collect();
        assert!(paths.contains(&"workflows[0].steps[1]"));
        assert!(paths.contains(&"conventions"));
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn test_unknown_task_kind() {
        let file = SourceFile::new(
            "tasks.json",
            FileKind::Tasks,
            json!({"tasks": [{"id": GOOD_ID, "title": "T", "kind": "chore"}]}),
        );
        let issues = RecordSchema::new().check(&file);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path.as_deref(), Some("tasks[0].kind"));
    }
}
