//! The multi-pass validator.
//!
//! Given a loaded snapshot, a reference index, and a trait graph, the
//! validator produces one [`ValidationResult`] aggregating every check
//! category:
//!
//! - schema conformance (via the [`SchemaCheck`] collaborator)
//! - reference integrity over the fixed reference-bearing field list
//! - orphan detection for spec items
//! - trait cycles (delegated to [`TraitGraph::detect_cycles`])
//! - completeness (criteria, descriptions, parent/child status, coverage)
//! - automation-eligibility marks on tasks
//!
//! Checks are independent and additive: a failure in one never suppresses
//! the others, and findings are accumulated rather than thrown. The result
//! is recomputed in full on every call; the same snapshot always produces
//! byte-identical output. The serialized shape is shared verbatim by the
//! CLI's JSON mode and the HTTP validation endpoint.

pub mod automation;

pub use automation::{
    AutomationAssessment, AutomationVerdict, CriterionCheck, CriterionStatus, assess_automation,
};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::coverage::CoverageIndex;
use crate::index::{ReferenceIndex, ResolveError};
use crate::models::{ItemKind, ItemStatus, Snapshot, SpecItem};
use crate::reference::short_id;
use crate::schema::SchemaCheck;
use crate::traits::{TraitCycleError, TraitGraph};

/// One schema violation, located by file and path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaError {
    pub file: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// One reference-integrity finding (error or warning).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefFinding {
    /// Display reference of the entity declaring the reference
    pub item_ref: String,

    /// Field the reference appears in
    pub field: String,

    /// The reference string as written
    pub reference: String,

    pub message: String,
}

/// A spec item no reference points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanFinding {
    pub identity: String,
    pub title: String,
    pub kind: ItemKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Category of a completeness warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletenessKind {
    MissingAcceptanceCriteria,
    EmptyDescription,
    ImplementedParentUnstartedChild,
    UncoveredCriteria,
    AutomationMissingSpec,
}

/// One completeness warning. Warnings never affect the overall `valid` flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletenessWarning {
    #[serde(rename = "type")]
    pub warning_type: CompletenessKind,

    pub item_ref: String,
    pub item_title: String,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Counters over what one validation run looked at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationStats {
    pub files_checked: usize,
    pub items_checked: usize,
    pub tasks_checked: usize,
}

/// Counters over loaded meta-entities, present when a meta-manifest was
/// loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaStats {
    pub agents: usize,
    pub workflows: usize,
    pub conventions: usize,
    pub observations: usize,
}

/// Aggregated result of one validation run.
///
/// Purely derived: never mutated in place, recomputed in full per call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// True iff schema errors, reference errors, and trait cycles are all
    /// empty. Warnings and orphans never flip this flag.
    pub valid: bool,

    pub schema_errors: Vec<SchemaError>,
    pub ref_errors: Vec<RefFinding>,
    pub ref_warnings: Vec<RefFinding>,
    pub orphans: Vec<OrphanFinding>,
    pub completeness_warnings: Vec<CompletenessWarning>,
    pub trait_cycle_errors: Vec<TraitCycleError>,
    pub stats: ValidationStats,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_stats: Option<MetaStats>,
}

/// The validator: borrows its collaborators, owns no state across runs.
pub struct Validator<'a> {
    index: &'a ReferenceIndex,
    traits: &'a TraitGraph,
    schema: &'a dyn SchemaCheck,
    coverage: Option<&'a dyn CoverageIndex>,
}

impl<'a> Validator<'a> {
    /// Create a validator over the given index, trait graph, and schema
    /// checker. Coverage checking is off until a coverage index is supplied.
    pub fn new(
        index: &'a ReferenceIndex,
        traits: &'a TraitGraph,
        schema: &'a dyn SchemaCheck,
    ) -> Self {
        Self {
            index,
            traits,
            schema,
            coverage: None,
        }
    }

    /// Supply the covered-criterion keys gathered before this run; enables
    /// the coverage portion of the completeness check.
    pub fn with_coverage(mut self, coverage: &'a dyn CoverageIndex) -> Self {
        self.coverage = Some(coverage);
        self
    }

    /// Run every check category and merge the findings.
    pub fn run(&self, snapshot: &Snapshot) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.check_schema(snapshot, &mut result);
        let targets = self.check_references(snapshot, &mut result);
        self.check_orphans(snapshot, &targets, &mut result);
        let cycling = self.check_trait_cycles(&mut result);
        self.check_completeness(snapshot, &cycling, &mut result);
        self.check_automation_marks(snapshot, &mut result);

        result.stats = ValidationStats {
            files_checked: snapshot.files.len(),
            items_checked: snapshot.all_items().len(),
            tasks_checked: snapshot.tasks.len(),
        };
        result.meta_stats = snapshot.meta.as_ref().map(|meta| MetaStats {
            agents: meta.agents.len(),
            workflows: meta.workflows.len(),
            conventions: meta.conventions.len(),
            observations: meta.observations.len(),
        });

        result.valid = result.schema_errors.is_empty()
            && result.ref_errors.is_empty()
            && result.trait_cycle_errors.is_empty();

        tracing::debug!(
            valid = result.valid,
            schema_errors = result.schema_errors.len(),
            ref_errors = result.ref_errors.len(),
            warnings = result.completeness_warnings.len(),
            "validation run complete"
        );
        result
    }

    fn check_schema(&self, snapshot: &Snapshot, result: &mut ValidationResult) {
        for file in &snapshot.files {
            for issue in self.schema.check(file) {
                result.schema_errors.push(SchemaError {
                    file: file.path.clone(),
                    path: issue.path,
                    message: issue.message,
                    details: None,
                });
            }
        }
    }

    /// Resolve every reference-bearing field and return the set of resolved
    /// target identities (the input to orphan detection).
    fn check_references(&self, snapshot: &Snapshot, result: &mut ValidationResult) -> HashSet<String> {
        let mut targets = HashSet::new();

        for item in snapshot.all_items() {
            let owner = item.display_ref();
            let fields: [(&str, &[String]); 5] = [
                ("traits", &item.traits),
                ("depends_on", &item.depends_on),
                ("implements", &item.implements),
                ("relates_to", &item.relates_to),
                ("supersedes", &item.supersedes),
            ];
            for (field, references) in fields {
                for reference in references {
                    self.check_one_reference(&owner, field, reference, &mut targets, result);
                }
            }
        }

        for task in &snapshot.tasks {
            let owner = task.display_ref();
            if let Some(reference) = &task.spec_ref {
                self.check_one_reference(&owner, "spec_ref", reference, &mut targets, result);
            }
            if let Some(reference) = &task.meta_ref {
                self.check_one_reference(&owner, "meta_ref", reference, &mut targets, result);
            }
            let fields: [(&str, &[String]); 4] = [
                ("depends_on", &task.depends_on),
                ("blocked_by", &task.blocked_by),
                ("tests", &task.tests),
                ("context", &task.context),
            ];
            for (field, references) in fields {
                for reference in references {
                    self.check_one_reference(&owner, field, reference, &mut targets, result);
                }
            }
        }

        targets
    }

    fn check_one_reference(
        &self,
        owner: &str,
        field: &str,
        reference: &str,
        targets: &mut HashSet<String>,
        result: &mut ValidationResult,
    ) {
        match self.index.resolve(reference) {
            Ok(identity) => {
                if let Some(message) = self.wrong_kind_warning(field, &identity) {
                    result.ref_warnings.push(RefFinding {
                        item_ref: owner.to_string(),
                        field: field.to_string(),
                        reference: reference.to_string(),
                        message,
                    });
                }
                targets.insert(identity);
            }
            Err(error) => {
                result.ref_errors.push(RefFinding {
                    item_ref: owner.to_string(),
                    field: field.to_string(),
                    reference: reference.to_string(),
                    message: describe_resolve_error(&error),
                });
            }
        }
    }

    /// Semantically-questionable but resolvable references are warnings, not
    /// errors.
    fn wrong_kind_warning(&self, field: &str, identity: &str) -> Option<String> {
        let kind = self.index.entry(identity)?.kind;
        let expected = match field {
            "traits" => {
                if kind.is_trait() {
                    return None;
                }
                "a trait"
            }
            "spec_ref" | "implements" => {
                if kind.is_item() {
                    return None;
                }
                "a spec item"
            }
            "meta_ref" => {
                if kind.is_meta() {
                    return None;
                }
                "a meta-entity"
            }
            _ => return None,
        };
        Some(format!(
            "resolves to {} ({}), expected {}",
            short_id(identity),
            kind,
            expected
        ))
    }

    fn check_orphans(
        &self,
        snapshot: &Snapshot,
        targets: &HashSet<String>,
        result: &mut ValidationResult,
    ) {
        // Tasks are never orphan candidates; only spec items are checked.
        for item in snapshot.all_items() {
            if targets.contains(&item.id) || item.kind.is_entry_point() || item.nested {
                continue;
            }
            result.orphans.push(OrphanFinding {
                identity: item.id.clone(),
                title: item.title.clone(),
                kind: item.kind,
                file: item.file.clone(),
            });
        }
    }

    /// Report trait cycles and return the identities involved, so
    /// completeness skips traits already known to be malformed.
    fn check_trait_cycles(&self, result: &mut ValidationResult) -> HashSet<String> {
        let mut cycling = HashSet::new();
        for error in self.traits.detect_cycles() {
            cycling.extend(error.identities.iter().cloned());
            result.trait_cycle_errors.push(error);
        }
        cycling
    }

    fn check_completeness(
        &self,
        snapshot: &Snapshot,
        cycling: &HashSet<String>,
        result: &mut ValidationResult,
    ) {
        for item in snapshot.all_items() {
            if cycling.contains(&item.id) {
                continue;
            }

            if item.criteria.is_empty() {
                result.completeness_warnings.push(warning(
                    CompletenessKind::MissingAcceptanceCriteria,
                    item,
                    "has no acceptance criteria".to_string(),
                    None,
                ));
            }

            if item.description.as_deref().is_none_or(str::is_empty) {
                result.completeness_warnings.push(warning(
                    CompletenessKind::EmptyDescription,
                    item,
                    "has an empty description".to_string(),
                    None,
                ));
            }

            if item.status == ItemStatus::Implemented {
                let unstarted: Vec<String> = item
                    .children
                    .iter()
                    .filter(|child| child.status == ItemStatus::NotStarted)
                    .map(|child| child.display_ref())
                    .collect();
                if !unstarted.is_empty() {
                    result.completeness_warnings.push(warning(
                        CompletenessKind::ImplementedParentUnstartedChild,
                        item,
                        format!(
                            "is marked implemented but has {} unstarted child(ren)",
                            unstarted.len()
                        ),
                        Some(unstarted.join(", ")),
                    ));
                }
            }

            if let Some(coverage) = self.coverage {
                self.check_item_coverage(item, coverage, result);
            }
        }
    }

    /// An item is flagged only when *none* of its own or inherited criteria
    /// have a coverage annotation.
    fn check_item_coverage(
        &self,
        item: &SpecItem,
        coverage: &dyn CoverageIndex,
        result: &mut ValidationResult,
    ) {
        let inherited = self.traits.inherited_criteria(&item.id);
        let total = item.criteria.len() + inherited.len();
        if total == 0 {
            // Nothing to cover; missing_acceptance_criteria already fired.
            return;
        }

        let alias = item.aliases.iter().find(|a| !a.is_empty());
        let prefix = short_id(&item.id);

        let any_covered = item
            .criteria
            .iter()
            .map(|c| c.id.as_str())
            .chain(inherited.iter().map(|i| i.criterion.id.as_str()))
            .any(|criterion_id| {
                // Matched in fixed order; first hit wins.
                if let Some(alias) = alias {
                    if coverage.covered(&format!("{}/{}", alias, criterion_id)) {
                        return true;
                    }
                    if coverage.covered(alias) {
                        return true;
                    }
                }
                coverage.covered(&format!("{}/{}", prefix, criterion_id))
                    || coverage.covered(prefix)
            });

        if !any_covered {
            result.completeness_warnings.push(warning(
                CompletenessKind::UncoveredCriteria,
                item,
                format!("none of its {} acceptance criteria have coverage annotations", total),
                None,
            ));
        }
    }

    /// Tasks marked eligible-for-automation must carry a resolvable spec
    /// reference.
    fn check_automation_marks(&self, snapshot: &Snapshot, result: &mut ValidationResult) {
        for task in &snapshot.tasks {
            if !task.automation_eligible {
                continue;
            }
            let problem = match &task.spec_ref {
                None => Some("is marked eligible for automation but has no spec reference".to_string()),
                Some(reference) => match self.index.resolve(reference) {
                    Ok(_) => None,
                    Err(error) => Some(format!(
                        "is marked eligible for automation but its spec reference {} does not resolve ({})",
                        reference,
                        error.code()
                    )),
                },
            };
            if let Some(message) = problem {
                result.completeness_warnings.push(CompletenessWarning {
                    warning_type: CompletenessKind::AutomationMissingSpec,
                    item_ref: task.display_ref(),
                    item_title: task.title.clone(),
                    message,
                    details: None,
                });
            }
        }
    }
}

fn warning(
    warning_type: CompletenessKind,
    item: &SpecItem,
    message: String,
    details: Option<String>,
) -> CompletenessWarning {
    CompletenessWarning {
        warning_type,
        item_ref: item.display_ref(),
        item_title: item.title.clone(),
        message,
        details,
    }
}

fn describe_resolve_error(error: &ResolveError) -> String {
    match error {
        ResolveError::NotFound => "does not resolve to any entity".to_string(),
        ResolveError::Ambiguous(candidates) => format!(
            "is an ambiguous prefix of {} identities: {}",
            candidates.len(),
            join_short(candidates)
        ),
        ResolveError::DuplicateAlias(candidates) => format!(
            "matches an alias declared by {} entities: {}",
            candidates.len(),
            join_short(candidates)
        ),
    }
}

fn join_short(identities: &[String]) -> String {
    identities
        .iter()
        .map(|id| short_id(id).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::CoverageSet;
    use crate::models::{AcceptanceCriterion, SpecItem, Task};
    use crate::schema::RecordSchema;

    fn validate(snapshot: &Snapshot) -> ValidationResult {
        let index = ReferenceIndex::build(snapshot);
        let traits = TraitGraph::build(snapshot, &index);
        let schema = RecordSchema::new();
        Validator::new(&index, &traits, &schema).run(snapshot)
    }

    fn item(kind: ItemKind, alias: &str) -> SpecItem {
        let mut item = SpecItem::new(kind, format!("Item {}", alias));
        item.aliases.push(alias.to_string());
        item.description = Some("described".to_string());
        item.criteria
            .push(AcceptanceCriterion::new("ac-1", "g", "w", "t"));
        item
    }

    #[test]
    fn test_clean_snapshot_is_valid() {
        let module = item(ItemKind::Module, "auth");
        let mut feature = item(ItemKind::Feature, "login");
        feature.implements = vec!["@auth".to_string()];
        let mut task = Task::new("Build login");
        task.spec_ref = Some("@login".to_string());

        let snapshot = Snapshot {
            items: vec![module, feature],
            tasks: vec![task],
            ..Default::default()
        };
        let result = validate(&snapshot);

        assert!(result.valid, "unexpected findings: {:?}", result);
        assert!(result.ref_errors.is_empty());
        assert!(result.orphans.is_empty());
        assert_eq!(result.stats.items_checked, 2);
        assert_eq!(result.stats.tasks_checked, 1);
        assert!(result.meta_stats.is_none());
    }

    #[test]
    fn test_unresolved_reference_is_error() {
        let mut feature = item(ItemKind::Module, "login");
        feature.depends_on = vec!["@missing".to_string()];
        let snapshot = Snapshot {
            items: vec![feature],
            ..Default::default()
        };
        let result = validate(&snapshot);

        assert!(!result.valid);
        assert_eq!(result.ref_errors.len(), 1);
        assert_eq!(result.ref_errors[0].field, "depends_on");
        assert_eq!(result.ref_errors[0].reference, "@missing");
    }

    #[test]
    fn test_wrong_kind_reference_is_warning_not_error() {
        let plain = item(ItemKind::Module, "plain");
        let mut feature = item(ItemKind::Module, "login");
        feature.traits = vec!["@plain".to_string()];
        let snapshot = Snapshot {
            items: vec![plain, feature],
            ..Default::default()
        };
        let result = validate(&snapshot);

        assert!(result.valid);
        assert!(result.ref_errors.is_empty());
        assert_eq!(result.ref_warnings.len(), 1);
        assert!(result.ref_warnings[0].message.contains("expected a trait"));
    }

    #[test]
    fn test_orphan_detection_respects_entry_points_and_nesting() {
        // Unreferenced non-entry-point item: orphan.
        let lonely = item(ItemKind::Feature, "lonely");
        // Unreferenced module: entry point, not an orphan.
        let module = item(ItemKind::Module, "auth");
        // Unreferenced nested item: positionally owned, not an orphan.
        let mut nested = item(ItemKind::Requirement, "nested");
        nested.nested = true;

        let snapshot = Snapshot {
            items: vec![lonely, module, nested],
            ..Default::default()
        };
        let result = validate(&snapshot);

        assert!(result.valid); // orphans never affect validity
        assert_eq!(result.orphans.len(), 1);
        assert_eq!(result.orphans[0].kind, ItemKind::Feature);
    }

    #[test]
    fn test_referenced_item_is_not_orphan() {
        let target = item(ItemKind::Feature, "target");
        let mut module = item(ItemKind::Module, "auth");
        module.depends_on = vec!["@target".to_string()];
        let snapshot = Snapshot {
            items: vec![target, module],
            ..Default::default()
        };
        let result = validate(&snapshot);
        assert!(result.orphans.is_empty());
    }

    #[test]
    fn test_missing_criteria_and_description_warnings() {
        let mut bare = SpecItem::new(ItemKind::Feature, "Bare");
        bare.aliases.push("bare".to_string());
        // Referenced so it is not an orphan.
        let mut module = item(ItemKind::Module, "auth");
        module.depends_on = vec!["@bare".to_string()];
        let snapshot = Snapshot {
            items: vec![bare, module],
            ..Default::default()
        };
        let result = validate(&snapshot);

        let kinds: Vec<CompletenessKind> = result
            .completeness_warnings
            .iter()
            .map(|w| w.warning_type)
            .collect();
        assert!(kinds.contains(&CompletenessKind::MissingAcceptanceCriteria));
        assert!(kinds.contains(&CompletenessKind::EmptyDescription));
        assert!(result.valid);
    }

    #[test]
    fn test_implemented_parent_with_unstarted_child() {
        let mut parent = item(ItemKind::Module, "auth");
        parent.status = ItemStatus::Implemented;
        let mut child = item(ItemKind::Feature, "login");
        child.nested = true;
        child.status = ItemStatus::NotStarted;
        parent.children.push(child);

        let snapshot = Snapshot {
            items: vec![parent],
            ..Default::default()
        };
        let result = validate(&snapshot);

        let warning = result
            .completeness_warnings
            .iter()
            .find(|w| w.warning_type == CompletenessKind::ImplementedParentUnstartedChild)
            .expect("parent/child warning");
        assert_eq!(warning.details.as_deref(), Some("@login"));
    }

    #[test]
    fn test_trait_cycle_flips_valid_and_suppresses_completeness() {
        let mut a = SpecItem::new_trait("A");
        a.aliases.push("a".to_string());
        a.traits = vec!["@b".to_string()];
        let mut b = SpecItem::new_trait("B");
        b.aliases.push("b".to_string());
        b.traits = vec!["@a".to_string()];

        let snapshot = Snapshot {
            items: vec![a, b],
            ..Default::default()
        };
        let result = validate(&snapshot);

        assert!(!result.valid);
        assert_eq!(result.trait_cycle_errors.len(), 1);
        // Both traits are malformed; neither gets completeness warnings.
        assert!(
            result
                .completeness_warnings
                .iter()
                .all(|w| w.item_ref != "@a" && w.item_ref != "@b")
        );
    }

    #[test]
    fn test_coverage_by_alias_and_inherited_criteria() {
        let mut covered = item(ItemKind::Feature, "covered");
        covered.criteria = vec![AcceptanceCriterion::new("ac-1", "g", "w", "t")];
        let mut uncovered = item(ItemKind::Feature, "uncovered");
        uncovered.criteria = vec![AcceptanceCriterion::new("ac-1", "g", "w", "t")];
        // Inherits one criterion; covered through the item's own alias key.
        let mut audited = SpecItem::new_trait("Audited");
        audited.aliases.push("audited".to_string());
        audited.description = Some("d".to_string());
        audited
            .criteria
            .push(AcceptanceCriterion::new("ac-9", "g", "w", "t"));
        let mut inheriting = SpecItem::new(ItemKind::Feature, "Inheriting");
        inheriting.aliases.push("inheriting".to_string());
        inheriting.description = Some("d".to_string());
        inheriting.traits = vec!["@audited".to_string()];

        let mut module = item(ItemKind::Module, "root");
        module.depends_on = vec![
            "@covered".to_string(),
            "@uncovered".to_string(),
            "@inheriting".to_string(),
            "@audited".to_string(),
        ];

        let snapshot = Snapshot {
            items: vec![covered, uncovered, audited, inheriting, module],
            ..Default::default()
        };
        let index = ReferenceIndex::build(&snapshot);
        let traits = TraitGraph::build(&snapshot, &index);
        let schema = RecordSchema::new();
        let coverage: CoverageSet = ["covered/ac-1", "inheriting/ac-9", "root", "audited"]
            .into_iter()
            .collect();
        let result = Validator::new(&index, &traits, &schema)
            .with_coverage(&coverage)
            .run(&snapshot);

        let uncovered_refs: Vec<&str> = result
            .completeness_warnings
            .iter()
            .filter(|w| w.warning_type == CompletenessKind::UncoveredCriteria)
            .map(|w| w.item_ref.as_str())
            .collect();
        assert_eq!(uncovered_refs, vec!["@uncovered"]);
    }

    #[test]
    fn test_automation_mark_without_spec_ref_warns() {
        let mut task = Task::new("Automate me");
        task.automation_eligible = true;
        let snapshot = Snapshot {
            tasks: vec![task],
            ..Default::default()
        };
        let result = validate(&snapshot);

        let warning = result
            .completeness_warnings
            .iter()
            .find(|w| w.warning_type == CompletenessKind::AutomationMissingSpec)
            .expect("automation warning");
        assert!(warning.message.contains("no spec reference"));
        assert!(result.valid);
    }

    #[test]
    fn test_automation_mark_with_unresolvable_spec_ref_warns() {
        let mut task = Task::new("Automate me");
        task.automation_eligible = true;
        task.spec_ref = Some("@gone".to_string());
        let snapshot = Snapshot {
            tasks: vec![task],
            ..Default::default()
        };
        let result = validate(&snapshot);

        // Both a reference error and the automation warning fire; checks are
        // additive.
        assert!(!result.valid);
        assert_eq!(result.ref_errors.len(), 1);
        assert!(
            result
                .completeness_warnings
                .iter()
                .any(|w| w.warning_type == CompletenessKind::AutomationMissingSpec)
        );
    }

    #[test]
    fn test_meta_stats_reported() {
        let mut meta = crate::models::MetaSet::default();
        meta.agents.push(crate::models::Agent::new("planner"));
        meta.observations
            .push(crate::models::Observation::new("CI slow"));
        let snapshot = Snapshot {
            meta: Some(meta),
            ..Default::default()
        };
        let result = validate(&snapshot);

        let stats = result.meta_stats.expect("meta stats");
        assert_eq!(stats.agents, 1);
        assert_eq!(stats.observations, 1);
        assert_eq!(stats.conventions, 0);
    }

    #[test]
    fn test_result_wire_field_names() {
        let result = validate(&Snapshot::default());
        let json = serde_json::to_value(&result).unwrap();
        for field in [
            "valid",
            "schemaErrors",
            "refErrors",
            "refWarnings",
            "orphans",
            "completenessWarnings",
            "traitCycleErrors",
            "stats",
        ] {
            assert!(json.get(field).is_some(), "missing field {}", field);
        }
        assert!(json["stats"].get("filesChecked").is_some());
        assert!(json.get("metaStats").is_none());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let mut feature = item(ItemKind::Feature, "login");
        feature.depends_on = vec!["@missing".to_string()];
        let snapshot = Snapshot {
            items: vec![feature],
            ..Default::default()
        };

        let index = ReferenceIndex::build(&snapshot);
        let traits = TraitGraph::build(&snapshot, &index);
        let schema = RecordSchema::new();
        let validator = Validator::new(&index, &traits, &schema);

        let first = serde_json::to_string(&validator.run(&snapshot)).unwrap();
        let second = serde_json::to_string(&validator.run(&snapshot)).unwrap();
        assert_eq!(first, second);
    }
}
