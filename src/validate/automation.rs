//! Automation-eligibility assessment for pending tasks.
//!
//! This is the decision procedure that *proposes* the eligible-for-automation
//! marking; validating an existing marking is the validator's job. It is a
//! pure function of three criteria over the task and the snapshot it points
//! into - no hidden state, no I/O.

use serde::{Deserialize, Serialize};

use crate::index::ReferenceIndex;
use crate::models::{Snapshot, Task, TaskKind};

/// Final verdict of an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationVerdict {
    /// Spike tasks are always executed manually, whatever else holds.
    ManualOnly,
    /// At least one required criterion failed; a human should look.
    NeedsReview,
    /// Every criterion passed; propose marking the task eligible.
    ReviewForEligible,
}

/// Outcome of one assessment criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionStatus {
    Pass,
    Fail,
    /// Not evaluated because a prerequisite criterion already failed, to
    /// avoid double-counting one root cause.
    Skipped,
}

/// One evaluated criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionCheck {
    pub name: String,
    pub status: CriterionStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CriterionCheck {
    fn pass(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CriterionStatus::Pass,
            note: None,
        }
    }

    fn fail(name: &str, note: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CriterionStatus::Fail,
            note: Some(note.into()),
        }
    }

    fn skipped(name: &str, note: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CriterionStatus::Skipped,
            note: Some(note.into()),
        }
    }
}

/// Result of assessing one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationAssessment {
    /// Display reference of the assessed task
    pub task_ref: String,

    pub verdict: AutomationVerdict,

    /// Every evaluated criterion, in fixed order
    pub criteria: Vec<CriterionCheck>,

    /// Human-readable explanation of the verdict
    pub reason: String,
}

/// Assess whether a pending task is a candidate for automated execution.
///
/// Three criteria are evaluated: `has_spec_ref` (spec reference present and
/// resolvable), `spec_has_criteria` (the resolved spec item has at least one
/// acceptance criterion; skipped when `has_spec_ref` failed), and
/// `not_spike`. Spike kind dominates: it always yields
/// [`AutomationVerdict::ManualOnly`] regardless of the other criteria.
pub fn assess_automation(
    task: &Task,
    index: &ReferenceIndex,
    snapshot: &Snapshot,
) -> AutomationAssessment {
    let mut criteria = Vec::with_capacity(3);

    let resolved_spec = match &task.spec_ref {
        None => {
            criteria.push(CriterionCheck::fail("has_spec_ref", "task has no spec reference"));
            None
        }
        Some(reference) => match index.resolve(reference) {
            Ok(identity) => {
                criteria.push(CriterionCheck::pass("has_spec_ref"));
                Some(identity)
            }
            Err(error) => {
                criteria.push(CriterionCheck::fail(
                    "has_spec_ref",
                    format!("spec reference {} does not resolve ({})", reference, error.code()),
                ));
                None
            }
        },
    };

    match &resolved_spec {
        None => criteria.push(CriterionCheck::skipped(
            "spec_has_criteria",
            "no resolvable spec reference to inspect",
        )),
        Some(identity) => match snapshot.find_item(identity) {
            Some(item) if !item.criteria.is_empty() => {
                criteria.push(CriterionCheck::pass("spec_has_criteria"));
            }
            Some(_) => criteria.push(CriterionCheck::fail(
                "spec_has_criteria",
                "resolved spec item has no acceptance criteria",
            )),
            None => criteria.push(CriterionCheck::fail(
                "spec_has_criteria",
                "spec reference resolves to something other than a spec item",
            )),
        },
    }

    let is_spike = task.kind == TaskKind::Spike;
    if is_spike {
        criteria.push(CriterionCheck::fail("not_spike", "task is a spike"));
    } else {
        criteria.push(CriterionCheck::pass("not_spike"));
    }

    let (verdict, reason) = if is_spike {
        (
            AutomationVerdict::ManualOnly,
            "spike tasks always require manual execution".to_string(),
        )
    } else {
        let failing: Vec<String> = criteria
            .iter()
            .filter(|c| c.status == CriterionStatus::Fail)
            .map(|c| match &c.note {
                Some(note) => format!("{} ({})", c.name, note),
                None => c.name.clone(),
            })
            .collect();
        if failing.is_empty() {
            (
                AutomationVerdict::ReviewForEligible,
                "all automation criteria pass".to_string(),
            )
        } else {
            (
                AutomationVerdict::NeedsReview,
                format!("failing criteria: {}", failing.join("; ")),
            )
        }
    };

    AutomationAssessment {
        task_ref: task.display_ref(),
        verdict,
        criteria,
        reason,
    }
}
