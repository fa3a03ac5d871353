//! Trait inheritance: resolving inherited acceptance criteria and detecting
//! cycles among traits.
//!
//! A trait is a spec item of kind `trait`: a reusable acceptance-criteria
//! template. Any item may declare trait references; traits themselves may
//! declare further traits, forming a directed graph that must stay acyclic.
//!
//! The graph is built once per snapshot against a [`ReferenceIndex`]; edges
//! that fail to resolve, or resolve to non-trait entities, are skipped here
//! and reported by the validator's reference-integrity pass instead.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::index::ReferenceIndex;
use crate::models::{AcceptanceCriterion, Snapshot};

/// One acceptance criterion inherited through a trait reference, with
/// provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InheritedCriterion {
    /// Display reference of the trait the criterion came from
    pub trait_ref: String,

    /// Title of the owning trait
    pub trait_title: String,

    /// The criterion itself
    pub criterion: AcceptanceCriterion,
}

/// A cycle found in the trait graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitCycleError {
    /// Display reference of the trait where the cycle closes
    pub trait_ref: String,

    /// Title of that trait
    pub trait_title: String,

    /// Display references along the cycle, wrapped back to the first
    pub cycle: Vec<String>,

    /// Human-readable description
    pub message: String,

    /// Identities of every trait on the cycle, for warning suppression.
    /// Not part of the wire shape.
    #[serde(skip)]
    pub identities: Vec<String>,
}

#[derive(Debug, Clone)]
struct TraitNode {
    title: String,
    display_ref: String,
    criteria: Vec<AcceptanceCriterion>,
    /// Resolved identities of traits this trait declares, in declared order
    edges: Vec<String>,
}

/// The trait-inheritance graph for one snapshot.
#[derive(Debug, Clone, Default)]
pub struct TraitGraph {
    /// Trait nodes by identity
    nodes: HashMap<String, TraitNode>,

    /// Trait identities in snapshot order, the DFS root order
    order: Vec<String>,

    /// For every item (trait or not): resolved trait identities from its
    /// `traits` field, in declared order
    item_traits: HashMap<String, Vec<String>>,
}

impl TraitGraph {
    /// Build the graph from the snapshot's trait items and the `traits`
    /// declarations of every item.
    pub fn build(snapshot: &Snapshot, index: &ReferenceIndex) -> Self {
        let mut graph = Self::default();

        for item in snapshot.all_items() {
            let resolved: Vec<String> = item
                .traits
                .iter()
                .filter_map(|reference| index.resolve(reference).ok())
                .filter(|identity| {
                    index
                        .entry(identity)
                        .is_some_and(|entry| entry.kind.is_trait())
                })
                .collect();

            if item.kind.is_trait() {
                graph.order.push(item.id.clone());
                graph.nodes.insert(
                    item.id.clone(),
                    TraitNode {
                        title: item.title.clone(),
                        display_ref: item.display_ref(),
                        criteria: item.criteria.clone(),
                        edges: resolved.clone(),
                    },
                );
            }

            graph.item_traits.insert(item.id.clone(), resolved);
        }

        tracing::debug!(traits = graph.order.len(), "built trait graph");
        graph
    }

    /// Number of trait nodes in the graph.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the graph has no traits.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns true if the identity names a trait node.
    pub fn is_trait(&self, identity: &str) -> bool {
        self.nodes.contains_key(identity)
    }

    /// Acceptance criteria the entity inherits through its `traits` list.
    ///
    /// Follows the declared order of the list, then each trait's criteria in
    /// their declared order, tagging every criterion with the owning trait's
    /// reference and title. Unresolvable or non-trait references contribute
    /// nothing.
    pub fn inherited_criteria(&self, identity: &str) -> Vec<InheritedCriterion> {
        let mut inherited = Vec::new();
        let Some(trait_ids) = self.item_traits.get(identity) else {
            return inherited;
        };

        for trait_id in trait_ids {
            let Some(node) = self.nodes.get(trait_id) else {
                continue;
            };
            for criterion in &node.criteria {
                inherited.push(InheritedCriterion {
                    trait_ref: node.display_ref.clone(),
                    trait_title: node.title.clone(),
                    criterion: criterion.clone(),
                });
            }
        }

        inherited
    }

    /// Find cycles among traits.
    ///
    /// Iterative three-state depth-first traversal (`unvisited`,
    /// `in_progress`, `done`). Each cycle is reported exactly once: when an
    /// `in_progress` node is re-encountered, the cycle is the suffix of the
    /// current path starting at that node, and every node on it is marked
    /// `done` on the spot so the same cycle is never re-reported from another
    /// root. Deterministic given snapshot order.
    pub fn detect_cycles(&self) -> Vec<TraitCycleError> {
        let mut errors = Vec::new();
        let mut in_progress: HashSet<String> = HashSet::new();
        let mut done: HashSet<String> = HashSet::new();

        for root in &self.order {
            if done.contains(root) {
                continue;
            }

            // Explicit stack of (identity, next edge index); path mirrors the
            // in-progress chain for cycle extraction.
            let mut stack: Vec<(String, usize)> = vec![(root.clone(), 0)];
            let mut path: Vec<String> = Vec::new();

            while let Some((current, edge_idx)) = stack.last().cloned() {
                if edge_idx == 0 && !in_progress.contains(&current) {
                    in_progress.insert(current.clone());
                    path.push(current.clone());
                }

                let edges = &self.nodes[&current].edges;
                if edge_idx < edges.len() {
                    stack.last_mut().unwrap().1 += 1;
                    let next = &edges[edge_idx];

                    if done.contains(next) {
                        continue;
                    }
                    if in_progress.contains(next) {
                        errors.push(self.cycle_error(&path, next));
                        // Close out the cycle members immediately so the same
                        // cycle is not reported again from another root.
                        let start = path.iter().position(|p| p == next).unwrap_or(0);
                        for identity in &path[start..] {
                            done.insert(identity.clone());
                        }
                        continue;
                    }
                    stack.push((next.clone(), 0));
                } else {
                    stack.pop();
                    in_progress.remove(&current);
                    done.insert(current.clone());
                    path.pop();
                }
            }
        }

        if !errors.is_empty() {
            tracing::debug!(cycles = errors.len(), "trait cycles detected");
        }
        errors
    }

    fn cycle_error(&self, path: &[String], closing: &str) -> TraitCycleError {
        let start = path.iter().position(|p| p == closing).unwrap_or(0);
        let identities: Vec<String> = path[start..].to_vec();

        let mut cycle: Vec<String> = identities
            .iter()
            .map(|id| self.nodes[id].display_ref.clone())
            .collect();
        // Wrap back to the closing trait.
        cycle.push(self.nodes[closing].display_ref.clone());

        let node = &self.nodes[closing];
        TraitCycleError {
            trait_ref: node.display_ref.clone(),
            trait_title: node.title.clone(),
            message: format!("trait inheritance cycle: {}", cycle.join(" -> ")),
            cycle,
            identities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AcceptanceCriterion, ItemKind, SpecItem};

    fn trait_item(alias: &str, criteria: &[(&str, &str)], traits: &[&str]) -> SpecItem {
        let mut item = SpecItem::new_trait(format!("Trait {}", alias));
        item.aliases.push(alias.to_string());
        for (id, text) in criteria {
            item.criteria.push(AcceptanceCriterion::new(
                *id,
                "some state",
                *text,
                "it holds",
            ));
        }
        item.traits = traits.iter().map(|t| format!("@{}", t)).collect();
        item
    }

    fn build(items: Vec<SpecItem>) -> (Snapshot, ReferenceIndex, TraitGraph) {
        let snapshot = Snapshot {
            items,
            ..Default::default()
        };
        let index = ReferenceIndex::build(&snapshot);
        let graph = TraitGraph::build(&snapshot, &index);
        (snapshot, index, graph)
    }

    #[test]
    fn test_inherited_criteria_order_and_provenance() {
        let audited = trait_item("audited", &[("ac-1", "it is logged")], &[]);
        let secured = trait_item(
            "secured",
            &[("ac-1", "it is authenticated"), ("ac-2", "it is authorized")],
            &[],
        );

        let mut item = SpecItem::new(ItemKind::Feature, "Payments");
        item.traits = vec!["@secured".to_string(), "@audited".to_string()];
        let item_id = item.id.clone();

        let (_snapshot, _index, graph) = build(vec![audited, secured, item]);

        let inherited = graph.inherited_criteria(&item_id);
        assert_eq!(inherited.len(), 3);
        // Declared trait order wins, not snapshot order.
        assert_eq!(inherited[0].trait_ref, "@secured");
        assert_eq!(inherited[0].criterion.id, "ac-1");
        assert_eq!(inherited[1].trait_ref, "@secured");
        assert_eq!(inherited[1].criterion.id, "ac-2");
        assert_eq!(inherited[2].trait_ref, "@audited");
        assert_eq!(inherited[2].trait_title, "Trait audited");
    }

    #[test]
    fn test_inherited_criteria_skips_unresolvable_and_non_trait_refs() {
        let audited = trait_item("audited", &[("ac-1", "it is logged")], &[]);
        let mut plain = SpecItem::new(ItemKind::Feature, "Plain");
        plain.aliases.push("plain".to_string());

        let mut item = SpecItem::new(ItemKind::Feature, "Payments");
        item.traits = vec![
            "@missing".to_string(),
            "@plain".to_string(),
            "@audited".to_string(),
        ];
        let item_id = item.id.clone();

        let (_s, _i, graph) = build(vec![audited, plain, item]);

        let inherited = graph.inherited_criteria(&item_id);
        assert_eq!(inherited.len(), 1);
        assert_eq!(inherited[0].trait_ref, "@audited");
    }

    #[test]
    fn test_no_cycles_in_acyclic_graph() {
        let base = trait_item("base", &[("ac-1", "base holds")], &[]);
        let derived = trait_item("derived", &[], &["base"]);
        // Diamond: two traits share a base, still acyclic.
        let other = trait_item("other", &[], &["base"]);

        let (_s, _i, graph) = build(vec![base, derived, other]);
        assert!(graph.detect_cycles().is_empty());
    }

    #[test]
    fn test_two_trait_cycle_reported_once() {
        let a = trait_item("a", &[], &["b"]);
        let b = trait_item("b", &[], &["a"]);

        let (_s, _i, graph) = build(vec![a, b]);
        let errors = graph.detect_cycles();

        assert_eq!(errors.len(), 1);
        let error = &errors[0];
        assert_eq!(error.cycle.first(), error.cycle.last());
        assert_eq!(error.cycle.len(), 3);
        assert!(error.message.contains("cycle"));
        assert_eq!(error.identities.len(), 2);
    }

    #[test]
    fn test_cycle_reported_once_even_when_reachable_from_multiple_roots() {
        // c -> a -> b -> a; traversal from c and from a both reach the cycle.
        let c = trait_item("c", &[], &["a"]);
        let a = trait_item("a", &[], &["b"]);
        let b = trait_item("b", &[], &["a"]);

        let (_s, _i, graph) = build(vec![c, a, b]);
        let errors = graph.detect_cycles();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_self_cycle() {
        let a = trait_item("a", &[], &["a"]);
        let (_s, _i, graph) = build(vec![a]);

        let errors = graph.detect_cycles();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].cycle, vec!["@a".to_string(), "@a".to_string()]);
    }

    #[test]
    fn test_two_independent_cycles_both_reported() {
        let a = trait_item("a", &[], &["b"]);
        let b = trait_item("b", &[], &["a"]);
        let x = trait_item("x", &[], &["y"]);
        let y = trait_item("y", &[], &["x"]);

        let (_s, _i, graph) = build(vec![a, b, x, y]);
        assert_eq!(graph.detect_cycles().len(), 2);
    }

    #[test]
    fn test_detect_cycles_is_deterministic() {
        let a = trait_item("a", &[], &["b"]);
        let b = trait_item("b", &[], &["a"]);
        let (_s, _i, graph) = build(vec![a, b]);

        let first = graph.detect_cycles();
        let second = graph.detect_cycles();
        assert_eq!(first, second);
    }
}
