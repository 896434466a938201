//! Rule evaluation over a whole normalized tree

use crate::rule_engine::{evaluate_rules, resolve_conflicts};
use crate::rules::{MappingRule, ResolvedProperties, RuleMatch};
use crate::types::AltNode;
use crate::EngineOptions;
use serde::Serialize;
use std::collections::HashMap;

/// Ranked matches for every node of a tree, keyed by node id.
///
/// Resolution is not precomputed; call [`TreeMatches::resolve`] for the
/// nodes you need.
#[derive(Debug, Clone, Default)]
pub struct TreeMatches {
    by_node: HashMap<String, Vec<RuleMatch>>,
    order: Vec<String>,
}

impl TreeMatches {
    pub fn get(&self, node_id: &str) -> Option<&[RuleMatch]> {
        self.by_node.get(node_id).map(Vec::as_slice)
    }

    /// Merged properties for one node, or None for an unknown id
    pub fn resolve(&self, node_id: &str) -> Option<ResolvedProperties> {
        self.by_node.get(node_id).map(|matches| resolve_conflicts(matches))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Node ids in pre-order
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// (node id, matches) pairs in pre-order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RuleMatch])> {
        self.order
            .iter()
            .filter_map(move |id| self.by_node.get(id).map(|m| (id.as_str(), m.as_slice())))
    }

    pub fn matched_node_count(&self) -> usize {
        self.by_node.values().filter(|m| !m.is_empty()).count()
    }

    /// Number of conflicting match pairs across the tree
    pub fn conflict_count(&self) -> usize {
        let sides: usize = self
            .by_node
            .values()
            .flat_map(|matches| matches.iter())
            .map(|m| m.conflicts_with.len())
            .sum();
        sides / 2
    }

    fn insert(&mut self, node_id: &str, matches: Vec<RuleMatch>) {
        if self.by_node.insert(node_id.to_string(), matches).is_some() {
            log::warn!("Duplicate node id '{}' in tree; keeping the later node's matches", node_id);
        } else {
            self.order.push(node_id.to_string());
        }
    }
}

/// Evaluate `rules` against every node of `root`, pre-order.
///
/// Nodes are evaluated independently of one another.
pub fn evaluate_tree(root: &AltNode<'_>, rules: &[MappingRule], options: &EngineOptions) -> TreeMatches {
    let mut result = TreeMatches::default();
    for node in root.iter() {
        result.insert(&node.id, evaluate_rules(node, rules, options));
    }

    log::debug!(
        "Evaluated {} rules over {} nodes: {} matched, {} conflicts",
        rules.len(),
        result.len(),
        result.matched_node_count(),
        result.conflict_count()
    );
    result
}

/// Summary counts for one normalized tree and its matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeStats {
    pub node_count: usize,
    pub visible_count: usize,
    pub flattenable_count: usize,
    pub matched_node_count: usize,
    pub conflict_count: usize,
}

impl TreeStats {
    pub fn collect(root: &AltNode<'_>, matches: Option<&TreeMatches>) -> Self {
        let mut stats = Self::default();
        for node in root.iter() {
            stats.node_count += 1;
            if node.visible {
                stats.visible_count += 1;
            }
            if node.can_be_flattened {
                stats.flattenable_count += 1;
            }
        }
        if let Some(matches) = matches {
            stats.matched_node_count = matches.matched_node_count();
            stats.conflict_count = matches.conflict_count();
        }
        stats
    }
}
