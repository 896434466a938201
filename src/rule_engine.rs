//! Rule evaluation, conflict detection and conflict resolution for one node

use crate::rules::{ConflictSeverity, MappingRule, ResolvedProperties, RuleMatch};
use crate::selector;
use crate::types::AltNode;
use crate::{EngineOptions, TieBreak};

/// Match `rules` against `node` and rank the matches, highest priority first.
///
/// Disabled rules are skipped unless the options include them, and so are
/// rules with no transformer for the target framework. Every pair of matches
/// whose contributions share a key is recorded as a conflict on both sides.
pub fn evaluate_rules(node: &AltNode<'_>, rules: &[MappingRule], options: &EngineOptions) -> Vec<RuleMatch> {
    let mut matches: Vec<RuleMatch> = rules
        .iter()
        .filter(|rule| rule.enabled || options.include_disabled)
        .filter(|rule| selector::matches(node, &rule.selector))
        .filter_map(|rule| {
            let Some(transformer) = rule.transformer_for(options.framework) else {
                log::trace!("Rule '{}' has no {} transformer", rule.id, options.framework);
                return None;
            };
            Some(RuleMatch {
                rule_id: rule.id.clone(),
                rule_name: rule.name.clone(),
                priority: rule.priority,
                contributed_properties: transformer.contributed_properties(),
                conflicts_with: Vec::new(),
                conflict_severity: None,
            })
        })
        .collect();

    rank_matches(&mut matches, options.tie_break);
    detect_conflicts(&mut matches, &options.major_properties);

    if !matches.is_empty() {
        log::trace!("Node '{}' matched {} rules", node.id, matches.len());
    }
    matches
}

/// Sort by descending priority. Equal priorities keep input order or fall
/// back to rule id order, per `tie_break`.
pub fn rank_matches(matches: &mut [RuleMatch], tie_break: TieBreak) {
    match tie_break {
        TieBreak::InputOrder => matches.sort_by(|a, b| b.priority.cmp(&a.priority)),
        TieBreak::RuleId => matches.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.rule_id.cmp(&b.rule_id))
        }),
    }
}

/// Record pairwise overlaps between contributed property keys.
///
/// A match's severity is the worst over all of its overlaps: major when any
/// shared key is listed in `major_properties`, minor otherwise.
pub fn detect_conflicts(matches: &mut [RuleMatch], major_properties: &[String]) {
    for i in 0..matches.len() {
        for j in (i + 1)..matches.len() {
            let (left, right) = matches.split_at_mut(j);
            let first = &mut left[i];
            let second = &mut right[0];

            let mut shared = first
                .contributed_properties
                .keys()
                .filter(|key| second.contributed_properties.contains_key(*key))
                .peekable();

            if shared.peek().is_none() {
                continue;
            }

            let severity = if shared.any(|key| major_properties.iter().any(|m| m == key)) {
                ConflictSeverity::Major
            } else {
                ConflictSeverity::Minor
            };

            record_conflict(first, &second.rule_id, severity);
            record_conflict(second, &first.rule_id, severity);
        }
    }
}

fn record_conflict(target: &mut RuleMatch, other: &str, severity: ConflictSeverity) {
    if !target.conflicts_with.iter().any(|id| id == other) {
        target.conflicts_with.push(other.to_string());
    }
    target.conflict_severity = target.conflict_severity.max(Some(severity));
}

/// Merge ranked matches: the first match to define a key supplies its value.
pub fn resolve_conflicts(matches: &[RuleMatch]) -> ResolvedProperties {
    let mut result = ResolvedProperties::default();

    for rule_match in matches {
        for (key, value) in &rule_match.contributed_properties {
            if result.resolved.contains_key(key) {
                continue;
            }
            result.resolved.insert(key.clone(), value.clone());
            result.provenance.insert(key.clone(), rule_match.rule_id.clone());
        }
    }

    result
}
