//! Tree transformer: SourceNode tree -> normalized AltNode tree
//!
//! A transformation pass walks the source tree depth-first. For each node it
//! assigns a semantic kind, merges the style normalizers' output, computes a
//! pass-unique display name and recurses into children in source order. Once
//! a node's children are all normalized, a stacking post-pass assigns
//! `zIndex` to the absolutely positioned ones.

use crate::error::{EngineError, Result};
use crate::normalize::*;
use crate::types::*;
use crate::variable_context::VariableResolver;
use std::collections::{HashMap, HashSet};

/// Fallback for nodes whose display name is blank
const UNNAMED: &str = "Component";

/// Pass-scoped unique-name generator.
///
/// The first node named `Icon` keeps its name, the second becomes `Icon_2`,
/// the third `Icon_3`. A suffixed name is reserved too, so a node literally
/// named `Icon_2` later in the pass gets `Icon_2_2`. Reset (or create a fresh
/// context) before every independent pass; reusing it carries counts over and
/// drifts the names.
#[derive(Debug, Clone, Default)]
pub struct NamingContext {
    counters: HashMap<String, usize>,
    issued: HashSet<String>,
}

impl NamingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.counters.clear();
        self.issued.clear();
    }

    pub fn unique_name(&mut self, name: &str) -> String {
        let base = match name.trim() {
            "" => UNNAMED,
            trimmed => trimmed,
        };

        let count = self.counters.entry(base.to_string()).or_insert(0);
        loop {
            *count += 1;
            let candidate = if *count == 1 {
                base.to_string()
            } else {
                format!("{}_{}", base, count)
            };
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Number of distinct base names seen in this pass
    pub fn distinct_names(&self) -> usize {
        self.counters.len()
    }
}

/// One transformation pass over a source tree
pub struct TreeTransformer<'c> {
    naming: &'c mut NamingContext,
    variables: &'c dyn VariableResolver,
    node_count: usize,
}

impl<'c> TreeTransformer<'c> {
    pub fn new(naming: &'c mut NamingContext, variables: &'c dyn VariableResolver) -> Self {
        Self {
            naming,
            variables,
            node_count: 0,
        }
    }

    pub fn transform<'a>(&mut self, root: &'a SourceNode) -> Result<AltNode<'a>> {
        self.node_count = 0;
        let alt = self.transform_node(root, &ParentContext::default(), 0.0)?;
        log::debug!(
            "Normalized {} nodes ({} distinct names) from root '{}'",
            self.node_count,
            self.naming.distinct_names(),
            root.id
        );
        Ok(alt)
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    fn transform_node<'a>(
        &mut self,
        node: &'a SourceNode,
        parent: &ParentContext,
        parent_rotation: f64,
    ) -> Result<AltNode<'a>> {
        if node.id.trim().is_empty() {
            return Err(EngineError::invalid_source(
                node.name.as_str(),
                "node is missing its id",
            ));
        }
        self.node_count += 1;

        let kind = AltKind::from_source(node.kind);
        let styles = self.collect_styles(node, parent);
        let unique_name = self.naming.unique_name(&node.name);
        let cumulative_rotation = parent_rotation + rotation_degrees(node);

        log::trace!("{} '{}' -> {} as {}", node.id, node.name, unique_name, kind);
        if kind == AltKind::Text {
            let run = detect_multi_style_text(node);
            if run.has_multiple_styles {
                log::debug!("Text '{}' mixes styles across {} characters", node.id, run.character_count);
            }
        }

        let context = ParentContext::of(node);
        let children = node
            .children
            .iter()
            .map(|child| self.transform_node(child, &context, cumulative_rotation))
            .collect::<Result<Vec<_>>>()?;

        let mut alt = AltNode {
            id: node.id.clone(),
            name: node.name.clone(),
            unique_name,
            kind,
            styles,
            children,
            visible: node.is_visible(),
            locked: node.is_locked(),
            can_be_flattened: is_likely_icon(node),
            cumulative_rotation,
            source: node,
        };

        apply_stacking_order(&mut alt.children);
        establish_positioning_context(&mut alt);

        Ok(alt)
    }

    fn collect_styles(&self, node: &SourceNode, parent: &ParentContext) -> StyleMap {
        let mut styles = StyleMap::new();
        styles.extend(normalize_layout(node));
        styles.extend(normalize_fills(node, self.variables));
        styles.extend(normalize_strokes(node, self.variables));
        styles.extend(normalize_effects(node));
        styles.extend(normalize_text(node));
        styles.extend(normalize_dimensions(node));
        styles.extend(normalize_positioning(node, parent));
        styles
    }
}

fn is_absolute(node: &AltNode<'_>) -> bool {
    node.style_is("position", "absolute")
}

/// Give absolutely positioned siblings a 1-based `zIndex` in source order.
///
/// Only absolute siblings are counted and touched.
pub fn apply_stacking_order(siblings: &mut [AltNode<'_>]) {
    for (index, sibling) in siblings.iter_mut().filter(|s| is_absolute(s)).enumerate() {
        sibling.styles.insert("zIndex".to_string(), StyleValue::from(index + 1));
    }
}

/// A node holding absolute children becomes their containing block
fn establish_positioning_context(node: &mut AltNode<'_>) {
    if node.styles.contains_key("position") {
        return;
    }
    if node.children.iter().any(is_absolute) {
        node.styles.insert("position".to_string(), "relative".into());
    }
}
