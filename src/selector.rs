//! Selector matching against normalized nodes
//!
//! Selectors only ever look at the normalized representation. Layout
//! requirements are checked against the derived `display` / `flexDirection`
//! styles, never against the source node's auto-layout fields.

use crate::rules::{LayoutAxis, Selector};
use crate::types::{AltNode, StyleValue};

/// True when every populated selector field holds for `node`.
///
/// An empty selector matches every node.
pub fn matches(node: &AltNode<'_>, selector: &Selector) -> bool {
    if let Some(kind) = selector.node_type {
        if node.kind != kind {
            return false;
        }
    }

    if let Some(axis) = selector.layout_mode {
        if layout_axis(node) != Some(axis) {
            return false;
        }
    }

    if let Some(wanted) = selector.has_children {
        if node.has_children() != wanted {
            return false;
        }
    }

    selector
        .custom_properties
        .iter()
        .all(|(key, expected)| style_equals(node.style(key), expected))
}

/// Flex axis derived from a node's styles
pub fn layout_axis(node: &AltNode<'_>) -> Option<LayoutAxis> {
    if !node.style_is("display", "flex") {
        return None;
    }
    match node.style("flexDirection").and_then(StyleValue::as_str) {
        Some("row") => Some(LayoutAxis::Horizontal),
        Some("column") => Some(LayoutAxis::Vertical),
        _ => None,
    }
}

/// Exact equality; an absent style never matches
fn style_equals(actual: Option<&StyleValue>, expected: &StyleValue) -> bool {
    actual.map_or(false, |value| value == expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AltKind, SourceKind, SourceNode, StyleMap};

    fn node<'a>(source: &'a SourceNode, kind: AltKind, styles: StyleMap) -> AltNode<'a> {
        AltNode {
            id: source.id.clone(),
            name: source.name.clone(),
            unique_name: source.name.clone(),
            kind,
            styles,
            children: Vec::new(),
            visible: true,
            locked: false,
            can_be_flattened: false,
            cumulative_rotation: 0.0,
            source,
        }
    }

    fn flex(direction: &str) -> StyleMap {
        let mut styles = StyleMap::new();
        styles.insert("display".to_string(), "flex".into());
        styles.insert("flexDirection".to_string(), direction.into());
        styles
    }

    #[test]
    fn test_empty_selector_matches_everything() {
        let source = SourceNode::new("1", "Any", SourceKind::Frame);
        let selector = Selector::default();
        assert!(selector.is_empty());
        assert!(matches(&node(&source, AltKind::Container, StyleMap::new()), &selector));
        assert!(matches(&node(&source, AltKind::Text, flex("row")), &selector));
    }

    #[test]
    fn test_node_type_and_children() {
        let source = SourceNode::new("1", "Box", SourceKind::Frame);
        let mut parent = node(&source, AltKind::Container, StyleMap::new());
        parent.children.push(node(&source, AltKind::Text, StyleMap::new()));

        let selector = Selector {
            node_type: Some(AltKind::Container),
            has_children: Some(true),
            ..Default::default()
        };
        assert!(matches(&parent, &selector));
        assert!(!matches(&parent.children[0], &selector));

        let leaf_only = Selector { has_children: Some(false), ..Default::default() };
        assert!(!matches(&parent, &leaf_only));
        assert!(matches(&parent.children[0], &leaf_only));
    }

    #[test]
    fn test_layout_uses_derived_styles() {
        let mut source = SourceNode::new("1", "Row", SourceKind::Frame);
        // Raw source layout is irrelevant to matching
        source.layout_mode = Some(crate::types::LayoutMode::Vertical);

        let row = node(&source, AltKind::Container, flex("row"));
        let horizontal = Selector { layout_mode: Some(LayoutAxis::Horizontal), ..Default::default() };
        let vertical = Selector { layout_mode: Some(LayoutAxis::Vertical), ..Default::default() };

        assert!(matches(&row, &horizontal));
        assert!(!matches(&row, &vertical));

        let mut block = flex("row");
        block.insert("display".to_string(), "block".into());
        assert!(!matches(&node(&source, AltKind::Container, block), &horizontal));
    }

    #[test]
    fn test_custom_properties_exact_equality() {
        let source = SourceNode::new("1", "Chip", SourceKind::Frame);
        let mut styles = StyleMap::new();
        styles.insert("background".to_string(), "#FF0000".into());
        styles.insert("zIndex".to_string(), StyleValue::Number(2.0));
        let chip = node(&source, AltKind::Container, styles);

        let mut selector = Selector::default();
        selector.custom_properties.insert("background".to_string(), "#FF0000".into());
        selector.custom_properties.insert("zIndex".to_string(), StyleValue::Number(2.0));
        assert!(matches(&chip, &selector));

        selector.custom_properties.insert("zIndex".to_string(), "2".into());
        assert!(!matches(&chip, &selector));

        let mut absent = Selector::default();
        absent.custom_properties.insert("border".to_string(), "1px solid #000000".into());
        assert!(!matches(&chip, &absent));
    }

    #[test]
    fn test_any_unsatisfied_field_fails() {
        let source = SourceNode::new("1", "Label", SourceKind::Text);
        let label = node(&source, AltKind::Text, StyleMap::new());
        let selector = Selector {
            node_type: Some(AltKind::Text),
            has_children: Some(true),
            ..Default::default()
        };
        assert!(!matches(&label, &selector));
    }
}
