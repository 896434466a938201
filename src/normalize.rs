//! Style normalizers
//!
//! Each normalizer maps one concern of a [`SourceNode`] to a partial
//! [`StyleMap`]. They are pure and independent of each other: the tree
//! transformer merges their outputs. A normalizer whose source data is absent
//! returns an empty map, never placeholder values.

use crate::types::*;
use crate::utils::{color_to_css, color_to_rgba, format_number, padding_shorthand, px, radians_to_degrees};
use crate::variable_context::VariableResolver;

/// Facts about the parent a node is placed in
#[derive(Debug, Clone, Copy, Default)]
pub struct ParentContext {
    pub bounds: Option<Rect>,
    pub auto_layout: bool,
}

impl ParentContext {
    pub fn of(node: &SourceNode) -> Self {
        Self {
            bounds: node.absolute_bounding_box,
            auto_layout: matches!(
                node.layout_mode,
                Some(LayoutMode::Horizontal) | Some(LayoutMode::Vertical)
            ),
        }
    }
}

/// Auto-layout to flexbox: `display`, `flexDirection`, `gap`, `padding`.
///
/// Nothing is emitted for nodes without a horizontal or vertical axis.
pub fn normalize_layout(node: &SourceNode) -> StyleMap {
    let mut styles = StyleMap::new();

    let direction = match node.layout_mode {
        Some(LayoutMode::Horizontal) => "row",
        Some(LayoutMode::Vertical) => "column",
        _ => return styles,
    };

    styles.insert("display".to_string(), "flex".into());
    styles.insert("flexDirection".to_string(), direction.into());

    if let Some(spacing) = node.item_spacing.filter(|s| *s > 0.0) {
        styles.insert("gap".to_string(), px(spacing).into());
    }

    let sides = [node.padding_top, node.padding_right, node.padding_bottom, node.padding_left];
    if sides.iter().any(|side| side.map_or(false, |v| v != 0.0)) {
        let [top, right, bottom, left] = sides.map(|side| side.unwrap_or(0.0));
        styles.insert("padding".to_string(), padding_shorthand(top, right, bottom, left).into());
    }

    styles
}

/// CSS colour for the first paint of a list, or None if it cannot be expressed
fn paint_color(paints: &[Paint], variables: &dyn VariableResolver) -> Option<String> {
    let paint = paints.first()?;

    if paint.visible == Some(false) {
        return None;
    }
    if paint.kind != PaintType::Solid {
        log::trace!("Skipping non-solid paint {:?}", paint.kind);
        return None;
    }

    if let Some(reference) = paint.color_variable() {
        if let Some(value) = variables.resolve(reference) {
            return Some(value.to_string());
        }
        log::debug!("Unresolved colour variable '{}', using literal colour", reference);
    }

    let color = paint.color.as_ref()?;
    Some(color_to_css(color, paint.opacity.unwrap_or(1.0)))
}

/// First fill to `background`. Multi-fill composition is not attempted.
pub fn normalize_fills(node: &SourceNode, variables: &dyn VariableResolver) -> StyleMap {
    let mut styles = StyleMap::new();
    if let Some(color) = paint_color(&node.fills, variables) {
        styles.insert("background".to_string(), color.into());
    }
    styles
}

/// First stroke to a 1px solid `border`
pub fn normalize_strokes(node: &SourceNode, variables: &dyn VariableResolver) -> StyleMap {
    let mut styles = StyleMap::new();
    if let Some(color) = paint_color(&node.strokes, variables) {
        styles.insert("border".to_string(), format!("1px solid {}", color).into());
    }
    styles
}

fn drop_shadow_css(effect: &Effect) -> String {
    let offset = effect.offset.unwrap_or_default();
    let radius = effect.radius.unwrap_or(0.0);
    let color = effect
        .color
        .map(|c| color_to_rgba(&c, c.a))
        .unwrap_or_else(|| "rgba(0, 0, 0, 0.10)".to_string());

    format!("{} {} {} {}", px(offset.x), px(offset.y), px(radius), color)
}

/// Drop shadows to `boxShadow`, joined in source order. Other effects are ignored.
pub fn normalize_effects(node: &SourceNode) -> StyleMap {
    let mut styles = StyleMap::new();

    let shadows: Vec<String> = node
        .effects
        .iter()
        .filter(|effect| effect.kind == EffectType::DropShadow)
        .map(drop_shadow_css)
        .collect();

    if !shadows.is_empty() {
        styles.insert("boxShadow".to_string(), shadows.join(", ").into());
    }
    styles
}

/// Font size and family for text nodes
pub fn normalize_text(node: &SourceNode) -> StyleMap {
    let mut styles = StyleMap::new();
    if node.kind != SourceKind::Text {
        return styles;
    }

    if let Some(size) = node.font_size() {
        styles.insert("fontSize".to_string(), px(size).into());
    }
    if let Some(family) = node.font_family().filter(|f| !f.is_empty()) {
        styles.insert("fontFamily".to_string(), format!("'{}', sans-serif", family).into());
    }
    styles
}

/// Bounding box size to `width` / `height`
pub fn normalize_dimensions(node: &SourceNode) -> StyleMap {
    let mut styles = StyleMap::new();
    if let Some(bounds) = node.absolute_bounding_box {
        styles.insert("width".to_string(), px(bounds.width).into());
        styles.insert("height".to_string(), px(bounds.height).into());
    }
    styles
}

/// Absolute placement, centring constraints, rotation and node opacity
pub fn normalize_positioning(node: &SourceNode, parent: &ParentContext) -> StyleMap {
    let mut styles = StyleMap::new();
    let mut transforms: Vec<String> = Vec::new();

    if node.layout_positioning == Some(LayoutPositioning::Absolute) {
        styles.insert("position".to_string(), "absolute".into());
        if let (Some(own), Some(outer)) = (node.absolute_bounding_box, parent.bounds) {
            styles.insert("left".to_string(), px(own.x - outer.x).into());
            styles.insert("top".to_string(), px(own.y - outer.y).into());
        }
    }

    // Constraints only place children of free-form (non auto-layout) parents
    if let Some(constraints) = node.constraints.filter(|_| !parent.auto_layout) {
        let center_x = constraints.horizontal == ConstraintType::Center;
        let center_y = constraints.vertical == ConstraintType::Center;

        if center_x || center_y {
            styles.insert("position".to_string(), "absolute".into());
            if node.absolute_bounding_box.is_some() {
                if center_x {
                    styles.insert("left".to_string(), "50%".into());
                    transforms.push("translateX(-50%)".to_string());
                }
                if center_y {
                    styles.insert("top".to_string(), "50%".into());
                    transforms.push("translateY(-50%)".to_string());
                }
            }
        }
    }

    let degrees = rotation_degrees(node);
    if degrees != 0.0 {
        transforms.push(format!("rotate({}deg)", format_number(degrees)));
    }
    if !transforms.is_empty() {
        styles.insert("transform".to_string(), transforms.join(" ").into());
    }

    if let Some(opacity) = node.opacity.filter(|o| *o < 1.0) {
        styles.insert("opacity".to_string(), opacity.into());
    }

    styles
}

/// Own rotation in degrees, rounded to four decimals
pub fn rotation_degrees(node: &SourceNode) -> f64 {
    let degrees = radians_to_degrees(node.rotation.unwrap_or(0.0));
    (degrees * 10_000.0).round() / 10_000.0
}

/// Whether a node is icon-like and can be flattened into one vector asset
pub fn is_likely_icon(node: &SourceNode) -> bool {
    if node.kind.is_vector_like() {
        return true;
    }

    let (width, height) = node
        .absolute_bounding_box
        .map_or((0.0, 0.0), |b| (b.width, b.height));

    if width <= ICON_MAX_SIZE && height <= ICON_MAX_SIZE {
        if !node.export_settings.is_empty() {
            return true;
        }
        if node.kind == SourceKind::Component
            && width <= ICON_COMPONENT_MAX_SIZE
            && height <= ICON_COMPONENT_MAX_SIZE
        {
            return true;
        }
    }

    false
}

/// Summary of a text run used to decide whether to split it into spans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRunInfo {
    pub character_count: usize,
    pub has_multiple_styles: bool,
}

/// Character count and style-span mixing for text nodes; zero/false otherwise
pub fn detect_multi_style_text(node: &SourceNode) -> TextRunInfo {
    if node.kind != SourceKind::Text {
        return TextRunInfo::default();
    }

    let character_count = node.characters.as_deref().map_or(0, |c| c.chars().count());

    // Override id 0 is the base style; any other id marks a differently styled span
    let has_override_spans = node
        .character_style_overrides
        .as_ref()
        .map_or(false, |overrides| overrides.iter().any(|id| *id != 0));
    let has_override_table = node
        .style_override_table
        .as_ref()
        .map_or(false, |table| !table.is_empty());

    TextRunInfo {
        character_count,
        has_multiple_styles: character_count > 0 && (has_override_spans || has_override_table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable_context::{NoVariables, VariableContext};

    fn frame() -> SourceNode {
        SourceNode::new("1:1", "Frame", SourceKind::Frame)
    }

    fn red() -> Color {
        Color::rgba(1.0, 0.0, 0.0, 1.0)
    }

    #[test]
    fn test_horizontal_layout() {
        let mut node = frame();
        node.layout_mode = Some(LayoutMode::Horizontal);
        node.item_spacing = Some(16.0);

        let styles = normalize_layout(&node);
        assert_eq!(styles["display"], StyleValue::from("flex"));
        assert_eq!(styles["flexDirection"], StyleValue::from("row"));
        assert_eq!(styles["gap"], StyleValue::from("16px"));
        assert!(!styles.contains_key("padding"));
    }

    #[test]
    fn test_vertical_layout_without_spacing() {
        let mut node = frame();
        node.layout_mode = Some(LayoutMode::Vertical);
        node.item_spacing = Some(0.0);

        let styles = normalize_layout(&node);
        assert_eq!(styles["flexDirection"], StyleValue::from("column"));
        assert!(!styles.contains_key("gap"));
    }

    #[test]
    fn test_no_axis_emits_nothing() {
        let mut node = frame();
        node.item_spacing = Some(12.0);
        node.padding_top = Some(4.0);
        assert!(normalize_layout(&node).is_empty());

        node.layout_mode = Some(LayoutMode::NoLayout);
        assert!(normalize_layout(&node).is_empty());
    }

    #[test]
    fn test_padding_collapses() {
        let mut node = frame();
        node.layout_mode = Some(LayoutMode::Horizontal);
        node.padding_top = Some(8.0);
        node.padding_bottom = Some(8.0);
        node.padding_left = Some(16.0);
        node.padding_right = Some(16.0);
        assert_eq!(normalize_layout(&node)["padding"], StyleValue::from("8px 16px"));

        node.padding_left = Some(4.0);
        assert_eq!(normalize_layout(&node)["padding"], StyleValue::from("8px 16px 8px 4px"));
    }

    #[test]
    fn test_solid_fill() {
        let mut node = frame();
        node.fills = vec![Paint::solid(red())];
        assert_eq!(normalize_fills(&node, &NoVariables)["background"], StyleValue::from("#FF0000"));

        node.fills[0].opacity = Some(0.5);
        assert_eq!(
            normalize_fills(&node, &NoVariables)["background"],
            StyleValue::from("rgba(255, 0, 0, 0.50)")
        );
    }

    #[test]
    fn test_only_first_fill_is_used() {
        let mut node = frame();
        let mut gradient = Paint::solid(red());
        gradient.kind = PaintType::GradientLinear;
        node.fills = vec![gradient, Paint::solid(red())];
        assert!(normalize_fills(&node, &NoVariables).is_empty());

        node.fills = vec![];
        assert!(normalize_fills(&node, &NoVariables).is_empty());
    }

    #[test]
    fn test_variable_bound_fill() {
        let mut paint = Paint::solid(red());
        paint.bound_variables = Some(PaintVariables {
            color: Some(VariableAlias { id: "VariableID:9".to_string() }),
        });
        let mut node = frame();
        node.fills = vec![paint];

        let mut variables = VariableContext::new();
        assert_eq!(normalize_fills(&node, &variables)["background"], StyleValue::from("#FF0000"));

        variables.insert("VariableID:9", "var(--brand)");
        assert_eq!(normalize_fills(&node, &variables)["background"], StyleValue::from("var(--brand)"));
    }

    #[test]
    fn test_stroke_border() {
        let mut node = frame();
        node.strokes = vec![Paint::solid(Color::rgba(0.0, 0.0, 0.0, 1.0))];
        assert_eq!(
            normalize_strokes(&node, &NoVariables)["border"],
            StyleValue::from("1px solid #000000")
        );
        assert!(normalize_strokes(&frame(), &NoVariables).is_empty());
    }

    #[test]
    fn test_drop_shadows() {
        let mut node = frame();
        node.effects = vec![Effect::drop_shadow(0.0, 2.0, 4.0, Color::rgba(0.0, 0.0, 0.0, 0.1))];
        assert_eq!(
            normalize_effects(&node)["boxShadow"],
            StyleValue::from("0px 2px 4px rgba(0, 0, 0, 0.10)")
        );

        let mut blur = Effect::drop_shadow(0.0, 0.0, 8.0, red());
        blur.kind = EffectType::LayerBlur;
        node.effects.insert(0, blur);
        node.effects.push(Effect::drop_shadow(1.0, 1.0, 0.0, red()));
        assert_eq!(
            normalize_effects(&node)["boxShadow"],
            StyleValue::from("0px 2px 4px rgba(0, 0, 0, 0.10), 1px 1px 0px rgba(255, 0, 0, 1.00)")
        );
    }

    #[test]
    fn test_non_shadow_effects_ignored() {
        let mut node = frame();
        let mut inner = Effect::drop_shadow(0.0, 0.0, 8.0, red());
        inner.kind = EffectType::InnerShadow;
        node.effects = vec![inner];
        assert!(normalize_effects(&node).is_empty());
    }

    #[test]
    fn test_text_only_for_text_nodes() {
        let mut node = SourceNode::new("2:1", "Title", SourceKind::Text);
        node.font_size = Some(24.0);
        node.font_family = Some("Inter".to_string());

        let styles = normalize_text(&node);
        assert_eq!(styles["fontSize"], StyleValue::from("24px"));
        assert_eq!(styles["fontFamily"], StyleValue::from("'Inter', sans-serif"));

        node.kind = SourceKind::Frame;
        assert!(normalize_text(&node).is_empty());
        assert!(normalize_text(&SourceNode::new("2:2", "Empty", SourceKind::Text)).is_empty());
    }

    #[test]
    fn test_dimensions() {
        let mut node = frame();
        assert!(normalize_dimensions(&node).is_empty());
        node.absolute_bounding_box = Some(Rect { x: 0.0, y: 0.0, width: 320.0, height: 48.5 });
        let styles = normalize_dimensions(&node);
        assert_eq!(styles["width"], StyleValue::from("320px"));
        assert_eq!(styles["height"], StyleValue::from("48.5px"));
    }

    #[test]
    fn test_absolute_positioning_relative_to_parent() {
        let mut node = frame();
        node.layout_positioning = Some(LayoutPositioning::Absolute);
        node.absolute_bounding_box = Some(Rect { x: 110.0, y: 40.0, width: 10.0, height: 10.0 });
        let parent = ParentContext {
            bounds: Some(Rect { x: 100.0, y: 20.0, width: 200.0, height: 200.0 }),
            auto_layout: true,
        };

        let styles = normalize_positioning(&node, &parent);
        assert_eq!(styles["position"], StyleValue::from("absolute"));
        assert_eq!(styles["left"], StyleValue::from("10px"));
        assert_eq!(styles["top"], StyleValue::from("20px"));
    }

    #[test]
    fn test_center_constraints() {
        let mut node = frame();
        node.absolute_bounding_box = Some(Rect::default());
        node.constraints = Some(Constraints {
            horizontal: ConstraintType::Center,
            vertical: ConstraintType::Center,
        });

        let styles = normalize_positioning(&node, &ParentContext::default());
        assert_eq!(styles["position"], StyleValue::from("absolute"));
        assert_eq!(styles["left"], StyleValue::from("50%"));
        assert_eq!(styles["transform"], StyleValue::from("translateX(-50%) translateY(-50%)"));

        let in_auto_layout = ParentContext { bounds: None, auto_layout: true };
        assert!(normalize_positioning(&node, &in_auto_layout).is_empty());
    }

    #[test]
    fn test_rotation_and_opacity() {
        let mut node = frame();
        node.rotation = Some(std::f64::consts::PI);
        node.opacity = Some(0.4);

        let styles = normalize_positioning(&node, &ParentContext::default());
        assert_eq!(styles["transform"], StyleValue::from("rotate(180deg)"));
        assert_eq!(styles["opacity"], StyleValue::Number(0.4));

        node.rotation = Some(0.0);
        node.opacity = Some(1.0);
        assert!(normalize_positioning(&node, &ParentContext::default()).is_empty());
    }

    #[test]
    fn test_icon_detection() {
        assert!(is_likely_icon(&SourceNode::new("v", "Icon", SourceKind::Vector)));

        let mut component = SourceNode::new("c", "Chevron", SourceKind::Component);
        component.absolute_bounding_box = Some(Rect { x: 0.0, y: 0.0, width: 24.0, height: 24.0 });
        assert!(is_likely_icon(&component));

        component.absolute_bounding_box = Some(Rect { x: 0.0, y: 0.0, width: 56.0, height: 56.0 });
        assert!(!is_likely_icon(&component));
        component.export_settings = vec![serde_json::json!({ "format": "SVG" })];
        assert!(is_likely_icon(&component));

        let mut big_frame = frame();
        big_frame.absolute_bounding_box = Some(Rect { x: 0.0, y: 0.0, width: 400.0, height: 300.0 });
        assert!(!is_likely_icon(&big_frame));
    }

    #[test]
    fn test_multi_style_detection() {
        let mut text = SourceNode::new("t", "Body", SourceKind::Text);
        text.characters = Some("Hello world".to_string());
        assert_eq!(
            detect_multi_style_text(&text),
            TextRunInfo { character_count: 11, has_multiple_styles: false }
        );

        text.character_style_overrides = Some(vec![0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1]);
        assert!(detect_multi_style_text(&text).has_multiple_styles);

        assert_eq!(detect_multi_style_text(&frame()), TextRunInfo::default());
    }
}
