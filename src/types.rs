//! Core data model: the design-tool source tree and the normalized tree

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// Icon heuristics (pixels)
pub const ICON_MAX_SIZE: f64 = 64.0;
pub const ICON_COMPONENT_MAX_SIZE: f64 = 48.0;

// Source node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceKind {
    #[default]
    Frame,
    Group,
    Text,
    Rectangle,
    Ellipse,
    Vector,
    BooleanOperation,
    Star,
    Polygon,
    RegularPolygon,
    Line,
    Component,
    ComponentSet,
    Instance,
    Image,
    Section,
    #[serde(other)]
    Unknown,
}

impl SourceKind {
    /// Shapes that render as a single path and can be flattened to an SVG
    pub fn is_vector_like(self) -> bool {
        matches!(
            self,
            Self::Vector
                | Self::BooleanOperation
                | Self::Star
                | Self::Polygon
                | Self::RegularPolygon
                | Self::Line
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutMode {
    #[serde(rename = "NONE")]
    NoLayout,
    Horizontal,
    Vertical,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutPositioning {
    Auto,
    Absolute,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintType {
    Left,
    Right,
    Top,
    Bottom,
    Center,
    LeftRight,
    TopBottom,
    Scale,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Constraints {
    pub horizontal: ConstraintType,
    pub vertical: ConstraintType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaintType {
    Solid,
    GradientLinear,
    GradientRadial,
    GradientAngular,
    GradientDiamond,
    Image,
    Video,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectType {
    DropShadow,
    InnerShadow,
    LayerBlur,
    BackgroundBlur,
    #[serde(other)]
    Other,
}

/// RGBA colour with channels in the 0..=1 range
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default = "full_alpha")]
    pub a: f64,
}

fn full_alpha() -> f64 {
    1.0
}

impl Color {
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VariableAlias {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PaintVariables {
    pub color: Option<VariableAlias>,
}

/// A fill or stroke paint
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paint {
    #[serde(rename = "type")]
    pub kind: PaintType,
    pub color: Option<Color>,
    pub opacity: Option<f64>,
    pub visible: Option<bool>,
    pub bound_variables: Option<PaintVariables>,
}

impl Paint {
    pub fn solid(color: Color) -> Self {
        Self {
            kind: PaintType::Solid,
            color: Some(color),
            opacity: None,
            visible: None,
            bound_variables: None,
        }
    }

    /// Id of the design variable bound to this paint's colour, if any
    pub fn color_variable(&self) -> Option<&str> {
        self.bound_variables
            .as_ref()
            .and_then(|vars| vars.color.as_ref())
            .map(|alias| alias.id.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Effect {
    #[serde(rename = "type")]
    pub kind: EffectType,
    pub color: Option<Color>,
    pub offset: Option<Vector2>,
    pub radius: Option<f64>,
    pub visible: Option<bool>,
}

impl Effect {
    pub fn drop_shadow(offset_x: f64, offset_y: f64, radius: f64, color: Color) -> Self {
        Self {
            kind: EffectType::DropShadow,
            color: Some(color),
            offset: Some(Vector2 { x: offset_x, y: offset_y }),
            radius: Some(radius),
            visible: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Text attributes nested under `style` in design-tool payloads
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
}

/// Raw design-tool node. Read-only input to a transformation pass.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    #[serde(default)]
    pub children: Vec<SourceNode>,

    pub layout_mode: Option<LayoutMode>,
    pub item_spacing: Option<f64>,
    pub padding_top: Option<f64>,
    pub padding_right: Option<f64>,
    pub padding_bottom: Option<f64>,
    pub padding_left: Option<f64>,
    pub layout_positioning: Option<LayoutPositioning>,
    pub constraints: Option<Constraints>,

    #[serde(default)]
    pub fills: Vec<Paint>,
    #[serde(default)]
    pub strokes: Vec<Paint>,
    #[serde(default)]
    pub effects: Vec<Effect>,

    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub characters: Option<String>,
    pub style: Option<TextStyle>,
    pub character_style_overrides: Option<Vec<u32>>,
    pub style_override_table: Option<BTreeMap<String, serde_json::Value>>,

    pub absolute_bounding_box: Option<Rect>,
    pub rotation: Option<f64>,
    pub opacity: Option<f64>,
    pub visible: Option<bool>,
    pub locked: Option<bool>,
    #[serde(default)]
    pub export_settings: Vec<serde_json::Value>,
}

impl SourceNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn with_children(mut self, children: Vec<SourceNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_visible(&self) -> bool {
        self.visible.unwrap_or(true)
    }

    pub fn is_locked(&self) -> bool {
        self.locked.unwrap_or(false)
    }

    pub fn font_family(&self) -> Option<&str> {
        self.font_family
            .as_deref()
            .or_else(|| self.style.as_ref().and_then(|s| s.font_family.as_deref()))
    }

    pub fn font_size(&self) -> Option<f64> {
        self.font_size
            .or_else(|| self.style.as_ref().and_then(|s| s.font_size))
    }

    /// Parse a source tree from design-tool JSON.
    ///
    /// Malformed JSON is a `Json` error; well-formed JSON describing an
    /// invalid node (missing `id` or `type`, wrong field types) is `InvalidSource`.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            if e.is_syntax() || e.is_eof() {
                crate::EngineError::Json(e)
            } else {
                crate::EngineError::invalid_source("<root>", e.to_string())
            }
        })
    }
}

/// Abstract element category assigned to a normalized node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AltKind {
    Container,
    Text,
    Image,
    Vector,
    Group,
}

impl AltKind {
    pub fn from_source(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Text => Self::Text,
            SourceKind::Group => Self::Group,
            SourceKind::Image | SourceKind::Rectangle | SourceKind::Ellipse => Self::Image,
            k if k.is_vector_like() => Self::Vector,
            _ => Self::Container,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Text => "text",
            Self::Image => "image",
            Self::Vector => "vector",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for AltKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single style value with CSS-value semantics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Bool(bool),
    Number(f64),
    Str(String),
}

impl StyleValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<usize> for StyleValue {
    fn from(value: usize) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for StyleValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::Str(s) => f.write_str(s),
        }
    }
}

/// camelCase CSS property name -> value. Absent keys mean "not applicable".
pub type StyleMap = BTreeMap<String, StyleValue>;

/// Normalized, style-annotated node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AltNode<'a> {
    pub id: String,
    pub name: String,
    pub unique_name: String,
    #[serde(rename = "type")]
    pub kind: AltKind,
    pub styles: StyleMap,
    pub children: Vec<AltNode<'a>>,
    pub visible: bool,
    pub locked: bool,
    pub can_be_flattened: bool,
    pub cumulative_rotation: f64,

    /// The node this was produced from
    #[serde(skip)]
    pub source: &'a SourceNode,
}

impl<'a> AltNode<'a> {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn style(&self, key: &str) -> Option<&StyleValue> {
        self.styles.get(key)
    }

    /// Whether `key` holds the string `value`
    pub fn style_is(&self, key: &str, value: &str) -> bool {
        self.styles.get(key).and_then(StyleValue::as_str) == Some(value)
    }

    /// Pre-order traversal of this node and all descendants
    pub fn iter(&self) -> PreOrder<'_, 'a> {
        PreOrder { stack: vec![self] }
    }

    pub fn find(&self, id: &str) -> Option<&AltNode<'a>> {
        self.iter().find(|n| n.id == id)
    }

    pub fn node_count(&self) -> usize {
        self.iter().count()
    }
}

pub struct PreOrder<'n, 'a> {
    stack: Vec<&'n AltNode<'a>>,
}

impl<'n, 'a> Iterator for PreOrder<'n, 'a> {
    type Item = &'n AltNode<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
