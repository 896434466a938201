//! Mapping rule model and rule-set loading

use crate::error::{EngineError, Result};
use crate::types::{AltKind, StyleValue};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Contributed-property key for the output element tag
pub const HTML_TAG: &str = "htmlTag";
/// Contributed-property key for the space-joined class list
pub const CSS_CLASSES: &str = "cssClasses";
/// Contributed-property key for the JSON-encoded attribute map
pub const ATTRIBUTES: &str = "attributes";

/// Code-generation target a transformer is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Framework {
    #[serde(rename = "react-tailwind")]
    ReactTailwind,
    #[serde(rename = "react-tailwind-v4")]
    ReactTailwindV4,
    #[serde(rename = "html-css")]
    HtmlCss,
    #[serde(rename = "react-inline")]
    ReactInline,
}

impl Framework {
    pub const ALL: [Framework; 4] = [
        Self::ReactTailwind,
        Self::ReactTailwindV4,
        Self::HtmlCss,
        Self::ReactInline,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReactTailwind => "react-tailwind",
            Self::ReactTailwindV4 => "react-tailwind-v4",
            Self::HtmlCss => "html-css",
            Self::ReactInline => "react-inline",
        }
    }

    /// Framework whose transformer is used when a rule has none for this one
    pub fn fallback(self) -> Option<Framework> {
        match self {
            Self::ReactTailwindV4 => Some(Self::ReactTailwind),
            _ => None,
        }
    }
}

impl Default for Framework {
    fn default() -> Self {
        Self::ReactTailwind
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Framework {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|fw| fw.as_str() == s)
            .ok_or_else(|| EngineError::InvalidFormat {
                message: format!("Unknown framework '{}'", s),
            })
    }
}

/// Layout direction a selector can require
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutAxis {
    Horizontal,
    Vertical,
}

/// AND-combined predicate over normalized nodes. Unset fields do not constrain.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
    #[serde(alias = "type", skip_serializing_if = "Option::is_none")]
    pub node_type: Option<AltKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_mode: Option<LayoutAxis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_children: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_properties: BTreeMap<String, StyleValue>,
}

impl Selector {
    pub fn is_empty(&self) -> bool {
        self.node_type.is_none()
            && self.layout_mode.is_none()
            && self.has_children.is_none()
            && self.custom_properties.is_empty()
    }
}

/// A rule's output for one framework
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transformer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub css_classes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inline_styles: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl Transformer {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            html_tag: Some(tag.into()),
            ..Default::default()
        }
    }

    /// Flatten into the string-keyed property map a rule contributes to a node
    pub fn contributed_properties(&self) -> BTreeMap<String, String> {
        let mut properties = BTreeMap::new();

        if let Some(tag) = &self.html_tag {
            properties.insert(HTML_TAG.to_string(), tag.clone());
        }
        if !self.css_classes.is_empty() {
            properties.insert(CSS_CLASSES.to_string(), self.css_classes.join(" "));
        }
        for (key, value) in &self.inline_styles {
            properties.insert(key.clone(), value.clone());
        }
        if !self.attributes.is_empty() {
            let object: serde_json::Map<String, serde_json::Value> = self
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect();
            properties.insert(ATTRIBUTES.to_string(), serde_json::Value::Object(object).to_string());
        }

        properties
    }

    pub fn is_empty(&self) -> bool {
        self.html_tag.is_none()
            && self.css_classes.is_empty()
            && self.inline_styles.is_empty()
            && self.attributes.is_empty()
    }
}

fn enabled_by_default() -> bool {
    true
}

/// Framework ids are open-ended; transformers for targets we cannot emit are dropped
fn known_frameworks<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<Framework, Transformer>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Transformer>::deserialize(deserializer)?;
    let mut known = BTreeMap::new();
    for (key, transformer) in raw {
        match key.parse::<Framework>() {
            Ok(framework) => {
                known.insert(framework, transformer);
            }
            Err(_) => log::warn!("Ignoring transformer for unsupported framework '{}'", key),
        }
    }
    Ok(known)
}

/// A declarative rule: which nodes it applies to and what it contributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRule {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub selector: Selector,
    /// Per-framework outputs
    #[serde(
        default,
        deserialize_with = "known_frameworks",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub transformers: BTreeMap<Framework, Transformer>,
    /// Framework-independent output, used when no per-framework entry applies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformer: Option<Transformer>,
    pub priority: i64,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MappingRule {
    pub fn new(id: impl Into<String>, priority: i64, selector: Selector) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            selector,
            transformers: BTreeMap::new(),
            transformer: None,
            priority,
            enabled: true,
            description: None,
        }
    }

    pub fn with_transformer(mut self, framework: Framework, transformer: Transformer) -> Self {
        self.transformers.insert(framework, transformer);
        self
    }

    /// Transformer for `framework`, following the framework fallback chain
    pub fn transformer_for(&self, framework: Framework) -> Option<&Transformer> {
        self.transformers
            .get(&framework)
            .or_else(|| framework.fallback().and_then(|fw| self.transformers.get(&fw)))
            .or(self.transformer.as_ref())
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(EngineError::invalid_rule(self.name.as_str(), "rule is missing its id"));
        }
        if self.transformers.is_empty() && self.transformer.is_none() {
            return Err(EngineError::invalid_rule(
                self.id.as_str(),
                "rule has no transformer for any framework",
            ));
        }
        Ok(())
    }
}

/// Severity of an overlap between two rules' contributions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSeverity {
    Minor,
    Major,
}

/// One rule matching one node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMatch {
    pub rule_id: String,
    pub rule_name: String,
    pub priority: i64,
    pub contributed_properties: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts_with: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_severity: Option<ConflictSeverity>,
}

impl RuleMatch {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts_with.is_empty()
    }
}

/// Merged properties for one node and which rule supplied each
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedProperties {
    pub resolved: BTreeMap<String, String>,
    pub provenance: BTreeMap<String, String>,
}

impl ResolvedProperties {
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.resolved.get(key).map(String::as_str)
    }

    pub fn supplier(&self, key: &str) -> Option<&str> {
        self.provenance.get(key).map(String::as_str)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RuleDocument {
    List(Vec<serde_json::Value>),
    Wrapped { rules: Vec<serde_json::Value> },
}

/// An ordered collection of mapping rules
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RuleSet {
    pub rules: Vec<MappingRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<MappingRule>) -> Self {
        Self { rules }
    }

    /// Parse a JSON array of rules, or an object with a `rules` array.
    ///
    /// Every rule is validated; the first invalid one fails the load.
    pub fn from_json(json: &str) -> Result<Self> {
        let document: RuleDocument = serde_json::from_str(json).map_err(|e| EngineError::InvalidFormat {
            message: format!("Rule set must be an array or {{ \"rules\": [...] }}: {}", e),
        })?;
        let raw_rules = match document {
            RuleDocument::List(rules) | RuleDocument::Wrapped { rules } => rules,
        };

        let mut rules = Vec::with_capacity(raw_rules.len());
        let mut seen = HashSet::new();

        for (index, raw) in raw_rules.into_iter().enumerate() {
            let label = raw
                .get("id")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{}", index));

            let rule: MappingRule = serde_json::from_value(raw)
                .map_err(|e| EngineError::invalid_rule(label.as_str(), e.to_string()))?;
            rule.validate()?;

            if !seen.insert(rule.id.clone()) {
                log::warn!("Duplicate rule id '{}' in rule set", rule.id);
            }
            rules.push(rule);
        }

        log::debug!("Loaded {} mapping rules", rules.len());
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MappingRule> {
        self.rules.iter()
    }

    pub fn enabled_count(&self) -> usize {
        self.rules.iter().filter(|r| r.enabled).count()
    }

    pub fn as_slice(&self) -> &[MappingRule] {
        &self.rules
    }
}

impl From<Vec<MappingRule>> for RuleSet {
    fn from(rules: Vec<MappingRule>) -> Self {
        Self::new(rules)
    }
}
