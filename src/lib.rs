//! altrules: design-tree normalization and rule matching
//!
//! Turns a design tool's node tree into a normalized, framework-agnostic
//! `AltNode` tree and evaluates declarative mapping rules against it.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use altrules::{evaluate, normalize, EngineOptions, RuleSet, SourceNode, Result};
//!
//! fn main() -> Result<()> {
//!     let source = SourceNode::from_json(&std::fs::read_to_string("tree.json")?)?;
//!     let rules = RuleSet::from_json(&std::fs::read_to_string("rules.json")?)?;
//!
//!     let root = normalize(&source)?;
//!     let matches = evaluate(&root, rules.as_slice(), &EngineOptions::default());
//!     println!("{:?}", matches.resolve(&root.id));
//!     Ok(())
//! }
//! ```
//!
//! # Pipeline
//!
//! 1. **Normalize**: style normalizers map layout, paint, effects, text,
//!    size and placement to CSS-like properties ([`normalize`])
//! 2. **Transform**: depth-first pass assigning kinds, unique names and a
//!    stacking post-pass ([`transform`])
//! 3. **Match**: selectors are tested against normalized nodes and the
//!    matches ranked by priority ([`rule_engine`])
//! 4. **Resolve**: conflicting contributions are merged, highest priority
//!    first, with per-property provenance

pub mod types;
pub mod error;
pub mod utils;
pub mod variable_context;
pub mod normalize;
pub mod transform;
pub mod rules;
pub mod selector;
pub mod rule_engine;
pub mod tree_evaluator;
pub mod cli;

use serde::{Deserialize, Serialize};
use std::fs;

pub use error::{EngineError, Result};
pub use types::{AltKind, AltNode, SourceKind, SourceNode, StyleMap, StyleValue};
pub use variable_context::{NoVariables, VariableContext, VariableEntry, VariableResolver};
pub use transform::{NamingContext, TreeTransformer};
pub use rules::{
    ConflictSeverity, Framework, MappingRule, ResolvedProperties, RuleMatch, RuleSet, Selector,
    Transformer,
};
pub use rule_engine::{detect_conflicts, evaluate_rules, rank_matches, resolve_conflicts};
pub use tree_evaluator::{evaluate_tree, TreeMatches, TreeStats};
pub use cli::Cli;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Ordering applied to matches of equal priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// Keep rule-set order (stable sort)
    #[default]
    InputOrder,
    /// Order by rule id, ascending
    RuleId,
}

/// Rule evaluation options
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    /// Target framework whose transformers contribute properties
    pub framework: Framework,

    /// How equal-priority matches are ordered
    pub tie_break: TieBreak,

    /// Contributed-property keys whose overlap is a major conflict
    pub major_properties: Vec<String>,

    /// Evaluate rules marked `enabled: false` as well
    pub include_disabled: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            framework: Framework::ReactTailwind,
            tie_break: TieBreak::InputOrder,
            major_properties: vec![rules::HTML_TAG.to_string()],
            include_disabled: false,
        }
    }
}

/// Normalize a source tree in a fresh naming pass with no variables bound
pub fn normalize(source: &SourceNode) -> Result<AltNode<'_>> {
    let mut naming = NamingContext::new();
    normalize_with(source, &mut naming, &NoVariables)
}

/// Normalize a source tree with caller-supplied naming and variable contexts
pub fn normalize_with<'a>(
    source: &'a SourceNode,
    naming: &mut NamingContext,
    variables: &dyn VariableResolver,
) -> Result<AltNode<'a>> {
    TreeTransformer::new(naming, variables).transform(source)
}

/// Evaluate `rules` against every node of a normalized tree
pub fn evaluate(root: &AltNode<'_>, rules: &[MappingRule], options: &EngineOptions) -> TreeMatches {
    evaluate_tree(root, rules, options)
}

fn read_input(path: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| EngineError::FileNotFound {
        path: format!("{}: {}", path, e),
    })
}

/// Read and parse a source tree JSON file
pub fn load_source_file(path: &str) -> Result<SourceNode> {
    let source = SourceNode::from_json(&read_input(path)?)?;
    log::debug!("Loaded source tree '{}' from {}", source.id, path);
    Ok(source)
}

/// Read and validate a rule-set JSON file
pub fn load_rules_file(path: &str) -> Result<RuleSet> {
    RuleSet::from_json(&read_input(path)?)
}

/// Read a variable-binding JSON file
pub fn load_variables_file(path: &str) -> Result<VariableContext> {
    VariableContext::from_json(&read_input(path)?)
}
