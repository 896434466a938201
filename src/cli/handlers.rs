// FILE: src/cli/handlers.rs
use crate::rules::{ResolvedProperties, RuleMatch, RuleSet};
use crate::transform::NamingContext;
use crate::tree_evaluator::{evaluate_tree, TreeMatches, TreeStats};
use crate::types::AltNode;
use crate::variable_context::{NoVariables, VariableContext, VariableResolver};
use crate::{
    load_rules_file, load_source_file, load_variables_file, normalize_with, EngineError, Result,
};

use serde::Serialize;
use std::fs;
use std::time::Instant;

/// One node's entry in `match` output
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeReport<'r> {
    node_id: &'r str,
    unique_name: &'r str,
    #[serde(rename = "type")]
    kind: &'static str,
    matches: &'r [RuleMatch],
    resolved: ResolvedProperties,
}

fn load_variables(path: Option<&str>) -> Result<Option<VariableContext>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let variables = load_variables_file(path)?;
    log::info!("Loaded {} variables from {}", variables.len(), path);
    Ok(Some(variables))
}

fn write_output(output_path: Option<&str>, content: &str) -> Result<()> {
    match output_path {
        Some(path) => {
            fs::write(path, content)?;
            log::info!("Wrote {} bytes to {}", content.len(), path);
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn log_stats(stats: &TreeStats) {
    log::info!(
        "Tree: {} nodes ({} visible, {} flattenable), {} matched, {} conflicts",
        stats.node_count,
        stats.visible_count,
        stats.flattenable_count,
        stats.matched_node_count,
        stats.conflict_count
    );
}

// --- NORMALIZE ---
pub fn handle_normalize_command(cli: &super::Cli, matches: &clap::ArgMatches) -> Result<()> {
    let input_path = required(matches, "input")?;
    let source = load_source_file(input_path)?;
    let variables = load_variables(cli.variables_path(matches))?;

    let start = Instant::now();
    let (json, stats) = render_normalized(&source, variables.as_ref())?;
    log::debug!("Normalization took {:.2}ms", start.elapsed().as_secs_f64() * 1000.0);

    log_stats(&stats);
    if matches.get_flag("stats") {
        print_stats(&stats);
    }

    write_output(matches.get_one::<String>("output").map(String::as_str), &json)
}

fn render_normalized(
    source: &crate::SourceNode,
    variables: Option<&VariableContext>,
) -> Result<(String, TreeStats)> {
    let resolver: &dyn VariableResolver = match variables {
        Some(context) => context,
        None => &NoVariables,
    };
    let mut naming = NamingContext::new();
    let root = normalize_with(source, &mut naming, resolver)?;
    let stats = TreeStats::collect(&root, None);
    Ok((serde_json::to_string_pretty(&root)?, stats))
}

// --- MATCH ---
pub fn handle_match_command(cli: &super::Cli, matches: &clap::ArgMatches) -> Result<()> {
    let input_path = required(matches, "input")?;
    let rules_path = required(matches, "rules")?;

    let options = cli.build_engine_options(matches)?;
    let source = load_source_file(input_path)?;
    let rules = load_rules_file(rules_path)?;
    let variables = load_variables(cli.variables_path(matches))?;
    let resolver: &dyn VariableResolver = match &variables {
        Some(context) => context,
        None => &NoVariables,
    };

    let mut naming = NamingContext::new();
    let root = normalize_with(&source, &mut naming, resolver)?;

    let start = Instant::now();
    let tree_matches = evaluate_tree(&root, rules.as_slice(), &options);
    log::debug!("Rule evaluation took {:.2}ms", start.elapsed().as_secs_f64() * 1000.0);
    log_stats(&TreeStats::collect(&root, Some(&tree_matches)));

    let node_filter = matches.get_one::<String>("node").map(String::as_str);
    let json = render_match_report(&root, &tree_matches, node_filter)?;
    write_output(matches.get_one::<String>("output").map(String::as_str), &json)
}

fn render_match_report(
    root: &AltNode<'_>,
    tree_matches: &TreeMatches,
    node_filter: Option<&str>,
) -> Result<String> {
    if let Some(id) = node_filter {
        if root.find(id).is_none() {
            return Err(EngineError::InvalidFormat {
                message: format!("No node with id '{}' in the tree", id),
            });
        }
    }

    let reports: Vec<NodeReport<'_>> = root
        .iter()
        .filter(|node| node_filter.map_or(true, |id| node.id == id))
        .filter_map(|node| {
            let node_matches = tree_matches.get(&node.id)?;
            Some(NodeReport {
                node_id: &node.id,
                unique_name: &node.unique_name,
                kind: node.kind.as_str(),
                matches: node_matches,
                resolved: tree_matches.resolve(&node.id).unwrap_or_default(),
            })
        })
        .collect();

    Ok(serde_json::to_string_pretty(&reports)?)
}

// --- CHECK RULES ---
pub fn handle_check_rules_command(matches: &clap::ArgMatches) -> Result<()> {
    let input_path = required(matches, "input")?;
    println!("🔍 Checking {}", input_path);

    let rules = load_rules_file(input_path)?;
    print_rule_summary(&rules);
    Ok(())
}

fn print_rule_summary(rules: &RuleSet) {
    println!("✅ {} rules loaded ({} enabled)", rules.len(), rules.enabled_count());
    for framework in crate::rules::Framework::ALL {
        let covered = rules
            .iter()
            .filter(|rule| rule.transformer_for(framework).is_some())
            .count();
        println!("   {:<18} {} rules", framework.as_str(), covered);
    }
}

fn print_stats(stats: &TreeStats) {
    println!("\n📊 Tree Statistics:");
    println!("   Nodes: {}", stats.node_count);
    println!("   Visible: {}", stats.visible_count);
    println!("   Flattenable: {}", stats.flattenable_count);
}

fn required<'m>(matches: &'m clap::ArgMatches, name: &str) -> Result<&'m str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| EngineError::InvalidFormat {
            message: format!("Missing required argument '{}'", name),
        })
}
