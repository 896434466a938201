//! Normalization and rule evaluation benchmarks

use altrules::rules::{LayoutAxis, HTML_TAG};
use altrules::types::{Color, LayoutMode, Paint, Rect};
use altrules::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Root frame with `rows` horizontal rows of `per_row` leaves, 1 + rows * (1 + per_row) nodes
fn build_tree(rows: usize, per_row: usize) -> SourceNode {
    let children = (0..rows)
        .map(|r| {
            let leaves = (0..per_row)
                .map(|i| {
                    let kind = if i % 2 == 0 { SourceKind::Text } else { SourceKind::Vector };
                    let mut leaf = SourceNode::new(format!("{}:{}", r, i), "Item", kind);
                    leaf.fills = vec![Paint::solid(Color::rgba(0.1, 0.2, 0.3, 1.0))];
                    leaf.absolute_bounding_box = Some(Rect { x: 0.0, y: 0.0, width: 24.0, height: 24.0 });
                    leaf
                })
                .collect();
            let mut row = SourceNode::new(format!("row:{}", r), "Row", SourceKind::Frame).with_children(leaves);
            row.layout_mode = Some(LayoutMode::Horizontal);
            row.item_spacing = Some(8.0);
            row.padding_top = Some(4.0);
            row
        })
        .collect();
    SourceNode::new("root", "Page", SourceKind::Frame).with_children(children)
}

fn build_rules(count: usize) -> Vec<MappingRule> {
    (0..count)
        .map(|i| {
            let selector = match i % 3 {
                0 => Selector { node_type: Some(AltKind::Text), ..Default::default() },
                1 => Selector { layout_mode: Some(LayoutAxis::Horizontal), ..Default::default() },
                _ => Selector::default(),
            };
            let mut transformer = Transformer::tag(format!("tag{}", i));
            transformer.css_classes = vec![format!("c{}", i)];
            MappingRule::new(format!("rule-{}", i), (i % 7) as i64, selector)
                .with_transformer(Framework::ReactTailwind, transformer)
        })
        .collect()
}

fn bench_normalize_100_nodes(c: &mut Criterion) {
    // 1 + 9 * 11 = 100 nodes
    let source = build_tree(9, 10);

    c.bench_function("normalize_100_nodes", |b| {
        b.iter(|| normalize(black_box(&source)).unwrap())
    });
}

fn bench_evaluate_50_rules(c: &mut Criterion) {
    let source = build_tree(9, 10);
    let root = normalize(&source).unwrap();
    let rules = build_rules(50);
    let options = EngineOptions::default();

    c.bench_function("evaluate_50_rules_100_nodes", |b| {
        b.iter(|| evaluate(black_box(&root), black_box(&rules), &options))
    });
}

fn bench_resolve_50_way_conflict(c: &mut Criterion) {
    let source = SourceNode::new("1", "Node", SourceKind::Frame);
    let root = normalize(&source).unwrap();
    let rules: Vec<MappingRule> = (0..50)
        .map(|i| {
            MappingRule::new(format!("r{}", i), i, Selector::default())
                .with_transformer(Framework::ReactTailwind, Transformer::tag("div"))
        })
        .collect();
    let matches = evaluate_rules(&root, &rules, &EngineOptions::default());

    c.bench_function("resolve_50_way_conflict", |b| {
        b.iter(|| {
            let resolved = resolve_conflicts(black_box(&matches));
            assert!(resolved.get(HTML_TAG).is_some());
            resolved
        })
    });
}

criterion_group!(
    benches,
    bench_normalize_100_nodes,
    bench_evaluate_50_rules,
    bench_resolve_50_way_conflict
);
criterion_main!(benches);
