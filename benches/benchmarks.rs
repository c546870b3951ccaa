use criteria_tree::{
    find_node_by_key, to_match_rules, to_tree_nodes, CriteriaKind, MatchRules, NodeKey,
    TreeController, TreeNode,
};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use serde_json::{json, Value};

const DEPTH: usize = 6;
const WIDTH: usize = 4;

fn nested_rules(depth: usize, width: usize) -> MatchRules {
    fn element(depth: usize, width: usize, index: usize) -> Value {
        if depth == 0 {
            let kind = if index % 2 == 0 { "clinical" } else { "genomic" };
            json!({"type": kind, "field": format!("field_{index}")})
        } else {
            let operator = if depth % 2 == 0 { "and" } else { "or" };
            let nested: Vec<_> = (0..width)
                .map(|child| element(depth - 1, width, child))
                .collect();
            json!({(operator): nested})
        }
    }
    MatchRules::new(vec![element(depth, width, 0)])
}

fn last_leaf_key(roots: &[TreeNode]) -> NodeKey {
    let mut node = &roots[roots.len() - 1];
    while let Some(children) = node.children() {
        match children.last() {
            Some(child) => node = child,
            None => break,
        }
    }
    node.key().clone()
}

pub fn convert_to_tree(c: &mut Criterion) {
    let rules = nested_rules(DEPTH, WIDTH);
    c.bench_function("to_tree_nodes", |b| {
        b.iter(|| {
            let _ = std::hint::black_box(to_tree_nodes(&rules));
        })
    });
}

pub fn convert_back(c: &mut Criterion) {
    let rules = nested_rules(DEPTH, WIDTH);
    let roots = to_tree_nodes(&rules).unwrap();
    c.bench_function("to_match_rules", |b| {
        b.iter(|| {
            let _ = std::hint::black_box(to_match_rules(&roots));
        })
    });
}

pub fn find_a_deep_node(c: &mut Criterion) {
    let rules = nested_rules(DEPTH, WIDTH);
    let roots = to_tree_nodes(&rules).unwrap();
    // The worst case for the depth-first search is the last leaf.
    let key = last_leaf_key(&roots);
    c.bench_function("find_node_by_key", |b| {
        b.iter(|| {
            let _ = std::hint::black_box(find_node_by_key(&roots, &key));
        })
    });
}

pub fn apply_a_delete_intent(c: &mut Criterion) {
    let rules = nested_rules(DEPTH, WIDTH);
    c.bench_function("delete_criteria", |b| {
        b.iter_batched(
            || {
                let mut controller = TreeController::new();
                controller.activate_arm("arm_a", Some(&rules)).unwrap();
                let target = last_leaf_key(controller.roots());
                (controller, target)
            },
            |(mut controller, target)| {
                let _ = std::hint::black_box(controller.request_delete_criteria(target));
            },
            BatchSize::SmallInput,
        )
    });
}

pub fn apply_an_add_intent(c: &mut Criterion) {
    let rules = nested_rules(DEPTH, WIDTH);
    c.bench_function("add_criteria", |b| {
        b.iter_batched(
            || {
                let mut controller = TreeController::new();
                let change = controller
                    .activate_arm("arm_a", Some(&rules))
                    .unwrap()
                    .unwrap();
                let target = change.selection.unwrap().key;
                (controller, target)
            },
            |(mut controller, target)| {
                let _ = std::hint::black_box(
                    controller.request_add_criteria(target, CriteriaKind::Genomic),
                );
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    convert_to_tree,
    convert_back,
    find_a_deep_node,
    apply_a_delete_intent,
    apply_an_add_intent
);
criterion_main!(benches);
