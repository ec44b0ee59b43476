use crate::fixtures::{example1, example2, graph_fn};
use crate::graph::dfs;
use crate::ir::{BlockId, Function, Type};

fn ids(order: &[BlockId]) -> Vec<u32> {
    order.iter().map(|b| b.0).collect()
}

#[test]
fn empty_function_yields_empty_orders() {
    let f = Function::new(Type::None, vec![]);
    assert!(dfs::pre_order(&f).is_empty());
    assert!(dfs::post_order(&f).is_empty());
    assert!(dfs::rpo(&f).is_empty());
}

#[test]
fn linear_chain() {
    let (f, bbs) = graph_fn(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]);
    assert_eq!(dfs::pre_order(&f), bbs);
    assert_eq!(dfs::rpo(&f), bbs);
}

#[test]
fn tree_pre_order() {
    let (f, _) = graph_fn(6, &[(0, 1), (0, 2), (1, 3), (1, 4), (2, 5)]);
    assert_eq!(ids(&dfs::pre_order(&f)), vec![0, 1, 3, 4, 2, 5]);
}

#[test]
fn bigger_tree_pre_order() {
    let (f, _) = graph_fn(
        10,
        &[
            (0, 1),
            (0, 2),
            (1, 3),
            (1, 4),
            (3, 7),
            (3, 8),
            (4, 9),
            (2, 5),
            (2, 6),
        ],
    );
    assert_eq!(ids(&dfs::pre_order(&f)), vec![0, 1, 3, 7, 8, 4, 9, 2, 5, 6]);
}

#[test]
fn duplicate_edges_visit_once() {
    let (f, _) = graph_fn(
        10,
        &[
            (0, 1),
            (0, 2),
            (0, 4),
            (1, 3),
            (1, 4),
            (3, 7),
            (3, 7),
            (3, 8),
            (4, 9),
            (5, 9),
            (2, 5),
            (2, 6),
        ],
    );
    assert_eq!(ids(&dfs::pre_order(&f)), vec![0, 1, 3, 7, 8, 4, 9, 2, 5, 6]);
}

#[test]
fn cycle_does_not_revisit() {
    let (f, _) = graph_fn(
        6,
        &[(0, 1), (0, 2), (1, 3), (1, 4), (2, 5), (4, 2), (5, 4)],
    );
    assert_eq!(ids(&dfs::pre_order(&f)), vec![0, 1, 3, 4, 2, 5]);
}

#[test]
fn example1_orders() {
    let (f, _) = example1();
    assert_eq!(ids(&dfs::pre_order(&f)), vec![0, 1, 2, 3, 5, 4, 6]);
    assert_eq!(ids(&dfs::post_order(&f)), vec![3, 6, 4, 5, 2, 1, 0]);
    assert_eq!(ids(&dfs::rpo(&f)), vec![0, 1, 2, 5, 4, 6, 3]);
}

#[test]
fn example2_pre_order() {
    let (f, _) = example2();
    assert_eq!(
        ids(&dfs::pre_order(&f)),
        vec![0, 1, 9, 2, 3, 4, 5, 6, 7, 8, 10]
    );
}

#[test]
fn back_edges_in_simple_loop() {
    let (f, bbs) = graph_fn(2, &[(0, 1), (1, 0)]);
    let mut edges = Vec::new();
    dfs::pre_order_with_back_edges(&f, |src, tgt| edges.push((src, tgt)));
    assert_eq!(edges, vec![(bbs[1], bbs[0])]);
}

#[test]
fn back_edges_example2() {
    let (f, bbs) = example2();
    let mut edges = Vec::new();
    dfs::pre_order_with_back_edges(&f, |src, tgt| edges.push((src, tgt)));
    assert_eq!(
        edges,
        vec![(bbs[3], bbs[2]), (bbs[5], bbs[4]), (bbs[7], bbs[1])]
    );
}

#[test]
fn forward_edges_are_not_back_edges() {
    let (f, _) = example1();
    let mut edges = Vec::new();
    dfs::pre_order_with_back_edges(&f, |src, tgt| edges.push((src, tgt)));
    assert!(edges.is_empty());
}
