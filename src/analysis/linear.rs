//! Block linearization: reverse post-order with reducible loops kept
//! contiguous.

use super::loops::{build_loops, LoopForest};
use crate::graph::dfs;
use crate::graph::CfgGraph;
use crate::ir::BlockId;

pub fn linear_order<G: CfgGraph>(graph: &G) -> Vec<BlockId> {
    let forest = build_loops(graph);
    linear_order_with(graph, &forest)
}

/// Walks RPO; a reducible loop header pulls in its whole loop in the
/// loop's linear body order, everything else is emitted alone. The result
/// is a permutation of the reachable blocks.
pub fn linear_order_with<G: CfgGraph>(graph: &G, forest: &LoopForest) -> Vec<BlockId> {
    let rpo = dfs::rpo(graph);
    let mut visited = vec![false; graph.num_blocks()];
    let mut order = Vec::with_capacity(rpo.len());

    for &bb in &rpo {
        if visited[bb.index()] {
            continue;
        }
        if forest.is_reducible_header(bb) {
            let id = forest.loop_of(bb).unwrap();
            for b in forest.linear_body_order(id) {
                if !visited[b.index()] {
                    visited[b.index()] = true;
                    order.push(b);
                }
            }
        } else {
            visited[bb.index()] = true;
            order.push(bb);
        }
    }

    debug_assert_eq!(order.len(), rpo.len());
    order
}
