//! Dominator tree via Lengauer–Tarjan.
//!
//! Blocks are numbered in DFS pre-order; semi-dominators are computed in
//! reverse pre-order over a link-eval forest, immediate dominators resolve
//! through the parent buckets, and a final forward pass applies
//! `idom(w) = idom(idom(w))` for the deferred cases. All intermediate
//! state is dense arrays indexed by DFS time.

use super::dsu::LinkEval;
use super::CfgGraph;
use crate::ir::BlockId;

pub struct DomTree {
    idom: Vec<Option<BlockId>>,
    children: Vec<Vec<BlockId>>,
    reachable: Vec<bool>,
}

impl DomTree {
    /// Immediate dominator; `None` for the entry and unreachable blocks.
    pub fn idom(&self, block: BlockId) -> Option<BlockId> {
        self.idom[block.index()]
    }

    /// Immediate dominatees of `block`, in DFS-time order.
    pub fn dominatees(&self, block: BlockId) -> &[BlockId] {
        &self.children[block.index()]
    }

    pub fn is_reachable(&self, block: BlockId) -> bool {
        self.reachable[block.index()]
    }

    /// True iff every entry path to `node` passes through `dom`.
    /// Self-domination holds. The walk descends the dominatee lists with
    /// an explicit stack.
    pub fn is_dominator(&self, dom: BlockId, node: BlockId) -> bool {
        if dom == node {
            return true;
        }
        let mut stack = vec![dom];
        while let Some(cur) = stack.pop() {
            for &child in &self.children[cur.index()] {
                if child == node {
                    return true;
                }
                stack.push(child);
            }
        }
        false
    }
}

pub fn build_dom_tree<G: CfgGraph>(graph: &G) -> DomTree {
    let size = graph.num_blocks();
    let mut tree = DomTree {
        idom: vec![None; size],
        children: vec![Vec::new(); size],
        reachable: vec![false; size],
    };
    let Some(entry) = graph.entry() else {
        return tree;
    };

    // DFS pre-order numbering with tree parents, explicit stack.
    let mut vertex: Vec<BlockId> = Vec::new();
    let mut time_of = vec![usize::MAX; size];
    let mut parent: Vec<usize> = Vec::new();

    let mut stack: Vec<(BlockId, usize)> = Vec::new();
    time_of[entry.index()] = 0;
    vertex.push(entry);
    parent.push(0);
    stack.push((entry, 0));

    while let Some(&(node, pos)) = stack.last() {
        let succs = graph.succs(node);
        if pos == succs.len() {
            stack.pop();
            continue;
        }
        stack.last_mut().unwrap().1 += 1;

        let succ = succs[pos];
        if time_of[succ.index()] == usize::MAX {
            time_of[succ.index()] = vertex.len();
            parent.push(time_of[node.index()]);
            vertex.push(succ);
            stack.push((succ, 0));
        }
    }

    let count = vertex.len();
    for &block in &vertex {
        tree.reachable[block.index()] = true;
    }
    if count == 1 {
        return tree;
    }

    // Semi-dominators in reverse DFS order; ties resolve to the lower
    // DFS time through the min in the link-eval forest.
    let mut sdom: Vec<usize> = (0..count).collect();
    let mut idom: Vec<usize> = (0..count).collect();
    let mut bucket: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut forest = LinkEval::new(count);

    for w in (1..count).rev() {
        for &pred in graph.preds(vertex[w]) {
            let pt = time_of[pred.index()];
            if pt == usize::MAX {
                continue;
            }
            let u = forest.eval(pt, &sdom);
            if sdom[u] < sdom[w] {
                sdom[w] = sdom[u];
            }
        }
        bucket[sdom[w]].push(w);

        let par = parent[w];
        forest.link(par, w);
        for v in std::mem::take(&mut bucket[par]) {
            let u = forest.eval(v, &sdom);
            idom[v] = if sdom[u] < sdom[v] { u } else { par };
        }
    }

    // Deferred resolutions in forward DFS order.
    for w in 1..count {
        if idom[w] != sdom[w] {
            idom[w] = idom[idom[w]];
        }
    }

    for w in 1..count {
        let node = vertex[w];
        let dom = vertex[idom[w]];
        tree.idom[node.index()] = Some(dom);
        tree.children[dom.index()].push(node);
    }

    tree
}
