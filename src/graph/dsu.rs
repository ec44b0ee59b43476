//! Link-eval forest for the dominator computation.
//!
//! Nodes are DFS times; `eval` returns, along the uplink path of a linked
//! node, the time with the minimum semi-dominator, excluding the unlinked
//! root itself. Path compression is iterative.

pub struct LinkEval {
    ancestor: Vec<Option<usize>>,
    label: Vec<usize>,
}

impl LinkEval {
    pub fn new(size: usize) -> Self {
        Self {
            ancestor: vec![None; size],
            label: (0..size).collect(),
        }
    }

    /// Hangs `node` under `parent` in the forest.
    pub fn link(&mut self, parent: usize, node: usize) {
        self.ancestor[node] = Some(parent);
    }

    /// Minimum-semi node on the path from `node` to its forest root.
    /// Unlinked nodes evaluate to themselves.
    pub fn eval(&mut self, node: usize, sdom: &[usize]) -> usize {
        if self.ancestor[node].is_none() {
            return node;
        }

        // Path from node up to the last node below the root.
        let mut path = vec![node];
        let mut cur = node;
        while let Some(above) = self.ancestor[cur] {
            if self.ancestor[above].is_none() {
                break;
            }
            path.push(above);
            cur = above;
        }
        let root = self.ancestor[*path.last().unwrap()].unwrap();

        // Compress root-side first so each node folds in a final label.
        for &n in path.iter().rev() {
            let above = self.ancestor[n].unwrap();
            if above != root && sdom[self.label[above]] < sdom[self.label[n]] {
                self.label[n] = self.label[above];
            }
            self.ancestor[n] = Some(root);
        }

        self.label[node]
    }
}
