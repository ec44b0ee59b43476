//! Loop forest construction.
//!
//! A back edge (src → header) found by the DFS defines a loop at the
//! header; edges to the same header coalesce. A loop is reducible iff the
//! header dominates every back-edge source. Headers populate innermost
//! first (post-order position): the backward predecessor walk from the
//! back-edge sources binds free blocks to the loop and attaches
//! already-owned blocks' outermost loops as inners. Irreducible loops get
//! only their back-edge sources. Blocks left over after population hang
//! off a synthetic root loop, which also adopts every parentless loop.

use indexmap::IndexMap;

use crate::graph::dfs;
use crate::graph::dom::build_dom_tree;
use crate::graph::CfgGraph;
use crate::ir::BlockId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoopId(pub u32);

impl LoopId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One body element, in binding order: a directly-owned block or a nested
/// loop attached while walking through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopItem {
    Block(BlockId),
    Inner(LoopId),
}

#[derive(Debug)]
pub struct LoopInfo {
    header: Option<BlockId>,
    body: Vec<LoopItem>,
    back_edge_srcs: Vec<BlockId>,
    outer: Option<LoopId>,
    inners: Vec<LoopId>,
    reducible: bool,
    root: bool,
}

impl LoopInfo {
    fn new(header: Option<BlockId>, root: bool) -> Self {
        Self {
            header,
            body: Vec::new(),
            back_edge_srcs: Vec::new(),
            outer: None,
            inners: Vec::new(),
            reducible: true,
            root,
        }
    }

    pub fn header(&self) -> Option<BlockId> {
        self.header
    }

    pub fn body(&self) -> &[LoopItem] {
        &self.body
    }

    pub fn back_edge_srcs(&self) -> &[BlockId] {
        &self.back_edge_srcs
    }

    pub fn outer(&self) -> Option<LoopId> {
        self.outer
    }

    pub fn inners(&self) -> &[LoopId] {
        &self.inners
    }

    pub fn reducible(&self) -> bool {
        self.reducible
    }

    pub fn is_root(&self) -> bool {
        self.root
    }
}

pub struct LoopForest {
    loops: Vec<LoopInfo>,
    block_loop: Vec<Option<LoopId>>,
    root: Option<LoopId>,
}

impl LoopForest {
    pub fn info(&self, id: LoopId) -> &LoopInfo {
        &self.loops[id.index()]
    }

    /// Innermost loop containing `block`; `None` only for unreachable
    /// blocks (every reachable block belongs somewhere, if only the root).
    pub fn loop_of(&self, block: BlockId) -> Option<LoopId> {
        self.block_loop[block.index()]
    }

    pub fn root(&self) -> Option<LoopId> {
        self.root
    }

    pub fn num_loops(&self) -> usize {
        self.loops.len()
    }

    /// Whether `block` lies in `id` or any loop nested inside it.
    pub fn contains(&self, id: LoopId, block: BlockId) -> bool {
        let mut cur = self.loop_of(block);
        while let Some(l) = cur {
            if l == id {
                return true;
            }
            cur = self.loops[l.index()].outer;
        }
        false
    }

    /// True iff `block` heads the reducible loop it belongs to.
    pub fn is_reducible_header(&self, block: BlockId) -> bool {
        match self.loop_of(block) {
            Some(l) => {
                let info = self.info(l);
                info.header() == Some(block) && info.reducible() && !info.is_root()
            }
            None => false,
        }
    }

    /// Linear order of a loop: the header first, then the body items in
    /// reverse binding order, inner loops expanded in place.
    pub fn linear_body_order(&self, id: LoopId) -> Vec<BlockId> {
        let mut out = Vec::new();
        let mut stack: Vec<(LoopId, usize)> = Vec::new();
        if let Some(h) = self.loops[id.index()].header {
            out.push(h);
        }
        stack.push((id, 0));
        while let Some(&(l, pos)) = stack.last() {
            let body = &self.loops[l.index()].body;
            if pos == body.len() {
                stack.pop();
                continue;
            }
            stack.last_mut().unwrap().1 += 1;
            match body[body.len() - 1 - pos] {
                LoopItem::Block(b) => out.push(b),
                LoopItem::Inner(inner) => {
                    if let Some(h) = self.loops[inner.index()].header {
                        out.push(h);
                    }
                    stack.push((inner, 0));
                }
            }
        }
        out
    }

    fn outermost(&self, id: LoopId) -> LoopId {
        let mut cur = id;
        while let Some(o) = self.loops[cur.index()].outer {
            cur = o;
        }
        cur
    }
}

pub fn build_loops<G: CfgGraph>(graph: &G) -> LoopForest {
    let mut forest = LoopForest {
        loops: Vec::new(),
        block_loop: vec![None; graph.num_blocks()],
        root: None,
    };

    let mut back_edges: Vec<(BlockId, BlockId)> = Vec::new();
    let reachable = dfs::pre_order_with_back_edges(graph, |src, tgt| back_edges.push((src, tgt)));
    let dom = build_dom_tree(graph);

    // Coalesce back edges by header.
    let mut headers: IndexMap<BlockId, LoopId> = IndexMap::new();
    for &(src, tgt) in &back_edges {
        let id = *headers.entry(tgt).or_insert_with(|| {
            let id = LoopId(forest.loops.len() as u32);
            forest.loops.push(LoopInfo::new(Some(tgt), false));
            id
        });
        let info = &mut forest.loops[id.index()];
        info.back_edge_srcs.push(src);
        info.reducible &= dom.is_dominator(tgt, src);
    }

    // Populate innermost first.
    for &bb in &dfs::post_order(graph) {
        if let Some(&id) = headers.get(&bb) {
            populate(graph, &mut forest, id);
        }
    }

    // Free blocks and parentless loops belong to the root loop.
    let free: Vec<BlockId> = reachable
        .iter()
        .copied()
        .filter(|b| forest.block_loop[b.index()].is_none())
        .collect();
    if !free.is_empty() {
        let root = LoopId(forest.loops.len() as u32);
        forest.loops.push(LoopInfo::new(None, true));
        for b in free {
            forest.block_loop[b.index()] = Some(root);
            forest.loops[root.index()].body.push(LoopItem::Block(b));
        }
        for i in 0..root.index() {
            if forest.loops[i].outer.is_none() {
                forest.loops[i].outer = Some(root);
                forest.loops[root.index()].inners.push(LoopId(i as u32));
            }
        }
        forest.root = Some(root);
    }

    forest
}

fn populate<G: CfgGraph>(graph: &G, forest: &mut LoopForest, id: LoopId) {
    let header = forest.loops[id.index()].header.unwrap();
    forest.block_loop[header.index()] = Some(id);

    if !forest.loops[id.index()].reducible {
        // No predecessor closure: the sources alone form the body.
        let srcs = forest.loops[id.index()].back_edge_srcs.clone();
        for src in srcs {
            if forest.block_loop[src.index()].is_none() {
                forest.block_loop[src.index()] = Some(id);
                forest.loops[id.index()].body.push(LoopItem::Block(src));
            }
        }
        return;
    }

    let mut visited = vec![false; graph.num_blocks()];
    let mut stack: Vec<BlockId> = forest.loops[id.index()].back_edge_srcs.clone();
    while let Some(node) = stack.pop() {
        if node == header || visited[node.index()] {
            continue;
        }
        visited[node.index()] = true;

        match forest.block_loop[node.index()] {
            None => {
                forest.block_loop[node.index()] = Some(id);
                forest.loops[id.index()].body.push(LoopItem::Block(node));
            }
            Some(owner) => {
                let top = forest.outermost(owner);
                if top != id {
                    forest.loops[top.index()].outer = Some(id);
                    forest.loops[id.index()].inners.push(top);
                    forest.loops[id.index()].body.push(LoopItem::Inner(top));
                }
            }
        }

        stack.extend(graph.preds(node).iter().copied());
    }
}
