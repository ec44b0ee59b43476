//! Basic blocks.

use super::inst::InstId;
use super::list::ListHead;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

impl BlockId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Arena node of one basic block: the instruction list head plus the edge
/// lists. Successors are kept in the order the edges were linked (If links
/// the then-target first); predecessors mirror them. Duplicate edges are
/// allowed, since a conditional may name the same target twice.
#[derive(Debug, Clone)]
pub struct BasicBlock {
    pub(crate) id: BlockId,
    pub(crate) list: ListHead,
    pub(crate) preds: Vec<BlockId>,
    pub(crate) succs: Vec<BlockId>,
}

impl BasicBlock {
    pub(crate) fn new(id: BlockId) -> Self {
        Self {
            id,
            list: ListHead::new(),
            preds: Vec::new(),
            succs: Vec::new(),
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn preds(&self) -> &[BlockId] {
        &self.preds
    }

    pub fn succs(&self) -> &[BlockId] {
        &self.succs
    }

    pub fn first_inst(&self) -> Option<InstId> {
        self.list.first()
    }

    pub fn last_inst(&self) -> Option<InstId> {
        self.list.last()
    }

    pub fn num_insts(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}
