//! Functions: instruction/block arenas, the build API, and the edit
//! primitives the optimization passes are written against.
//!
//! Handles index into arenas that never shrink; erasing an instruction
//! detaches it (`block == None`) and leaves the slot behind. Holding a
//! handle to an erased instruction is a programmer bug.

use super::block::{BasicBlock, BlockId};
use super::inst::{BinOpKind, FuncId, Inst, InstId, InstKind, UnaryOpKind};
use super::list;
use super::types::Type;

#[derive(Debug, Clone)]
pub struct Function {
    ret_ty: Type,
    param_tys: Vec<Type>,
    insts: Vec<Inst>,
    blocks: Vec<BasicBlock>,
    order: Vec<BlockId>,
}

impl Function {
    pub fn new(ret_ty: Type, param_tys: Vec<Type>) -> Self {
        Self {
            ret_ty,
            param_tys,
            insts: Vec::new(),
            blocks: Vec::new(),
            order: Vec::new(),
        }
    }

    pub fn ret_ty(&self) -> Type {
        self.ret_ty
    }

    pub fn param_tys(&self) -> &[Type] {
        &self.param_tys
    }

    /// First block in layout order; the function entry.
    pub fn entry(&self) -> Option<BlockId> {
        self.order.first().copied()
    }

    /// Blocks in layout order.
    pub fn block_order(&self) -> &[BlockId] {
        &self.order
    }

    /// Arena capacity for dense per-block maps (includes erased blocks).
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Arena capacity for dense per-instruction maps (includes erased ones).
    pub fn num_insts(&self) -> usize {
        self.insts.len()
    }

    pub fn inst(&self, id: InstId) -> &Inst {
        self.insts
            .get(id.index())
            .unwrap_or_else(|| panic!("invalid instruction handle {:?}", id))
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        self.blocks
            .get(id.index())
            .unwrap_or_else(|| panic!("invalid block handle {:?}", id))
    }

    pub fn is_attached(&self, id: InstId) -> bool {
        self.inst(id).block.is_some()
    }

    pub fn next_inst(&self, id: InstId) -> Option<InstId> {
        self.inst(id).next
    }

    pub fn prev_inst(&self, id: InstId) -> Option<InstId> {
        self.inst(id).prev
    }

    /// Bidirectional iterator over a block's instructions.
    pub fn block_insts(&self, bb: BlockId) -> InstIter<'_> {
        let block = self.block(bb);
        InstIter {
            func: self,
            front: block.first_inst(),
            back: block.last_inst(),
            done: block.is_empty(),
        }
    }

    /// Phis of a block, in list order.
    pub fn block_phis(&self, bb: BlockId) -> Vec<InstId> {
        self.block_insts(bb).filter(|&i| self.inst(i).is_phi()).collect()
    }

    pub fn append_block(&mut self) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(BasicBlock::new(id));
        self.order.push(id);
        id
    }

    // ---- build API -------------------------------------------------------

    pub fn push_const(&mut self, bb: BlockId, ty: Type, value: i64) -> InstId {
        self.push(bb, InstKind::Const(ty.normalize(value)), ty, vec![])
    }

    pub fn push_binop(&mut self, bb: BlockId, op: BinOpKind, lhs: InstId, rhs: InstId) -> InstId {
        let lty = self.inst(lhs).ty;
        let rty = self.inst(rhs).ty;
        assert!(
            lty == rty,
            "binop {} operand types differ: {} vs {}",
            op,
            lty,
            rty
        );
        let ty = if op.is_comparison() { Type::I1 } else { lty };
        self.push(bb, InstKind::BinOp(op), ty, vec![lhs, rhs])
    }

    pub fn push_unop(&mut self, bb: BlockId, op: UnaryOpKind, value: InstId) -> InstId {
        let ty = self.inst(value).ty;
        self.push(bb, InstKind::UnaryOp(op), ty, vec![value])
    }

    pub fn push_cast(&mut self, bb: BlockId, dst_ty: Type, src: InstId) -> InstId {
        self.push(bb, InstKind::Cast, dst_ty, vec![src])
    }

    pub fn push_if(&mut self, bb: BlockId, cond: InstId, then_bb: BlockId, else_bb: BlockId) -> InstId {
        let id = self.push(bb, InstKind::If { then_bb, else_bb }, Type::None, vec![cond]);
        self.add_edge(bb, then_bb);
        self.add_edge(bb, else_bb);
        id
    }

    pub fn push_jump(&mut self, bb: BlockId, target: BlockId) -> InstId {
        let id = self.push(bb, InstKind::Jump { target }, Type::None, vec![]);
        self.add_edge(bb, target);
        id
    }

    pub fn push_ret(&mut self, bb: BlockId, value: Option<InstId>) -> InstId {
        let inputs = value.into_iter().collect();
        self.push(bb, InstKind::Ret, Type::None, inputs)
    }

    /// Appends an empty phi; entries are added with [`Function::phi_add_entry`].
    pub fn push_phi(&mut self, bb: BlockId, ty: Type) -> InstId {
        self.push(bb, InstKind::Phi { blocks: Vec::new() }, ty, vec![])
    }

    /// Inserts an empty phi at the head of `bb`.
    pub fn push_phi_front(&mut self, bb: BlockId, ty: Type) -> InstId {
        let id = self.new_detached(InstKind::Phi { blocks: Vec::new() }, ty, vec![]);
        self.attach_front(bb, id);
        id
    }

    /// Adds one (value, predecessor) entry to a phi.
    pub fn phi_add_entry(&mut self, phi: InstId, value: InstId, block: BlockId) {
        let ty = self.inst(phi).ty;
        let vty = self.inst(value).ty;
        assert!(
            ty == vty,
            "phi {:?} of type {} given an entry of type {}",
            phi,
            ty,
            vty
        );
        match &mut self.insts[phi.index()].kind {
            InstKind::Phi { blocks } => blocks.push(block),
            other => panic!("phi_add_entry on non-phi {:?}", other),
        }
        self.insts[phi.index()].inputs.push(value);
        self.insts[value.index()].users.insert(phi);
    }

    pub fn push_param(&mut self, bb: BlockId, index: u32, ty: Type) -> InstId {
        self.push(bb, InstKind::Param { index }, ty, vec![])
    }

    pub fn push_call(&mut self, bb: BlockId, callee: FuncId, ty: Type, args: Vec<InstId>) -> InstId {
        self.push(bb, InstKind::Call { callee }, ty, args)
    }

    /// Creates an instruction outside any block. Use-def edges for `inputs`
    /// are registered; the node is placed later via [`Function::replace`],
    /// [`Function::insert_before`] or [`Function::insert_after`].
    pub fn new_detached(&mut self, kind: InstKind, ty: Type, inputs: Vec<InstId>) -> InstId {
        let id = InstId(self.insts.len() as u32);
        let mut inst = Inst::new(kind, ty);
        inst.inputs = inputs;
        self.insts.push(inst);
        for i in 0..self.insts[id.index()].inputs.len() {
            let input = self.insts[id.index()].inputs[i];
            self.insts[input.index()].users.insert(id);
        }
        id
    }

    fn push(&mut self, bb: BlockId, kind: InstKind, ty: Type, inputs: Vec<InstId>) -> InstId {
        if let Some(last) = self.block(bb).last_inst() {
            assert!(
                !self.inst(last).is_terminator(),
                "pushing {:?} after terminator in bb{}",
                kind,
                bb.0
            );
        }
        let id = self.new_detached(kind, ty, inputs);
        self.insts[id.index()].block = Some(bb);
        let mut head = std::mem::take(&mut self.blocks[bb.index()].list);
        list::push_back(&mut self.insts, &mut head, id);
        self.blocks[bb.index()].list = head;
        id
    }

    fn attach_front(&mut self, bb: BlockId, id: InstId) {
        self.insts[id.index()].block = Some(bb);
        let mut head = std::mem::take(&mut self.blocks[bb.index()].list);
        list::push_front(&mut self.insts, &mut head, id);
        self.blocks[bb.index()].list = head;
    }

    /// Inserts detached `id` before `pos` in `pos`'s block.
    pub fn insert_before(&mut self, pos: InstId, id: InstId) {
        let bb = self
            .inst(pos)
            .block
            .unwrap_or_else(|| panic!("insert_before detached position {:?}", pos));
        assert!(self.inst(id).block.is_none(), "inserting attached {:?}", id);
        self.insts[id.index()].block = Some(bb);
        let mut head = std::mem::take(&mut self.blocks[bb.index()].list);
        list::insert_before(&mut self.insts, &mut head, pos, id);
        self.blocks[bb.index()].list = head;
    }

    /// Inserts detached `id` after `pos` in `pos`'s block.
    pub fn insert_after(&mut self, pos: InstId, id: InstId) {
        let bb = self
            .inst(pos)
            .block
            .unwrap_or_else(|| panic!("insert_after detached position {:?}", pos));
        assert!(self.inst(id).block.is_none(), "inserting attached {:?}", id);
        self.insts[id.index()].block = Some(bb);
        let mut head = std::mem::take(&mut self.blocks[bb.index()].list);
        list::insert_after(&mut self.insts, &mut head, pos, id);
        self.blocks[bb.index()].list = head;
    }

    // ---- edit API --------------------------------------------------------

    /// Raw CFG edge insertion. Terminator pushes link edges themselves; this
    /// exists for graph-only construction and unusual front-ends.
    pub fn link_succ(&mut self, pred: BlockId, succ: BlockId) {
        self.add_edge(pred, succ);
    }

    fn add_edge(&mut self, pred: BlockId, succ: BlockId) {
        self.blocks[pred.index()].succs.push(succ);
        self.blocks[succ.index()].preds.push(pred);
    }

    fn remove_edge(&mut self, pred: BlockId, succ: BlockId) {
        let succs = &mut self.blocks[pred.index()].succs;
        if let Some(pos) = succs.iter().position(|&b| b == succ) {
            succs.remove(pos);
        }
        let preds = &mut self.blocks[succ.index()].preds;
        if let Some(pos) = preds.iter().position(|&b| b == pred) {
            preds.remove(pos);
        }
    }

    /// Swaps two operand positions; user sets are untouched.
    pub fn swap_inputs(&mut self, inst: InstId, i: usize, j: usize) {
        self.insts[inst.index()].inputs.swap(i, j);
    }

    /// Rewrites one operand slot, maintaining use-def on both sides.
    pub fn set_input(&mut self, inst: InstId, idx: usize, value: InstId) {
        let old = self.insts[inst.index()].inputs[idx];
        if old == value {
            return;
        }
        self.insts[inst.index()].inputs[idx] = value;
        if !self.insts[inst.index()].inputs.contains(&old) {
            self.insts[old.index()].users.shift_remove(&inst);
        }
        self.insts[value.index()].users.insert(inst);
    }

    /// Drops every input edge of `inst`.
    pub fn clear_inputs(&mut self, inst: InstId) {
        let inputs = std::mem::take(&mut self.insts[inst.index()].inputs);
        for input in inputs {
            self.insts[input.index()].users.shift_remove(&inst);
        }
        if let InstKind::Phi { blocks } = &mut self.insts[inst.index()].kind {
            blocks.clear();
        }
    }

    /// Rewrites every user of `from` to consume `to` instead.
    pub fn migrate_users(&mut self, from: InstId, to: InstId) {
        if from == to {
            return;
        }
        let users: Vec<InstId> = self.insts[from.index()].users.iter().copied().collect();
        for user in users {
            for slot in self.insts[user.index()].inputs.iter_mut() {
                if *slot == from {
                    *slot = to;
                }
            }
            self.insts[to.index()].users.insert(user);
        }
        self.insts[from.index()].users.clear();
    }

    /// Splices detached `new` into `old`'s position, migrates `old`'s users
    /// to `new`, and erases `old`.
    pub fn replace(&mut self, old: InstId, new: InstId) {
        assert!(self.inst(new).block.is_none(), "replacement {:?} already placed", new);
        self.insert_before(old, new);
        self.migrate_users(old, new);
        self.erase(old);
    }

    /// The only removal primitive: drops all input edges, unlinks the
    /// instruction from its block (and its CFG edges, for terminators).
    /// Erasing an instruction that still has users is a bug.
    pub fn erase(&mut self, inst: InstId) {
        assert!(
            self.inst(inst).users.is_empty(),
            "erasing {:?} while it still has users",
            inst
        );
        self.clear_inputs(inst);
        let bb = self.insts[inst.index()].block.take();
        if let Some(bb) = bb {
            for target in self.inst(inst).branch_targets() {
                self.remove_edge(bb, target);
            }
            let mut head = std::mem::take(&mut self.blocks[bb.index()].list);
            list::unlink(&mut self.insts, &mut head, inst);
            self.blocks[bb.index()].list = head;
        }
    }

    /// Splits the block after `inst`: the instruction suffix, the block's
    /// successor edges, and the phi entries naming it in those successors
    /// all move to a fresh block, which is returned.
    pub fn split_after(&mut self, inst: InstId) -> BlockId {
        let bb = self
            .inst(inst)
            .block
            .unwrap_or_else(|| panic!("splitting at detached {:?}", inst));
        let new_bb = self.append_block();

        let succs = std::mem::take(&mut self.blocks[bb.index()].succs);
        for &succ in &succs {
            let preds = &mut self.blocks[succ.index()].preds;
            if let Some(pos) = preds.iter().position(|&b| b == bb) {
                preds[pos] = new_bb;
            }
            self.retarget_phi_entries(succ, bb, new_bb);
        }
        self.blocks[new_bb.index()].succs = succs;

        if let Some(first) = self.inst(inst).next {
            let last = self.blocks[bb.index()].list.last().unwrap();
            let mut src = std::mem::take(&mut self.blocks[bb.index()].list);
            let mut dst = std::mem::take(&mut self.blocks[new_bb.index()].list);
            list::splice_range(&mut self.insts, &mut src, &mut dst, first, last, new_bb);
            self.blocks[bb.index()].list = src;
            self.blocks[new_bb.index()].list = dst;
        }
        new_bb
    }

    /// Moves all instructions of `src` to the end of `dst` and transfers
    /// `src`'s successor edges (retargeting phi entries in the successors).
    /// `src` is left empty and edge-free.
    pub fn splice_append(&mut self, dst: BlockId, src: BlockId) {
        if let Some(last) = self.block(dst).last_inst() {
            assert!(
                !self.inst(last).is_terminator(),
                "splicing into bb{} past its terminator",
                dst.0
            );
        }
        let succs = std::mem::take(&mut self.blocks[src.index()].succs);
        for &succ in &succs {
            let preds = &mut self.blocks[succ.index()].preds;
            if let Some(pos) = preds.iter().position(|&b| b == src) {
                preds[pos] = dst;
            }
            self.retarget_phi_entries(succ, src, dst);
        }
        self.blocks[dst.index()].succs.extend(succs);

        if !self.block(src).is_empty() {
            let first = self.block(src).first_inst().unwrap();
            let last = self.block(src).last_inst().unwrap();
            let mut src_list = std::mem::take(&mut self.blocks[src.index()].list);
            let mut dst_list = std::mem::take(&mut self.blocks[dst.index()].list);
            list::splice_range(&mut self.insts, &mut src_list, &mut dst_list, first, last, dst);
            self.blocks[src.index()].list = src_list;
            self.blocks[dst.index()].list = dst_list;
        }
    }

    fn retarget_phi_entries(&mut self, bb: BlockId, from: BlockId, to: BlockId) {
        let phis = self.block_phis(bb);
        for phi in phis {
            if let InstKind::Phi { blocks } = &mut self.insts[phi.index()].kind {
                for b in blocks.iter_mut() {
                    if *b == from {
                        *b = to;
                    }
                }
            }
        }
    }

    /// Removes an empty, edge-free block from the layout order.
    pub fn remove_block(&mut self, bb: BlockId) {
        assert!(self.block(bb).is_empty(), "removing non-empty bb{}", bb.0);
        assert!(
            self.block(bb).preds.is_empty() && self.block(bb).succs.is_empty(),
            "removing bb{} with live edges",
            bb.0
        );
        self.order.retain(|&b| b != bb);
    }

    /// Repositions blocks in the layout order so they precede `pos`.
    pub fn move_blocks_before(&mut self, pos: BlockId, blocks: &[BlockId]) {
        self.order.retain(|b| !blocks.contains(b));
        let at = self
            .order
            .iter()
            .position(|&b| b == pos)
            .unwrap_or_else(|| panic!("bb{} not in layout order", pos.0));
        for (i, &b) in blocks.iter().enumerate() {
            self.order.insert(at + i, b);
        }
    }

    /// Merges another function's arenas into this one, offsetting every
    /// embedded handle. Returns the handle maps (indexed by the old ids).
    /// The absorbed blocks are appended to the layout order.
    pub fn absorb(&mut self, other: Function) -> (Vec<BlockId>, Vec<InstId>) {
        let ioff = self.insts.len() as u32;
        let boff = self.blocks.len() as u32;
        let imap: Vec<InstId> = (0..other.insts.len() as u32).map(|i| InstId(i + ioff)).collect();
        let bmap: Vec<BlockId> = (0..other.blocks.len() as u32)
            .map(|b| BlockId(b + boff))
            .collect();

        let mi = |id: InstId| InstId(id.0 + ioff);
        let mb = |id: BlockId| BlockId(id.0 + boff);

        for mut inst in other.insts {
            inst.block = inst.block.map(mb);
            inst.prev = inst.prev.map(mi);
            inst.next = inst.next.map(mi);
            for slot in inst.inputs.iter_mut() {
                *slot = mi(*slot);
            }
            inst.users = inst.users.iter().map(|&u| mi(u)).collect();
            match &mut inst.kind {
                InstKind::If { then_bb, else_bb } => {
                    *then_bb = mb(*then_bb);
                    *else_bb = mb(*else_bb);
                }
                InstKind::Jump { target } => *target = mb(*target),
                InstKind::Phi { blocks } => {
                    for b in blocks.iter_mut() {
                        *b = mb(*b);
                    }
                }
                _ => {}
            }
            self.insts.push(inst);
        }

        for mut block in other.blocks {
            block.id = mb(block.id);
            block.list.first = block.list.first.map(mi);
            block.list.last = block.list.last.map(mi);
            for b in block.preds.iter_mut() {
                *b = mb(*b);
            }
            for b in block.succs.iter_mut() {
                *b = mb(*b);
            }
            self.blocks.push(block);
        }

        self.order.extend(other.order.into_iter().map(mb));
        (bmap, imap)
    }
}

/// Bidirectional cursor over a block's instruction list.
pub struct InstIter<'a> {
    func: &'a Function,
    front: Option<InstId>,
    back: Option<InstId>,
    done: bool,
}

impl Iterator for InstIter<'_> {
    type Item = InstId;

    fn next(&mut self) -> Option<InstId> {
        if self.done {
            return None;
        }
        let cur = self.front?;
        if self.front == self.back {
            self.done = true;
        } else {
            self.front = self.func.inst(cur).next;
        }
        Some(cur)
    }
}

impl DoubleEndedIterator for InstIter<'_> {
    fn next_back(&mut self) -> Option<InstId> {
        if self.done {
            return None;
        }
        let cur = self.back?;
        if self.front == self.back {
            self.done = true;
        } else {
            self.back = self.func.inst(cur).prev;
        }
        Some(cur)
    }
}

/// A flat collection of functions; `Call` instructions name their callee by
/// [`FuncId`].
#[derive(Debug, Default)]
pub struct Module {
    funcs: Vec<Function>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_function(&mut self, func: Function) -> FuncId {
        let id = FuncId(self.funcs.len() as u32);
        self.funcs.push(func);
        id
    }

    pub fn func(&self, id: FuncId) -> &Function {
        self.funcs
            .get(id.index())
            .unwrap_or_else(|| panic!("invalid function handle {:?}", id))
    }

    pub fn func_mut(&mut self, id: FuncId) -> &mut Function {
        self.funcs
            .get_mut(id.index())
            .unwrap_or_else(|| panic!("invalid function handle {:?}", id))
    }

    pub fn num_funcs(&self) -> usize {
        self.funcs.len()
    }
}
