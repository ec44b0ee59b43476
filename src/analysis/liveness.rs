//! Liveness: linear/live numbering and per-value live ranges.
//!
//! Numbering walks blocks in linear order. Linear numbers advance by one
//! per instruction; live numbers advance by two per non-phi instruction,
//! and every phi of a block shares the block-entry live number (phis are
//! conceptually executed on the incoming edges). A block's interval runs
//! from its entry number to one step past its terminator.
//!
//! Ranges are built walking blocks in reverse linear order. The initial
//! live set of a block unions the live-ins of the successors processed so
//! far; a back-edge successor has none yet and contributes nothing, and
//! the loop widening at its header is what stretches loop-carried values
//! over the whole loop. Phi inputs join the set through the
//! per-predecessor correction.

use std::collections::HashSet;

use super::linear::linear_order_with;
use super::loops::build_loops;
use crate::ir::{BlockId, Function, InstId};

pub const LIVE_STEP: usize = 2;

/// Closed numeric range with `start <= end`; empty when they coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveInterval {
    pub start: usize,
    pub end: usize,
}

impl LiveInterval {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Widens to the union hull of the two intervals.
    pub fn update(&mut self, other: LiveInterval) {
        self.start = self.start.min(other.start);
        self.end = self.end.max(other.end);
    }
}

pub struct Liveness {
    order: Vec<BlockId>,
    linear_num: Vec<Option<u32>>,
    live_num: Vec<Option<usize>>,
    intervals: Vec<Option<LiveInterval>>,
    block_intervals: Vec<Option<LiveInterval>>,
}

impl Liveness {
    pub fn linear_order(&self) -> &[BlockId] {
        &self.order
    }

    pub fn linear_num(&self, inst: InstId) -> Option<u32> {
        self.linear_num[inst.index()]
    }

    pub fn live_num(&self, inst: InstId) -> Option<usize> {
        self.live_num[inst.index()]
    }

    /// Live range of the instruction's value; empty for non-producers,
    /// `None` for unreachable instructions.
    pub fn interval(&self, inst: InstId) -> Option<LiveInterval> {
        self.intervals[inst.index()]
    }

    pub fn block_interval(&self, block: BlockId) -> Option<LiveInterval> {
        self.block_intervals[block.index()]
    }
}

pub fn liveness(func: &Function) -> Liveness {
    let forest = build_loops(func);
    let order = linear_order_with(func, &forest);

    let mut lv = Liveness {
        order,
        linear_num: vec![None; func.num_insts()],
        live_num: vec![None; func.num_insts()],
        intervals: vec![None; func.num_insts()],
        block_intervals: vec![None; func.num_blocks()],
    };

    let mut linear = 0u32;
    let mut live = 0usize;
    for i in 0..lv.order.len() {
        let bb = lv.order[i];
        let start = live;
        for inst in func.block_insts(bb) {
            lv.linear_num[inst.index()] = Some(linear);
            linear += 1;
            let num = if func.inst(inst).is_phi() {
                start
            } else {
                live += LIVE_STEP;
                live
            };
            lv.live_num[inst.index()] = Some(num);
            lv.intervals[inst.index()] = Some(LiveInterval::new(num, num));
        }
        live += LIVE_STEP;
        lv.block_intervals[bb.index()] = Some(LiveInterval::new(start, live));
    }

    let mut live_in: Vec<Option<HashSet<InstId>>> = vec![None; func.num_blocks()];
    for i in (0..lv.order.len()).rev() {
        let bb = lv.order[i];
        let mut set: HashSet<InstId> = HashSet::new();
        for &succ in func.block(bb).succs() {
            let Some(succ_in) = &live_in[succ.index()] else {
                continue;
            };
            set.extend(succ_in.iter().copied());
            for phi in func.block_phis(succ) {
                for (value, pred) in func.inst(phi).phi_entries() {
                    if pred == bb {
                        set.insert(value);
                    }
                }
            }
        }

        let bival = lv.block_intervals[bb.index()].unwrap();
        for &v in &set {
            lv.intervals[v.index()].as_mut().unwrap().update(bival);
        }

        for inst in func.block_insts(bb).rev() {
            if func.inst(inst).is_phi() {
                continue;
            }
            let num = lv.live_num[inst.index()].unwrap();
            if func.inst(inst).produces_value() {
                let iv = lv.intervals[inst.index()].as_mut().unwrap();
                iv.start = num;
                iv.end = iv.end.max(num + LIVE_STEP);
                set.remove(&inst);
            }
            for &input in func.inst(inst).inputs() {
                set.insert(input);
                lv.intervals[input.index()]
                    .as_mut()
                    .unwrap()
                    .update(LiveInterval::new(bival.start, num));
            }
        }

        for phi in func.block_phis(bb) {
            set.remove(&phi);
        }

        if forest.is_reducible_header(bb) {
            // Everything still live at the header survives the whole loop.
            let id = forest.loop_of(bb).unwrap();
            let end = forest
                .linear_body_order(id)
                .iter()
                .map(|b| lv.block_intervals[b.index()].unwrap().end)
                .max()
                .unwrap_or(bival.end);
            let span = LiveInterval::new(bival.start, end);
            for &v in &set {
                lv.intervals[v.index()].as_mut().unwrap().update(span);
            }
        }

        assert!(
            live_in[bb.index()].is_none(),
            "live-in of bb{} computed twice",
            bb.0
        );
        live_in[bb.index()] = Some(set);
    }

    lv
}
