//! IR invariant checking.
//!
//! `verify` covers the structural invariants every pass must preserve;
//! `verify_ssa` additionally checks that each use is dominated by its
//! definition. Blocks that carry CFG edges but no instructions (graph
//! skeletons under construction) pass `verify`; the terminator/successor
//! agreement check only applies once a block ends in a terminator.

use thiserror::Error;

use crate::graph::dfs;
use crate::graph::dom::build_dom_tree;

use super::block::BlockId;
use super::function::Function;
use super::inst::InstId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("edge {pred:?} -> {succ:?} is not symmetric")]
    EdgeAsymmetry { pred: BlockId, succ: BlockId },

    #[error("terminator {inst:?} is not the last instruction of {block:?}")]
    TerminatorNotLast { inst: InstId, block: BlockId },

    #[error("successor list of {block:?} disagrees with its terminator")]
    SuccessorMismatch { block: BlockId },

    #[error("phi {phi:?} has {entries} entries but its block has {preds} predecessors")]
    PhiArity { phi: InstId, entries: usize, preds: usize },

    #[error("phi {phi:?} entry blocks do not match the predecessor set")]
    PhiEntryBlocks { phi: InstId },

    #[error("use-def edge between {user:?} and {value:?} is one-sided")]
    BrokenUseDef { user: InstId, value: InstId },

    #[error("{user:?} consumes erased value {value:?}")]
    ErasedValue { user: InstId, value: InstId },

    #[error("{block:?} is not reachable from the entry block")]
    OrphanBlock { block: BlockId },

    #[error("use of {value:?} in {user:?} is not dominated by its definition")]
    UseNotDominated { user: InstId, value: InstId },
}

fn count(list: &[BlockId], needle: BlockId) -> usize {
    list.iter().filter(|&&b| b == needle).count()
}

/// Checks edge symmetry, terminator placement, successor agreement, phi
/// shape, use-def consistency and block reachability.
pub fn verify(func: &Function) -> Result<(), VerifyError> {
    for &bb in func.block_order() {
        let block = func.block(bb);

        for &succ in block.succs() {
            if count(block.succs(), succ) != count(func.block(succ).preds(), bb) {
                return Err(VerifyError::EdgeAsymmetry { pred: bb, succ });
            }
        }
        for &pred in block.preds() {
            if count(block.preds(), pred) != count(func.block(pred).succs(), bb) {
                return Err(VerifyError::EdgeAsymmetry { pred, succ: bb });
            }
        }

        let last = block.last_inst();
        for inst in func.block_insts(bb) {
            if func.inst(inst).is_terminator() && Some(inst) != last {
                return Err(VerifyError::TerminatorNotLast { inst, block: bb });
            }
        }

        if let Some(last) = last {
            if func.inst(last).is_terminator() {
                let mut targets = func.inst(last).branch_targets();
                let mut succs = block.succs().to_vec();
                targets.sort();
                succs.sort();
                if targets != succs {
                    return Err(VerifyError::SuccessorMismatch { block: bb });
                }
            }
        }

        for phi in func.block_phis(bb) {
            let entries = func.inst(phi).inputs().len();
            let preds = block.preds().len();
            if entries != preds {
                return Err(VerifyError::PhiArity { phi, entries, preds });
            }
            let mut entry_blocks: Vec<BlockId> =
                func.inst(phi).phi_entries().map(|(_, b)| b).collect();
            let mut pred_blocks = block.preds().to_vec();
            entry_blocks.sort();
            pred_blocks.sort();
            if entry_blocks != pred_blocks {
                return Err(VerifyError::PhiEntryBlocks { phi });
            }
        }

        for inst in func.block_insts(bb) {
            for &input in func.inst(inst).inputs() {
                if !func.is_attached(input) {
                    return Err(VerifyError::ErasedValue { user: inst, value: input });
                }
                if !func.inst(input).users().contains(&inst) {
                    return Err(VerifyError::BrokenUseDef { user: inst, value: input });
                }
            }
            for &user in func.inst(inst).users() {
                if !func.inst(user).inputs().contains(&inst) {
                    return Err(VerifyError::BrokenUseDef { user, value: inst });
                }
            }
        }
    }

    let reachable = dfs::pre_order(func);
    let mut seen = vec![false; func.num_blocks()];
    for &bb in &reachable {
        seen[bb.index()] = true;
    }
    for &bb in func.block_order() {
        if !seen[bb.index()] {
            return Err(VerifyError::OrphanBlock { block: bb });
        }
    }

    Ok(())
}

/// `verify` plus the SSA dominance property: every use is dominated by its
/// definition. Phi uses are checked at the tail of the matching predecessor.
pub fn verify_ssa(func: &Function) -> Result<(), VerifyError> {
    verify(func)?;
    let dom = build_dom_tree(func);

    for &bb in func.block_order() {
        for inst in func.block_insts(bb) {
            if func.inst(inst).is_phi() {
                for (value, pred) in func.inst(inst).phi_entries() {
                    let def_bb = func.inst(value).block().unwrap();
                    if !dom.is_dominator(def_bb, pred) {
                        return Err(VerifyError::UseNotDominated { user: inst, value });
                    }
                }
                continue;
            }
            for &value in func.inst(inst).inputs() {
                let def_bb = func.inst(value).block().unwrap();
                if def_bb == bb {
                    // Same block: the definition must come first in list order.
                    let mut cur = func.prev_inst(inst);
                    let mut found = false;
                    while let Some(p) = cur {
                        if p == value {
                            found = true;
                            break;
                        }
                        cur = func.prev_inst(p);
                    }
                    if !found {
                        return Err(VerifyError::UseNotDominated { user: inst, value });
                    }
                } else if !dom.is_dominator(def_bb, bb) {
                    return Err(VerifyError::UseNotDominated { user: inst, value });
                }
            }
        }
    }
    Ok(())
}
