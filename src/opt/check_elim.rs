//! Redundant check elimination.
//!
//! A `zero_check v` is redundant when another `zero_check v` dominates it;
//! a `bounds_check v, b` when another `bounds_check v, b` with the same
//! bound dominates it. Candidates come from an RPO sweep; the user set of
//! the checked value is snapshotted before scanning so erasure never
//! happens under an active iteration.

use crate::graph::dfs;
use crate::graph::dom::{build_dom_tree, DomTree};
use crate::ir::{BinOpKind, Function, InstId, InstKind, UnaryOpKind};

use super::{Pass, PassError};

pub struct CheckElim;

impl Pass for CheckElim {
    fn name(&self) -> &'static str {
        "check-elim"
    }

    fn run(&mut self, func: &mut Function) -> Result<bool, PassError> {
        Ok(run(func))
    }
}

pub fn run(func: &mut Function) -> bool {
    let dom = build_dom_tree(&*func);

    let mut candidates = Vec::new();
    for &bb in &dfs::rpo(&*func) {
        for inst in func.block_insts(bb) {
            if is_check(func, inst) {
                candidates.push(inst);
            }
        }
    }

    let mut changed = false;
    for cand in candidates {
        if !func.is_attached(cand) {
            continue;
        }
        // A consumed check result cannot be rewired away.
        if !func.inst(cand).users().is_empty() {
            continue;
        }
        let value = func.inst(cand).inputs()[0];
        let bound = match func.inst(cand).kind() {
            InstKind::BinOp(BinOpKind::BoundsCheck) => Some(func.inst(cand).inputs()[1]),
            _ => None,
        };

        let users: Vec<InstId> = func.inst(value).users().iter().copied().collect();
        for user in users {
            if user == cand || !func.is_attached(user) {
                continue;
            }
            if !same_check(func, user, value, bound) {
                continue;
            }
            if dominates(func, &dom, user, cand) {
                func.erase(cand);
                changed = true;
                break;
            }
        }
    }
    changed
}

fn is_check(func: &Function, inst: InstId) -> bool {
    matches!(
        func.inst(inst).kind(),
        InstKind::UnaryOp(UnaryOpKind::ZeroCheck) | InstKind::BinOp(BinOpKind::BoundsCheck)
    )
}

fn same_check(func: &Function, user: InstId, value: InstId, bound: Option<InstId>) -> bool {
    match bound {
        None => {
            matches!(func.inst(user).kind(), InstKind::UnaryOp(UnaryOpKind::ZeroCheck))
                && func.inst(user).inputs()[0] == value
        }
        Some(bound) => {
            matches!(func.inst(user).kind(), InstKind::BinOp(BinOpKind::BoundsCheck))
                && func.inst(user).inputs()[0] == value
                && func.inst(user).inputs()[1] == bound
        }
    }
}

/// Instruction-level dominance: block dominance across blocks, list order
/// within one.
fn dominates(func: &Function, dom: &DomTree, a: InstId, b: InstId) -> bool {
    let ba = func.inst(a).block().unwrap();
    let bb = func.inst(b).block().unwrap();
    if ba != bb {
        return dom.is_dominator(ba, bb);
    }
    let mut cur = func.next_inst(a);
    while let Some(n) = cur {
        if n == b {
            return true;
        }
        cur = func.next_inst(n);
    }
    false
}
