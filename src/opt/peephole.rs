//! Local algebraic simplifications driven by use-def.
//!
//! Candidates are collected up front in RPO, blocks forward; every rewrite
//! migrates the users of the folded instruction to its replacement value
//! and then erases the dead instruction. Commutative operand
//! normalization puts a lone constant on the right for Add and Or.

use crate::graph::dfs;
use crate::ir::{BinOpKind, Function, InstId, InstKind};

use super::{Pass, PassError};

pub struct Peephole;

impl Pass for Peephole {
    fn name(&self) -> &'static str {
        "peephole"
    }

    fn run(&mut self, func: &mut Function) -> Result<bool, PassError> {
        Ok(run(func))
    }
}

pub fn run(func: &mut Function) -> bool {
    let mut candidates = Vec::new();
    for &bb in &dfs::rpo(&*func) {
        for inst in func.block_insts(bb) {
            if matches!(func.inst(inst).kind(), InstKind::BinOp(_)) {
                candidates.push(inst);
            }
        }
    }

    let mut changed = false;
    for inst in candidates {
        if !func.is_attached(inst) {
            continue;
        }
        changed |= fold(func, inst);
    }
    changed
}

fn is_const(func: &Function, id: InstId) -> bool {
    func.inst(id).const_value().is_some()
}

fn const_is(func: &Function, id: InstId, value: i64) -> bool {
    let ty = func.inst(id).ty();
    func.inst(id).const_value() == Some(ty.normalize(value))
}

fn fold(func: &mut Function, inst: InstId) -> bool {
    // No users, nothing to rewire.
    if func.inst(inst).users().is_empty() {
        return false;
    }
    let op = func.inst(inst).binop_kind().unwrap();

    if matches!(op, BinOpKind::Add | BinOpKind::Or) {
        let lhs = func.inst(inst).inputs()[0];
        let rhs = func.inst(inst).inputs()[1];
        if is_const(func, lhs) && !is_const(func, rhs) {
            func.swap_inputs(inst, 0, 1);
        }
    }

    match op {
        BinOpKind::Add => fold_add(func, inst),
        BinOpKind::Shr => fold_shr(func, inst),
        BinOpKind::Or => fold_or(func, inst),
        _ => false,
    }
}

/// `add x, 0 -> x`
fn fold_add(func: &mut Function, inst: InstId) -> bool {
    let lhs = func.inst(inst).inputs()[0];
    let rhs = func.inst(inst).inputs()[1];
    if const_is(func, rhs, 0) {
        func.migrate_users(inst, lhs);
        func.erase(inst);
        return true;
    }
    false
}

/// `shr x, 0 -> x` and
/// `shr (shr x, c1), c2 -> shr x, (add c1, c2)` when the inner shift has
/// exactly one user.
fn fold_shr(func: &mut Function, inst: InstId) -> bool {
    let lhs = func.inst(inst).inputs()[0];
    let rhs = func.inst(inst).inputs()[1];
    if !is_const(func, rhs) {
        return false;
    }
    if const_is(func, rhs, 0) {
        func.migrate_users(inst, lhs);
        func.erase(inst);
        return true;
    }

    if func.inst(lhs).binop_kind() != Some(BinOpKind::Shr) {
        return false;
    }
    let inner = lhs;
    if func.inst(inner).users().len() > 1 {
        return false;
    }
    let inner_shamt = func.inst(inner).inputs()[1];
    if !is_const(func, inner_shamt) {
        return false;
    }

    let x = func.inst(inner).inputs()[0];
    let ty = func.inst(inner_shamt).ty();
    let add = func.new_detached(InstKind::BinOp(BinOpKind::Add), ty, vec![inner_shamt, rhs]);
    func.set_input(inst, 0, x);
    func.set_input(inst, 1, add);
    // The combined amount takes the inner shift's position in the block.
    func.replace(inner, add);
    true
}

/// `or x, 0 -> x` and `or x, -1 -> -1` (all-ones of the operand type).
fn fold_or(func: &mut Function, inst: InstId) -> bool {
    let lhs = func.inst(inst).inputs()[0];
    let rhs = func.inst(inst).inputs()[1];
    if !is_const(func, rhs) {
        return false;
    }
    if const_is(func, rhs, 0) {
        func.migrate_users(inst, lhs);
        func.erase(inst);
        return true;
    }
    let ty = func.inst(rhs).ty();
    if const_is(func, rhs, ty.all_ones()) {
        func.migrate_users(inst, rhs);
        func.erase(inst);
        return true;
    }
    false
}
