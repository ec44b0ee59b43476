//! Whole-expression constant folding.
//!
//! Every BinOp/Cast whose operands are all constants collapses to a single
//! constant with the two's-complement semantics of the operand type.
//! Candidates are collected in RPO before any mutation so the result does
//! not depend on list edits made along the way. A shift with an
//! out-of-range or negative amount aborts the pass at that instruction;
//! folds already applied stay in place and the offending site is left
//! untouched.

use thiserror::Error;

use crate::graph::dfs;
use crate::ir::{BinOpKind, Function, InstId, InstKind, Type};

use super::{Pass, PassError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("shift amount {amount} exceeds the width of {ty}")]
    ShiftTooWide { amount: i64, ty: Type },

    #[error("shift amount {amount} is negative")]
    ShiftNegative { amount: i64 },
}

pub struct ConstFold;

impl Pass for ConstFold {
    fn name(&self) -> &'static str {
        "const-fold"
    }

    fn run(&mut self, func: &mut Function) -> Result<bool, PassError> {
        Ok(run(func)?)
    }
}

pub fn run(func: &mut Function) -> Result<bool, ArithmeticError> {
    let mut candidates = Vec::new();
    for &bb in &dfs::rpo(&*func) {
        for inst in func.block_insts(bb) {
            if foldable(func, inst) {
                candidates.push(inst);
            }
        }
    }

    let mut changed = false;
    for inst in candidates {
        if !func.is_attached(inst) {
            continue;
        }
        let value = eval(func, inst)?;
        let ty = func.inst(inst).ty();
        let operands = func.inst(inst).inputs().to_vec();

        let folded = func.new_detached(InstKind::Const(ty.normalize(value)), ty, vec![]);
        func.clear_inputs(inst);
        // Operand constants orphaned by the fold go with it.
        let mut seen: Vec<InstId> = Vec::new();
        for op in operands {
            if !seen.contains(&op) {
                seen.push(op);
            }
        }
        for op in seen {
            if func.is_attached(op) && func.inst(op).users().is_empty() {
                func.erase(op);
            }
        }
        func.replace(inst, folded);
        changed = true;
    }
    Ok(changed)
}

fn foldable(func: &Function, inst: InstId) -> bool {
    match func.inst(inst).kind() {
        InstKind::BinOp(op) => {
            !matches!(op, BinOpKind::BoundsCheck | BinOpKind::Div)
                && func
                    .inst(inst)
                    .inputs()
                    .iter()
                    .all(|&i| func.inst(i).const_value().is_some())
        }
        InstKind::Cast => func
            .inst(func.inst(inst).inputs()[0])
            .const_value()
            .is_some(),
        _ => false,
    }
}

fn eval(func: &Function, inst: InstId) -> Result<i64, ArithmeticError> {
    match *func.inst(inst).kind() {
        InstKind::BinOp(op) => {
            let lhs = func.inst(func.inst(inst).inputs()[0]);
            let rhs = func.inst(func.inst(inst).inputs()[1]);
            eval_binop(op, lhs.ty(), lhs.const_value().unwrap(), rhs.const_value().unwrap())
        }
        InstKind::Cast => {
            let src = func.inst(func.inst(inst).inputs()[0]);
            Ok(func.inst(inst).ty().normalize(src.const_value().unwrap()))
        }
        ref other => panic!("cannot fold {:?}", other),
    }
}

/// Evaluates one binary operation in the operand type `ty`.
pub fn eval_binop(op: BinOpKind, ty: Type, lhs: i64, rhs: i64) -> Result<i64, ArithmeticError> {
    let value = match op {
        BinOpKind::Add => ty.normalize(lhs.wrapping_add(rhs)),
        BinOpKind::Sub => ty.normalize(lhs.wrapping_sub(rhs)),
        BinOpKind::Mul => {
            if ty == Type::I1 {
                (lhs != 0 && rhs != 0) as i64
            } else {
                ty.normalize(lhs.wrapping_mul(rhs))
            }
        }
        BinOpKind::Le => (lhs <= rhs) as i64,
        BinOpKind::Eq => (lhs == rhs) as i64,
        BinOpKind::Shr => {
            let width = ty.bit_width() as i64;
            if rhs < 0 {
                return Err(ArithmeticError::ShiftNegative { amount: rhs });
            }
            if rhs >= width {
                return Err(ArithmeticError::ShiftTooWide { amount: rhs, ty });
            }
            // Operands are stored sign-extended, so >> is arithmetic.
            ty.normalize(lhs >> rhs)
        }
        BinOpKind::Or => ty.normalize(lhs | rhs),
        BinOpKind::BoundsCheck | BinOpKind::Div => panic!("{} is never folded", op),
    };
    Ok(value)
}
