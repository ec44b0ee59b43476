//! Textual and DOT dumps of the IR.

use std::fmt::Write;

use super::function::Function;
use super::inst::{InstId, InstKind};

fn val(id: InstId) -> String {
    format!("%v{}", id.0)
}

fn format_inst(func: &Function, id: InstId) -> String {
    let inst = func.inst(id);
    let mut s = String::new();
    if inst.produces_value() {
        write!(s, "{}: {} = ", val(id), inst.ty()).unwrap();
    }
    match inst.kind() {
        InstKind::Const(v) => write!(s, "const {}", v).unwrap(),
        InstKind::BinOp(op) => write!(
            s,
            "{} {}, {}",
            op,
            val(inst.inputs()[0]),
            val(inst.inputs()[1])
        )
        .unwrap(),
        InstKind::UnaryOp(op) => write!(s, "{} {}", op, val(inst.inputs()[0])).unwrap(),
        InstKind::Cast => write!(s, "cast {}", val(inst.inputs()[0])).unwrap(),
        InstKind::If { then_bb, else_bb } => write!(
            s,
            "if {} then bb{} else bb{}",
            val(inst.inputs()[0]),
            then_bb.0,
            else_bb.0
        )
        .unwrap(),
        InstKind::Jump { target } => write!(s, "jmp bb{}", target.0).unwrap(),
        InstKind::Phi { .. } => {
            write!(s, "phi").unwrap();
            for (i, (value, block)) in inst.phi_entries().enumerate() {
                let sep = if i == 0 { " " } else { ", " };
                write!(s, "{}[{}, bb{}]", sep, val(value), block.0).unwrap();
            }
        }
        InstKind::Ret => match inst.inputs().first() {
            Some(&v) => write!(s, "ret {}", val(v)).unwrap(),
            None => write!(s, "ret").unwrap(),
        },
        InstKind::Param { index } => write!(s, "param {}", index).unwrap(),
        InstKind::Call { callee } => {
            write!(s, "call f{}(", callee.0).unwrap();
            for (i, &arg) in inst.inputs().iter().enumerate() {
                if i > 0 {
                    write!(s, ", ").unwrap();
                }
                write!(s, "{}", val(arg)).unwrap();
            }
            write!(s, ")").unwrap();
        }
    }
    s
}

/// Renders a function as stable text, one instruction per line.
pub fn format_function(func: &Function) -> String {
    let mut out = String::new();
    write!(out, "fn (").unwrap();
    for (i, ty) in func.param_tys().iter().enumerate() {
        if i > 0 {
            write!(out, ", ").unwrap();
        }
        write!(out, "{}", ty).unwrap();
    }
    writeln!(out, ") -> {} {{", func.ret_ty()).unwrap();
    for &bb in func.block_order() {
        writeln!(out, "  bb{}:", bb.0).unwrap();
        for inst in func.block_insts(bb) {
            writeln!(out, "    {}", format_inst(func, inst)).unwrap();
        }
    }
    writeln!(out, "}}").unwrap();
    out
}

/// Renders the CFG in DOT, nodes and edges in layout order.
pub fn format_dot(func: &Function) -> String {
    let mut out = String::new();
    writeln!(out, "digraph cfg {{").unwrap();
    for &bb in func.block_order() {
        writeln!(out, "  bb{} [label=\"{}\"];", bb.0, bb.0).unwrap();
    }
    for &bb in func.block_order() {
        for &succ in func.block(bb).succs() {
            writeln!(out, "  bb{} -> bb{};", bb.0, succ.0).unwrap();
        }
    }
    writeln!(out, "}}").unwrap();
    out
}
