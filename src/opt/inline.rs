//! Function inlining.
//!
//! A call site expands by absorbing the callee's arenas into the caller,
//! splitting the call block, rewiring parameters to the argument values
//! and returns to the continuation, grafting the callee entry into the
//! call position, and erasing the call. Verification happens before any
//! mutation; a mismatched site reports an error and leaves the caller
//! untouched.

use thiserror::Error;

use crate::graph::dfs;
use crate::ir::{BlockId, FuncId, Function, InstId, InstKind, Module, Type};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InlineError {
    #[error("call passes {got} arguments but the callee takes {expected}")]
    ArityMismatch { expected: usize, got: usize },

    #[error("argument {index} has type {got} but the callee expects {expected}")]
    ArgTypeMismatch { index: usize, expected: Type, got: Type },

    #[error("call result type {call_ty} differs from callee return type {ret_ty}")]
    ResultTypeMismatch { call_ty: Type, ret_ty: Type },
}

/// Expands every call in `func_id`, in RPO order of the call sites. Each
/// site consumes its own clone of the callee.
pub fn run(module: &mut Module, func_id: FuncId) -> Result<bool, InlineError> {
    let mut calls: Vec<(InstId, FuncId)> = Vec::new();
    {
        let func = module.func(func_id);
        for &bb in &dfs::rpo(func) {
            for inst in func.block_insts(bb) {
                if let InstKind::Call { callee } = *func.inst(inst).kind() {
                    calls.push((inst, callee));
                }
            }
        }
    }

    let mut changed = false;
    for (call, callee_id) in calls {
        let callee = module.func(callee_id).clone();
        inline_call(module.func_mut(func_id), call, callee)?;
        changed = true;
    }
    Ok(changed)
}

/// Substitutes `callee`'s body at `call`. The callee function is consumed;
/// its blocks end up owned by the caller.
pub fn inline_call(caller: &mut Function, call: InstId, callee: Function) -> Result<(), InlineError> {
    let args = caller.inst(call).inputs().to_vec();
    if args.len() != callee.param_tys().len() {
        return Err(InlineError::ArityMismatch {
            expected: callee.param_tys().len(),
            got: args.len(),
        });
    }
    for (index, (&arg, &expected)) in args.iter().zip(callee.param_tys()).enumerate() {
        let got = caller.inst(arg).ty();
        if got != expected {
            return Err(InlineError::ArgTypeMismatch { index, expected, got });
        }
    }
    let call_ty = caller.inst(call).ty();
    if call_ty != callee.ret_ty() {
        return Err(InlineError::ResultTypeMismatch {
            call_ty,
            ret_ty: callee.ret_ty(),
        });
    }
    let returns_value = !callee.ret_ty().is_none();

    let old_entry = callee.entry().expect("inlining a callee without blocks");
    let old_order = callee.block_order().to_vec();
    let old_pre = dfs::pre_order(&callee);

    let (bmap, _) = caller.absorb(callee);
    let entry = bmap[old_entry.index()];
    let body: Vec<BlockId> = old_order
        .iter()
        .map(|b| bmap[b.index()])
        .filter(|&b| b != entry)
        .collect();
    let pre_blocks: Vec<BlockId> = old_pre.iter().map(|b| bmap[b.index()]).collect();

    // Everything after the call continues in a fresh block.
    let after = caller.split_after(call);

    // Callee instructions consume the argument values directly.
    let params: Vec<(u32, InstId)> = caller
        .block_insts(entry)
        .filter_map(|i| match *caller.inst(i).kind() {
            InstKind::Param { index } => Some((index, i)),
            _ => None,
        })
        .collect();
    for (index, param) in params {
        caller.migrate_users(param, args[index as usize]);
        caller.erase(param);
    }

    // Returns become jumps to the continuation; the returned value (or a
    // phi merging them) takes over the call's users.
    let mut rets: Vec<InstId> = Vec::new();
    for &bb in &pre_blocks {
        if let Some(last) = caller.block(bb).last_inst() {
            if matches!(caller.inst(last).kind(), InstKind::Ret) {
                rets.push(last);
            }
        }
    }
    if returns_value {
        if rets.len() == 1 {
            let ret_val = caller.inst(rets[0]).inputs()[0];
            caller.migrate_users(call, ret_val);
        } else {
            let phi = caller.push_phi_front(after, call_ty);
            for &ret in &rets {
                let value = caller.inst(ret).inputs()[0];
                let bb = caller.inst(ret).block().unwrap();
                caller.phi_add_entry(phi, value, bb);
            }
            caller.migrate_users(call, phi);
        }
    }
    for &ret in &rets {
        let bb = caller.inst(ret).block().unwrap();
        caller.erase(ret);
        caller.push_jump(bb, after);
    }

    // Graft the callee entry into the call position and drop the call.
    let pre_bb = caller.inst(call).block().unwrap();
    caller.splice_append(pre_bb, entry);
    caller.erase(call);
    caller.remove_block(entry);

    caller.move_blocks_before(after, &body);
    Ok(())
}
