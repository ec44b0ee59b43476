use crate::ir::{BinOpKind, Function, Type};
use crate::opt::peephole;

#[test]
fn add_zero_forwards_the_operand() {
    let mut f = Function::new(Type::None, vec![]);
    let b0 = f.append_block();
    let lhs = f.push_const(b0, Type::I64, 32);
    let rhs = f.push_const(b0, Type::I64, 0);
    let add = f.push_binop(b0, BinOpKind::Add, lhs, rhs);
    let user = f.push_binop(b0, BinOpKind::Mul, add, lhs);

    assert!(peephole::run(&mut f));

    assert_eq!(f.block(b0).num_insts(), 3);
    assert!(!f.is_attached(add));
    assert_eq!(f.block(b0).last_inst(), Some(user));
    assert_eq!(f.inst(user).inputs()[0], lhs);
}

#[test]
fn shr_zero_forwards_the_operand() {
    let mut f = Function::new(Type::None, vec![]);
    let b0 = f.append_block();
    let lhs = f.push_const(b0, Type::I64, 32);
    let rhs = f.push_const(b0, Type::I64, 0);
    let shr = f.push_binop(b0, BinOpKind::Shr, lhs, rhs);
    let user = f.push_binop(b0, BinOpKind::Mul, shr, lhs);

    assert!(peephole::run(&mut f));

    assert_eq!(f.block(b0).num_insts(), 3);
    assert_eq!(f.inst(user).inputs()[0], lhs);
}

#[test]
fn shr_of_shr_combines_the_amounts() {
    let mut f = Function::new(Type::None, vec![]);
    let b0 = f.append_block();
    let two = f.push_const(b0, Type::I64, 2);
    let one = f.push_const(b0, Type::I64, 1);
    let v0 = f.push_binop(b0, BinOpKind::Mul, two, one);
    let fst = f.push_binop(b0, BinOpKind::Shr, v0, two);
    let sec = f.push_binop(b0, BinOpKind::Shr, fst, one);
    let user = f.push_binop(b0, BinOpKind::Mul, sec, one);

    assert!(peephole::run(&mut f));

    let insts: Vec<_> = f.block_insts(b0).collect();
    assert_eq!(insts.len(), 6);
    assert_eq!(insts[..3], [two, one, v0]);

    // The combined amount takes the inner shift's position.
    let add = insts[3];
    assert_eq!(f.inst(add).binop_kind(), Some(BinOpKind::Add));
    assert_eq!(f.inst(add).inputs(), &[two, one]);

    assert_eq!(insts[4], sec);
    assert_eq!(f.inst(sec).inputs(), &[v0, add]);
    assert!(!f.is_attached(fst));

    assert_eq!(insts[5], user);
    assert_eq!(f.inst(user).inputs()[0], sec);
}

#[test]
fn shr_of_shared_shr_is_left_alone() {
    let mut f = Function::new(Type::None, vec![]);
    let b0 = f.append_block();
    let two = f.push_const(b0, Type::I64, 2);
    let one = f.push_const(b0, Type::I64, 1);
    let v0 = f.push_binop(b0, BinOpKind::Mul, two, one);
    let fst = f.push_binop(b0, BinOpKind::Shr, v0, two);
    let sec = f.push_binop(b0, BinOpKind::Shr, fst, one);
    // A second consumer pins the inner shift.
    let keep = f.push_binop(b0, BinOpKind::Mul, fst, sec);

    assert!(!peephole::run(&mut f));
    assert!(f.is_attached(fst));
    assert_eq!(f.inst(sec).inputs(), &[fst, one]);
    assert_eq!(f.inst(keep).inputs(), &[fst, sec]);
}

#[test]
fn or_zero_forwards_the_operand() {
    let mut f = Function::new(Type::None, vec![]);
    let b0 = f.append_block();
    let lhs = f.push_const(b0, Type::I64, 32);
    let rhs = f.push_const(b0, Type::I64, 0);
    let or = f.push_binop(b0, BinOpKind::Or, lhs, rhs);
    let user = f.push_binop(b0, BinOpKind::Mul, or, lhs);

    assert!(peephole::run(&mut f));

    assert_eq!(f.block(b0).num_insts(), 3);
    assert_eq!(f.inst(user).inputs()[0], lhs);
}

#[test]
fn or_all_ones_forwards_the_mask() {
    let mut f = Function::new(Type::None, vec![]);
    let b0 = f.append_block();
    let seed = f.push_const(b0, Type::I64, 32);
    let value = f.push_binop(b0, BinOpKind::Mul, seed, seed);
    let ones = f.push_const(b0, Type::I64, -1);
    // Normalization swaps the constant to the right first.
    let or = f.push_binop(b0, BinOpKind::Or, ones, value);
    let user = f.push_binop(b0, BinOpKind::Mul, or, value);

    assert!(peephole::run(&mut f));

    assert_eq!(f.block(b0).num_insts(), 4);
    assert!(!f.is_attached(or));
    assert_eq!(f.inst(user).inputs()[0], ones);
}

#[test]
fn unused_binop_is_skipped() {
    let mut f = Function::new(Type::None, vec![]);
    let b0 = f.append_block();
    let lhs = f.push_const(b0, Type::I64, 32);
    let rhs = f.push_const(b0, Type::I64, 0);
    let add = f.push_binop(b0, BinOpKind::Add, lhs, rhs);

    assert!(!peephole::run(&mut f));
    assert!(f.is_attached(add));
    assert_eq!(f.block(b0).num_insts(), 3);
}

#[test]
fn chained_identities_converge_in_one_pass() {
    let mut f = Function::new(Type::I64, vec![]);
    let b0 = f.append_block();
    let seed = f.push_const(b0, Type::I64, 3);
    let x = f.push_binop(b0, BinOpKind::Mul, seed, seed);
    let z0 = f.push_const(b0, Type::I64, 0);
    let a1 = f.push_binop(b0, BinOpKind::Add, x, z0);
    let z1 = f.push_const(b0, Type::I64, 0);
    let a2 = f.push_binop(b0, BinOpKind::Add, a1, z1);
    let ret = f.push_ret(b0, Some(a2));

    assert!(peephole::run(&mut f));
    assert!(!f.is_attached(a1));
    assert!(!f.is_attached(a2));
    assert_eq!(f.inst(ret).inputs(), &[x]);
}
