use crate::ir::{format_function, BinOpKind, Function, Type};
use crate::opt::const_fold::{self, ArithmeticError};
use crate::opt::Pipeline;

#[test]
fn add_folds_to_42() {
    let mut f = Function::new(Type::I64, vec![]);
    let b0 = f.append_block();
    let lhs = f.push_const(b0, Type::I64, 32);
    let rhs = f.push_const(b0, Type::I64, 10);
    let sum = f.push_binop(b0, BinOpKind::Add, lhs, rhs);
    let ret = f.push_ret(b0, Some(sum));

    assert_eq!(const_fold::run(&mut f), Ok(true));

    // The orphaned operand constants go with the fold.
    let insts: Vec<_> = f.block_insts(b0).collect();
    assert_eq!(insts.len(), 2);
    let folded = insts[0];
    assert_eq!(f.inst(folded).const_value(), Some(42));
    assert_eq!(f.inst(folded).ty(), Type::I64);
    assert_eq!(f.inst(ret).inputs(), &[folded]);
    assert!(!f.is_attached(lhs));
    assert!(!f.is_attached(rhs));
}

#[test]
fn shr_folds_arithmetically() {
    let mut f = Function::new(Type::I64, vec![]);
    let b0 = f.append_block();
    let lhs = f.push_const(b0, Type::I64, 32);
    let rhs = f.push_const(b0, Type::I64, 2);
    let shr = f.push_binop(b0, BinOpKind::Shr, lhs, rhs);
    f.push_ret(b0, Some(shr));

    assert_eq!(const_fold::run(&mut f), Ok(true));
    let first = f.block(b0).first_inst().unwrap();
    assert_eq!(f.inst(first).const_value(), Some(8));
}

#[test]
fn or_folds_bitwise() {
    let mut f = Function::new(Type::I64, vec![]);
    let b0 = f.append_block();
    let lhs = f.push_const(b0, Type::I64, 32);
    let rhs = f.push_const(b0, Type::I64, 2);
    let or = f.push_binop(b0, BinOpKind::Or, lhs, rhs);
    f.push_ret(b0, Some(or));

    assert_eq!(const_fold::run(&mut f), Ok(true));
    let first = f.block(b0).first_inst().unwrap();
    assert_eq!(f.inst(first).const_value(), Some(34));
}

#[test]
fn i1_mul_is_logical_and() {
    let mut f = Function::new(Type::I1, vec![]);
    let b0 = f.append_block();
    let a = f.push_const(b0, Type::I1, 1);
    let b = f.push_const(b0, Type::I1, 0);
    let and = f.push_binop(b0, BinOpKind::Mul, a, b);
    f.push_ret(b0, Some(and));

    assert_eq!(const_fold::run(&mut f), Ok(true));
    let first = f.block(b0).first_inst().unwrap();
    assert_eq!(f.inst(first).const_value(), Some(0));
    assert_eq!(f.inst(first).ty(), Type::I1);
}

#[test]
fn comparison_folds_to_i1() {
    let mut f = Function::new(Type::I1, vec![]);
    let b0 = f.append_block();
    let a = f.push_const(b0, Type::I64, 3);
    let b = f.push_const(b0, Type::I64, 3);
    let le = f.push_binop(b0, BinOpKind::Le, a, b);
    f.push_ret(b0, Some(le));

    assert_eq!(const_fold::run(&mut f), Ok(true));
    let first = f.block(b0).first_inst().unwrap();
    assert_eq!(f.inst(first).const_value(), Some(1));
    assert_eq!(f.inst(first).ty(), Type::I1);
}

#[test]
fn cast_truncates_and_sign_extends() {
    let mut f = Function::new(Type::I8, vec![]);
    let b0 = f.append_block();
    let wide = f.push_const(b0, Type::I64, 300);
    let narrow = f.push_cast(b0, Type::I8, wide);
    f.push_ret(b0, Some(narrow));

    assert_eq!(const_fold::run(&mut f), Ok(true));
    let first = f.block(b0).first_inst().unwrap();
    assert_eq!(f.inst(first).const_value(), Some(44));
    assert_eq!(f.inst(first).ty(), Type::I8);

    let mut g = Function::new(Type::I8, vec![]);
    let b0 = g.append_block();
    let wide = g.push_const(b0, Type::I64, 200);
    let narrow = g.push_cast(b0, Type::I8, wide);
    g.push_ret(b0, Some(narrow));

    assert_eq!(const_fold::run(&mut g), Ok(true));
    let first = g.block(b0).first_inst().unwrap();
    assert_eq!(g.inst(first).const_value(), Some(-56));
}

#[test]
fn div_and_bounds_check_are_left_alone() {
    let mut f = Function::new(Type::I64, vec![]);
    let b0 = f.append_block();
    let a = f.push_const(b0, Type::I64, 10);
    let b = f.push_const(b0, Type::I64, 2);
    let div = f.push_binop(b0, BinOpKind::Div, a, b);
    let check = f.push_binop(b0, BinOpKind::BoundsCheck, a, b);
    f.push_ret(b0, Some(div));

    assert_eq!(const_fold::run(&mut f), Ok(false));
    assert!(f.is_attached(div));
    assert!(f.is_attached(check));
}

#[test]
fn wide_shift_reports_and_keeps_earlier_folds() {
    let mut f = Function::new(Type::I64, vec![]);
    let b0 = f.append_block();
    let a = f.push_const(b0, Type::I64, 1);
    let b = f.push_const(b0, Type::I64, 2);
    let sum = f.push_binop(b0, BinOpKind::Add, a, b);
    let base = f.push_const(b0, Type::I64, 32);
    let amount = f.push_const(b0, Type::I64, 64);
    let shr = f.push_binop(b0, BinOpKind::Shr, base, amount);
    let both = f.push_binop(b0, BinOpKind::Mul, sum, shr);
    f.push_ret(b0, Some(both));

    let err = const_fold::run(&mut f).unwrap_err();
    assert_eq!(
        err,
        ArithmeticError::ShiftTooWide {
            amount: 64,
            ty: Type::I64
        }
    );

    // The add collapsed before the failure; the shift site is untouched.
    assert!(!f.is_attached(sum));
    assert!(f.is_attached(shr));
    assert_eq!(f.inst(shr).inputs(), &[base, amount]);
    assert_eq!(f.inst(f.inst(both).inputs()[0]).const_value(), Some(3));
}

#[test]
fn negative_shift_reports() {
    let mut f = Function::new(Type::I64, vec![]);
    let b0 = f.append_block();
    let base = f.push_const(b0, Type::I64, 32);
    let amount = f.push_const(b0, Type::I64, -2);
    let shr = f.push_binop(b0, BinOpKind::Shr, base, amount);
    f.push_ret(b0, Some(shr));

    assert_eq!(
        const_fold::run(&mut f),
        Err(ArithmeticError::ShiftNegative { amount: -2 })
    );
    assert!(f.is_attached(shr));
}

#[test]
fn shared_operand_constant_survives_until_orphaned() {
    let mut f = Function::new(Type::None, vec![]);
    let b0 = f.append_block();
    let a = f.push_const(b0, Type::I64, 2);
    let b = f.push_const(b0, Type::I64, 3);
    let first = f.push_binop(b0, BinOpKind::Add, a, b);
    let second = f.push_binop(b0, BinOpKind::Add, a, b);
    f.push_ret(b0, None);
    let _ = (first, second);

    assert_eq!(const_fold::run(&mut f), Ok(true));

    let consts: Vec<_> = f
        .block_insts(b0)
        .filter_map(|i| f.inst(i).const_value())
        .collect();
    assert_eq!(consts, vec![5, 5]);
    assert!(!f.is_attached(a));
    assert!(!f.is_attached(b));
}

#[test]
fn folding_is_idempotent() {
    let mut f = Function::new(Type::I64, vec![]);
    let b0 = f.append_block();
    let lhs = f.push_const(b0, Type::I64, 32);
    let rhs = f.push_const(b0, Type::I64, 10);
    let sum = f.push_binop(b0, BinOpKind::Add, lhs, rhs);
    f.push_ret(b0, Some(sum));

    assert_eq!(const_fold::run(&mut f), Ok(true));
    let once = format_function(&f);
    assert_eq!(const_fold::run(&mut f), Ok(false));
    assert_eq!(format_function(&f), once);
}

#[test]
fn pipeline_runs_all_function_passes() {
    let mut f = Function::new(Type::I64, vec![]);
    let b0 = f.append_block();
    let x = f.push_const(b0, Type::I64, 7);
    let zero = f.push_const(b0, Type::I64, 0);
    let shifted = f.push_binop(b0, BinOpKind::Add, x, zero);
    let doubled = f.push_binop(b0, BinOpKind::Add, shifted, x);
    f.push_ret(b0, Some(doubled));

    let changed = Pipeline::new().run(&mut f).unwrap();
    assert!(changed);

    // add x, 0 peepholed away, then add 7, 7 folded.
    let ret = f.block(b0).last_inst().unwrap();
    let result = f.inst(ret).inputs()[0];
    assert_eq!(f.inst(result).const_value(), Some(14));
}
