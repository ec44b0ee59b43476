use indoc::indoc;

use crate::fixtures::graph_fn;
use crate::ir::{format_dot, format_function, BinOpKind, FuncId, Function, Type, UnaryOpKind};

#[test]
fn straight_line_dump() {
    let mut f = Function::new(Type::I64, vec![Type::I64]);
    let b0 = f.append_block();
    let b1 = f.append_block();
    let p = f.push_param(b0, 0, Type::I64);
    let c = f.push_const(b0, Type::I64, 2);
    let sum = f.push_binop(b0, BinOpKind::Add, p, c);
    f.push_jump(b0, b1);
    f.push_ret(b1, Some(sum));

    let expected = indoc! {"
        fn (i64) -> i64 {
          bb0:
            %v0: i64 = param 0
            %v1: i64 = const 2
            %v2: i64 = add %v0, %v1
            jmp bb1
          bb1:
            ret %v2
        }
    "};
    assert_eq!(format_function(&f), expected);
}

#[test]
fn phi_branch_and_call_dump() {
    let mut f = Function::new(Type::I64, vec![Type::I64]);
    let b0 = f.append_block();
    let b1 = f.append_block();
    let b2 = f.append_block();
    let b3 = f.append_block();

    let p = f.push_param(b0, 0, Type::I64);
    let check = f.push_unop(b0, UnaryOpKind::ZeroCheck, p);
    let narrow = f.push_cast(b0, Type::I32, check);
    let zero = f.push_const(b0, Type::I32, 0);
    let cond = f.push_binop(b0, BinOpKind::Le, narrow, zero);
    f.push_if(b0, cond, b1, b2);

    let a = f.push_call(b1, FuncId(3), Type::I64, vec![p]);
    f.push_jump(b1, b3);
    let b = f.push_const(b2, Type::I64, 7);
    f.push_jump(b2, b3);

    let phi = f.push_phi(b3, Type::I64);
    f.phi_add_entry(phi, a, b1);
    f.phi_add_entry(phi, b, b2);
    f.push_ret(b3, Some(phi));

    let expected = indoc! {"
        fn (i64) -> i64 {
          bb0:
            %v0: i64 = param 0
            %v1: i64 = zero_check %v0
            %v2: i32 = cast %v1
            %v3: i32 = const 0
            %v4: i1 = le %v2, %v3
            if %v4 then bb1 else bb2
          bb1:
            %v6: i64 = call f3(%v0)
            jmp bb3
          bb2:
            %v8: i64 = const 7
            jmp bb3
          bb3:
            %v10: i64 = phi [%v6, bb1], [%v8, bb2]
            ret %v10
        }
    "};
    assert_eq!(format_function(&f), expected);
}

#[test]
fn dot_dump_lists_nodes_then_edges() {
    let (f, _) = graph_fn(3, &[(0, 1), (0, 2), (1, 2)]);
    let expected = indoc! {"
        digraph cfg {
          bb0 [label=\"0\"];
          bb1 [label=\"1\"];
          bb2 [label=\"2\"];
          bb0 -> bb1;
          bb0 -> bb2;
          bb1 -> bb2;
        }
    "};
    assert_eq!(format_dot(&f), expected);
}
