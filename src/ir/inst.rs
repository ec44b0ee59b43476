//! SSA instructions.
//!
//! An instruction is a node in its function's arena. The handle of a
//! value-producing instruction doubles as the handle of the SSA value it
//! defines; use-def edges are the ordered `inputs` list on the user side
//! and the `users` set on the producer side.

use std::fmt;

use indexmap::IndexSet;

use super::block::BlockId;
use super::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstId(pub u32);

impl InstId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle of a function within a [`Module`](super::function::Module).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncId(pub u32);

impl FuncId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Le,
    Eq,
    Shr,
    Or,
    BoundsCheck,
    Div,
}

impl BinOpKind {
    /// Comparisons produce an I1 result regardless of operand type.
    pub fn is_comparison(self) -> bool {
        matches!(self, BinOpKind::Le | BinOpKind::Eq)
    }
}

impl fmt::Display for BinOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BinOpKind::Add => "add",
            BinOpKind::Sub => "sub",
            BinOpKind::Mul => "mul",
            BinOpKind::Le => "le",
            BinOpKind::Eq => "eq",
            BinOpKind::Shr => "shr",
            BinOpKind::Or => "or",
            BinOpKind::BoundsCheck => "bounds_check",
            BinOpKind::Div => "div",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOpKind {
    ZeroCheck,
}

impl fmt::Display for UnaryOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOpKind::ZeroCheck => write!(f, "zero_check"),
        }
    }
}

/// Instruction payload. Value operands live in `Inst::inputs`; the
/// variants carry only non-value data (immediates, targets, phi entry
/// blocks).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstKind {
    /// Immediate, normalized to the instruction type's width.
    Const(i64),
    /// inputs: [lhs, rhs]
    BinOp(BinOpKind),
    /// inputs: [value]
    UnaryOp(UnaryOpKind),
    /// inputs: [src]; the destination type is the instruction type.
    Cast,
    /// inputs: [cond]
    If { then_bb: BlockId, else_bb: BlockId },
    Jump { target: BlockId },
    /// Entry blocks, parallel to `inputs`.
    Phi { blocks: Vec<BlockId> },
    /// inputs: [] or [value]
    Ret,
    Param { index: u32 },
    /// inputs: argument values, in order.
    Call { callee: FuncId },
}

impl InstKind {
    pub fn is_terminator(&self) -> bool {
        matches!(self, InstKind::If { .. } | InstKind::Jump { .. } | InstKind::Ret)
    }

    pub fn is_phi(&self) -> bool {
        matches!(self, InstKind::Phi { .. })
    }

    pub fn produces_value(&self) -> bool {
        matches!(
            self,
            InstKind::Const(_)
                | InstKind::BinOp(_)
                | InstKind::UnaryOp(_)
                | InstKind::Cast
                | InstKind::Phi { .. }
                | InstKind::Call { .. }
                | InstKind::Param { .. }
        )
    }
}

/// Arena node of one instruction.
#[derive(Debug, Clone)]
pub struct Inst {
    pub(crate) kind: InstKind,
    pub(crate) ty: Type,
    pub(crate) block: Option<BlockId>,
    pub(crate) prev: Option<InstId>,
    pub(crate) next: Option<InstId>,
    pub(crate) inputs: Vec<InstId>,
    pub(crate) users: IndexSet<InstId>,
}

impl Inst {
    pub(crate) fn new(kind: InstKind, ty: Type) -> Self {
        Self {
            kind,
            ty,
            block: None,
            prev: None,
            next: None,
            inputs: Vec::new(),
            users: IndexSet::new(),
        }
    }

    pub fn kind(&self) -> &InstKind {
        &self.kind
    }

    pub fn ty(&self) -> Type {
        self.ty
    }

    /// Owning block; `None` once the instruction has been erased.
    pub fn block(&self) -> Option<BlockId> {
        self.block
    }

    pub fn inputs(&self) -> &[InstId] {
        &self.inputs
    }

    pub fn users(&self) -> &IndexSet<InstId> {
        &self.users
    }

    pub fn is_terminator(&self) -> bool {
        self.kind.is_terminator()
    }

    pub fn is_phi(&self) -> bool {
        self.kind.is_phi()
    }

    /// Kind-level production plus a real result type: a call of a
    /// `None`-returning callee defines nothing.
    pub fn produces_value(&self) -> bool {
        self.kind.produces_value() && !self.ty.is_none()
    }

    /// Constant payload, if this is a `Const`.
    pub fn const_value(&self) -> Option<i64> {
        match self.kind {
            InstKind::Const(v) => Some(v),
            _ => None,
        }
    }

    pub fn binop_kind(&self) -> Option<BinOpKind> {
        match self.kind {
            InstKind::BinOp(op) => Some(op),
            _ => None,
        }
    }

    /// Phi entries as (value, predecessor) pairs.
    pub fn phi_entries(&self) -> impl Iterator<Item = (InstId, BlockId)> + '_ {
        let blocks: &[BlockId] = match &self.kind {
            InstKind::Phi { blocks } => blocks,
            _ => &[],
        };
        self.inputs.iter().copied().zip(blocks.iter().copied())
    }

    /// The successor blocks this instruction transfers control to.
    pub fn branch_targets(&self) -> Vec<BlockId> {
        match &self.kind {
            InstKind::If { then_bb, else_bb } => vec![*then_bb, *else_bb],
            InstKind::Jump { target } => vec![*target],
            _ => Vec::new(),
        }
    }
}
