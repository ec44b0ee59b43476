//! SSA intermediate representation: typed values, instructions, basic
//! blocks and functions, backed by handle arenas.

pub mod block;
pub mod format;
pub mod function;
pub mod inst;
pub mod list;
pub mod types;
pub mod verify;

pub use block::{BasicBlock, BlockId};
pub use format::{format_dot, format_function};
pub use function::{Function, InstIter, Module};
pub use inst::{BinOpKind, FuncId, Inst, InstId, InstKind, UnaryOpKind};
pub use types::Type;
pub use verify::{verify, verify_ssa, VerifyError};

#[cfg(test)]
#[path = "../tests/ir/t_list.rs"]
mod t_list;

#[cfg(test)]
#[path = "../tests/ir/t_function.rs"]
mod t_function;

#[cfg(test)]
#[path = "../tests/ir/t_format.rs"]
mod t_format;

#[cfg(test)]
#[path = "../tests/ir/t_verify.rs"]
mod t_verify;
