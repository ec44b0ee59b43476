//! IR-to-IR optimization passes.

pub mod check_elim;
pub mod const_fold;
pub mod inline;
pub mod peephole;

pub use check_elim::CheckElim;
pub use const_fold::{ArithmeticError, ConstFold};
pub use inline::InlineError;
pub use peephole::Peephole;

use thiserror::Error;

use crate::ir::Function;

#[derive(Debug, Error)]
pub enum PassError {
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),

    #[error(transparent)]
    Inline(#[from] InlineError),
}

/// A function-local optimization pass. `run` reports whether the IR
/// changed; analyses are invalidated wholesale whenever it did.
pub trait Pass {
    fn name(&self) -> &'static str;
    fn run(&mut self, func: &mut Function) -> Result<bool, PassError>;
}

/// The function-local pass order, in one place. Inlining runs at module
/// scope and is driven separately (see [`inline::run`]).
pub struct Pipeline {
    passes: Vec<Box<dyn Pass>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            passes: vec![
                Box::new(Peephole),
                Box::new(ConstFold),
                Box::new(CheckElim),
            ],
        }
    }

    pub fn run(&mut self, func: &mut Function) -> Result<bool, PassError> {
        let mut changed = false;
        for pass in &mut self.passes {
            changed |= pass.run(func)?;
        }
        Ok(changed)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/opt/t_const_fold.rs"]
mod t_const_fold;

#[cfg(test)]
#[path = "../tests/opt/t_peephole.rs"]
mod t_peephole;

#[cfg(test)]
#[path = "../tests/opt/t_check_elim.rs"]
mod t_check_elim;

#[cfg(test)]
#[path = "../tests/opt/t_inline.rs"]
mod t_inline;
