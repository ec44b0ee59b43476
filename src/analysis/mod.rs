//! CFG analyses: loops, linearization, liveness, register allocation.

pub mod linear;
pub mod liveness;
pub mod loops;
pub mod regalloc;

pub use linear::{linear_order, linear_order_with};
pub use liveness::{liveness, LiveInterval, Liveness, LIVE_STEP};
pub use loops::{build_loops, LoopForest, LoopId, LoopInfo, LoopItem};
pub use regalloc::{regalloc, regalloc_with, Location, RegMap, RegisterPool};

#[cfg(test)]
#[path = "../tests/analysis/t_loops.rs"]
mod t_loops;

#[cfg(test)]
#[path = "../tests/analysis/t_linear.rs"]
mod t_linear;

#[cfg(test)]
#[path = "../tests/analysis/t_liveness.rs"]
mod t_liveness;

#[cfg(test)]
#[path = "../tests/analysis/t_regalloc.rs"]
mod t_regalloc;
