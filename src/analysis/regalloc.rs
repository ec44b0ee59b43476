//! Linear-scan register allocation over liveness intervals.

use std::fmt;

use super::liveness::{liveness, LiveInterval, Liveness};
use crate::ir::{Function, InstId};

/// Fixed pool of physical registers with deterministic lowest-free
/// allocation.
pub struct RegisterPool {
    regs: Vec<bool>,
    in_use: usize,
}

impl RegisterPool {
    pub fn new(num_regs: usize) -> Self {
        Self {
            regs: vec![false; num_regs],
            in_use: 0,
        }
    }

    pub fn in_use(&self) -> usize {
        self.in_use
    }

    pub fn allocate(&mut self) -> Option<usize> {
        if self.in_use == self.regs.len() {
            return None;
        }
        for (i, used) in self.regs.iter_mut().enumerate() {
            if !*used {
                *used = true;
                self.in_use += 1;
                return Some(i);
            }
        }
        unreachable!("no free register found below the use count");
    }

    pub fn release(&mut self, id: usize) {
        assert!(self.in_use != 0, "releasing from an empty pool");
        assert!(id < self.regs.len(), "register id {} out of bound", id);
        assert!(self.regs[id], "register {} released twice", id);
        self.regs[id] = false;
        self.in_use -= 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Reg(usize),
    Stack(usize),
}

impl Location {
    pub fn is_stack(self) -> bool {
        matches!(self, Location::Stack(_))
    }

    pub fn id(self) -> usize {
        match self {
            Location::Reg(id) | Location::Stack(id) => id,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Reg(id) => write!(f, "r{}", id),
            Location::Stack(id) => write!(f, "s{}", id),
        }
    }
}

/// Location of every allocated value.
pub struct RegMap {
    locs: Vec<Option<Location>>,
}

impl RegMap {
    pub fn location(&self, value: InstId) -> Option<Location> {
        self.locs[value.index()]
    }
}

pub fn regalloc(func: &Function, num_regs: usize) -> RegMap {
    let lv = liveness(func);
    regalloc_with(func, &lv, num_regs)
}

struct Active {
    value: InstId,
    interval: LiveInterval,
    reg: usize,
}

/// Sweeps the non-empty value intervals sorted by start. The active list
/// stays sorted by interval end: the front expires first, the back is the
/// spill candidate with the latest end.
pub fn regalloc_with(func: &Function, lv: &Liveness, num_regs: usize) -> RegMap {
    let mut items: Vec<(InstId, LiveInterval)> = (0..func.num_insts() as u32)
        .map(InstId)
        .filter(|&i| func.is_attached(i) && func.inst(i).produces_value())
        .filter_map(|i| lv.interval(i).map(|iv| (i, iv)))
        .filter(|(_, iv)| !iv.is_empty())
        .collect();
    items.sort_by(|a, b| {
        (a.1.start, a.1.end, a.0)
            .cmp(&(b.1.start, b.1.end, b.0))
    });

    let mut pool = RegisterPool::new(num_regs);
    let mut active: Vec<Active> = Vec::new();
    let mut locs: Vec<Option<Location>> = vec![None; func.num_insts()];
    let mut next_stack_slot = 0usize;

    for (value, interval) in items {
        while !active.is_empty() && active[0].interval.end <= interval.start {
            pool.release(active[0].reg);
            active.remove(0);
        }

        match pool.allocate() {
            Some(reg) => {
                locs[value.index()] = Some(Location::Reg(reg));
                active.push(Active { value, interval, reg });
            }
            None => {
                let steal = active
                    .last()
                    .map(|spill| spill.interval.end > interval.end)
                    .unwrap_or(false);
                if steal {
                    let spill = active.pop().unwrap();
                    locs[spill.value.index()] = Some(Location::Stack(next_stack_slot));
                    next_stack_slot += 1;
                    locs[value.index()] = Some(Location::Reg(spill.reg));
                    active.push(Active {
                        value,
                        interval,
                        reg: spill.reg,
                    });
                } else {
                    locs[value.index()] = Some(Location::Stack(next_stack_slot));
                    next_stack_slot += 1;
                }
            }
        }

        active.sort_by_key(|a| a.interval.end);
    }

    RegMap { locs }
}
