//! Handle-linked instruction list.
//!
//! Blocks do not own instruction storage; the function arena does. A block
//! holds a [`ListHead`] and every [`Inst`] carries its own `prev`/`next`
//! handles, so insertion, removal and range splicing are pointer-swaps on
//! arena slots. `None` is the end sentinel on both sides.

use super::block::BlockId;
use super::inst::{Inst, InstId};

#[derive(Debug, Clone, Default)]
pub struct ListHead {
    pub(crate) first: Option<InstId>,
    pub(crate) last: Option<InstId>,
    pub(crate) len: usize,
}

impl ListHead {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn first(&self) -> Option<InstId> {
        self.first
    }

    pub fn last(&self) -> Option<InstId> {
        self.last
    }
}

fn node(arena: &mut [Inst], id: InstId) -> &mut Inst {
    arena
        .get_mut(id.index())
        .unwrap_or_else(|| panic!("invalid instruction handle {:?}", id))
}

pub(crate) fn push_back(arena: &mut [Inst], list: &mut ListHead, id: InstId) {
    match list.last {
        Some(last) => {
            node(arena, last).next = Some(id);
            let n = node(arena, id);
            n.prev = Some(last);
            n.next = None;
        }
        None => {
            let n = node(arena, id);
            n.prev = None;
            n.next = None;
            list.first = Some(id);
        }
    }
    list.last = Some(id);
    list.len += 1;
}

pub(crate) fn push_front(arena: &mut [Inst], list: &mut ListHead, id: InstId) {
    match list.first {
        Some(first) => insert_before(arena, list, first, id),
        None => push_back(arena, list, id),
    }
}

pub(crate) fn insert_before(arena: &mut [Inst], list: &mut ListHead, pos: InstId, id: InstId) {
    let prev = node(arena, pos).prev;
    {
        let n = node(arena, id);
        n.prev = prev;
        n.next = Some(pos);
    }
    node(arena, pos).prev = Some(id);
    match prev {
        Some(p) => node(arena, p).next = Some(id),
        None => list.first = Some(id),
    }
    list.len += 1;
}

pub(crate) fn insert_after(arena: &mut [Inst], list: &mut ListHead, pos: InstId, id: InstId) {
    let next = node(arena, pos).next;
    {
        let n = node(arena, id);
        n.prev = Some(pos);
        n.next = next;
    }
    node(arena, pos).next = Some(id);
    match next {
        Some(n) => node(arena, n).prev = Some(id),
        None => list.last = Some(id),
    }
    list.len += 1;
}

/// Detaches `id`; the node keeps no links afterwards.
pub(crate) fn unlink(arena: &mut [Inst], list: &mut ListHead, id: InstId) {
    let (prev, next) = {
        let n = node(arena, id);
        (n.prev.take(), n.next.take())
    };
    match prev {
        Some(p) => node(arena, p).next = next,
        None => list.first = next,
    }
    match next {
        Some(n) => node(arena, n).prev = prev,
        None => list.last = prev,
    }
    list.len -= 1;
}

/// Moves the inclusive range `[first, last]` out of `src` and appends it to
/// `dst`, rebinding each node's owner to `owner`.
///
/// The links are re-stitched in O(1); the owner rebind and the length
/// adjustment walk the moved range once.
pub(crate) fn splice_range(
    arena: &mut [Inst],
    src: &mut ListHead,
    dst: &mut ListHead,
    first: InstId,
    last: InstId,
    owner: BlockId,
) {
    // Count and rebind owners.
    let mut moved = 0usize;
    let mut cur = Some(first);
    while let Some(id) = cur {
        let n = node(arena, id);
        n.block = Some(owner);
        moved += 1;
        cur = if id == last { None } else { n.next };
    }

    // Unhook from the source list.
    let before = node(arena, first).prev.take();
    let after = node(arena, last).next.take();
    match before {
        Some(p) => node(arena, p).next = after,
        None => src.first = after,
    }
    match after {
        Some(n) => node(arena, n).prev = before,
        None => src.last = before,
    }
    src.len -= moved;

    // Append to the destination.
    match dst.last {
        Some(tail) => {
            node(arena, tail).next = Some(first);
            node(arena, first).prev = Some(tail);
        }
        None => {
            dst.first = Some(first);
            node(arena, first).prev = None;
        }
    }
    dst.last = Some(last);
    dst.len += moved;
}
