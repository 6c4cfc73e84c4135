//! The dual-ended allocator: queue records grow up from offset 8, data
//! blocks grow down from the top of the arena, and the two regions are
//! allowed to meet but never cross.
use crate::block::{self, BlockOffset, Link, BLOCK_SIZE};
use crate::buffer::{Buffer, SIZE};
use crate::record::{self, QueueOffset, RECORD_SIZE, REGION_START};

/// Offsets of the four 16-bit allocator-state cursors at the start of the
/// arena.
mod field {
    pub const LOWEST_FREE_QUEUE: u16 = 0;
    pub const HIGHEST_FREE_BLOCK: u16 = 2;
    pub const HIGHEST_QUEUE: u16 = 4;
    pub const LOWEST_BLOCK: u16 = 6;
}

/// Sentinel for `lowest_block_offset` when no blocks are live. Deliberately
/// off the 16-byte block grid so free-scans can tell "no blocks" apart from
/// "a real block here".
const NO_BLOCKS: u16 = SIZE as u16 - 1;

fn lowest_free_queue_offset(buffer: &Buffer) -> u16 {
    buffer.read_u16(field::LOWEST_FREE_QUEUE)
}

fn set_lowest_free_queue_offset(buffer: &mut Buffer, value: u16) {
    buffer.write_u16(field::LOWEST_FREE_QUEUE, value);
}

fn highest_free_block_offset(buffer: &Buffer) -> u16 {
    buffer.read_u16(field::HIGHEST_FREE_BLOCK)
}

fn set_highest_free_block_offset(buffer: &mut Buffer, value: u16) {
    buffer.write_u16(field::HIGHEST_FREE_BLOCK, value);
}

pub(crate) fn highest_queue_offset(buffer: &Buffer) -> u16 {
    buffer.read_u16(field::HIGHEST_QUEUE)
}

fn set_highest_queue_offset(buffer: &mut Buffer, value: u16) {
    buffer.write_u16(field::HIGHEST_QUEUE, value);
}

pub(crate) fn lowest_block_offset(buffer: &Buffer) -> u16 {
    buffer.read_u16(field::LOWEST_BLOCK)
}

fn set_lowest_block_offset(buffer: &mut Buffer, value: u16) {
    buffer.write_u16(field::LOWEST_BLOCK, value);
}

/// An "uninitialized" allocator is recognized by `lowest_free_queue_offset
/// == 0` — the same all-zero state a freshly constructed [`Buffer`] starts
/// in.
pub(crate) fn is_initialized(buffer: &Buffer) -> bool {
    lowest_free_queue_offset(buffer) != 0
}

/// First-use initialization: lays out the starting cursors for an
/// all-zero buffer.
pub(crate) fn init(buffer: &mut Buffer) {
    set_lowest_free_queue_offset(buffer, REGION_START);
    set_highest_free_block_offset(buffer, SIZE as u16 - BLOCK_SIZE);
    set_highest_queue_offset(buffer, 0);
    set_lowest_block_offset(buffer, NO_BLOCKS);
}

/// The exhaustion predicate shared by block allocation and `create_queue`:
/// true when a further block would collide with the queue-record region.
fn is_exhausted(highest_free_block: i32, highest_queue: i32) -> bool {
    highest_free_block < highest_queue + RECORD_SIZE as i32
}

fn check_not_exhausted(buffer: &Buffer) {
    if is_exhausted(
        highest_free_block_offset(buffer) as i32,
        highest_queue_offset(buffer) as i32,
    ) {
        panic!("embqueue: out of memory (data-block region exhausted)");
    }
}

/// Store a newly computed `highest_free_block_offset`, or raise
/// out-of-memory if the candidate value would already collide with the
/// queue-record region.
///
/// A sparse free-slot scan can legitimately produce a candidate that has
/// already crossed into the queue region; storing it unchecked and only
/// noticing on the *next* call would let unsigned wraparound turn a
/// negative "no room at all" candidate into a large, falsely-free-looking
/// `u16`. Checking immediately means a sparse scan that exhausts the block
/// region is reported as out-of-memory right away instead of corrupting the
/// cursor.
fn store_highest_free_block_offset(buffer: &mut Buffer, candidate: i32) {
    if is_exhausted(candidate, highest_queue_offset(buffer) as i32) {
        panic!("embqueue: out of memory (data-block region exhausted)");
    }
    debug_assert!(candidate >= 0 && candidate < SIZE as i32);
    set_highest_free_block_offset(buffer, candidate as u16);
}

/// Allocate one data block, returning its offset.
pub(crate) fn alloc_block(buffer: &mut Buffer) -> BlockOffset {
    check_not_exhausted(buffer);

    let allocated = BlockOffset(highest_free_block_offset(buffer));
    block::set_terminal(buffer, allocated);

    let lowest_block = lowest_block_offset(buffer);
    if allocated.get() < lowest_block {
        // Block allocations are contiguous: the region just grew downward.
        set_lowest_block_offset(buffer, allocated.get());
        store_highest_free_block_offset(buffer, allocated.get() as i32 - BLOCK_SIZE as i32);
    } else {
        let mut scan = allocated.get() as i32 - BLOCK_SIZE as i32;
        let floor = lowest_block as i32;
        let mut found = None;
        while scan >= floor {
            if block::is_free(buffer, BlockOffset(scan as u16)) {
                found = Some(scan);
                break;
            }
            scan -= BLOCK_SIZE as i32;
        }
        let candidate = found.unwrap_or(lowest_block as i32 - BLOCK_SIZE as i32);
        store_highest_free_block_offset(buffer, candidate);
    }

    allocated
}

/// Free one block and update both free-region cursors. Shared bookkeeping
/// used by destroy, dequeue's head-advance and merge.
pub(crate) fn free_block(buffer: &mut Buffer, offset: BlockOffset) {
    block::set_free(buffer, offset);

    if offset.get() > highest_free_block_offset(buffer) {
        set_highest_free_block_offset(buffer, offset.get());
    }
    if offset.get() == lowest_block_offset(buffer) {
        recompute_lowest_block_offset(buffer, offset.get());
    }
}

/// Walk a block chain from `head`, freeing every block, stopping at the
/// terminal sentinel. An explicit loop rather than recursion, so chain
/// length never threatens stack depth.
pub(crate) fn free_chain(buffer: &mut Buffer, head: BlockOffset) {
    let mut current = head;
    loop {
        let next = block::link(buffer, current);
        free_block(buffer, current);
        match next {
            Link::Next(successor) => current = successor,
            Link::Terminal | Link::Free => break,
        }
    }
}

/// Recompute `lowest_block_offset` after freeing the block previously at
/// that offset: scan upward by 16 for the next allocated block, or reset to
/// the sentinel if none remain.
fn recompute_lowest_block_offset(buffer: &mut Buffer, freed_offset: u16) {
    let mut i = freed_offset;
    while i < SIZE as u16 {
        if !block::is_free(buffer, BlockOffset(i)) {
            set_lowest_block_offset(buffer, i);
            return;
        }
        i += BLOCK_SIZE;
    }
    set_lowest_block_offset(buffer, NO_BLOCKS);
}

/// Reserve the next free queue-record slot for `create_queue`, without yet
/// writing any record fields into it. The caller must initialize the
/// record (see [`record::init`]) before calling [`commit_queue_slot`],
/// since the free-slot scan below relies on the slot's `first_block_offset`
/// still reading as free.
pub(crate) fn reserve_queue_slot(buffer: &Buffer) -> QueueOffset {
    check_not_exhausted(buffer);
    QueueOffset(lowest_free_queue_offset(buffer))
}

/// Advance `lowest_free_queue_offset` past the slot just filled by
/// `create_queue`. Must run after the record at `allocated` has been
/// written, so the free-slot scan does not pick the same slot again.
pub(crate) fn commit_queue_slot(buffer: &mut Buffer, allocated: QueueOffset) {
    let highest_queue = highest_queue_offset(buffer);
    if allocated.get() > highest_queue {
        // Queue allocations are contiguous: the region just grew upward.
        set_highest_queue_offset(buffer, allocated.get());
        set_lowest_free_queue_offset(buffer, allocated.get() + RECORD_SIZE);
    } else {
        let mut i = allocated.get();
        let mut found = None;
        while i <= highest_queue {
            if record::is_free(buffer, QueueOffset(i)) {
                found = Some(i);
                break;
            }
            i += RECORD_SIZE;
        }
        set_lowest_free_queue_offset(buffer, found.unwrap_or(highest_queue + RECORD_SIZE));
    }
}

/// Release a queue record's slot and update the record-region cursors.
pub(crate) fn free_queue_slot(buffer: &mut Buffer, offset: QueueOffset) {
    let lowest_free_queue = lowest_free_queue_offset(buffer);
    if offset.get() < lowest_free_queue {
        set_lowest_free_queue_offset(buffer, offset.get());
    }
    if offset.get() == highest_queue_offset(buffer) {
        recompute_highest_queue_offset(buffer, offset.get());
    }
    record::free(buffer, offset);
}

/// Recompute `highest_queue_offset` after freeing the record at that
/// offset: scan downward by 8 for the next live record, or reset to 0 if
/// none remain.
fn recompute_highest_queue_offset(buffer: &mut Buffer, freed_offset: u16) {
    let mut i = freed_offset as i32 - RECORD_SIZE as i32;
    while i >= REGION_START as i32 {
        let candidate = QueueOffset(i as u16);
        if !record::is_free(buffer, candidate) {
            set_highest_queue_offset(buffer, i as u16);
            return;
        }
        i -= RECORD_SIZE as i32;
    }
    set_highest_queue_offset(buffer, 0);
}
