//! The public lifecycle API: create/destroy a queue, enqueue/dequeue a
//! byte.
use crate::allocator;
use crate::block::{self, BlockOffset, Link, BLOCK_DATA_SIZE};
use crate::buffer::Buffer;
use crate::record::{self, QueueOffset};

/// A handle to one FIFO queue living inside an [`Arena`].
///
/// The handle is a plain offset into the arena: records are never moved for
/// their lifetime, so a bare offset is a sound, stable handle and no
/// generation tag is needed. There is no publicly constructible "null"
/// handle: the only way to obtain one is [`Arena::create_queue`], and the
/// only way to invalidate one is [`Arena::destroy_queue`]. Using a handle
/// after its queue has been destroyed is reported the same way a null
/// handle would be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueHandle(QueueOffset);

/// Many independent FIFO byte queues packed into one fixed 2048-byte arena.
///
/// See the crate-level documentation for the layout this type manages.
/// Every method that can observe or mutate queue state takes `&mut self`:
/// the arena has no interior mutability, so the borrow checker enforces
/// "exactly one caller at a time" at compile time rather than with a
/// runtime lock.
pub struct Arena {
    buffer: Buffer,
}

impl Arena {
    /// Create a new, empty arena. The allocator initializes itself lazily
    /// on the first [`create_queue`](Self::create_queue) call.
    #[must_use = "create a queue with `create_queue` to do anything with the arena"]
    pub const fn new() -> Self {
        Self {
            buffer: Buffer::new(),
        }
    }

    /// Allocate a new, empty FIFO queue and return a handle to it.
    ///
    /// # Panics
    /// Panics if the data-block region has no room left for the queue's
    /// first block.
    pub fn create_queue(&mut self) -> QueueHandle {
        if !allocator::is_initialized(&self.buffer) {
            allocator::init(&mut self.buffer);
        }

        let offset = allocator::reserve_queue_slot(&self.buffer);
        let block = allocator::alloc_block(&mut self.buffer);
        record::init(&mut self.buffer, offset, block);
        allocator::commit_queue_slot(&mut self.buffer, offset);

        QueueHandle(offset)
    }

    /// Destroy a queue, returning all of its blocks and its record to free
    /// state.
    ///
    /// # Panics
    /// Panics if `handle` has already been destroyed.
    pub fn destroy_queue(&mut self, handle: QueueHandle) {
        let offset = self.require_live(handle);

        let head = BlockOffset(record::first_block(&self.buffer, offset));
        allocator::free_chain(&mut self.buffer, head);
        allocator::free_queue_slot(&mut self.buffer, offset);
    }

    /// Append one byte to the tail of `handle`'s queue.
    ///
    /// # Panics
    /// Panics if `handle` has already been destroyed, or if a fresh block
    /// is needed and the data-block region has no room left for one.
    pub fn enqueue(&mut self, handle: QueueHandle, byte: u8) {
        let offset = self.require_live(handle);

        let size = record::size(&self.buffer, offset);
        let last = record::last(&self.buffer, offset);
        let mut tail = BlockOffset(record::last_block(&self.buffer, offset));

        let index = if last == (BLOCK_DATA_SIZE - 1) as i8 && size >= BLOCK_DATA_SIZE as u16 {
            let fresh = allocator::alloc_block(&mut self.buffer);
            block::set_next(&mut self.buffer, tail, fresh);
            tail = fresh;
            record::set_last_block(&mut self.buffer, offset, tail.get());
            record::set_last(&mut self.buffer, offset, 0);
            0u8
        } else {
            let next_last = (last + 1).rem_euclid(BLOCK_DATA_SIZE as i8);
            record::set_last(&mut self.buffer, offset, next_last);
            next_last as u8
        };

        block::set_byte(&mut self.buffer, tail, index, byte);
        record::set_size(&mut self.buffer, offset, size + 1);
    }

    /// Remove and return the oldest byte of `handle`'s queue.
    ///
    /// # Panics
    /// Panics if `handle` has already been destroyed, or if the queue is
    /// empty.
    pub fn dequeue(&mut self, handle: QueueHandle) -> u8 {
        let offset = self.require_live(handle);

        let size = record::size(&self.buffer, offset);
        if size == 0 {
            panic!("embqueue: illegal operation (dequeue from an empty queue)");
        }

        let head_block = BlockOffset(record::first_block(&self.buffer, offset));
        let first = record::first(&self.buffer, offset);
        let byte = block::byte(&self.buffer, head_block, first as u8);
        block::set_byte(&mut self.buffer, head_block, first as u8, 0);

        let size = size - 1;
        record::set_size(&mut self.buffer, offset, size);

        let tail_block = BlockOffset(record::last_block(&self.buffer, offset));
        let spans_two_blocks = head_block != tail_block;

        if spans_two_blocks && size < BLOCK_DATA_SIZE as u16 / 2 {
            merge(&mut self.buffer, offset);
        } else if first == (BLOCK_DATA_SIZE - 1) as i8 && size >= BLOCK_DATA_SIZE as u16 {
            let successor = match block::link(&self.buffer, head_block) {
                Link::Next(successor) => successor,
                _ => unreachable!("head block of a >=2-block chain must have a successor"),
            };
            allocator::free_block(&mut self.buffer, head_block);
            record::set_first_block(&mut self.buffer, offset, successor.get());
            record::set_first(&mut self.buffer, offset, 0);
        } else {
            let next_first = (first + 1).rem_euclid(BLOCK_DATA_SIZE as i8);
            record::set_first(&mut self.buffer, offset, next_first);
        }

        byte
    }

    /// Number of bytes currently stored in `handle`'s queue.
    ///
    /// # Panics
    /// Panics if `handle` has already been destroyed.
    pub fn len(&self, handle: QueueHandle) -> u16 {
        if record::is_free(&self.buffer, handle.0) {
            panic!("embqueue: illegal operation (queue handle is null or already destroyed)");
        }
        record::size(&self.buffer, handle.0)
    }

    /// Whether `handle`'s queue currently holds no bytes.
    ///
    /// # Panics
    /// Panics if `handle` has already been destroyed.
    pub fn is_empty(&self, handle: QueueHandle) -> bool {
        self.len(handle) == 0
    }

    fn require_live(&self, handle: QueueHandle) -> QueueOffset {
        if record::is_free(&self.buffer, handle.0) {
            panic!("embqueue: illegal operation (queue handle is null or already destroyed)");
        }
        handle.0
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

/// Compact a queue spanning exactly two sparsely-occupied blocks into one.
/// Copies backward from the logical last byte, switching from the tail
/// block to the head block when the source cursor wraps from −1 to 13,
/// then releases the head block.
fn merge(buffer: &mut Buffer, offset: QueueOffset) {
    let head = BlockOffset(record::first_block(buffer, offset));
    let tail = BlockOffset(record::last_block(buffer, offset));
    let size = record::size(buffer, offset);
    debug_assert!(size > 0, "merge only runs on a >=2-block queue, which can't hold 0 bytes in practice");

    let mut last = record::last(buffer, offset) as i32;
    let mut source = tail;
    for i in (0..size as i32).rev() {
        let byte = block::byte(buffer, source, last as u8);
        block::set_byte(buffer, tail, i as u8, byte);
        last -= 1;
        if last == -1 {
            last = (BLOCK_DATA_SIZE - 1) as i32;
            source = head;
        }
    }

    allocator::free_block(buffer, head);
    record::set_first_block(buffer, offset, tail.get());
    record::set_first(buffer, offset, 0);
    record::set_last(buffer, offset, (size - 1) as i8);
}
