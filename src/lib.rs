//! Many independent FIFO byte queues, packed into one fixed 2048-byte
//! buffer.
//!
//! This crate provides a single type called [`Arena`]. An [`Arena`] is a
//! fixed 2048-byte region that can hold any number of independent FIFO byte
//! queues at once — a handful of queues with hundreds of bytes each, or
//! hundreds of tiny queues with a few bytes each — without ever growing
//! past its fixed size and without any bookkeeping outside that size. There
//! is no heap involved: `Arena::new()` is a `const fn`, so the whole thing
//! can live in a `static`.
//! ```no_run
//! static mut ARENA: embqueue::Arena = embqueue::Arena::new();
//! ```
//!
//! # Usage
//! ```
//! use embqueue::Arena;
//!
//! let mut arena = Arena::new();
//! let q = arena.create_queue();
//! arena.enqueue(q, b'h');
//! arena.enqueue(q, b'i');
//! assert_eq!(arena.dequeue(q), b'h');
//! assert_eq!(arena.dequeue(q), b'i');
//! arena.destroy_queue(q);
//! ```
//!
//! # Implementation
//! The 2048 bytes are split into three regions:
//! ```text
//! [ allocator state | queue records --> | ...free gap... | <-- data blocks ]
//!   offset 0..7        growing upward                       growing downward
//! ```
//! The first 8 bytes are a small header of four cursors tracking where each
//! region currently ends and where its next free slot is. Every *queue
//! record* (8 bytes: which block holds the oldest byte, which block holds
//! the newest, how many bytes are stored, and two cursors into those
//! blocks) lives in the low region, growing upward as queues are created.
//! Every *data block* (16 bytes: a 2-byte link to the next block in some
//! queue's chain, plus 14 payload bytes) lives in the high region, growing
//! downward as queues need storage. The two regions are allowed to meet but
//! never cross — allocating a block or a record when they would collide
//! reports out-of-memory (see [`Arena::create_queue`], [`Arena::enqueue`]).
//!
//! A queue with more than 14 bytes spans multiple blocks, linked in order
//! from oldest to newest. Each block is used as a circular buffer of its 14
//! bytes (so a queue's per-block cursors wrap around rather than leaving a
//! block's tail bytes behind once its head bytes are consumed). When a
//! two-block queue drains down to fewer than 7 bytes — half of one block —
//! [`Arena::dequeue`] compacts the two blocks into one, copying the live
//! bytes into the newer block and releasing the older one. This keeps a
//! queue from permanently pinning two blocks to hold what easily fits in
//! one.
//!
//! # Concurrency
//! [`Arena`] has no interior mutability: every method that touches queue
//! state takes `&mut self`, so the borrow checker enforces "exactly one
//! caller at a time" at compile time rather than with a runtime lock. A
//! host wanting to share one arena across threads must serialize access
//! itself (for example behind a mutex) — the same "conforming host must
//! serialize externally" contract an unsynchronized C global would need.
//!
//! # Errors
//! There are exactly two ways a call can fail, and both are unrecoverable
//! by design: running out of room in the data-block region, and misusing a
//! queue handle (using it after [`Arena::destroy_queue`], or dequeuing an
//! empty queue). Both are reported as panics with a distinct, descriptive
//! message — there is no `Result` to match on, because there is nothing a
//! caller could locally do to recover from either.
#![no_std]

mod allocator;
mod arena;
mod block;
mod buffer;
mod record;

pub use arena::{Arena, QueueHandle};
