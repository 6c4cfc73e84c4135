//! Basic ordering and multi-block chains.
use embqueue::Arena;

#[test]
fn single_byte_round_trips() {
    let mut arena = Arena::new();
    let q = arena.create_queue();
    arena.enqueue(q, 42);
    assert_eq!(arena.dequeue(q), 42);
}

#[test]
fn bytes_come_out_in_enqueue_order_within_one_block() {
    let mut arena = Arena::new();
    let q = arena.create_queue();
    for b in 0..10u8 {
        arena.enqueue(q, b);
    }
    for b in 0..10u8 {
        assert_eq!(arena.dequeue(q), b);
    }
}

#[test]
fn crossing_a_block_boundary_preserves_order() {
    // One block holds 14 bytes; enqueueing 20 forces at least two blocks.
    let mut arena = Arena::new();
    let q = arena.create_queue();
    for b in 0..20u8 {
        arena.enqueue(q, b);
    }
    for b in 0..20u8 {
        assert_eq!(arena.dequeue(q), b);
    }
    assert!(arena.is_empty(q));
}

#[test]
fn queue_is_reusable_after_fully_draining() {
    let mut arena = Arena::new();
    let q = arena.create_queue();
    for b in 0..20u8 {
        arena.enqueue(q, b);
    }
    for _ in 0..20 {
        arena.dequeue(q);
    }
    // The queue collapsed back to one block via repeated merges; it must
    // still behave like a fresh queue.
    arena.enqueue(q, 99);
    assert_eq!(arena.dequeue(q), 99);
}

#[test]
fn many_small_queues_coexist() {
    let mut arena = Arena::new();
    let handles: alloc_free_vec::Array = {
        let mut v = alloc_free_vec::Array::new();
        for _ in 0..20 {
            v.push(arena.create_queue());
        }
        v
    };
    for (i, &h) in handles.iter().enumerate() {
        arena.enqueue(h, i as u8);
    }
    for (i, &h) in handles.iter().enumerate() {
        assert_eq!(arena.dequeue(h), i as u8);
        arena.destroy_queue(h);
    }
}

/// A tiny fixed-capacity array, since this integration test intentionally
/// avoids pulling in `alloc` just to hold a handful of queue handles.
mod alloc_free_vec {
    use embqueue::QueueHandle;

    pub struct Array {
        items: [Option<QueueHandle>; 32],
        len: usize,
    }

    impl Array {
        pub fn new() -> Self {
            Self {
                items: [None; 32],
                len: 0,
            }
        }

        pub fn push(&mut self, handle: QueueHandle) {
            self.items[self.len] = Some(handle);
            self.len += 1;
        }

        pub fn iter(&self) -> impl Iterator<Item = &QueueHandle> {
            self.items[..self.len].iter().map(|h| h.as_ref().unwrap())
        }
    }
}
