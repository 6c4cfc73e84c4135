//! Out-of-memory must fire reliably and must not corrupt earlier queues.
use embqueue::Arena;

#[test]
fn running_out_of_blocks_does_not_corrupt_earlier_queues() {
    let mut arena = Arena::new();

    // Create one queue up front and give it a recognizable payload so we
    // can confirm it still drains correctly after exhaustion.
    let survivor = arena.create_queue();
    for b in 0..5u8 {
        arena.enqueue(survivor, b);
    }

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        loop {
            arena.create_queue();
        }
    }));
    assert!(result.is_err(), "out-of-memory must panic eventually");

    for b in 0..5u8 {
        assert_eq!(arena.dequeue(survivor), b);
    }
}

#[test]
#[should_panic(expected = "out of memory")]
fn exhaustion_panic_names_the_failure_kind() {
    let mut arena = Arena::new();
    loop {
        arena.create_queue();
    }
}
