//! This test ensures that a statically-allocated [`embqueue::Arena`] is not
//! placed in `.data`.
//!
//! `.data` holds non-zero-initialized global variables, which on most
//! embedded targets means the initializer bytes also live in flash. An
//! all-zero [`Arena`] (its natural starting state — the allocator
//! initializes itself lazily on first use, see the crate docs) has no
//! business costing flash for 2048 bytes of zeroes: it belongs in `.bss`.
//! This mirrors the identical hazard `emballoc` guards against for its own
//! heap buffer in its own `tests/sections.rs`.
use std::ptr;

static ARENA: embqueue::Arena = embqueue::Arena::new();

#[cfg(all(target_arch = "x86_64", target_os = "linux"))] // this is only tested on Linux
#[test]
fn ensure_that_arena_memory_is_not_initialized() {
    let memory_map = MemoryMap::new();
    let bss_start = memory_map.bss_start;
    let data_end = memory_map.data_end;
    assert_eq!(bss_start, data_end, "test assumes bss directly after data");

    let addr_arena = ptr::addr_of!(ARENA) as usize;
    assert!(addr_arena >= bss_start, "arena is placed in .data");
}

/// The (at runtime) reconstructed memory map containing addresses of sections.
struct MemoryMap {
    /// The end of the `.data`-section.
    data_end: usize,
    /// The start address of the `.bss`-section.
    bss_start: usize,
}
impl MemoryMap {
    pub fn new() -> Self {
        // The symbols defined in the (default) linker script
        extern "C" {
            static __bss_start: usize;
            static _edata: usize;
        }

        Self {
            data_end: unsafe { ptr::addr_of!(__bss_start) } as usize,
            bss_start: unsafe { ptr::addr_of!(_edata) } as usize,
        }
    }
}
