//! Per-allocation headers.
//!
//! Every block handed out by [`crate::alloc`] is preceded by an
//! [`AllocationHeader`] stored immediately before the user pointer:
//!
//! ```text
//! ...[..alignment padding..][.........header.........][payload][fence]
//!    ^ block returned by the allocator fn             ^ user pointer (aligned)
//! ```
//!
//! With the `debug-memory` feature, headers are also linked into a global
//! list of live allocations, fence bytes guard both ends of the payload and
//! freed/uninitialized memory gets deterministic fills. The fill values are
//! the classic debug-CRT ones: non-zero, odd, large and atypical, which makes
//! the common classes of memory bugs fail fast and reproducibly.

use crate::alloc::AllocatorFn;

#[cfg(feature = "debug-memory")]
use parking_lot::Mutex;

/// Fence length on each side of the payload (`debug-memory` only).
pub const NO_MANS_LAND_SIZE: usize = 4;
/// Byte written into fences.
pub const NO_MANS_LAND_FILL: u8 = 0xFD;
/// Byte written over freed payloads.
pub const DEAD_LAND_FILL: u8 = 0xDD;
/// Byte written over fresh payloads when `DO_INIT_0` was not requested.
pub const CLEAN_LAND_FILL: u8 = 0xCD;

/// Metadata stored immediately before every payload.
#[repr(C)]
pub struct AllocationHeader {
    #[cfg(feature = "debug-memory")]
    pub(crate) debug_next: *mut AllocationHeader,
    #[cfg(feature = "debug-memory")]
    pub(crate) debug_prev: *mut AllocationHeader,

    /// Unique, monotonically increasing id. Reproducible run to run in a
    /// single-threaded program, which makes it a better breakpoint anchor
    /// than file/line.
    pub id: u32,

    /// Incremented every time this block is resized in place.
    pub rid: u32,

    /// The allocator that produced the block; `free` recovers it from here.
    pub alloc_fn: AllocatorFn,
    pub alloc_context: *mut u8,

    /// Payload size, excluding header and padding.
    pub size: i64,

    /// Opaque tag written by containers to tie a block to its owner.
    pub owner: *mut u8,

    #[cfg(feature = "debug-memory")]
    pub(crate) debug_pointer: *mut u8,

    /// Alignment the payload was allocated with.
    pub alignment: u16,
    /// Bytes inserted before the header so the payload lands aligned.
    pub alignment_padding: u16,

    /// Free slot for the caller.
    pub user_data: *mut u8,

    #[cfg(feature = "debug-memory")]
    pub(crate) no_mans_land: [u8; NO_MANS_LAND_SIZE],
}

pub const HEADER_SIZE: usize = std::mem::size_of::<AllocationHeader>();

/// Recover the header of a payload pointer.
///
/// # Safety
/// `payload` must be a live pointer returned by this crate's allocation
/// front-ends.
#[inline]
pub unsafe fn header_of<'a>(payload: *mut u8) -> &'a mut AllocationHeader {
    &mut *(payload.sub(HEADER_SIZE) as *mut AllocationHeader)
}

/// Payload pointer of a header.
#[inline]
pub unsafe fn payload_of(header: *mut AllocationHeader) -> *mut u8 {
    (header as *mut u8).add(HEADER_SIZE)
}

/// Padding that must precede `ptr` so `ptr + padding` is `alignment`-aligned.
#[inline]
pub fn padding_for_pointer(ptr: *const u8, alignment: usize) -> usize {
    debug_assert!(alignment > 0 && alignment.is_power_of_two());
    (ptr as usize).wrapping_neg() & (alignment - 1)
}

/// Like [`padding_for_pointer`] but guarantees room for a header inside the
/// padding, i.e. `ptr + result` is aligned and `result >= header_size`.
pub fn padding_for_pointer_with_header(ptr: *const u8, alignment: usize, header_size: usize) -> usize {
    let mut padding = padding_for_pointer(ptr, alignment);
    if padding < header_size {
        let missing = header_size - padding;
        padding += alignment * missing.div_ceil(alignment);
    }
    padding
}

#[cfg(feature = "debug-memory")]
struct LiveList {
    head: *mut AllocationHeader,
}

// The list only stores pointers to headers that outlive their list membership;
// all access happens under the mutex.
#[cfg(feature = "debug-memory")]
unsafe impl Send for LiveList {}

#[cfg(feature = "debug-memory")]
static LIVE: Mutex<LiveList> = Mutex::new(LiveList {
    head: std::ptr::null_mut(),
});

/// Link a freshly written header at the front of the live list.
#[cfg(feature = "debug-memory")]
pub(crate) unsafe fn link_header(header: *mut AllocationHeader) {
    let mut live = LIVE.lock();
    (*header).debug_prev = std::ptr::null_mut();
    (*header).debug_next = live.head;
    if !live.head.is_null() {
        (*live.head).debug_prev = header;
    }
    live.head = header;
}

/// Remove a header from the live list.
#[cfg(feature = "debug-memory")]
pub(crate) unsafe fn unlink_header(header: *mut AllocationHeader) {
    let mut live = LIVE.lock();
    let prev = (*header).debug_prev;
    let next = (*header).debug_next;
    if !prev.is_null() {
        (*prev).debug_next = next;
    } else if live.head == header {
        live.head = next;
    }
    if !next.is_null() {
        (*next).debug_prev = prev;
    }
    (*header).debug_prev = std::ptr::null_mut();
    (*header).debug_next = std::ptr::null_mut();
}

/// Drop every live header that belongs to the given allocator. Called by
/// allocators that implement `FREE_ALL` so the list doesn't keep pointers
/// into released storage.
#[cfg(feature = "debug-memory")]
pub unsafe fn unlink_all_for(alloc_fn: AllocatorFn, alloc_context: *mut u8) {
    let mut live = LIVE.lock();
    let mut cur = live.head;
    while !cur.is_null() {
        let next = (*cur).debug_next;
        if (*cur).alloc_fn == alloc_fn && (*cur).alloc_context == alloc_context {
            let prev = (*cur).debug_prev;
            if !prev.is_null() {
                (*prev).debug_next = next;
            } else {
                live.head = next;
            }
            if !next.is_null() {
                (*next).debug_prev = prev;
            }
        }
        cur = next;
    }
}

/// Check a single header's fences and identity field.
///
/// # Safety
/// `header` must point at a live header produced by this crate.
#[cfg(feature = "debug-memory")]
pub unsafe fn verify_header(header: *mut AllocationHeader) {
    let h = &*header;
    assert!(
        h.debug_pointer == payload_of(header),
        "allocation header is corrupt (id {}): payload back-pointer mismatch",
        h.id
    );
    assert!(
        h.no_mans_land == [NO_MANS_LAND_FILL; NO_MANS_LAND_SIZE],
        "heap corruption before block id {}: write underflowed into the header fence",
        h.id
    );
    let after = payload_of(header).add(h.size as usize);
    for i in 0..NO_MANS_LAND_SIZE {
        assert!(
            *after.add(i) == NO_MANS_LAND_FILL,
            "heap corruption after block id {}: write overflowed past the payload",
            h.id
        );
    }
}

#[cfg(not(feature = "debug-memory"))]
pub unsafe fn verify_header(_header: *mut AllocationHeader) {}

/// Walk the whole live list verifying every header.
#[cfg(feature = "debug-memory")]
pub fn verify_heap() {
    let live = LIVE.lock();
    let mut cur = live.head;
    let mut seen_prev: *mut AllocationHeader = std::ptr::null_mut();
    while !cur.is_null() {
        unsafe {
            assert!(
                (*cur).debug_prev == seen_prev,
                "live-allocation list is inconsistent at block id {}",
                (*cur).id
            );
            verify_header(cur);
            seen_prev = cur;
            cur = (*cur).debug_next;
        }
    }
}

#[cfg(not(feature = "debug-memory"))]
pub fn verify_heap() {}

/// Number of live allocations currently linked (0 when `debug-memory` is off).
pub fn live_allocation_count() -> usize {
    #[cfg(feature = "debug-memory")]
    {
        let live = LIVE.lock();
        let mut n = 0;
        let mut cur = live.head;
        while !cur.is_null() {
            n += 1;
            cur = unsafe { (*cur).debug_next };
        }
        n
    }
    #[cfg(not(feature = "debug-memory"))]
    {
        0
    }
}

/// Log every live allocation through `tracing`. Meant to run at process
/// termination when `Context.check_for_leaks_at_termination` is set.
pub fn report_leaks() -> usize {
    #[cfg(feature = "debug-memory")]
    {
        let live = LIVE.lock();
        let mut n = 0;
        let mut cur = live.head;
        while !cur.is_null() {
            unsafe {
                tracing::warn!(
                    target: "memory",
                    id = (*cur).id,
                    size = (*cur).size,
                    rid = (*cur).rid,
                    "leaked allocation"
                );
                n += 1;
                cur = (*cur).debug_next;
            }
        }
        n
    }
    #[cfg(not(feature = "debug-memory"))]
    {
        0
    }
}
