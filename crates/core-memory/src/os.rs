//! Raw OS page allocation.
//!
//! Everything above this module goes through allocator vtables; this is the
//! one place that actually asks the operating system for memory. Mappings
//! carry a small preamble recording their length so `os_free` / `os_resize`
//! don't need the caller to remember it.

use std::ptr;

/// Bytes reserved in front of every mapping for the length record.
/// Kept at 16 so the pointer we hand out stays 16-byte aligned.
const PREAMBLE: usize = 16;

#[cfg(unix)]
pub fn os_page_size() -> i64 {
    // SAFETY: sysconf with a valid name has no preconditions.
    unsafe { libc::sysconf(libc::_SC_PAGESIZE) as i64 }
}

#[cfg(not(unix))]
pub fn os_page_size() -> i64 {
    4096
}

/// Map `size` bytes of fresh pages. Returns null when the OS refuses.
#[cfg(unix)]
pub fn os_allocate(size: i64) -> *mut u8 {
    debug_assert!(size > 0);
    let total = size as usize + PREAMBLE;
    // SAFETY: anonymous private mapping; we check the result before use.
    let raw = unsafe {
        libc::mmap(
            ptr::null_mut(),
            total,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0,
        )
    };
    if raw == libc::MAP_FAILED {
        return ptr::null_mut();
    }
    // SAFETY: the mapping is at least PREAMBLE bytes and writable.
    unsafe {
        (raw as *mut usize).write(total);
        (raw as *mut u8).add(PREAMBLE)
    }
}

#[cfg(not(unix))]
pub fn os_allocate(size: i64) -> *mut u8 {
    use std::alloc::{alloc, Layout};
    let total = size as usize + PREAMBLE;
    let layout = Layout::from_size_align(total, PREAMBLE).expect("os allocation layout");
    // SAFETY: non-zero size layout.
    unsafe {
        let raw = alloc(layout);
        if raw.is_null() {
            return ptr::null_mut();
        }
        (raw as *mut usize).write(total);
        raw.add(PREAMBLE)
    }
}

/// Unmap a block returned by [`os_allocate`]. Null is a no-op.
///
/// # Safety
/// `ptr` must be null or a pointer previously returned by [`os_allocate`]
/// that has not been freed yet.
#[cfg(unix)]
pub unsafe fn os_free(ptr: *mut u8) {
    if ptr.is_null() {
        return;
    }
    let raw = ptr.sub(PREAMBLE);
    let total = (raw as *mut usize).read();
    libc::munmap(raw as *mut libc::c_void, total);
}

#[cfg(not(unix))]
pub unsafe fn os_free(ptr: *mut u8) {
    use std::alloc::{dealloc, Layout};
    if ptr.is_null() {
        return;
    }
    let raw = ptr.sub(PREAMBLE);
    let total = (raw as *mut usize).read();
    let layout = Layout::from_size_align(total, PREAMBLE).expect("os allocation layout");
    dealloc(raw, layout);
}

/// Try to grow/shrink a mapping in place. We never remap, so the only case
/// that succeeds is a new size that still fits the existing mapping.
///
/// # Safety
/// Same contract as [`os_free`] for `ptr`.
pub unsafe fn os_resize(ptr: *mut u8, new_size: i64) -> *mut u8 {
    if ptr.is_null() {
        return ptr::null_mut();
    }
    let raw = ptr.sub(PREAMBLE);
    let total = (raw as *mut usize).read();
    if new_size as usize + PREAMBLE <= total {
        return ptr;
    }
    ptr::null_mut()
}
