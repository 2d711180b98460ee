//! Allocator vtables and the allocation front-ends.
//!
//! An allocator is a plain `{ fn, context }` pair. The function is called
//! with a mode and operates on *raw* blocks; headers, alignment padding,
//! fences and fills are all handled here, above the allocator, so
//! implementations stay small. Third-party allocators plug in by conforming
//! to [`AllocatorFn`].

use std::ptr;
use std::sync::atomic::{AtomicU32, Ordering};

use bitflags::bitflags;
use thiserror::Error;

use crate::header::{
    self, header_of, padding_for_pointer_with_header, AllocationHeader, HEADER_SIZE,
};
use crate::os;

/// What an allocator function is being asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocatorMode {
    /// Return a fresh block of `size` bytes, or null on OOM.
    Allocate,
    /// Grow or shrink `old_ptr` **in place**. The only valid returns are
    /// `old_ptr` (success) or null (can't; the caller will move the block).
    /// This is deliberately not "realloc".
    Resize,
    /// Release `old_ptr`. Null is a no-op.
    Free,
    /// Release everything this allocator owns. Optional; allocators that
    /// don't support it return [`FREE_ALL_UNSUPPORTED`].
    FreeAll,
}

/// Returned from a `FreeAll` call by allocators that don't support it.
pub const FREE_ALL_UNSUPPORTED: *mut u8 = usize::MAX as *mut u8;

/// The one calling convention shared by every allocator.
///
/// `size` and `old_size` are raw block sizes (header and padding included);
/// the front-ends below do that accounting. The final `u64` carries user
/// flags, forwarded verbatim from the call site.
pub type AllocatorFn = unsafe fn(
    mode: AllocatorMode,
    context: *mut u8,
    size: i64,
    old_ptr: *mut u8,
    old_size: i64,
    flags: u64,
) -> *mut u8;

bitflags! {
    /// User flags accepted by the allocation front-ends.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AllocFlags: u64 {
        /// Zero the returned payload (handled above the allocator).
        const DO_INIT_0 = 1 << 31;
    }
}

/// Largest alignment we can record in the header.
pub const MAX_ALIGNMENT: usize = 1 << 15;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocError {
    #[error("out of memory allocating {size} bytes")]
    OutOfMemory { size: i64 },
    #[error("invalid alignment {align} (must be a power of two <= {MAX_ALIGNMENT})")]
    BadAlignment { align: usize },
}

/// An allocator handle: a function and the state it closes over.
#[derive(Clone, Copy)]
pub struct Allocator {
    pub func: AllocatorFn,
    pub context: *mut u8,
}

impl PartialEq for Allocator {
    fn eq(&self, other: &Self) -> bool {
        self.func as usize == other.func as usize && self.context == other.context
    }
}
impl Eq for Allocator {}

impl std::fmt::Debug for Allocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Allocator")
            .field("func", &(self.func as usize))
            .field("context", &self.context)
            .finish()
    }
}

// Allocator functions must be callable from any thread; the temporary
// allocator's per-thread contract is enforced by never sharing its handle.
unsafe impl Send for Allocator {}

static ALLOCATION_COUNT: AtomicU32 = AtomicU32::new(0);

/// Total fence overhead after the payload.
#[cfg(feature = "debug-memory")]
const TAIL_FENCE: usize = header::NO_MANS_LAND_SIZE;
#[cfg(not(feature = "debug-memory"))]
const TAIL_FENCE: usize = 0;

impl Allocator {
    /// Allocate `size` bytes at the context's default alignment.
    pub fn allocate(self, size: i64, flags: AllocFlags) -> *mut u8 {
        self.allocate_aligned(size, crate::context::context().alloc_alignment as usize, flags)
    }

    /// Allocate `size` bytes aligned to `align` (power of two).
    pub fn allocate_aligned(self, size: i64, align: usize, flags: AllocFlags) -> *mut u8 {
        match self.try_allocate_aligned(size, align, flags) {
            Ok(p) => p,
            Err(AllocError::OutOfMemory { .. }) => ptr::null_mut(),
            Err(e @ AllocError::BadAlignment { .. }) => {
                crate::context::context_panic(&format!("{e}"));
            }
        }
    }

    /// Like [`Self::allocate_aligned`] with a typed error instead of null.
    pub fn try_allocate_aligned(
        self,
        size: i64,
        align: usize,
        flags: AllocFlags,
    ) -> Result<*mut u8, AllocError> {
        if !align.is_power_of_two() || align > MAX_ALIGNMENT {
            return Err(AllocError::BadAlignment { align });
        }
        debug_assert!(size >= 0);

        // Worst case we need `align` bytes of padding in front of the header
        // plus the tail fence behind the payload.
        let raw_size = size + (HEADER_SIZE + align + TAIL_FENCE) as i64;

        // SAFETY: the allocator contract for Allocate has no preconditions.
        let raw = unsafe {
            (self.func)(
                AllocatorMode::Allocate,
                self.context,
                raw_size,
                ptr::null_mut(),
                0,
                flags.bits(),
            )
        };
        if raw.is_null() {
            tracing::debug!(target: "memory", size, "allocation failed");
            return Err(AllocError::OutOfMemory { size });
        }

        // SAFETY: `raw` is a fresh block of `raw_size` bytes.
        unsafe { Ok(encode_header(raw, size, align, self.func, self.context, flags)) }
    }

    /// Release everything this allocator owns. Returns false when the
    /// allocator doesn't support `FreeAll`.
    pub fn free_all(self, flags: AllocFlags) -> bool {
        // SAFETY: FreeAll has no pointer preconditions.
        let r = unsafe {
            (self.func)(
                AllocatorMode::FreeAll,
                self.context,
                0,
                ptr::null_mut(),
                0,
                flags.bits(),
            )
        };
        r != FREE_ALL_UNSUPPORTED
    }
}

/// Write the header in front of the payload, apply fills and fences, link
/// into the live list.
///
/// # Safety
/// `raw` must point to a fresh block big enough for
/// `user_size + HEADER_SIZE + align + TAIL_FENCE`.
unsafe fn encode_header(
    raw: *mut u8,
    user_size: i64,
    align: usize,
    func: AllocatorFn,
    context: *mut u8,
    flags: AllocFlags,
) -> *mut u8 {
    let padding = padding_for_pointer_with_header(raw, align, HEADER_SIZE);
    debug_assert!(padding >= HEADER_SIZE && padding <= HEADER_SIZE + align);

    let user = raw.add(padding);
    let header_ptr = user.sub(HEADER_SIZE) as *mut AllocationHeader;

    header_ptr.write(AllocationHeader {
        #[cfg(feature = "debug-memory")]
        debug_next: ptr::null_mut(),
        #[cfg(feature = "debug-memory")]
        debug_prev: ptr::null_mut(),
        id: ALLOCATION_COUNT.fetch_add(1, Ordering::Relaxed),
        rid: 0,
        alloc_fn: func,
        alloc_context: context,
        size: user_size,
        owner: ptr::null_mut(),
        #[cfg(feature = "debug-memory")]
        debug_pointer: user,
        alignment: align as u16,
        alignment_padding: (padding - HEADER_SIZE) as u16,
        user_data: ptr::null_mut(),
        #[cfg(feature = "debug-memory")]
        no_mans_land: [header::NO_MANS_LAND_FILL; header::NO_MANS_LAND_SIZE],
    });

    #[cfg(feature = "debug-memory")]
    {
        user.add(user_size as usize)
            .write_bytes(header::NO_MANS_LAND_FILL, header::NO_MANS_LAND_SIZE);
        if !flags.contains(AllocFlags::DO_INIT_0) {
            user.write_bytes(header::CLEAN_LAND_FILL, user_size as usize);
        }
        header::link_header(header_ptr);
    }
    let _ = header_ptr;

    if flags.contains(AllocFlags::DO_INIT_0) {
        user.write_bytes(0, user_size as usize);
    }

    user
}

/// Raw block start of a payload (undoes header + padding) and the size that
/// was requested from the allocator for it. The requested size uses the
/// worst-case padding (`align`), not the padding that happened to apply, so
/// it matches what bump-style allocators advanced their cursor by.
#[inline]
unsafe fn raw_block_of(payload: *mut u8) -> (*mut u8, i64) {
    let h = header_of(payload);
    let raw = payload.sub(h.alignment_padding as usize + HEADER_SIZE);
    let raw_size = h.size + (HEADER_SIZE + h.alignment as usize + TAIL_FENCE) as i64;
    (raw, raw_size)
}

/// Resize a block, moving it if the allocator can't grow in place.
///
/// Null `ptr` is a no-op returning null; `new_size == 0` frees and returns
/// null. The allocation id survives a move, `rid` counts the resizes.
///
/// # Safety
/// `ptr` must be null or a live pointer returned by these front-ends.
pub unsafe fn reallocate(ptr: *mut u8, new_size: i64, flags: AllocFlags) -> *mut u8 {
    if ptr.is_null() {
        return ptr::null_mut();
    }
    if new_size == 0 {
        free(ptr, flags);
        return ptr::null_mut();
    }

    header::verify_header(header_of(ptr) as *mut AllocationHeader);

    let h = header_of(ptr);
    let old_size = h.size;
    if old_size == new_size {
        return ptr;
    }

    let func = h.alloc_fn;
    let context = h.alloc_context;
    let align = h.alignment as usize;
    let (raw, raw_size) = raw_block_of(ptr);
    let new_raw_size = raw_size - old_size + new_size;

    // First give the allocator a chance to grow/shrink in place.
    let resized = (func)(
        AllocatorMode::Resize,
        context,
        new_raw_size,
        raw,
        raw_size,
        flags.bits(),
    );
    if !resized.is_null() {
        debug_assert!(resized == raw, "Resize must return the old block or null");
        let h = header_of(ptr);
        h.size = new_size;
        h.rid += 1;
        #[cfg(feature = "debug-memory")]
        {
            if new_size > old_size && !flags.contains(AllocFlags::DO_INIT_0) {
                ptr.add(old_size as usize)
                    .write_bytes(header::CLEAN_LAND_FILL, (new_size - old_size) as usize);
            }
            ptr.add(new_size as usize)
                .write_bytes(header::NO_MANS_LAND_FILL, header::NO_MANS_LAND_SIZE);
        }
        if flags.contains(AllocFlags::DO_INIT_0) && new_size > old_size {
            ptr.add(old_size as usize).write_bytes(0, (new_size - old_size) as usize);
        }
        return ptr;
    }

    // Moving is our job, not the allocator's: allocate, copy, free.
    let alloc = Allocator { func, context };
    let fresh = alloc.allocate_aligned(new_size, align, flags);
    if fresh.is_null() {
        return ptr::null_mut();
    }
    ptr::copy_nonoverlapping(ptr, fresh, old_size.min(new_size) as usize);

    let (old_id, old_rid, owner, user_data) = {
        let h = header_of(ptr);
        (h.id, h.rid, h.owner, h.user_data)
    };
    free(ptr, flags);

    let nh = header_of(fresh);
    nh.id = old_id;
    nh.rid = old_rid + 1;
    nh.owner = owner;
    nh.user_data = user_data;
    fresh
}

/// Free a block. Null is a no-op. The allocator that produced the block is
/// recovered from its header, so this is a free function, not a method.
///
/// # Safety
/// `ptr` must be null or a live pointer returned by these front-ends.
pub unsafe fn free(ptr: *mut u8, flags: AllocFlags) {
    if ptr.is_null() {
        return;
    }

    let header_ptr = header_of(ptr) as *mut AllocationHeader;
    header::verify_header(header_ptr);

    let h = header_of(ptr);
    let func = h.alloc_fn;
    let context = h.alloc_context;
    let (raw, raw_size) = raw_block_of(ptr);

    #[cfg(feature = "debug-memory")]
    {
        header::unlink_header(header_ptr);
        ptr.write_bytes(header::DEAD_LAND_FILL, h.size as usize);
    }

    (func)(AllocatorMode::Free, context, 0, raw, raw_size, flags.bits());
}

//
// Default allocator: general-purpose heap over libc. Thread-safe.
//

/// General-purpose heap allocator (the `Malloc` of this library).
///
/// `Resize` is always refused: libc's heap can't grow a block in place
/// without permission to move it, and moving is the front-end's concern.
pub unsafe fn default_allocator(
    mode: AllocatorMode,
    _context: *mut u8,
    size: i64,
    old_ptr: *mut u8,
    _old_size: i64,
    _flags: u64,
) -> *mut u8 {
    match mode {
        AllocatorMode::Allocate => libc::malloc(size as libc::size_t) as *mut u8,
        AllocatorMode::Resize => ptr::null_mut(),
        AllocatorMode::Free => {
            libc::free(old_ptr as *mut libc::c_void);
            ptr::null_mut()
        }
        AllocatorMode::FreeAll => FREE_ALL_UNSUPPORTED,
    }
}

/// The default allocator handle.
pub const MALLOC: Allocator = Allocator {
    func: default_allocator,
    context: ptr::null_mut(),
};

//
// OS allocator: thin pass-through to page allocation. Used for bootstrapping
// and by the temporary allocator's pages.
//

pub unsafe fn os_allocator(
    mode: AllocatorMode,
    _context: *mut u8,
    size: i64,
    old_ptr: *mut u8,
    _old_size: i64,
    _flags: u64,
) -> *mut u8 {
    match mode {
        AllocatorMode::Allocate => os::os_allocate(size),
        AllocatorMode::Resize => os::os_resize(old_ptr, size),
        AllocatorMode::Free => {
            os::os_free(old_ptr);
            ptr::null_mut()
        }
        AllocatorMode::FreeAll => FREE_ALL_UNSUPPORTED,
    }
}

pub const OS_ALLOC: Allocator = Allocator {
    func: os_allocator,
    context: ptr::null_mut(),
};
