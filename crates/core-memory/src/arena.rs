//! The temporary allocator: a per-thread bump arena with overflow pages.
//!
//! This is the normal scratch space for transient allocations (formatter
//! intermediates, encoding conversions). Individual frees are no-ops; callers
//! release everything at once with `FREE_ALL`, at which point any overflow
//! pages are merged into an enlarged base page so the next burst of the same
//! size doesn't page again.

use std::ptr;

use crate::alloc::{Allocator, AllocatorMode};
use crate::os;

/// Page sizes are kept at multiples of this.
const PAGE_GRANULARITY: i64 = 8 * 1024;

#[derive(Debug)]
pub struct Page {
    pub storage: *mut u8,
    pub reserved: i64,
    pub used: i64,
    pub next: *mut Page,
}

/// Backing state of one temporary allocator. Lives in thread-local storage;
/// each thread gets its own, so the allocator itself takes no locks.
#[derive(Debug)]
pub struct TemporaryStorage {
    pub base: Page,
    pub total_used: i64,
}

impl TemporaryStorage {
    pub const fn new() -> Self {
        TemporaryStorage {
            base: Page {
                storage: ptr::null_mut(),
                reserved: 0,
                used: 0,
                next: ptr::null_mut(),
            },
            total_used: 0,
        }
    }

    /// Sum of `reserved` over the base page and all overflow pages.
    pub fn total_reserved(&self) -> i64 {
        let mut total = self.base.reserved;
        let mut page = self.base.next;
        while !page.is_null() {
            unsafe {
                total += (*page).reserved;
                page = (*page).next;
            }
        }
        total
    }

    /// Number of overflow pages currently chained.
    pub fn overflow_page_count(&self) -> usize {
        let mut n = 0;
        let mut page = self.base.next;
        while !page.is_null() {
            n += 1;
            page = unsafe { (*page).next };
        }
        n
    }
}

impl Default for TemporaryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn round_up_to_granularity(size: i64) -> i64 {
    (size + PAGE_GRANULARITY - 1) / PAGE_GRANULARITY * PAGE_GRANULARITY
}

/// Growth target for a fresh overflow page after `last_reserved` filled up.
fn overflow_reserve_target(size: i64, last_reserved: i64) -> i64 {
    let doubled = ((size * 2).max(1) as u64).next_power_of_two() as i64;
    let log_grown = {
        let r = last_reserved as f64;
        ((((r * ((r * 10.0).log2() / 3.0)).ceil() as i64).max(1)) as u64).next_power_of_two() as i64
    };
    round_up_to_granularity(doubled.max(log_grown))
}

unsafe fn alloc_page_node(reserved: i64) -> *mut Page {
    let node = libc::malloc(std::mem::size_of::<Page>()) as *mut Page;
    node.write(Page {
        storage: os::os_allocate(reserved),
        reserved,
        used: 0,
        next: ptr::null_mut(),
    });
    node
}

/// The temporary allocator function. `context` is a [`TemporaryStorage`].
///
/// - `Allocate` bumps the first page with room, chaining an overflow page
///   when none has any.
/// - `Resize` succeeds only for the most recent allocation on its page.
/// - `Free` is a no-op.
/// - `FreeAll` drops the overflow pages, grows the base to their combined
///   size and resets the cursor.
pub unsafe fn temporary_allocator(
    mode: AllocatorMode,
    context: *mut u8,
    size: i64,
    old_ptr: *mut u8,
    old_size: i64,
    _flags: u64,
) -> *mut u8 {
    let data = &mut *(context as *mut TemporaryStorage);

    match mode {
        AllocatorMode::Allocate => {
            if data.base.storage.is_null() {
                let initial = round_up_to_granularity((size * 2).max(PAGE_GRANULARITY));
                data.base.storage = os::os_allocate(initial);
                if data.base.storage.is_null() {
                    return ptr::null_mut();
                }
                data.base.reserved = initial;
                tracing::debug!(target: "memory.temp", reserved = initial, "arena initialized");
            }

            // First fit over the page list.
            let mut page: *mut Page = &mut data.base;
            let mut last = page;
            while !page.is_null() {
                if (*page).used + size <= (*page).reserved {
                    break;
                }
                last = page;
                page = (*page).next;
            }

            if page.is_null() {
                let target = overflow_reserve_target(size, (*last).reserved);
                let fresh = alloc_page_node(target);
                if (*fresh).storage.is_null() {
                    libc::free(fresh as *mut libc::c_void);
                    return ptr::null_mut();
                }
                (*last).next = fresh;
                page = fresh;
                tracing::debug!(
                    target: "memory.temp",
                    reserved = target,
                    "arena overflow page chained"
                );
            }

            let result = (*page).storage.add((*page).used as usize);
            (*page).used += size;
            data.total_used += size;
            result
        }
        AllocatorMode::Resize => {
            // Only the most recent allocation on its page can be resized:
            // the block must end exactly at the page cursor.
            let mut page: *mut Page = &mut data.base;
            while !page.is_null() {
                let p = &mut *page;
                let is_tail = !old_ptr.is_null()
                    && old_ptr.add(old_size as usize) == p.storage.add(p.used as usize)
                    && old_ptr >= p.storage;
                if is_tail {
                    if p.used - old_size + size <= p.reserved {
                        p.used += size - old_size;
                        data.total_used += size - old_size;
                        return old_ptr;
                    }
                    return ptr::null_mut();
                }
                page = p.next;
            }
            ptr::null_mut()
        }
        AllocatorMode::Free => ptr::null_mut(),
        AllocatorMode::FreeAll => {
            // Headers of temporary allocations would dangle once the pages
            // are gone; drop them from the live list first.
            #[cfg(feature = "debug-memory")]
            crate::header::unlink_all_for(temporary_allocator, context);

            let mut target = data.base.reserved;
            let mut page = data.base.next;
            while !page.is_null() {
                let next = (*page).next;
                target += (*page).reserved;
                os::os_free((*page).storage);
                libc::free(page as *mut libc::c_void);
                page = next;
            }
            data.base.next = ptr::null_mut();

            if target != data.base.reserved {
                os::os_free(data.base.storage);
                data.base.storage = os::os_allocate(target);
                data.base.reserved = if data.base.storage.is_null() { 0 } else { target };
                tracing::debug!(
                    target: "memory.temp",
                    reserved = data.base.reserved,
                    "arena pages merged"
                );
            }

            data.base.used = 0;
            data.total_used = 0;
            ptr::null_mut()
        }
    }
}

/// Release every page of a temporary storage, including the base. Called when
/// a thread's context is torn down.
pub unsafe fn release_temporary_storage(data: *mut TemporaryStorage) {
    if (*data).base.storage.is_null() {
        return;
    }
    let alloc = Allocator {
        func: temporary_allocator,
        context: data as *mut u8,
    };
    alloc.free_all(crate::alloc::AllocFlags::empty());
    os::os_free((*data).base.storage);
    (*data).base.storage = ptr::null_mut();
    (*data).base.reserved = 0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::AllocFlags;

    fn arena_with(storage: &mut TemporaryStorage) -> Allocator {
        Allocator {
            func: temporary_allocator,
            context: storage as *mut TemporaryStorage as *mut u8,
        }
    }

    #[test]
    fn bump_and_free_all_resets() {
        let mut storage = TemporaryStorage::new();
        let alloc = arena_with(&mut storage);

        let a = alloc.allocate_aligned(100, 8, AllocFlags::empty());
        let b = alloc.allocate_aligned(200, 8, AllocFlags::empty());
        assert!(!a.is_null() && !b.is_null());
        assert!(storage.total_used > 0);

        assert!(alloc.free_all(AllocFlags::empty()));
        assert_eq!(storage.total_used, 0);
        assert_eq!(storage.base.used, 0);

        unsafe { release_temporary_storage(&mut storage) };
    }

    #[test]
    fn individual_free_is_noop() {
        let mut storage = TemporaryStorage::new();
        let alloc = arena_with(&mut storage);
        let p = alloc.allocate_aligned(64, 8, AllocFlags::empty());
        let used = storage.total_used;
        unsafe { crate::alloc::free(p, AllocFlags::empty()) };
        assert_eq!(storage.total_used, used);
        unsafe { release_temporary_storage(&mut storage) };
    }

    #[test]
    fn overflow_pages_chain_and_merge() {
        let mut storage = TemporaryStorage::new();
        let alloc = arena_with(&mut storage);

        // 10 x 16 KiB overflows the initial base page several times over.
        for _ in 0..10 {
            let p = alloc.allocate_aligned(16 * 1024, 8, AllocFlags::empty());
            assert!(!p.is_null());
        }
        assert!(storage.overflow_page_count() > 0);
        let combined = storage.total_reserved();

        assert!(alloc.free_all(AllocFlags::empty()));
        assert_eq!(storage.total_used, 0);
        assert_eq!(storage.overflow_page_count(), 0);
        assert!(storage.base.reserved >= combined);

        // The grown base should now absorb the same burst without paging.
        for _ in 0..10 {
            let p = alloc.allocate_aligned(16 * 1024, 8, AllocFlags::empty());
            assert!(!p.is_null());
        }
        assert_eq!(storage.overflow_page_count(), 0);

        alloc.free_all(AllocFlags::empty());
        unsafe { release_temporary_storage(&mut storage) };
    }

    #[test]
    fn resize_tail_allocation_in_place() {
        let mut storage = TemporaryStorage::new();
        let alloc = arena_with(&mut storage);

        let a = alloc.allocate_aligned(64, 8, AllocFlags::empty());
        let grown = unsafe { crate::alloc::reallocate(a, 128, AllocFlags::empty()) };
        // Tail block grows in place.
        assert_eq!(grown, a);

        let _b = alloc.allocate_aligned(16, 8, AllocFlags::empty());
        // No longer the tail: reallocate moves it instead.
        let moved = unsafe { crate::alloc::reallocate(grown, 256, AllocFlags::empty()) };
        assert!(!moved.is_null());
        assert_ne!(moved, grown);

        alloc.free_all(AllocFlags::empty());
        unsafe { release_temporary_storage(&mut storage) };
    }

    #[test]
    fn page_sizes_are_granular() {
        assert_eq!(round_up_to_granularity(1), PAGE_GRANULARITY);
        assert_eq!(round_up_to_granularity(PAGE_GRANULARITY), PAGE_GRANULARITY);
        assert_eq!(
            round_up_to_granularity(PAGE_GRANULARITY + 1),
            2 * PAGE_GRANULARITY
        );
        let t = overflow_reserve_target(100, 8192);
        assert_eq!(t % PAGE_GRANULARITY, 0);
        assert!(t >= 8192);
    }
}
