//! Memory substrate: allocator vtables, per-allocation headers, the default
//! heap and per-thread temporary arena, and the implicit context.
//!
//! The layering is strict: [`os`] talks to the operating system, [`alloc`]
//! defines the allocator calling convention and the header-aware front-ends,
//! [`arena`] implements the temporary allocator on top of OS pages, and
//! [`context`] carries the thread-local defaults everything above consults.
//!
//! Allocation is always explicit. Containers and the formatter allocate
//! through the context's current allocator, which callers swap for a scope:
//!
//! ```
//! use core_memory::context::{temporary_allocator, with_alloc, context};
//! use core_memory::alloc::AllocFlags;
//!
//! let temp = temporary_allocator();
//! with_alloc(temp, || {
//!     let scratch = context().alloc.allocate(256, AllocFlags::empty());
//!     assert!(!scratch.is_null());
//!     // no free: the arena reclaims everything at once
//! });
//! temp.free_all(AllocFlags::empty());
//! ```

pub mod alloc;
pub mod arena;
pub mod context;
pub mod header;
pub mod os;

pub use alloc::{
    default_allocator, free, os_allocator, reallocate, AllocError, AllocFlags, Allocator,
    AllocatorFn, AllocatorMode, FREE_ALL_UNSUPPORTED, MALLOC, OS_ALLOC,
};
pub use arena::TemporaryStorage;
pub use context::{
    context, context_panic, fmt_parse_error, push_context, set_context, spawn_with_context,
    temporary_allocator, with_alignment, with_alloc, with_context_var, with_log, Context,
    ContextGuard, FmtParseErrorHandler, Locale, LogHandle, LogWriter, PanicHandler,
};
pub use header::{header_of, verify_heap, AllocationHeader, HEADER_SIZE};
