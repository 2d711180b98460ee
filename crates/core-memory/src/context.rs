//! The implicit context: a plain-value, thread-local bundle of defaults.
//!
//! Every thread carries one [`Context`]. Library code reads the current
//! allocator, alignment, log writer, locale and error handlers from it
//! instead of taking them as parameters, so callers can redirect behavior for
//! a whole call tree by pushing an override for the duration of a scope.
//! Overrides are restored on every exit path, including panics, by a drop
//! guard.
//!
//! Spawning a thread through [`spawn_with_context`] copies the parent's
//! context; the child always gets a fresh temporary arena of its own.

use std::cell::{Cell, UnsafeCell};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::alloc::{Allocator, MALLOC};
use crate::arena::{self, TemporaryStorage};

/// Writer interface used by the context's log. The concrete writer hierarchy
/// (counting, builder, buffered console) lives in the formatting layer; this
/// trait is the seam between the two.
pub trait LogWriter {
    fn write(&mut self, bytes: &[u8]);
    fn flush(&mut self) {}
}

/// Where `print`-like output goes. A plain `Copy` handle so the whole context
/// stays a value type.
#[derive(Debug, Clone, Copy)]
pub enum LogHandle {
    Stdout,
    Stderr,
    /// Discard everything.
    Null,
    /// A caller-supplied writer. It must outlive the scope that installs it,
    /// which the push guard enforces structurally.
    Custom(*mut dyn LogWriter),
}

impl LogHandle {
    /// Write bytes through the handle. Console variants write unbuffered
    /// here; the formatting layer substitutes its buffered console writers
    /// for anything it prints itself.
    pub fn write(self, bytes: &[u8]) {
        match self {
            LogHandle::Stdout => console_write(1, bytes),
            LogHandle::Stderr => console_write(2, bytes),
            LogHandle::Null => {}
            LogHandle::Custom(w) => {
                // SAFETY: the installer guaranteed the writer outlives the
                // scope of this handle.
                unsafe { (*w).write(bytes) }
            }
        }
    }
}

#[cfg(unix)]
fn console_write(fd: i32, bytes: &[u8]) {
    // SAFETY: fd 1/2 are always open; partial writes are retried.
    unsafe {
        let mut off = 0usize;
        while off < bytes.len() {
            let n = libc::write(
                fd,
                bytes.as_ptr().add(off) as *const libc::c_void,
                bytes.len() - off,
            );
            if n <= 0 {
                break;
            }
            off += n as usize;
        }
    }
}

#[cfg(not(unix))]
fn console_write(fd: i32, bytes: &[u8]) {
    use std::io::Write;
    if fd == 1 {
        let _ = std::io::stdout().write_all(bytes);
    } else {
        let _ = std::io::stderr().write_all(bytes);
    }
}

/// Locale knob consulted by the casing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Default,
    /// Turkish/Azerbaijani dotted/dotless `i` rules.
    Turkic,
}

/// Called on unrecoverable errors. Must not return.
pub type PanicHandler = fn(&str) -> !;

/// Called by the formatter on malformed format strings:
/// `(message, format_string, byte_position)`.
pub type FmtParseErrorHandler = fn(&str, &str, i64);

/// The thread-local bundle. All fields are plain values; copying the struct
/// copies the configuration, never the referenced resources.
#[derive(Clone, Copy)]
pub struct Context {
    /// Allocator used by everything that doesn't name one explicitly.
    pub alloc: Allocator,
    /// Default allocation alignment.
    pub alloc_alignment: u16,
    /// Destination of `print`-like output.
    pub log: LogHandle,
    pub panic_handler: PanicHandler,
    pub fmt_parse_error_handler: FmtParseErrorHandler,
    pub locale: Locale,
    /// When set, color/emphasis format fields render as nothing.
    pub fmt_disable_ansi_codes: bool,
    /// Debug aid: ask for a live-allocation report at termination.
    pub check_for_leaks_at_termination: bool,
    /// This thread's id as assigned at context creation.
    pub thread_id: u64,
}

// The context is copied across the spawn boundary by `spawn_with_context`.
// Allocator handles must be usable from any thread (§ concurrency model);
// the temporary allocator is excluded from the copy by construction.
unsafe impl Send for Context {}

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

fn initial_context() -> Context {
    Context {
        alloc: MALLOC,
        alloc_alignment: std::mem::size_of::<usize>() as u16,
        log: LogHandle::Stdout,
        panic_handler: default_panic_handler,
        fmt_parse_error_handler: default_fmt_parse_error_handler,
        locale: Locale::Default,
        fmt_disable_ansi_codes: false,
        check_for_leaks_at_termination: false,
        thread_id: NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed),
    }
}

struct TempStorageSlot(UnsafeCell<TemporaryStorage>);

impl Drop for TempStorageSlot {
    fn drop(&mut self) {
        // SAFETY: thread teardown; nobody else can touch this thread's arena.
        unsafe { arena::release_temporary_storage(self.0.get()) }
        // The context TLS may already be gone during teardown; skip the leak
        // report rather than resurrect it.
        let check = CONTEXT
            .try_with(|c| c.get().map(|ctx| ctx.check_for_leaks_at_termination))
            .ok()
            .flatten()
            .unwrap_or(false);
        if check {
            crate::header::report_leaks();
        }
    }
}

thread_local! {
    static CONTEXT: Cell<Option<Context>> = const { Cell::new(None) };
    static TEMP_STORAGE: TempStorageSlot =
        const { TempStorageSlot(UnsafeCell::new(TemporaryStorage::new())) };
}

/// Current thread's context (a copy; mutate through [`set_context`] or the
/// scoped push helpers).
pub fn context() -> Context {
    CONTEXT.with(|c| match c.get() {
        Some(ctx) => ctx,
        None => {
            let ctx = initial_context();
            c.set(Some(ctx));
            ctx
        }
    })
}

/// Replace the current thread's context wholesale. Prefer the scoped helpers;
/// this exists for the rare caller that manages its own save/restore.
pub fn set_context(ctx: Context) {
    CONTEXT.with(|c| c.set(Some(ctx)));
}

/// Handle to this thread's temporary allocator.
pub fn temporary_allocator() -> Allocator {
    TEMP_STORAGE.with(|slot| Allocator {
        func: arena::temporary_allocator,
        context: slot.0.get() as *mut u8,
    })
}

/// Direct access to this thread's arena bookkeeping (tests, diagnostics).
pub fn with_temporary_storage<R>(f: impl FnOnce(&TemporaryStorage) -> R) -> R {
    TEMP_STORAGE.with(|slot| {
        // SAFETY: shared read; the arena is single-threaded by construction.
        f(unsafe { &*slot.0.get() })
    })
}

/// Guard restoring the previous context when dropped.
pub struct ContextGuard {
    saved: Context,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        set_context(self.saved);
    }
}

/// Install `new` until the returned guard drops.
#[must_use = "the override ends when the guard drops"]
pub fn push_context(new: Context) -> ContextGuard {
    let saved = context();
    set_context(new);
    ContextGuard { saved }
}

/// Run `body` with a field-level override applied by `modify`.
pub fn with_context_var<R>(modify: impl FnOnce(&mut Context), body: impl FnOnce() -> R) -> R {
    let mut ctx = context();
    modify(&mut ctx);
    let _guard = push_context(ctx);
    body()
}

/// Run `body` with a different default allocator.
pub fn with_alloc<R>(alloc: Allocator, body: impl FnOnce() -> R) -> R {
    with_context_var(|ctx| ctx.alloc = alloc, body)
}

/// Run `body` with a different default alignment.
pub fn with_alignment<R>(alignment: u16, body: impl FnOnce() -> R) -> R {
    with_context_var(|ctx| ctx.alloc_alignment = alignment, body)
}

/// Run `body` with log output redirected.
pub fn with_log<R>(log: LogHandle, body: impl FnOnce() -> R) -> R {
    with_context_var(|ctx| ctx.log = log, body)
}

/// Report an unrecoverable error through the installed panic handler.
pub fn context_panic(message: &str) -> ! {
    (context().panic_handler)(message)
}

/// Report a format-string parse error through the installed handler.
pub fn fmt_parse_error(message: &str, fmt_string: &str, position: i64) {
    (context().fmt_parse_error_handler)(message, fmt_string, position)
}

fn default_panic_handler(message: &str) -> ! {
    let log = context().log;
    let ansi = !context().fmt_disable_ansi_codes;
    if ansi {
        log.write(b"\x1b[38;2;255;000;000m");
    }
    log.write(b"panic: ");
    log.write(message.as_bytes());
    log.write(b"\n");
    if ansi {
        log.write(b"\x1b[0m");
    }
    let trace = std::backtrace::Backtrace::force_capture();
    log.write(format!("{trace}\n").as_bytes());
    std::process::abort();
}

fn default_fmt_parse_error_handler(message: &str, fmt_string: &str, position: i64) {
    let log = context().log;
    log.write(b">>> An error occured while formatting: ");
    log.write(message.as_bytes());
    log.write(b"\n    ... the error happened here:\n        ");
    log.write(fmt_string.as_bytes());
    log.write(b"\n        ");
    let pos = position.max(0) as usize;
    let mut marker = vec![b' '; pos];
    marker.push(b'^');
    log.write(&marker);
    log.write(b"\n");
}

/// Spawn a thread that starts with a copy of the calling thread's context.
/// The child's temporary arena is its own, freshly zeroed; its thread id is
/// newly assigned.
pub fn spawn_with_context<F, R>(f: F) -> std::thread::JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let mut parent = context();
    std::thread::spawn(move || {
        parent.thread_id = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
        set_context(parent);
        f()
    })
}
