//! Type-erased callables with small-storage optimization.
//!
//! A [`Delegate`] wraps any `FnMut(A) -> R` behind two thunks (call and
//! drop). Callables up to three words with word alignment are stored inline;
//! anything bigger spills to the context's current allocator. `A` is the
//! argument tuple, so a two-argument delegate is `Delegate<(i32, i32), R>`.

use std::marker::PhantomData;
use std::mem::{align_of, size_of, MaybeUninit};

use core_memory::alloc::AllocFlags;
use core_memory::context::{context, context_panic};

const INLINE_WORDS: usize = 3;
const INLINE_BYTES: usize = INLINE_WORDS * size_of::<usize>();

enum Storage {
    Inline([MaybeUninit<usize>; INLINE_WORDS]),
    Heap(*mut u8),
}

pub struct Delegate<A, R> {
    call_thunk: unsafe fn(*mut u8, A) -> R,
    drop_thunk: unsafe fn(*mut u8),
    storage: Storage,
    _marker: PhantomData<fn(A) -> R>,
}

unsafe fn call_thunk_impl<F: FnMut(A) -> R, A, R>(data: *mut u8, args: A) -> R {
    (*(data as *mut F))(args)
}

unsafe fn drop_thunk_impl<F>(data: *mut u8) {
    std::ptr::drop_in_place(data as *mut F);
}

impl<A, R> Delegate<A, R> {
    /// Wrap a callable. Closures that fit three words stay inline; larger
    /// captures are allocated through the context.
    pub fn new<F>(f: F) -> Self
    where
        F: FnMut(A) -> R + 'static,
    {
        let storage = if size_of::<F>() <= INLINE_BYTES && align_of::<F>() <= align_of::<usize>() {
            let mut words = [MaybeUninit::<usize>::uninit(); INLINE_WORDS];
            // SAFETY: F fits and is sufficiently aligned; ownership moves in.
            unsafe { (words.as_mut_ptr() as *mut F).write(f) };
            Storage::Inline(words)
        } else {
            let p = context().alloc.allocate_aligned(
                size_of::<F>() as i64,
                align_of::<F>().max(size_of::<usize>()),
                AllocFlags::empty(),
            );
            if p.is_null() {
                context_panic("out of memory storing a delegate");
            }
            // SAFETY: fresh block of the right size and alignment.
            unsafe { (p as *mut F).write(f) };
            Storage::Heap(p)
        };
        Delegate {
            call_thunk: call_thunk_impl::<F, A, R>,
            drop_thunk: drop_thunk_impl::<F>,
            storage,
            _marker: PhantomData,
        }
    }

    fn data(&mut self) -> *mut u8 {
        match &mut self.storage {
            Storage::Inline(words) => words.as_mut_ptr() as *mut u8,
            Storage::Heap(p) => *p,
        }
    }

    /// True when the callable spilled to the heap.
    pub fn is_heap_allocated(&self) -> bool {
        matches!(self.storage, Storage::Heap(_))
    }

    /// Invoke the wrapped callable.
    pub fn call(&mut self, args: A) -> R {
        // SAFETY: `data` points at a live F matching the thunk.
        unsafe { (self.call_thunk)(self.data(), args) }
    }
}

impl<A, R> Drop for Delegate<A, R> {
    fn drop(&mut self) {
        let data = self.data();
        // SAFETY: `data` points at a live F; after this it is never touched.
        unsafe { (self.drop_thunk)(data) };
        if let Storage::Heap(p) = &self.storage {
            // SAFETY: heap storage came from the allocation front-ends.
            unsafe { core_memory::alloc::free(*p, AllocFlags::empty()) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn free_function_delegate() {
        fn double(args: (i32,)) -> i32 {
            args.0 * 2
        }
        let mut d: Delegate<(i32,), i32> = Delegate::new(double);
        assert!(!d.is_heap_allocated());
        assert_eq!(d.call((21,)), 42);
    }

    #[test]
    fn small_closure_is_inline() {
        let base = 10i64;
        let mut d: Delegate<(i64,), i64> = Delegate::new(move |(x,)| x + base);
        assert!(!d.is_heap_allocated());
        assert_eq!(d.call((5,)), 15);
    }

    #[test]
    fn large_capture_spills_to_heap() {
        let blob = [7u8; 256];
        let mut d: Delegate<(), usize> = Delegate::new(move |()| blob.iter().map(|&b| b as usize).sum());
        assert!(d.is_heap_allocated());
        assert_eq!(d.call(()), 7 * 256);
    }

    #[test]
    fn stateful_closure_mutates_between_calls() {
        let mut counter = 0i32;
        let mut d: Delegate<(), i32> = Delegate::new(move |()| {
            counter += 1;
            counter
        });
        assert_eq!(d.call(()), 1);
        assert_eq!(d.call(()), 2);
        assert_eq!(d.call(()), 3);
    }

    #[test]
    fn captured_state_is_dropped() {
        let alive = Rc::new(Cell::new(true));
        struct Tracker(Rc<Cell<bool>>);
        impl Drop for Tracker {
            fn drop(&mut self) {
                self.0.set(false);
            }
        }
        let t = Tracker(alive.clone());
        let d: Delegate<(), ()> = Delegate::new(move |()| {
            let _ = &t;
        });
        assert!(alive.get());
        drop(d);
        assert!(!alive.get());
    }

    #[test]
    fn multi_argument_tuples() {
        let mut d: Delegate<(i32, i32, i32), i32> = Delegate::new(|(a, b, c)| a + b + c);
        assert_eq!(d.call((1, 2, 3)), 6);
    }
}
