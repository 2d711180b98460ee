//! Chunked write buffer that concatenates into a final [`Text`].
//!
//! The head buffer is embedded in the builder itself; overflow chains fixed
//! 1 KiB buffers allocated with the builder's allocator (captured from the
//! context on first overflow). Total concatenation cost stays O(n) without
//! guessing the final size up front, which is why the formatter uses this as
//! its default sink.

use std::ptr;

use core_memory::alloc::{AllocFlags, Allocator};
use core_memory::context::{context, context_panic};
use core_unicode::utf8::encode_cp;

use crate::text::Text;

pub const BUILDER_BUFFER_SIZE: usize = 1024;

struct Buffer {
    data: [u8; BUILDER_BUFFER_SIZE],
    occupied: usize,
    next: *mut Buffer,
}

pub struct TextBuilder {
    base: Buffer,
    /// Most recent overflow buffer; null while everything fits in `base`.
    /// (Kept as a pointer into the heap chain only, so moving the builder
    /// never invalidates it.)
    current: *mut Buffer,
    /// Allocator used for overflow buffers. Captured on first overflow.
    alloc: Option<Allocator>,
    /// How many overflow buffers have been chained.
    indirection_count: usize,
}

impl Default for TextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuilder {
    pub const fn new() -> Self {
        TextBuilder {
            base: Buffer {
                data: [0; BUILDER_BUFFER_SIZE],
                occupied: 0,
                next: ptr::null_mut(),
            },
            current: ptr::null_mut(),
            alloc: None,
            indirection_count: 0,
        }
    }

    /// Total bytes written so far.
    pub fn len(&self) -> usize {
        let mut total = self.base.occupied;
        let mut b = self.base.next;
        while !b.is_null() {
            unsafe {
                total += (*b).occupied;
                b = (*b).next;
            }
        }
        total
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn overflow_buffer_count(&self) -> usize {
        self.indirection_count
    }

    /// Append raw bytes, chaining a fresh buffer whenever the tail fills up.
    pub fn add_bytes(&mut self, mut bytes: &[u8]) {
        while !bytes.is_empty() {
            let tail: &mut Buffer = if self.current.is_null() {
                &mut self.base
            } else {
                // SAFETY: `current` points into the heap chain we own.
                unsafe { &mut *self.current }
            };

            let available = BUILDER_BUFFER_SIZE - tail.occupied;
            let take = available.min(bytes.len());
            tail.data[tail.occupied..tail.occupied + take].copy_from_slice(&bytes[..take]);
            tail.occupied += take;
            bytes = &bytes[take..];

            if !bytes.is_empty() {
                let tail_ptr: *mut Buffer = tail;
                // A buffer kept around by reset() gets reused before any new
                // one is chained.
                let existing = unsafe { (*tail_ptr).next };
                if !existing.is_null() {
                    self.current = existing;
                    continue;
                }
                let alloc = *self.alloc.get_or_insert_with(|| context().alloc);
                let fresh = alloc.allocate_aligned(
                    std::mem::size_of::<Buffer>() as i64,
                    std::mem::align_of::<Buffer>(),
                    AllocFlags::empty(),
                ) as *mut Buffer;
                if fresh.is_null() {
                    context_panic("out of memory chaining a builder buffer");
                }
                unsafe {
                    fresh.write(Buffer {
                        data: [0; BUILDER_BUFFER_SIZE],
                        occupied: 0,
                        next: ptr::null_mut(),
                    });
                }
                unsafe { (*tail_ptr).next = fresh };
                self.current = fresh;
                self.indirection_count += 1;
            }
        }
    }

    /// Append the UTF-8 encoding of a code point.
    pub fn add_cp(&mut self, cp: char) {
        let mut buf = [0u8; 4];
        let n = encode_cp(&mut buf, cp);
        self.add_bytes(&buf[..n]);
    }

    /// Append a string slice.
    pub fn add_str(&mut self, s: &str) {
        self.add_bytes(s.as_bytes());
    }

    /// Append a [`Text`].
    pub fn add_text(&mut self, t: &Text) {
        self.add_bytes(t.as_bytes());
    }

    /// Concatenate every buffer into one owned [`Text`]. The builder keeps
    /// its buffers and contents.
    pub fn to_text(&self) -> Text {
        let mut out = Text::new();
        out.reserve(self.len() as i64);
        out.append_bytes(&self.base.data[..self.base.occupied]);
        let mut b = self.base.next;
        while !b.is_null() {
            unsafe {
                out.append_bytes(&(&(*b).data)[..(*b).occupied]);
                b = (*b).next;
            }
        }
        out
    }

    /// Reset the cursors, keeping every chained buffer for reuse.
    pub fn reset(&mut self) {
        self.base.occupied = 0;
        let mut b = self.base.next;
        while !b.is_null() {
            unsafe {
                (*b).occupied = 0;
                b = (*b).next;
            }
        }
        // Writes restart in the base buffer; kept overflow buffers are
        // re-entered lazily as it refills.
        self.current = ptr::null_mut();
    }

    /// Free every chained buffer and reset the head.
    pub fn free_buffers(&mut self) {
        let mut b = self.base.next;
        while !b.is_null() {
            unsafe {
                let next = (*b).next;
                core_memory::alloc::free(b as *mut u8, AllocFlags::empty());
                b = next;
            }
        }
        self.base.next = ptr::null_mut();
        self.base.occupied = 0;
        self.current = ptr::null_mut();
        self.indirection_count = 0;
    }
}

impl Drop for TextBuilder {
    fn drop(&mut self) {
        self.free_buffers();
    }
}
