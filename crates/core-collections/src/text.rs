//! UTF-8 string with code-point addressing.
//!
//! [`Text`] follows the same owned-or-view discipline as [`crate::Array`]:
//! `allocated == 0` means the bytes are referenced, not owned, and the first
//! mutation copies them into an owned buffer. Indexing is by code point with
//! Python-style negative indices; the code-point length is cached alongside
//! the byte count.

use std::ptr;

use core_memory::alloc::AllocFlags;
use core_memory::context::{context, context_panic};
use core_memory::header::header_of;
use core_unicode::utf8::{
    decode_cp, encode_cp, size_of_cp, size_of_lead_byte, utf8_byte_offset_of, utf8_length,
};

use crate::array::{translate_index, SearchOptions};

pub struct Text {
    data: *mut u8,
    count: i64,     // bytes
    allocated: i64, // 0 means view
    length: i64,    // code points
}

impl Default for Text {
    fn default() -> Self {
        Self::new()
    }
}

impl Text {
    pub const fn new() -> Self {
        Text {
            data: ptr::null_mut(),
            count: 0,
            allocated: 0,
            length: 0,
        }
    }

    /// The null string: no data pointer at all. Returned by operations that
    /// reject their input (e.g. NFC on malformed UTF-8).
    pub const fn null() -> Self {
        Self::new()
    }

    /// True for the null string (no data pointer, zero bytes).
    pub fn is_null(&self) -> bool {
        self.data.is_null() && self.count == 0
    }

    /// A non-owning view of a `&str`. The referent must outlive the view;
    /// mutation materializes an owned copy.
    pub fn from_str(s: &str) -> Self {
        Text {
            data: s.as_ptr() as *mut u8,
            count: s.len() as i64,
            allocated: 0,
            length: s.chars().count() as i64,
        }
    }

    /// Deep copy of a `&str` into an owned buffer.
    pub fn owned(s: &str) -> Self {
        Text::from_str(s).clone()
    }

    /// View over raw UTF-8 bytes. The caller vouches for validity.
    pub fn from_utf8_view(bytes: &[u8]) -> Self {
        Text {
            data: bytes.as_ptr() as *mut u8,
            count: bytes.len() as i64,
            allocated: 0,
            length: utf8_length(bytes),
        }
    }

    /// Byte length.
    pub fn count(&self) -> i64 {
        self.count
    }

    /// Length in code points.
    pub fn length(&self) -> i64 {
        self.length
    }

    pub fn allocated(&self) -> i64 {
        self.allocated
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn data(&self) -> *mut u8 {
        self.data
    }

    pub fn as_bytes(&self) -> &[u8] {
        if self.data.is_null() {
            return &[];
        }
        // SAFETY: `data[0..count]` is initialized.
        unsafe { std::slice::from_raw_parts(self.data, self.count as usize) }
    }

    /// The contents as `&str`. The bytes are valid UTF-8 by construction.
    pub fn as_str(&self) -> &str {
        // SAFETY: every constructor and mutator maintains UTF-8 validity.
        unsafe { std::str::from_utf8_unchecked(self.as_bytes()) }
    }

    pub fn is_owner(&self) -> bool {
        if self.allocated == 0 || self.data.is_null() {
            return false;
        }
        // SAFETY: owned buffers come from the allocation front-ends.
        unsafe { header_of(self.data).owner == self.data }
    }

    pub fn iter(&self) -> std::str::Chars<'_> {
        self.as_str().chars()
    }

    fn grow_target(needed: i64) -> i64 {
        ((needed + 1).max(8) as u64).next_power_of_two() as i64
    }

    /// Ensure owned room for at least `extra` more bytes.
    pub fn reserve(&mut self, extra: i64) {
        let needed = self.count + extra;
        if self.allocated > 0 && self.is_owner() {
            if self.allocated >= needed {
                return;
            }
            let target = Self::grow_target(needed);
            // SAFETY: live owned allocation.
            let grown =
                unsafe { core_memory::alloc::reallocate(self.data, target, AllocFlags::empty()) };
            if grown.is_null() {
                context_panic("out of memory growing a string");
            }
            self.data = grown;
            self.allocated = target;
            unsafe { header_of(grown).owner = grown };
            return;
        }

        let target = Self::grow_target(needed);
        let fresh = context().alloc.allocate(target, AllocFlags::empty());
        if fresh.is_null() {
            context_panic("out of memory allocating a string");
        }
        if self.count > 0 {
            unsafe { ptr::copy_nonoverlapping(self.data, fresh, self.count as usize) };
        }
        unsafe { header_of(fresh).owner = fresh };
        self.data = fresh;
        self.allocated = target;
    }

    /// Release owned bytes; views reset to empty.
    pub fn free(&mut self) {
        if self.is_owner() {
            // SAFETY: owned allocation.
            unsafe { core_memory::alloc::free(self.data, AllocFlags::empty()) };
        }
        *self = Text::new();
    }

    fn byte_offset(&self, cp_index: i64) -> usize {
        utf8_byte_offset_of(self.as_bytes(), cp_index)
    }

    /// The `index`-th code point (negative counts from the end).
    pub fn get(&self, index: i64) -> char {
        let index = translate_index(index, self.length, false);
        let off = self.byte_offset(index);
        decode_cp(&self.as_bytes()[off..])
    }

    /// Replace the code point at `index`, resizing the byte buffer when the
    /// encoded lengths differ.
    pub fn set(&mut self, index: i64, cp: char) {
        let index = translate_index(index, self.length, false);
        let off = self.byte_offset(index) as i64;
        let old_size = size_of_lead_byte(self.as_bytes()[off as usize]) as i64;
        let new_size = size_of_cp(cp) as i64;

        self.reserve((new_size - old_size).max(0));
        unsafe {
            if new_size != old_size {
                ptr::copy(
                    self.data.add((off + old_size) as usize),
                    self.data.add((off + new_size) as usize),
                    (self.count - off - old_size) as usize,
                );
            }
            let mut buf = [0u8; 4];
            let n = encode_cp(&mut buf, cp);
            ptr::copy_nonoverlapping(buf.as_ptr(), self.data.add(off as usize), n);
        }
        self.count += new_size - old_size;
    }

    /// Insert a code point at code-point `index` (`-1` appends).
    pub fn insert_at_index(&mut self, index: i64, cp: char) {
        let mut buf = [0u8; 4];
        let n = encode_cp(&mut buf, cp);
        self.insert_bytes_at_cp_index(index, &buf[..n], 1);
    }

    /// Insert a string at code-point `index`.
    pub fn insert_text_at_index(&mut self, index: i64, s: &str) {
        self.insert_bytes_at_cp_index(index, s.as_bytes(), s.chars().count() as i64);
    }

    fn insert_bytes_at_cp_index(&mut self, index: i64, bytes: &[u8], cp_count: i64) {
        let index = translate_index(index, self.length, true);
        let off = self.byte_offset(index) as i64;
        self.reserve(bytes.len() as i64);
        unsafe {
            ptr::copy(
                self.data.add(off as usize),
                self.data.add(off as usize + bytes.len()),
                (self.count - off) as usize,
            );
            ptr::copy_nonoverlapping(bytes.as_ptr(), self.data.add(off as usize), bytes.len());
        }
        self.count += bytes.len() as i64;
        self.length += cp_count;
    }

    /// Remove the code point at `index`.
    pub fn remove_at_index(&mut self, index: i64) {
        let index = translate_index(index, self.length, false);
        self.remove_cp_range_translated(index, index + 1);
    }

    /// Remove the half-open code-point range `[begin, end)`.
    pub fn remove_range(&mut self, begin: i64, end: i64) {
        let begin = translate_index(begin, self.length, true);
        let end = translate_index(end, self.length, true);
        if begin >= end {
            return;
        }
        self.remove_cp_range_translated(begin, end);
    }

    fn remove_cp_range_translated(&mut self, begin: i64, end: i64) {
        let b = self.byte_offset(begin) as i64;
        let e = self.byte_offset(end) as i64;
        self.reserve(0);
        unsafe {
            ptr::copy(
                self.data.add(e as usize),
                self.data.add(b as usize),
                (self.count - e) as usize,
            );
        }
        self.count -= e - b;
        self.length -= end - begin;
    }

    /// Append a code point.
    pub fn append(&mut self, cp: char) {
        let length = self.length;
        let mut buf = [0u8; 4];
        let n = encode_cp(&mut buf, cp);
        self.insert_bytes_at_cp_index(length, &buf[..n], 1);
    }

    /// Append a string.
    pub fn append_str(&mut self, s: &str) {
        let length = self.length;
        self.insert_bytes_at_cp_index(length, s.as_bytes(), s.chars().count() as i64);
    }

    /// Append raw UTF-8 bytes the caller vouches for.
    pub fn append_bytes(&mut self, bytes: &[u8]) {
        let length = self.length;
        self.insert_bytes_at_cp_index(length, bytes, utf8_length(bytes));
    }

    /// Deep copy into a fresh owned buffer.
    pub fn clone_text(&self) -> Text {
        let mut t = Text::new();
        if self.count > 0 {
            t.reserve(self.count);
            unsafe { ptr::copy_nonoverlapping(self.data, t.data, self.count as usize) };
            t.count = self.count;
            t.length = self.length;
        }
        t
    }

    /// View of the code-point range `[begin, end)`, clamped; respects code
    /// point boundaries by construction.
    pub fn slice(&self, begin: i64, end: i64) -> Text {
        let begin = begin.clamp(0, self.length);
        let end = end.clamp(0, self.length);
        if begin >= end {
            return Text::new();
        }
        let b = self.byte_offset(begin);
        let e = self.byte_offset(end);
        Text {
            data: unsafe { self.data.add(b) },
            count: (e - b) as i64,
            allocated: 0,
            length: end - begin,
        }
    }

    /// Does the string start with `prefix`.
    pub fn match_beginning(&self, prefix: &str) -> bool {
        self.as_str().starts_with(prefix)
    }

    /// Does the string end with `suffix`.
    pub fn match_end(&self, suffix: &str) -> bool {
        self.as_str().ends_with(suffix)
    }

    fn ascii_whitespace(cp: char) -> bool {
        matches!(cp, ' ' | '\n' | '\r' | '\t' | '\x0B' | '\x0C')
    }

    /// View with whitespace removed from both sides.
    pub fn trim(&self) -> Text {
        self.trim_start().trim_end()
    }

    pub fn trim_start(&self) -> Text {
        let mut begin = 0i64;
        for cp in self.iter() {
            if !Self::ascii_whitespace(cp) {
                break;
            }
            begin += 1;
        }
        self.slice(begin, self.length)
    }

    pub fn trim_end(&self) -> Text {
        let mut end = self.length;
        for cp in self.as_str().chars().rev() {
            if !Self::ascii_whitespace(cp) {
                break;
            }
            end -= 1;
        }
        self.slice(0, end)
    }

    /// Search for a code point; returns its code-point index or -1.
    pub fn search(&self, cp: char, options: SearchOptions) -> i64 {
        self.search_by(|c| c == cp, options)
    }

    /// Search with an arbitrary predicate.
    pub fn search_by(&self, predicate: impl Fn(char) -> bool, options: SearchOptions) -> i64 {
        if self.length == 0 {
            return -1;
        }
        let mut start = options.start;
        if start < 0 {
            start += self.length;
        }
        if start < 0 || start >= self.length {
            return -1;
        }
        if options.reversed {
            for (i, cp) in self.iter().enumerate().take(start as usize + 1).collect::<Vec<_>>().into_iter().rev() {
                if predicate(cp) {
                    return i as i64;
                }
            }
        } else {
            for (i, cp) in self.iter().enumerate().skip(start as usize) {
                if predicate(cp) {
                    return i as i64;
                }
            }
        }
        -1
    }

    /// Search for a substring; returns the code-point index of its first
    /// code point, or -1.
    pub fn search_text(&self, needle: &str, options: SearchOptions) -> i64 {
        let needle_len = needle.chars().count() as i64;
        if needle_len == 0 || self.length == 0 {
            return -1;
        }
        let mut start = options.start;
        if start < 0 {
            start += self.length;
        }
        if start < 0 || start >= self.length {
            return -1;
        }
        let hay = self.as_str();
        if options.reversed {
            let mut i = start.min(self.length - needle_len);
            while i >= 0 {
                let b = self.byte_offset(i);
                if hay[b..].starts_with(needle) {
                    return i;
                }
                i -= 1;
            }
        } else {
            let mut i = start;
            while i + needle_len <= self.length {
                let b = self.byte_offset(i);
                if hay[b..].starts_with(needle) {
                    return i;
                }
                i += 1;
            }
        }
        -1
    }

    pub fn has(&self, cp: char) -> bool {
        self.search(cp, SearchOptions::default()) != -1
    }

    pub fn has_text(&self, needle: &str) -> bool {
        self.search_text(needle, SearchOptions::default()) != -1
    }

    /// Count occurrences of a code point.
    pub fn count_of(&self, cp: char) -> i64 {
        self.iter().filter(|&c| c == cp).count() as i64
    }

    /// Count occurrences of a substring; the scan advances one code point
    /// past each hit.
    pub fn count_of_text(&self, needle: &str) -> i64 {
        if needle.is_empty() {
            return 0;
        }
        let mut n = 0i64;
        let mut at = 0i64;
        loop {
            let hit = self.search_text(needle, SearchOptions { start: at, reversed: false });
            if hit == -1 {
                return n;
            }
            n += 1;
            at = hit + 1;
            if at >= self.length {
                return n;
            }
        }
    }

    /// Replace every occurrence of `pattern` with `replacement`, advancing
    /// past each replacement (freshly inserted text is never rescanned).
    pub fn replace_all(&mut self, pattern: &str, replacement: &str) {
        if pattern.is_empty() {
            return;
        }
        let pat_len = pattern.chars().count() as i64;
        let repl_len = replacement.chars().count() as i64;
        let mut at = 0i64;
        loop {
            if at >= self.length {
                return;
            }
            let hit = self.search_text(pattern, SearchOptions { start: at, reversed: false });
            if hit == -1 {
                return;
            }
            let b = self.byte_offset(hit) as i64;
            let e = self.byte_offset(hit + pat_len) as i64;
            self.replace_byte_range(b, e, replacement.as_bytes());
            self.length += repl_len - pat_len;
            at = hit + repl_len;
        }
    }

    /// Replace every occurrence of one code point with another.
    pub fn replace_all_cp(&mut self, old: char, new: char) {
        let mut old_buf = [0u8; 4];
        let mut new_buf = [0u8; 4];
        let on = encode_cp(&mut old_buf, old);
        let nn = encode_cp(&mut new_buf, new);
        let old_s = std::str::from_utf8(&old_buf[..on]).unwrap().to_owned();
        let new_s = std::str::from_utf8(&new_buf[..nn]).unwrap().to_owned();
        self.replace_all(&old_s, &new_s);
    }

    /// Remove every occurrence of a substring.
    pub fn remove_all(&mut self, pattern: &str) {
        self.replace_all(pattern, "");
    }

    /// Remove every occurrence of a code point.
    pub fn remove_all_cp(&mut self, cp: char) {
        let mut buf = [0u8; 4];
        let n = encode_cp(&mut buf, cp);
        let s = std::str::from_utf8(&buf[..n]).unwrap().to_owned();
        self.remove_all(&s);
    }

    fn replace_byte_range(&mut self, begin: i64, end: i64, bytes: &[u8]) {
        let old_len = end - begin;
        let new_len = bytes.len() as i64;
        let delta = new_len - old_len;
        if delta > 0 {
            self.reserve(delta);
        } else {
            self.reserve(0);
        }
        unsafe {
            if delta != 0 {
                ptr::copy(
                    self.data.add(end as usize),
                    self.data.add((end + delta) as usize),
                    (self.count - end) as usize,
                );
            }
            ptr::copy_nonoverlapping(bytes.as_ptr(), self.data.add(begin as usize), bytes.len());
        }
        self.count += delta;
    }

    /// Clone with every code point uppercased through the context's locale.
    pub fn to_upper(&self) -> Text {
        let mut out = Text::new();
        out.reserve(self.count);
        for cp in self.iter() {
            out.append(core_unicode::to_upper(cp));
        }
        out
    }

    /// Clone with every code point lowercased through the context's locale.
    pub fn to_lower(&self) -> Text {
        let mut out = Text::new();
        out.reserve(self.count);
        for cp in self.iter() {
            out.append(core_unicode::to_lower(cp));
        }
        out
    }

    /// Clone the contents repeated `n` times.
    pub fn repeated(&self, n: i64) -> Text {
        let mut out = Text::new();
        out.reserve(self.count * n.max(0));
        for _ in 0..n {
            out.append_str(self.as_str());
        }
        out
    }

    /// Lexicographic comparison by code point.
    pub fn compare(&self, other: &Text) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }

    /// Case-insensitive comparison through the context's locale.
    pub fn compare_ignore_case(&self, other: &Text) -> std::cmp::Ordering {
        let mut a = self.iter().map(core_unicode::to_lower);
        let mut b = other.iter().map(core_unicode::to_lower);
        loop {
            match (a.next(), b.next()) {
                (None, None) => return std::cmp::Ordering::Equal,
                (None, Some(_)) => return std::cmp::Ordering::Less,
                (Some(_), None) => return std::cmp::Ordering::Greater,
                (Some(x), Some(y)) => match x.cmp(&y) {
                    std::cmp::Ordering::Equal => continue,
                    other => return other,
                },
            }
        }
    }
}

impl Clone for Text {
    fn clone(&self) -> Self {
        self.clone_text()
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}
impl Eq for Text {}

impl PartialEq<&str> for Text {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialOrd for Text {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.compare(other))
    }
}

impl std::fmt::Debug for Text {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl std::fmt::Display for Text {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Drop for Text {
    fn drop(&mut self) {
        self.free();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_and_lengths() {
        let s = Text::from_str("aДc");
        assert_eq!(s.count(), 4);
        assert_eq!(s.length(), 3);
        assert_eq!(s.allocated(), 0);
        assert!(!s.is_owner());
    }

    #[test]
    fn get_with_negative_indices() {
        let s = Text::from_str("aДc");
        assert_eq!(s.get(0), 'a');
        assert_eq!(s.get(1), 'Д');
        assert_eq!(s.get(2), 'c');
        assert_eq!(s.get(-1), 'c');
        assert_eq!(s.get(-3), 'a');
    }

    #[test]
    fn set_changes_byte_width() {
        let mut s = Text::from_str("aDc");
        s.set(1, 'Д');
        assert_eq!(s, "aДc");
        assert_eq!(s.count(), 4);

        // Three supplementary-plane code points, assigned through negative
        // indices, each replacing a smaller encoding.
        s.set(-3, '\u{2070E}');
        s.set(-2, '\u{20731}');
        s.set(-1, '\u{20779}');
        assert_eq!(s, "\u{2070E}\u{20731}\u{20779}");
        assert_eq!(s.count(), 12);
        assert_eq!(s.length(), 3);

        // And shrink back down.
        s.set(1, 'x');
        assert_eq!(s, "\u{2070E}x\u{20779}");
        assert_eq!(s.count(), 9);
    }

    #[test]
    fn insert_and_remove_code_points() {
        let mut s = Text::from_str("hello");
        s.insert_at_index(0, 'Й');
        assert_eq!(s, "Йhello");
        s.insert_at_index(-1, '!');
        assert_eq!(s, "Йhello!");
        s.insert_text_at_index(1, "уй ");
        assert_eq!(s, "Йуй hello!");
        s.remove_at_index(0);
        assert_eq!(s, "уй hello!");
        s.remove_range(0, 3);
        assert_eq!(s, "hello!");
        s.remove_at_index(-1);
        assert_eq!(s, "hello");
    }

    #[test]
    fn append_grows_and_caches_length() {
        let mut s = Text::new();
        s.append('a');
        s.append('Д');
        s.append_str("く😀");
        assert_eq!(s, "aДく😀");
        assert_eq!(s.length(), 4);
        assert_eq!(s.count(), 1 + 2 + 3 + 4);
        assert!(s.is_owner());
    }

    #[test]
    fn length_matches_decoded_count() {
        for case in ["", "ascii", "aДc", "漢字仮名", "a\u{0301}\u{0323}x"] {
            let t = Text::from_str(case);
            assert_eq!(t.length(), case.chars().count() as i64);
        }
    }

    #[test]
    fn trim_whitespace() {
        let s = Text::from_str("\t  hello world\r\n ");
        assert_eq!(s.trim().as_str(), "hello world");
        assert_eq!(s.trim_start().as_str(), "hello world\r\n ");
        assert_eq!(s.trim_end().as_str(), "\t  hello world");
        assert_eq!(Text::from_str("   ").trim().count(), 0);
    }

    #[test]
    fn search_forward_and_reverse() {
        let s = Text::from_str("This is a string");
        assert_eq!(s.search('i', SearchOptions::default()), 2);
        assert_eq!(s.search('i', SearchOptions { start: 3, reversed: false }), 5);
        assert_eq!(
            s.search('i', SearchOptions { start: -1, reversed: true }),
            13
        );
        assert_eq!(s.search_text("is", SearchOptions::default()), 2);
        assert_eq!(
            s.search_text("is", SearchOptions { start: 3, reversed: false }),
            5
        );
        assert_eq!(s.search('z', SearchOptions::default()), -1);
        assert_eq!(s.search_text("zz", SearchOptions::default()), -1);
    }

    #[test]
    fn search_by_predicate() {
        let s = Text::from_str("ab1cd");
        assert_eq!(s.search_by(|c| c.is_ascii_digit(), SearchOptions::default()), 2);
        assert_eq!(
            s.search_by(|c| c.is_ascii_digit(), SearchOptions { start: -1, reversed: true }),
            2
        );
    }

    #[test]
    fn match_beginning_and_end() {
        let s = Text::from_str("Hello, world!");
        assert!(s.match_beginning("Hello"));
        assert!(!s.match_beginning("world"));
        assert!(s.match_end("world!"));
        assert!(!s.match_end("Hello"));
    }

    #[test]
    fn replace_all_advances_past_replacement() {
        let mut s = Text::owned("aaa");
        s.replace_all("a", "aa");
        assert_eq!(s, "aaaaaa");

        let mut t = Text::owned("ababab");
        t.replace_all("ab", "b");
        assert_eq!(t, "bbb");

        let mut u = Text::owned("xyz");
        u.replace_all_cp('y', 'Д');
        assert_eq!(u, "xДz");
    }

    #[test]
    fn remove_all_variants() {
        let mut s = Text::owned("banana");
        s.remove_all("an");
        assert_eq!(s, "ba");

        let mut t = Text::owned("mississippi");
        t.remove_all_cp('s');
        assert_eq!(t, "miiippi");
    }

    #[test]
    fn slice_respects_code_points() {
        let s = Text::from_str("aДく😀z");
        let mid = s.slice(1, 4);
        assert_eq!(mid.as_str(), "Дく😀");
        assert_eq!(mid.allocated(), 0);
        assert_eq!(s.slice(3, 3).count(), 0);
        assert_eq!(s.slice(-5, 100).length(), 5); // clamped to the whole string
        assert_eq!(s.slice(4, 2).count(), 0);
    }

    #[test]
    fn clone_is_deep() {
        let v = Text::from_str("view");
        let owned = v.clone();
        assert!(owned.is_owner());
        assert_eq!(owned, "view");
        assert_ne!(owned.data(), v.data());
    }

    #[test]
    fn case_conversion_clones() {
        let s = Text::from_str("Hello Дом ς");
        assert_eq!(s.to_upper(), "HELLO ДОМ Σ");
        assert_eq!(s.to_lower(), "hello дом ς");
    }

    #[test]
    fn repeated_and_counting() {
        let s = Text::from_str("ab");
        assert_eq!(s.repeated(3), "ababab");
        assert_eq!(s.repeated(0), "");
        let t = Text::from_str("abcabcabc");
        assert_eq!(t.count_of('b'), 3);
        assert_eq!(t.count_of_text("abc"), 3);
        assert_eq!(t.count_of_text("x"), 0);
    }

    #[test]
    fn comparisons() {
        let a = Text::from_str("alpha");
        let b = Text::from_str("beta");
        assert!(a < b);
        assert_eq!(a.compare_ignore_case(&Text::from_str("ALPHA")), std::cmp::Ordering::Equal);
    }
}
