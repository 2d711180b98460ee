//! Canonical NFC normalization.
//!
//! Pipeline: validate the input bytes, recursively apply canonical
//! decomposition, put runs of non-starters into canonical order (stable, so
//! equal combining classes keep their input order), compose primary
//! composites left to right, and re-encode. Malformed input yields the null
//! string without allocating.

use core_unicode::props::{canonical_decomposition, combining_class, compose};
use core_unicode::utf8::utf8_find_invalid;

use crate::text::Text;

fn decompose_into(cp: char, out: &mut Vec<char>) {
    match canonical_decomposition(cp) {
        Some([a, b]) => {
            decompose_into(a, out);
            decompose_into(b, out);
        }
        None => out.push(cp),
    }
}

/// Reorder each run of non-starters by ascending combining class. Insertion
/// sort keeps it stable, and runs are short in any real text.
fn canonical_order(buf: &mut [char]) {
    let mut i = 1;
    while i < buf.len() {
        let ccc = combining_class(buf[i]);
        if ccc != 0 {
            let mut j = i;
            while j > 0 {
                let prev = combining_class(buf[j - 1]);
                if prev == 0 || prev <= ccc {
                    break;
                }
                buf.swap(j - 1, j);
                j -= 1;
            }
        }
        i += 1;
    }
}

/// Canonical composition pass over a decomposed, canonically ordered buffer.
fn compose_in_place(buf: &mut Vec<char>) {
    if buf.is_empty() {
        return;
    }
    let mut out: Vec<char> = Vec::with_capacity(buf.len());
    // Position of the current starter inside `out`; None until one appears.
    let mut starter: Option<usize> = None;
    // Highest combining class seen since the starter (blocking check).
    let mut last_ccc: u8 = 0;

    for &cp in buf.iter() {
        let ccc = combining_class(cp);
        if let Some(s) = starter {
            // A combining mark is blocked when something with an equal or
            // higher class sits between it and the starter.
            let blocked = last_ccc != 0 && last_ccc >= ccc;
            if !blocked {
                if let Some(composed) = compose(out[s], cp) {
                    out[s] = composed;
                    continue;
                }
            }
        }
        if ccc == 0 {
            starter = Some(out.len());
            last_ccc = 0;
        } else {
            last_ccc = ccc;
        }
        out.push(cp);
    }
    *buf = out;
}

/// Normalize to NFC. Invalid UTF-8 input returns the null string (no data
/// pointer, zero count) without allocating.
pub fn nfc(input: &Text) -> Text {
    if utf8_find_invalid(input.as_bytes()) != -1 {
        return Text::null();
    }

    let mut decomposed: Vec<char> = Vec::with_capacity(input.length() as usize);
    for cp in input.iter() {
        decompose_into(cp, &mut decomposed);
    }
    canonical_order(&mut decomposed);
    compose_in_place(&mut decomposed);

    let mut out = Text::new();
    out.reserve(input.count());
    for cp in decomposed {
        out.append(cp);
    }
    out
}

/// Normalize raw bytes to NFC; the same null-string contract for invalid
/// input.
pub fn nfc_bytes(bytes: &[u8]) -> Text {
    if utf8_find_invalid(bytes) != -1 {
        return Text::null();
    }
    nfc(&Text::from_utf8_view(bytes))
}
