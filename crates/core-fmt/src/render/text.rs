//! String, code point, pointer and bool rendering.

use crate::interp::Interp;
use crate::render::{active_specs, int, write_padded};
use crate::specs::Align;

pub fn render_str(f: &mut Interp<'_, '_>, s: &str) {
    let specs = active_specs(f);
    // Precision is the maximum length in code points.
    if let Some(precision) = specs.precision {
        let truncated: String = s.chars().take(precision.max(0) as usize).collect();
        write_padded(f, &truncated, Align::Left);
    } else {
        write_padded(f, s, Align::Left);
    }
}

pub fn render_code_point(f: &mut Interp<'_, '_>, cp: char) {
    let specs = active_specs(f);
    match specs.type_char {
        // Numeric type letters render the scalar value as an integer.
        Some('b' | 'B' | 'd' | 'o' | 'x' | 'X' | 'n') => {
            int::render_magnitude(f, false, cp as u64);
        }
        _ => render_code_point_body(f, cp),
    }
}

pub(crate) fn render_code_point_body(f: &mut Interp<'_, '_>, cp: char) {
    let mut buf = [0u8; 4];
    let s: &str = cp.encode_utf8(&mut buf);
    let owned = s.to_owned();
    write_padded(f, &owned, Align::Left);
}

pub fn render_bool(f: &mut Interp<'_, '_>, value: bool) {
    let specs = active_specs(f);
    if specs.type_char == Some('d') {
        int::render_unsigned(f, value as u64);
        return;
    }
    write_padded(f, if value { "true" } else { "false" }, Align::Left);
}

pub fn render_pointer(f: &mut Interp<'_, '_>, address: usize) {
    let mut body = String::from("0x");
    body.push_str(&int::to_base(address as u64, 16, false));
    write_padded(f, &body, Align::Right);
}
