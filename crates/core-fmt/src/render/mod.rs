//! Per-type renderers plus the shared padding helpers. Width, fill and
//! alignment all count code points, never bytes.

pub mod float;
pub mod int;
pub mod text;

use crate::interp::Interp;
use crate::specs::{Align, FormatSpecs};

pub(crate) fn active_specs(f: &Interp<'_, '_>) -> FormatSpecs {
    f.specs.unwrap_or_default()
}

pub(crate) fn write_fill(f: &mut Interp<'_, '_>, fill: char, n: usize) {
    let mut buf = [0u8; 4];
    let encoded = fill.encode_utf8(&mut buf).as_bytes().to_vec();
    for _ in 0..n {
        f.write_raw(&encoded);
    }
}

/// Write `body` padded to the field width. `default_align` applies when the
/// specifier didn't pick one; `Numeric` behaves like `Right` here (renderers
/// that support sign-aware padding call [`write_numeric_padded`] instead).
pub(crate) fn write_padded(f: &mut Interp<'_, '_>, body: &str, default_align: Align) {
    let specs = active_specs(f);
    let width = specs.width.unwrap_or(0) as i64;
    let len = body.chars().count() as i64;
    if width <= len {
        f.write_raw_str(body);
        return;
    }
    let pad = (width - len) as usize;
    let align = if specs.align == Align::None {
        default_align
    } else {
        specs.align
    };
    match align {
        Align::Left => {
            f.write_raw_str(body);
            write_fill(f, specs.fill, pad);
        }
        Align::Center => {
            let left = pad / 2;
            write_fill(f, specs.fill, left);
            f.write_raw_str(body);
            write_fill(f, specs.fill, pad - left);
        }
        _ => {
            write_fill(f, specs.fill, pad);
            f.write_raw_str(body);
        }
    }
}

/// Write a numeric body split into `prefix` (sign and base prefix) and
/// `digits`. With `=` alignment the padding goes between the two.
pub(crate) fn write_numeric_padded(f: &mut Interp<'_, '_>, prefix: &str, digits: &str) {
    let specs = active_specs(f);
    let width = specs.width.unwrap_or(0) as i64;
    let len = (prefix.chars().count() + digits.chars().count()) as i64;

    if specs.align == Align::Numeric && width > len {
        f.write_raw_str(prefix);
        write_fill(f, specs.fill, (width - len) as usize);
        f.write_raw_str(digits);
        return;
    }

    let mut body = String::with_capacity(prefix.len() + digits.len());
    body.push_str(prefix);
    body.push_str(digits);
    write_padded(f, &body, Align::Right);
}
