//! Integer rendering: bases, prefixes, grouping and sign interplay.

use crate::interp::Interp;
use crate::render::{active_specs, text, write_numeric_padded};
use crate::specs::Sign;

pub fn render_signed(f: &mut Interp<'_, '_>, value: i64) {
    render_magnitude(f, value < 0, value.unsigned_abs());
}

pub fn render_unsigned(f: &mut Interp<'_, '_>, value: u64) {
    render_magnitude(f, false, value);
}

pub(crate) fn render_magnitude(f: &mut Interp<'_, '_>, negative: bool, magnitude: u64) {
    let specs = active_specs(f);
    let type_char = specs.type_char.unwrap_or('d');

    if type_char == 'c' {
        let cp = char::from_u32(magnitude as u32).unwrap_or('\u{FFFD}');
        text::render_code_point_body(f, cp);
        return;
    }

    let digits = match type_char {
        'b' | 'B' => to_base(magnitude, 2, false),
        'o' => to_base(magnitude, 8, false),
        'x' => to_base(magnitude, 16, false),
        'X' => to_base(magnitude, 16, true),
        'n' => grouped_decimal(magnitude),
        _ => to_base(magnitude, 10, false),
    };

    let mut prefix = String::new();
    if negative {
        prefix.push('-');
    } else {
        match specs.sign {
            Sign::Plus => prefix.push('+'),
            Sign::Space => prefix.push(' '),
            _ => {}
        }
    }
    if specs.hash {
        match type_char {
            'b' => prefix.push_str("0b"),
            'B' => prefix.push_str("0B"),
            'o' => prefix.push('0'),
            'x' => prefix.push_str("0x"),
            'X' => prefix.push_str("0X"),
            _ => {}
        }
    }

    write_numeric_padded(f, &prefix, &digits);
}

pub(crate) fn to_base(mut value: u64, base: u64, upper: bool) -> String {
    if value == 0 {
        return "0".into();
    }
    let table = if upper {
        b"0123456789ABCDEF"
    } else {
        b"0123456789abcdef"
    };
    let mut out = Vec::new();
    while value > 0 {
        out.push(table[(value % base) as usize]);
        value /= base;
    }
    out.reverse();
    String::from_utf8(out).expect("base digits are ascii")
}

/// Decimal with a `,` between each group of three.
fn grouped_decimal(value: u64) -> String {
    let plain = to_base(value, 10, false);
    let mut out = String::with_capacity(plain.len() + plain.len() / 3);
    let offset = plain.len() % 3;
    for (i, c) in plain.chars().enumerate() {
        if i > 0 && (i + 3 - offset) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bases() {
        assert_eq!(to_base(0, 2, false), "0");
        assert_eq!(to_base(42, 2, false), "101010");
        assert_eq!(to_base(0o12345670, 8, false), "12345670");
        assert_eq!(to_base(0x90ABCDEF, 16, false), "90abcdef");
        assert_eq!(to_base(0x90ABCDEF, 16, true), "90ABCDEF");
    }

    #[test]
    fn grouping() {
        assert_eq!(grouped_decimal(123), "123");
        assert_eq!(grouped_decimal(1234), "1,234");
        assert_eq!(grouped_decimal(1234567), "1,234,567");
        assert_eq!(grouped_decimal(4294967295), "4,294,967,295");
    }
}
