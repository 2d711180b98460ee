//! Float rendering: shortest round-trip default with the fixed-form
//! prettify bracket, scientific/fixed/general/percent types, forced decimal
//! points with `#`, and nan/inf.
//!
//! Digit generation leans on the platform's shortest-round-trip printing for
//! the default form and on the exact decimal expansion (every binary float
//! has a finite one) for rounded forms, so rounding is half-away-from-zero
//! at the decimal level, independent of the binary tie-breaking the standard
//! library would apply.

use crate::interp::Interp;
use crate::render::{active_specs, write_numeric_padded, write_padded};
use crate::specs::{Align, FormatSpecs, Sign};

#[derive(Debug, Clone, Copy)]
pub enum FloatVal {
    F32(f32),
    F64(f64),
}

impl FloatVal {
    fn is_nan(self) -> bool {
        match self {
            FloatVal::F32(v) => v.is_nan(),
            FloatVal::F64(v) => v.is_nan(),
        }
    }
    fn is_infinite(self) -> bool {
        match self {
            FloatVal::F32(v) => v.is_infinite(),
            FloatVal::F64(v) => v.is_infinite(),
        }
    }
    fn is_sign_negative(self) -> bool {
        match self {
            FloatVal::F32(v) => v.is_sign_negative(),
            FloatVal::F64(v) => v.is_sign_negative(),
        }
    }
    /// Widen to f64 (exact for every f32).
    fn wide_abs(self) -> f64 {
        match self {
            FloatVal::F32(v) => (v as f64).abs(),
            FloatVal::F64(v) => v.abs(),
        }
    }
    /// Shortest round-trip representation of the absolute value in the
    /// value's own precision.
    fn shortest_exp_string(self) -> String {
        match self {
            FloatVal::F32(v) => format!("{:e}", v.abs()),
            FloatVal::F64(v) => format!("{:e}", v.abs()),
        }
    }
}

/// `(digits, exp)`: the value is `0.digits * 10^(exp + 1)`, i.e. the decimal
/// point sits after the first digit when `exp` is 0.
fn parse_exp_string(s: &str) -> (String, i32) {
    let (mantissa, exp) = s.split_once('e').expect("exponential form");
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    (digits, exp.parse().expect("exponent"))
}

/// Exact decimal expansion, 767 significant digits (enough for any f64).
fn exact_parts(value: f64) -> (String, i32) {
    parse_exp_string(&format!("{:.766e}", value))
}

/// Round an exact digit string to `keep` significant digits, half away from
/// zero. Returns the digits (exactly `keep` long when `keep > 0`) and the
/// adjusted exponent; a `None` means the value rounded to zero.
fn round_significant(digits: &str, exp: i32, keep: i64) -> Option<(String, i32)> {
    let bytes = digits.as_bytes();
    if bytes.iter().all(|&b| b == b'0') {
        return None;
    }
    if keep < 0 {
        return None;
    }
    if keep == 0 {
        // Rounding before the first digit: either zero or 10^(exp+1).
        if bytes[0] >= b'5' {
            return Some(("1".into(), exp + 1));
        }
        return None;
    }
    let keep = keep as usize;
    if keep >= bytes.len() {
        let mut out = digits.to_owned();
        out.push_str(&"0".repeat(keep - bytes.len()));
        return Some((out, exp));
    }

    let mut kept: Vec<u8> = bytes[..keep].to_vec();
    if bytes[keep] >= b'5' {
        // Propagate the carry.
        let mut i = keep;
        loop {
            if i == 0 {
                // All nines: 999 -> 1000, keep the leading digits.
                kept.insert(0, b'1');
                kept.truncate(keep);
                return Some((String::from_utf8(kept).unwrap(), exp + 1));
            }
            i -= 1;
            if kept[i] == b'9' {
                kept[i] = b'0';
            } else {
                kept[i] += 1;
                break;
            }
        }
    }
    Some((String::from_utf8(kept).unwrap(), exp))
}

/// Build a plain fixed-point string from significant digits and exponent.
fn fixed_from_parts(digits: &str, exp: i32) -> String {
    let n = digits.len() as i32;
    if exp >= 0 {
        let int_len = exp + 1;
        if n <= int_len {
            let mut out = digits.to_owned();
            out.push_str(&"0".repeat((int_len - n) as usize));
            out
        } else {
            let mut out = String::new();
            out.push_str(&digits[..int_len as usize]);
            out.push('.');
            out.push_str(&digits[int_len as usize..]);
            out
        }
    } else {
        let mut out = String::from("0.");
        out.push_str(&"0".repeat((-exp - 1) as usize));
        out.push_str(digits);
        out
    }
}

fn exponent_suffix(exp: i32, upper: bool) -> String {
    let e = if upper { 'E' } else { 'e' };
    if exp < 0 {
        format!("{e}-{:02}", -exp)
    } else {
        format!("{e}+{:02}", exp)
    }
}

/// Fixed rendering with exactly `prec` fractional digits.
fn fixed_with_precision(value: f64, prec: i64) -> String {
    let (digits, exp) = exact_parts(value);
    match round_significant(&digits, exp, exp as i64 + 1 + prec) {
        Some((d, e)) => {
            let body = fixed_from_parts(&d, e);
            // Guarantee the full fractional width (rounding may have
            // shortened it for values below 10^-prec).
            pad_fraction(body, prec)
        }
        None => {
            let mut out = String::from("0");
            if prec > 0 {
                out.push('.');
                out.push_str(&"0".repeat(prec as usize));
            }
            out
        }
    }
}

fn pad_fraction(mut body: String, prec: i64) -> String {
    if prec <= 0 {
        return body;
    }
    let frac_len = match body.find('.') {
        Some(dot) => (body.len() - dot - 1) as i64,
        None => {
            body.push('.');
            0
        }
    };
    if frac_len < prec {
        body.push_str(&"0".repeat((prec - frac_len) as usize));
    }
    body
}

/// Strip trailing fractional zeros (general form without `#`).
fn strip_trailing_zeros(body: &mut String) {
    if body.contains('.') {
        while body.ends_with('0') {
            body.pop();
        }
        if body.ends_with('.') {
            body.pop();
        }
    }
}

fn sign_prefix(negative: bool, sign: Sign) -> &'static str {
    if negative {
        "-"
    } else {
        match sign {
            Sign::Plus => "+",
            Sign::Space => " ",
            _ => "",
        }
    }
}

pub fn render(f: &mut Interp<'_, '_>, value: FloatVal) {
    let specs = active_specs(f);
    let type_char = specs.type_char;
    let upper = specs.is_upper_type();
    let negative = value.is_sign_negative();
    let prefix = sign_prefix(negative, specs.sign);

    if value.is_nan() || value.is_infinite() {
        let mut body = String::from(match (value.is_nan(), upper) {
            (true, false) => "nan",
            (true, true) => "NAN",
            (false, false) => "inf",
            (false, true) => "INF",
        });
        if type_char == Some('%') {
            body.push('%');
        }
        let mut combined = String::from(prefix);
        combined.push_str(&body);
        write_padded(f, &combined, Align::Right);
        return;
    }

    let body = match type_char {
        None if specs.precision.is_none() => render_default(value, &specs),
        Some('e') | Some('E') => render_scientific(value.wide_abs(), &specs, upper),
        Some('f') | Some('F') => {
            let prec = specs.precision.unwrap_or(6) as i64;
            let mut s = fixed_with_precision(value.wide_abs(), prec);
            if specs.hash && prec == 0 {
                s.push('.');
            }
            s
        }
        Some('%') => {
            let prec = specs.precision.unwrap_or(6) as i64;
            let mut s = fixed_with_precision(value.wide_abs() * 100.0, prec);
            s.push('%');
            s
        }
        // 'g', 'G' and a bare precision all take the general form.
        _ => render_general(value.wide_abs(), &specs, upper),
    };

    write_numeric_padded(f, prefix, &body);
}

/// No type, no precision: shortest round-trip digits, fixed form inside the
/// `[-4, 15]` exponent bracket, scientific outside it.
fn render_default(value: FloatVal, specs: &FormatSpecs) -> String {
    let (digits, exp) = parse_exp_string(&value.shortest_exp_string());

    if (-4..=15).contains(&exp) {
        let mut body = fixed_from_parts(&digits, exp);
        if specs.hash && !body.contains('.') {
            body.push_str(".0");
        }
        body
    } else {
        let mut body = String::new();
        body.push_str(&digits[..1]);
        if digits.len() > 1 {
            body.push('.');
            body.push_str(&digits[1..]);
        } else if specs.hash {
            body.push('.');
        }
        body.push_str(&exponent_suffix(exp, false));
        body
    }
}

/// `e`/`E`: one digit, a point, `precision` digits, a signed two-digit
/// exponent.
fn render_scientific(value: f64, specs: &FormatSpecs, upper: bool) -> String {
    let prec = specs.precision.unwrap_or(6) as i64;
    let (digits, exp) = exact_parts(value);
    let (d, e) = match round_significant(&digits, exp, prec + 1) {
        Some(parts) => parts,
        None => ("0".repeat(prec as usize + 1), 0),
    };
    let mut body = String::new();
    body.push_str(&d[..1]);
    if d.len() > 1 {
        body.push('.');
        body.push_str(&d[1..]);
    } else if specs.hash {
        body.push('.');
    }
    body.push_str(&exponent_suffix(e, upper));
    body
}

/// `g`-style general form: `P` significant digits, fixed when the exponent
/// is in `[-4, P)`, scientific otherwise, trailing zeros stripped unless `#`.
fn render_general(value: f64, specs: &FormatSpecs, upper: bool) -> String {
    let p = (specs.precision.unwrap_or(6) as i64).max(1);
    let (digits, exp) = exact_parts(value);
    let (d, e) = match round_significant(&digits, exp, p) {
        Some(parts) => parts,
        None => ("0".into(), 0),
    };

    if e < -4 || e as i64 >= p {
        let mut mantissa = String::new();
        mantissa.push_str(&d[..1]);
        if d.len() > 1 {
            mantissa.push('.');
            mantissa.push_str(&d[1..]);
        }
        if !specs.hash {
            strip_trailing_zeros(&mut mantissa);
        }
        mantissa.push_str(&exponent_suffix(e, upper));
        mantissa
    } else {
        let mut body = fixed_from_parts(&d, e);
        if !specs.hash {
            strip_trailing_zeros(&mut body);
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exp_string_parsing() {
        assert_eq!(parse_exp_string("3.92649e2"), ("392649".into(), 2));
        assert_eq!(parse_exp_string("0e0"), ("0".into(), 0));
        assert_eq!(parse_exp_string("1e-5"), ("1".into(), -5));
    }

    #[test]
    fn rounding_half_away_from_zero() {
        // 0.5 exactly: one kept digit rounds away from zero.
        let (digits, exp) = exact_parts(0.5);
        assert_eq!(round_significant(&digits, exp, 0), Some(("1".into(), 0)));

        let (digits, exp) = exact_parts(0.2);
        assert_eq!(round_significant(&digits, exp, 0), None);

        let (digits, exp) = exact_parts(9.5);
        assert_eq!(round_significant(&digits, exp, 1), Some(("1".into(), 1)));

        let (digits, exp) = exact_parts(9.1);
        assert_eq!(round_significant(&digits, exp, 1), Some(("9".into(), 0)));
    }

    #[test]
    fn fixed_builder() {
        assert_eq!(fixed_from_parts("392649", 2), "392.649");
        assert_eq!(fixed_from_parts("1", 15), "1000000000000000");
        assert_eq!(fixed_from_parts("1234", -3), "0.001234");
        assert_eq!(fixed_from_parts("42", 1), "42");
    }

    #[test]
    fn fixed_precision_strings() {
        assert_eq!(fixed_with_precision(0.0, 6), "0.000000");
        assert_eq!(fixed_with_precision(392.65, 6), "392.650000");
        assert_eq!(fixed_with_precision(0.0005, 3), "0.001");
        assert_eq!(fixed_with_precision(0.00049, 3), "0.000");
        assert_eq!(fixed_with_precision(0.9999, 3), "1.000");
        assert_eq!(fixed_with_precision(7.2809479766055470e-15, 4), "0.0000");
    }

    #[test]
    fn exponent_suffixes() {
        assert_eq!(exponent_suffix(2, false), "e+02");
        assert_eq!(exponent_suffix(-5, false), "e-05");
        assert_eq!(exponent_suffix(-324, false), "e-324");
        assert_eq!(exponent_suffix(16, true), "E+16");
    }
}
