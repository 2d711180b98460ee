//! Parser for the `{…}` format mini-language.
//!
//! Walks the format string byte by byte, copying literal runs to the writer
//! (with `{{`/`}}` escapes), and for each replacement field resolves the
//! argument, parses the specifier block, and hands off to the renderers.
//!
//! Parsing is strictly syntactic; dynamic width/precision resolution and
//! semantic validation of the specifiers against the argument kind happen
//! only after the field's closing `}` has been seen, so a truncated field
//! always reports `"}" expected` rather than a later semantic error. Every
//! malformed input reports a specific message through the context's
//! format-error handler and stops the call.

use core_memory::context::context;
use core_unicode::utf8::size_of_lead_byte;

use crate::args::FmtValue;
use crate::interp::Interp;
use crate::specs::{Align, FormatSpecs, Sign};
use crate::style::{
    lookup_named_color, lookup_terminal_color, style_to_ansi, ColorSpec, Emphasis, TextStyle,
};

pub fn parse_and_format(f: &mut Interp<'_, '_>) {
    let bytes = f.fmt_string.as_bytes().to_vec();
    let mut i = 0usize;

    while i < bytes.len() {
        // Copy the literal run up to the next '{', honoring "}}" escapes and
        // rejecting a lone '}'.
        let mut run_start = i;
        loop {
            if i >= bytes.len() {
                f.write_raw(&bytes[run_start..i]);
                return;
            }
            match bytes[i] {
                b'{' => {
                    f.write_raw(&bytes[run_start..i]);
                    break;
                }
                b'}' => {
                    f.write_raw(&bytes[run_start..i]);
                    if i + 1 < bytes.len() && bytes[i + 1] == b'}' {
                        f.write_raw_str("}");
                        i += 2;
                        run_start = i;
                    } else {
                        f.on_error(
                            "Unmatched \"}\" in format string - if you want to print it use \"}}\" to escape",
                            i as i64,
                        );
                        return;
                    }
                }
                _ => i += 1,
            }
        }

        // At a '{'.
        i += 1;
        if i >= bytes.len() {
            f.on_error("Invalid format string", i as i64);
            return;
        }

        match bytes[i] {
            b'{' => {
                f.write_raw_str("{");
                i += 1;
            }
            b'}' => {
                let Some(index) = f.claim_auto_index(i as i64) else { return };
                let Some(value) = f.arg_by_index(index, i as i64) else { return };
                f.specs = None;
                f.format_value(value);
                i += 1;
            }
            b'!' => {
                i += 1;
                let Some(style) = parse_text_style(f, &bytes, &mut i) else { return };
                if i >= bytes.len() || bytes[i] != b'}' {
                    f.on_error("\"}\" expected", i as i64);
                    return;
                }
                i += 1;
                if !context().fmt_disable_ansi_codes {
                    let mut seq = String::new();
                    style_to_ansi(&style, &mut seq);
                    f.write_raw_str(&seq);
                }
            }
            _ => {
                let Some(value) = parse_arg_ref(f, &bytes, &mut i) else { return };
                if i >= bytes.len() {
                    f.on_error("Format string ended abruptly", i as i64);
                    return;
                }
                match bytes[i] {
                    b'}' => {
                        f.specs = None;
                        f.format_value(value);
                        i += 1;
                    }
                    b':' => {
                        i += 1;
                        let field_pos = i as i64;
                        let Some(pending) = parse_fmt_specs(f, &bytes, &mut i) else {
                            return;
                        };
                        if i >= bytes.len() || bytes[i] != b'}' {
                            f.on_error("\"}\" expected", i as i64);
                            return;
                        }
                        i += 1;
                        let Some(specs) = finalize_specs(f, pending, &value, field_pos) else {
                            return;
                        };
                        f.specs = Some(specs);
                        f.format_value(value);
                        f.specs = None;
                    }
                    _ => {
                        f.on_error("Expected \":\" or \"}\"", i as i64);
                        return;
                    }
                }
            }
        }
        if f.errored {
            return;
        }
    }
}

/// Parse an argument reference (index, name, or automatic) and fetch its
/// value.
fn parse_arg_ref<'a>(
    f: &mut Interp<'_, 'a>,
    bytes: &[u8],
    i: &mut usize,
) -> Option<FmtValue<'a>> {
    let start = *i;
    if bytes[*i].is_ascii_digit() {
        let index = parse_integer(bytes, i).unwrap_or(u64::MAX);
        if !f.claim_manual_index(start as i64) {
            return None;
        }
        if *i >= bytes.len() {
            f.on_error("Format string ended abruptly", *i as i64);
            return None;
        }
        return f.arg_by_index(index.min(usize::MAX as u64) as usize, start as i64);
    }
    if bytes[*i] == b'_' || bytes[*i].is_ascii_alphabetic() {
        let mut end = *i;
        while end < bytes.len() && (bytes[end] == b'_' || bytes[end].is_ascii_alphanumeric()) {
            end += 1;
        }
        let name = std::str::from_utf8(&bytes[*i..end]).ok()?;
        *i = end;
        if !f.claim_manual_index(start as i64) {
            return None;
        }
        return f.arg_by_name(name, start as i64);
    }
    f.on_error("Expected \":\" or \"}\"", start as i64);
    None
}

/// Parse a run of decimal digits. `None` on overflow.
fn parse_integer(bytes: &[u8], i: &mut usize) -> Option<u64> {
    let mut value: u64 = 0;
    let mut overflow = false;
    while *i < bytes.len() && bytes[*i].is_ascii_digit() {
        value = match value
            .checked_mul(10)
            .and_then(|v| v.checked_add((bytes[*i] - b'0') as u64))
        {
            Some(v) => v,
            None => {
                overflow = true;
                u64::MAX
            }
        };
        *i += 1;
    }
    if overflow {
        None
    } else {
        Some(value)
    }
}

/// An unresolved dynamic width/precision reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DynId {
    None,
    Auto,
    Index(usize),
}

/// Specifier block after the syntactic pass; dynamic references still
/// unresolved.
struct PendingSpecs {
    specs: FormatSpecs,
    dyn_width: DynId,
    dyn_precision: DynId,
}

#[derive(Clone, Copy, PartialEq)]
enum DynKind {
    Width,
    Precision,
}

fn is_align_byte(b: u8) -> bool {
    matches!(b, b'<' | b'>' | b'=' | b'^')
}

fn align_of_byte(b: u8) -> Align {
    match b {
        b'<' => Align::Left,
        b'>' => Align::Right,
        b'=' => Align::Numeric,
        _ => Align::Center,
    }
}

/// Syntactic parse of `[[fill]align][sign][#][0][width][.precision][type]`.
fn parse_fmt_specs(
    f: &mut Interp<'_, '_>,
    bytes: &[u8],
    i: &mut usize,
) -> Option<PendingSpecs> {
    let mut pending = PendingSpecs {
        specs: FormatSpecs::default(),
        dyn_width: DynId::None,
        dyn_precision: DynId::None,
    };
    let specs = &mut pending.specs;

    // [[fill]align] -- the fill may be any code point.
    if *i < bytes.len() && bytes[*i] != b'}' {
        let fill_len = size_of_lead_byte(bytes[*i]);
        let after_fill = *i + fill_len;
        if after_fill < bytes.len() && is_align_byte(bytes[after_fill]) {
            if bytes[*i] == b'{' {
                f.on_error("Invalid fill character \"{\"", *i as i64);
                return None;
            }
            let fill_str = std::str::from_utf8(bytes.get(*i..after_fill)?).ok()?;
            specs.fill = fill_str.chars().next()?;
            specs.align = align_of_byte(bytes[after_fill]);
            *i = after_fill + 1;
        } else if is_align_byte(bytes[*i]) {
            specs.align = align_of_byte(bytes[*i]);
            *i += 1;
        }
    }

    // [sign]
    if *i < bytes.len() {
        specs.sign = match bytes[*i] {
            b'+' => Sign::Plus,
            b'-' => Sign::Minus,
            b' ' => Sign::Space,
            _ => Sign::None,
        };
        if specs.sign != Sign::None {
            *i += 1;
        }
    }

    // [#]
    if *i < bytes.len() && bytes[*i] == b'#' {
        specs.hash = true;
        *i += 1;
    }

    // [0]
    if *i < bytes.len() && bytes[*i] == b'0' {
        specs.zero = true;
        if specs.align == Align::None {
            specs.align = Align::Numeric;
        }
        if specs.fill == ' ' {
            specs.fill = '0';
        }
        *i += 1;
    }

    // [width]
    if *i < bytes.len() && bytes[*i].is_ascii_digit() {
        let start = *i;
        match parse_integer(bytes, i) {
            Some(v) if v <= i32::MAX as u64 => specs.width = Some(v as i32),
            _ => {
                f.on_error("We parsed an integer width which was too large", start as i64);
                return None;
            }
        }
    } else if *i < bytes.len() && bytes[*i] == b'{' {
        *i += 1;
        pending.dyn_width = parse_dynamic_id(f, bytes, i, DynKind::Width)?;
    }

    // [.precision]
    if *i < bytes.len() && bytes[*i] == b'.' {
        *i += 1;
        if *i < bytes.len() && bytes[*i].is_ascii_digit() {
            let start = *i;
            match parse_integer(bytes, i) {
                Some(v) if v <= i32::MAX as u64 => specs.precision = Some(v as i32),
                _ => {
                    f.on_error(
                        "We parsed an integer precision which was too large",
                        start as i64,
                    );
                    return None;
                }
            }
        } else if *i < bytes.len() && bytes[*i] == b'{' {
            *i += 1;
            pending.dyn_precision = parse_dynamic_id(f, bytes, i, DynKind::Precision)?;
        } else {
            f.on_error(
                "Missing precision specifier (we parsed a dot but nothing valid after that)",
                *i as i64,
            );
            return None;
        }
    }

    // [type]
    if *i < bytes.len() && (bytes[*i].is_ascii_alphabetic() || bytes[*i] == b'%') {
        specs.type_char = Some(bytes[*i] as char);
        *i += 1;
    }

    Some(pending)
}

/// Syntactic parse of the `{…}` inside a width/precision slot.
fn parse_dynamic_id(
    f: &mut Interp<'_, '_>,
    bytes: &[u8],
    i: &mut usize,
    kind: DynKind,
) -> Option<DynId> {
    let id = if *i < bytes.len() && bytes[*i].is_ascii_digit() {
        let index = parse_integer(bytes, i).unwrap_or(u64::MAX);
        DynId::Index(index.min(usize::MAX as u64) as usize)
    } else if *i >= bytes.len() || bytes[*i] == b'}' {
        // An empty id is automatic; a truncated one falls through to the
        // closing-brace check below.
        DynId::Auto
    } else {
        f.on_error("Expected a number - an index to an argument", *i as i64);
        return None;
    };

    if *i >= bytes.len() || bytes[*i] != b'}' {
        f.on_error(
            match kind {
                DynKind::Width => {
                    "Expected a closing \"}\" after parsing an argument ID for a dynamic width"
                }
                DynKind::Precision => {
                    "Expected a closing \"}\" after parsing an argument ID for a dynamic precision"
                }
            },
            *i as i64,
        );
        return None;
    }
    *i += 1;
    Some(id)
}

/// Resolve dynamic references and validate the block against the argument.
fn finalize_specs(
    f: &mut Interp<'_, '_>,
    pending: PendingSpecs,
    value: &FmtValue<'_>,
    position: i64,
) -> Option<FormatSpecs> {
    let mut specs = pending.specs;

    if pending.dyn_width != DynId::None {
        specs.width = Some(resolve_dynamic_value(f, pending.dyn_width, DynKind::Width, position)?);
    }
    if pending.dyn_precision != DynId::None {
        specs.precision = Some(resolve_dynamic_value(
            f,
            pending.dyn_precision,
            DynKind::Precision,
            position,
        )?);
    }

    if !validate_specs(f, &specs, value, position) {
        return None;
    }
    Some(specs)
}

fn resolve_dynamic_value(
    f: &mut Interp<'_, '_>,
    id: DynId,
    kind: DynKind,
    position: i64,
) -> Option<i32> {
    let index = match id {
        DynId::Auto => f.claim_auto_index(position)?,
        DynId::Index(index) => {
            if !f.claim_manual_index(position) {
                return None;
            }
            index
        }
        DynId::None => unreachable!(),
    };
    let value = f.arg_by_index(index, position)?;

    let as_signed = match value {
        FmtValue::S64(v) => Some(v),
        FmtValue::U64(v) => {
            if v > i32::MAX as u64 {
                f.on_error(
                    match kind {
                        DynKind::Width => "Width value is too big",
                        DynKind::Precision => "Precision value is too big",
                    },
                    position,
                );
                return None;
            }
            Some(v as i64)
        }
        // char32-like arguments count as integers here, matching the
        // integral treatment of code points in dynamic slots.
        FmtValue::CodePoint(cp) => Some(cp as i64),
        _ => {
            f.on_error(
                match kind {
                    DynKind::Width => "Width was not an integer",
                    DynKind::Precision => "Precision was not an integer",
                },
                position,
            );
            return None;
        }
    }?;

    if as_signed < 0 {
        f.on_error(
            match kind {
                DynKind::Width => "Negative width",
                DynKind::Precision => "Negative precision",
            },
            position,
        );
        return None;
    }
    if as_signed > i32::MAX as i64 {
        f.on_error(
            match kind {
                DynKind::Width => "Width value is too big",
                DynKind::Precision => "Precision value is too big",
            },
            position,
        );
        return None;
    }
    Some(as_signed as i32)
}

fn is_arithmetic(value: &FmtValue<'_>) -> bool {
    matches!(
        value,
        FmtValue::S64(_) | FmtValue::U64(_) | FmtValue::F32(_) | FmtValue::F64(_)
    )
}

fn validate_specs(
    f: &mut Interp<'_, '_>,
    specs: &FormatSpecs,
    value: &FmtValue<'_>,
    position: i64,
) -> bool {
    let t = specs.type_char;

    // Per-kind type letter validity.
    let type_ok = match value {
        FmtValue::S64(_) | FmtValue::U64(_) => matches!(
            t,
            None | Some('b' | 'B' | 'd' | 'o' | 'x' | 'X' | 'n' | 'c')
        ),
        FmtValue::F32(_) | FmtValue::F64(_) => {
            matches!(t, None | Some('e' | 'E' | 'f' | 'F' | 'g' | 'G' | '%'))
        }
        FmtValue::Pointer(_) => matches!(t, None | Some('p')),
        FmtValue::CodePoint(_) => matches!(
            t,
            None | Some('c' | 'b' | 'B' | 'd' | 'o' | 'x' | 'X' | 'n')
        ),
        FmtValue::Str(_) => matches!(t, None | Some('s')),
        FmtValue::CString(_) => matches!(t, None | Some('s' | 'p')),
        FmtValue::Bool(_) => matches!(t, None | Some('d' | 's')),
        FmtValue::Custom(_) | FmtValue::None => true,
    };
    if !type_ok {
        let message = match value {
            FmtValue::S64(_) | FmtValue::U64(_) => "Invalid type specifier for an integer",
            FmtValue::F32(_) | FmtValue::F64(_) => "Invalid type specifier for a float",
            FmtValue::Pointer(_) => "Invalid type specifier for a pointer",
            FmtValue::CodePoint(_) => "Invalid type specifier for a code point",
            FmtValue::Bool(_) => "Invalid type specifier for a bool",
            _ => "Invalid type specifier for a string",
        };
        f.on_error(message, position);
        return false;
    }

    // A code point rendered as a code point rejects all numeric decoration.
    if matches!(value, FmtValue::CodePoint(_)) && matches!(t, None | Some('c')) {
        let numeric_decoration = specs.align == Align::Numeric
            || specs.sign != Sign::None
            || specs.hash
            || specs.zero;
        if numeric_decoration {
            f.on_error(
                "Invalid format specifier(s) for code point - code points can't have numeric alignment, signs or #",
                position,
            );
            return false;
        }
    }

    // Signs.
    if specs.sign != Sign::None && !matches!(value, FmtValue::CodePoint(_)) {
        match value {
            FmtValue::U64(_) => {
                f.on_error(
                    "Format specifier requires a signed integer argument (got unsigned)",
                    position,
                );
                return false;
            }
            FmtValue::S64(_) | FmtValue::F32(_) | FmtValue::F64(_) => {}
            _ => {
                f.on_error("Format specifier requires an arithmetic argument", position);
                return false;
            }
        }
    }

    // '=' alignment, '#' and '0' all require arithmetic arguments.
    let arithmetic_only = specs.align == Align::Numeric || specs.hash || specs.zero;
    if arithmetic_only
        && !is_arithmetic(value)
        && !matches!(value, FmtValue::CodePoint(_) | FmtValue::Custom(_))
    {
        f.on_error("Format specifier requires an arithmetic argument", position);
        return false;
    }

    // Precision restrictions.
    if specs.precision.is_some() {
        match value {
            FmtValue::S64(_) | FmtValue::U64(_) | FmtValue::CodePoint(_) => {
                f.on_error("Precision is not allowed for integer types", position);
                return false;
            }
            FmtValue::Pointer(_) => {
                f.on_error("Precision is not allowed for pointer type", position);
                return false;
            }
            _ => {}
        }
    }

    true
}

/// Parse the `{!…}` text style body (cursor just after the '!').
fn parse_text_style(f: &mut Interp<'_, '_>, bytes: &[u8], i: &mut usize) -> Option<TextStyle> {
    let mut style = TextStyle::default();

    if *i < bytes.len() && bytes[*i] == b'}' {
        return Some(style); // empty style: reset
    }

    if *i < bytes.len() && bytes[*i].is_ascii_digit() {
        style.color = Some(parse_rgb(f, bytes, i)?);
    } else {
        // An identifier: try a color name first ('t' prefix selects the
        // 4-bit terminal set); failing that, treat it as emphasis letters.
        let start = *i;
        let mut end = *i;
        let mut saw_digit = false;
        while end < bytes.len() && (bytes[end] == b'_' || bytes[end].is_ascii_alphanumeric()) {
            saw_digit |= bytes[end].is_ascii_digit();
            end += 1;
        }
        let word = std::str::from_utf8(&bytes[start..end]).ok()?;

        let color = if let Some(rest) = word.strip_prefix('t') {
            lookup_terminal_color(rest)
        } else {
            lookup_named_color(word)
        };

        match color {
            Some(c) => {
                style.color = Some(c);
                *i = end;
            }
            None if saw_digit => {
                f.on_error(
                    "Invalid color name - it must be a valid identifier (without digits)",
                    start as i64,
                );
                return None;
            }
            None => {
                style.emphasis = parse_emphasis(f, bytes, i, end)?;
                return Some(style);
            }
        }
    }

    // After a color: optionally ";BG" or ";<emphasis>".
    if *i < bytes.len() && bytes[*i] == b';' {
        *i += 1;
        let start = *i;
        let mut end = *i;
        while end < bytes.len() && bytes[end].is_ascii_alphanumeric() {
            end += 1;
        }
        if &bytes[start..end] == b"BG" {
            style.background = true;
            *i = end;
        } else {
            style.emphasis = parse_emphasis(f, bytes, i, end)?;
        }
    }

    Some(style)
}

fn parse_emphasis(
    f: &mut Interp<'_, '_>,
    bytes: &[u8],
    i: &mut usize,
    end: usize,
) -> Option<Emphasis> {
    let mut emphasis = Emphasis::empty();
    for pos in *i..end {
        let flag = match bytes[pos] {
            b'B' => Emphasis::BOLD,
            b'I' => Emphasis::ITALIC,
            b'U' => Emphasis::UNDERLINE,
            b'S' => Emphasis::STRIKETHROUGH,
            _ => {
                f.on_error(
                    "Invalid emphasis character - valid ones are: B (bold), I (italic), U (underline) and S (strikethrough)",
                    pos as i64,
                );
                return None;
            }
        };
        emphasis |= flag;
    }
    *i = end;
    Some(emphasis)
}

fn parse_rgb(f: &mut Interp<'_, '_>, bytes: &[u8], i: &mut usize) -> Option<ColorSpec> {
    let mut channels = [0u8; 3];
    for (n, channel) in channels.iter_mut().enumerate() {
        if *i >= bytes.len() || !bytes[*i].is_ascii_digit() {
            f.on_error(
                "Expected an integer specifying a channel value (3 channels required)",
                *i as i64,
            );
            return None;
        }
        let start = *i;
        let value = parse_integer(bytes, i).unwrap_or(u64::MAX);
        if value > 255 {
            f.on_error(
                "Channel value too big - it must be in the range [0-255]",
                start as i64,
            );
            return None;
        }
        *channel = value as u8;

        if n < 2 {
            if *i >= bytes.len() || bytes[*i] != b';' {
                f.on_error(
                    "\";\" expected followed by the next channel value",
                    *i as i64,
                );
                return None;
            }
            *i += 1;
        }
    }
    // After the last channel only '}' or ';' may follow.
    if *i < bytes.len() && bytes[*i] != b'}' && bytes[*i] != b';' {
        f.on_error(
            "\"}\" expected (or \";\" for BG specifier or emphasis)",
            *i as i64,
        );
        return None;
    }
    Some(ColorSpec::Rgb(channels[0], channels[1], channels[2]))
}
