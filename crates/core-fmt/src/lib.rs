//! Formatted output engine with a Python-style mini-language.
//!
//! Format strings consist of literal text and `{…}` replacement fields:
//! automatic (`{}`) or manual (`{0}`, `{name}`) argument references, a
//! `:`-separated specifier (`[[fill]align][sign][#][0][width][.precision]
//! [type]`, with `{…}`-dynamic width/precision), `{{`/`}}` escapes, and
//! `{!STYLE}` fields that emit ANSI color/emphasis escapes without consuming
//! an argument.
//!
//! Arguments are captured by reference into a typed store at the call site
//! (see [`sprint!`]/[`print!`]); malformed format strings are reported to the
//! context's `fmt_parse_error_handler` and formatting stops cleanly, flushing
//! whatever was already produced.

pub mod args;
pub mod interp;
pub mod parse;
pub mod render;
pub mod specs;
pub mod style;
pub mod writer;

use core_collections::Text;
use core_memory::context::{context, LogHandle};

pub use args::{FmtArg, FmtCustom, FmtValue, IntoFmtValue};
pub use interp::Interp;
pub use specs::{Align, FormatSpecs, Sign};
pub use style::{Emphasis, TextStyle};
pub use writer::{BuilderWriter, ConsoleStream, ConsoleWriter, CountingWriter, Writer};

/// Format into any writer. The writer is flushed afterwards, error or not.
pub fn fmt_to_writer(writer: &mut dyn Writer, fmt_string: &str, fmt_args: &[FmtArg<'_>]) {
    let mut f = Interp::new(writer, fmt_string, fmt_args);
    parse::parse_and_format(&mut f);
    f.flush();
}

/// Number of bytes the formatted output would occupy.
pub fn calculate_formatted_size(fmt_string: &str, fmt_args: &[FmtArg<'_>]) -> i64 {
    let mut counter = CountingWriter::new();
    fmt_to_writer(&mut counter, fmt_string, fmt_args);
    counter.count
}

/// Format into a fresh [`Text`]: size with a counting pass, then emit through
/// a builder writer.
pub fn sprint_args(fmt_string: &str, fmt_args: &[FmtArg<'_>]) -> Text {
    let size = calculate_formatted_size(fmt_string, fmt_args);
    let mut writer = BuilderWriter::new();
    fmt_to_writer(&mut writer, fmt_string, fmt_args);
    let mut out = Text::new();
    out.reserve(size);
    let built = writer.to_text();
    out.append_bytes(built.as_bytes());
    out
}

/// Format to the context's log writer.
pub fn print_args(fmt_string: &str, fmt_args: &[FmtArg<'_>]) {
    match context().log {
        LogHandle::Stdout => {
            let mut w = ConsoleWriter::new(ConsoleStream::Stdout);
            fmt_to_writer(&mut w, fmt_string, fmt_args);
        }
        LogHandle::Stderr => {
            let mut w = ConsoleWriter::new(ConsoleStream::Stderr);
            fmt_to_writer(&mut w, fmt_string, fmt_args);
        }
        LogHandle::Null => {
            let mut w = CountingWriter::new();
            fmt_to_writer(&mut w, fmt_string, fmt_args);
        }
        LogHandle::Custom(raw) => {
            // SAFETY: whoever installed the handle guaranteed its lifetime
            // for the scope of the override.
            let w = unsafe { &mut *raw };
            fmt_to_writer(w, fmt_string, fmt_args);
        }
    }
}

/// Build a `[FmtArg; N]` from a comma-separated list of expressions, with
/// `name = value` entries becoming named arguments.
#[macro_export]
macro_rules! fmt_args {
    (@accum [$($done:expr),*] $name:ident = $e:expr, $($rest:tt)+) => {
        $crate::fmt_args!(@accum [$($done,)* $crate::args::FmtArg::named(stringify!($name), &$e)] $($rest)+)
    };
    (@accum [$($done:expr),*] $name:ident = $e:expr) => {
        [$($done,)* $crate::args::FmtArg::named(stringify!($name), &$e)]
    };
    (@accum [$($done:expr),*] $e:expr, $($rest:tt)+) => {
        $crate::fmt_args!(@accum [$($done,)* $crate::args::FmtArg::positional(&$e)] $($rest)+)
    };
    (@accum [$($done:expr),*] $e:expr) => {
        [$($done,)* $crate::args::FmtArg::positional(&$e)]
    };
    ($($t:tt)+) => {
        $crate::fmt_args!(@accum [] $($t)+)
    };
}

/// Format into a [`Text`].
#[macro_export]
macro_rules! sprint {
    ($fmt:expr) => {
        $crate::sprint_args($fmt, &[])
    };
    ($fmt:expr, $($rest:tt)+) => {
        $crate::sprint_args($fmt, &$crate::fmt_args!($($rest)+))
    };
}

/// Format to the context's log writer.
#[macro_export]
macro_rules! print {
    ($fmt:expr) => {
        $crate::print_args($fmt, &[])
    };
    ($fmt:expr, $($rest:tt)+) => {
        $crate::print_args($fmt, &$crate::fmt_args!($($rest)+))
    };
}

/// Format to a writer, macro form (used by custom formatters to recurse).
#[macro_export]
macro_rules! write_fmt {
    ($writer:expr, $fmt:expr) => {
        $crate::fmt_to_writer($writer, $fmt, &[])
    };
    ($writer:expr, $fmt:expr, $($rest:tt)+) => {
        $crate::fmt_to_writer($writer, $fmt, &$crate::fmt_args!($($rest)+))
    };
}
