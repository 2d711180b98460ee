//! The format interpreter: holds the argument store, the current writer and
//! specifier block, and dispatches each argument to its renderer.

use core_memory::context::fmt_parse_error;

use crate::args::{FmtArg, FmtValue, IntoFmtValue};
use crate::render;
use crate::specs::FormatSpecs;
use crate::writer::Writer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Indexing {
    Unset,
    Automatic,
    Manual,
}

pub struct Interp<'w, 'a> {
    pub(crate) writer: &'w mut dyn Writer,
    pub fmt_string: &'a str,
    pub args: &'a [FmtArg<'a>],
    /// Specifier block of the field currently being rendered.
    pub specs: Option<FormatSpecs>,
    pub(crate) next_arg_id: usize,
    pub(crate) indexing: Indexing,
    pub(crate) errored: bool,
}

impl<'w, 'a> Interp<'w, 'a> {
    pub fn new(writer: &'w mut dyn Writer, fmt_string: &'a str, args: &'a [FmtArg<'a>]) -> Self {
        Interp {
            writer,
            fmt_string,
            args,
            specs: None,
            next_arg_id: 0,
            indexing: Indexing::Unset,
            errored: false,
        }
    }

    /// Report a parse error through the context and stop this format call.
    pub fn on_error(&mut self, message: &str, position: i64) {
        if !self.errored {
            self.errored = true;
            fmt_parse_error(message, self.fmt_string, position);
        }
    }

    /// Raw bytes to the writer, ignoring any active specifiers.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.writer.write(bytes);
    }

    pub fn write_raw_str(&mut self, s: &str) {
        self.writer.write(s.as_bytes());
    }

    pub fn flush(&mut self) {
        self.writer.flush();
    }

    /// Claim the next automatic argument index. Errors when manual indexing
    /// was already used.
    pub(crate) fn claim_auto_index(&mut self, position: i64) -> Option<usize> {
        match self.indexing {
            Indexing::Manual => {
                self.on_error(
                    "Cannot switch from manual to automatic argument indexing",
                    position,
                );
                None
            }
            _ => {
                self.indexing = Indexing::Automatic;
                let id = self.next_arg_id;
                self.next_arg_id += 1;
                Some(id)
            }
        }
    }

    /// Validate use of an explicit argument index against the indexing mode.
    pub(crate) fn claim_manual_index(&mut self, position: i64) -> bool {
        match self.indexing {
            Indexing::Automatic => {
                self.on_error(
                    "Cannot switch from automatic to manual argument indexing",
                    position,
                );
                false
            }
            _ => {
                self.indexing = Indexing::Manual;
                true
            }
        }
    }

    pub(crate) fn arg_by_index(&mut self, index: usize, position: i64) -> Option<FmtValue<'a>> {
        match self.args.get(index) {
            Some(arg) => Some(arg.value),
            None => {
                self.on_error("Argument index out of range", position);
                None
            }
        }
    }

    pub(crate) fn arg_by_name(&mut self, name: &str, position: i64) -> Option<FmtValue<'a>> {
        match self.args.iter().find(|a| a.name == Some(name)) {
            Some(arg) => Some(arg.value),
            None => {
                self.on_error("There is no argument with this name", position);
                None
            }
        }
    }

    /// Render a value under the current specifier block.
    pub fn format_value(&mut self, value: FmtValue<'a>) {
        match value {
            FmtValue::None => {}
            FmtValue::S64(v) => render::int::render_signed(self, v),
            FmtValue::U64(v) => render::int::render_unsigned(self, v),
            FmtValue::Bool(v) => render::text::render_bool(self, v),
            FmtValue::CodePoint(cp) => render::text::render_code_point(self, cp),
            FmtValue::F32(v) => render::float::render(self, render::float::FloatVal::F32(v)),
            FmtValue::F64(v) => render::float::render(self, render::float::FloatVal::F64(v)),
            FmtValue::Str(s) => render::text::render_str(self, s),
            FmtValue::CString(s) => {
                let bytes = s.to_bytes();
                let s = std::str::from_utf8(bytes).unwrap_or("");
                render::text::render_str(self, s)
            }
            FmtValue::Pointer(p) => render::text::render_pointer(self, p),
            FmtValue::Custom(custom) => custom.fmt_custom(self),
        }
    }

    /// Render a value with default specifiers (used by the list/struct/tuple
    /// helpers and container adapters so nested entries don't inherit the
    /// outer field's width or alignment).
    pub fn write_fmt_value(&mut self, value: FmtValue<'_>) {
        let saved = self.specs.take();
        // The borrow of `value` is only for this call; reborrow compatible.
        match value {
            FmtValue::None => {}
            FmtValue::S64(v) => render::int::render_signed(self, v),
            FmtValue::U64(v) => render::int::render_unsigned(self, v),
            FmtValue::Bool(v) => render::text::render_bool(self, v),
            FmtValue::CodePoint(cp) => render::text::render_code_point(self, cp),
            FmtValue::F32(v) => render::float::render(self, render::float::FloatVal::F32(v)),
            FmtValue::F64(v) => render::float::render(self, render::float::FloatVal::F64(v)),
            FmtValue::Str(s) => render::text::render_str(self, s),
            FmtValue::CString(s) => {
                let bytes = s.to_bytes();
                let s = std::str::from_utf8(bytes).unwrap_or("");
                render::text::render_str(self, s)
            }
            FmtValue::Pointer(p) => render::text::render_pointer(self, p),
            FmtValue::Custom(custom) => custom.fmt_custom(self),
        }
        self.specs = saved;
    }

    /// Run a nested format string against the same writer. Custom formatters
    /// use this to recurse.
    pub fn write_fmt(&mut self, fmt: &str, args: &[FmtArg<'_>]) {
        let saved_specs = self.specs.take();
        let mut nested = Interp::new(&mut *self.writer, fmt, args);
        crate::parse::parse_and_format(&mut nested);
        self.specs = saved_specs;
    }

    /// `[a, b, c]`-style helper for list-like custom formatters.
    pub fn format_list<'i>(&'i mut self) -> ListBuilder<'i, 'w, 'a> {
        self.write_raw_str("[");
        ListBuilder {
            f: self,
            first: true,
        }
    }

    /// `name(a, b, c)`-style helper.
    pub fn format_tuple<'i>(&'i mut self, name: &str) -> TupleBuilder<'i, 'w, 'a> {
        self.write_raw_str(name);
        self.write_raw_str("(");
        TupleBuilder {
            f: self,
            first: true,
        }
    }

    /// `name { field: value, ... }`-style helper.
    pub fn debug_struct<'i>(&'i mut self, name: &str) -> StructBuilder<'i, 'w, 'a> {
        self.write_raw_str(name);
        self.write_raw_str(" {");
        StructBuilder {
            f: self,
            first: true,
        }
    }
}

pub struct ListBuilder<'i, 'w, 'a> {
    f: &'i mut Interp<'w, 'a>,
    first: bool,
}

impl ListBuilder<'_, '_, '_> {
    pub fn entry<T: IntoFmtValue + ?Sized>(&mut self, value: &T) -> &mut Self {
        if !self.first {
            self.f.write_raw_str(", ");
        }
        self.first = false;
        self.f.write_fmt_value(value.into_fmt_value());
        self
    }

    pub fn entries<'t, T: IntoFmtValue + 't>(
        &mut self,
        values: impl IntoIterator<Item = &'t T>,
    ) -> &mut Self {
        for v in values {
            self.entry(v);
        }
        self
    }

    pub fn finish(self) {
        self.f.write_raw_str("]");
    }
}

pub struct TupleBuilder<'i, 'w, 'a> {
    f: &'i mut Interp<'w, 'a>,
    first: bool,
}

impl TupleBuilder<'_, '_, '_> {
    pub fn field<T: IntoFmtValue + ?Sized>(&mut self, value: &T) -> &mut Self {
        if !self.first {
            self.f.write_raw_str(", ");
        }
        self.first = false;
        self.f.write_fmt_value(value.into_fmt_value());
        self
    }

    pub fn finish(&mut self) {
        self.f.write_raw_str(")");
    }
}

pub struct StructBuilder<'i, 'w, 'a> {
    f: &'i mut Interp<'w, 'a>,
    first: bool,
}

impl StructBuilder<'_, '_, '_> {
    pub fn field<T: IntoFmtValue + ?Sized>(&mut self, name: &str, value: &T) -> &mut Self {
        if !self.first {
            self.f.write_raw_str(",");
        }
        self.first = false;
        self.f.write_raw_str(" ");
        self.f.write_raw_str(name);
        self.f.write_raw_str(": ");
        self.f.write_fmt_value(value.into_fmt_value());
        self
    }

    pub fn finish(&mut self) {
        self.f.write_raw_str(" }");
    }
}
