//! The typed argument store built at every formatting call site.
//!
//! Arguments are captured by reference into a fixed array of [`FmtArg`]s; the
//! value side is a closed enum over the recognized kinds. Custom types erase
//! to a `&dyn FmtCustom`, the pair of pointer and format function.

use std::ffi::CStr;

use core_collections::{Array, DList, SList, Table, Text};
use core_variant::Optional;

use crate::interp::Interp;

/// A user type that knows how to format itself. Implementations typically
/// inspect `f.specs` (e.g. the `#` flag for a debug form) and use the
/// [`Interp`] helpers.
pub trait FmtCustom {
    fn fmt_custom(&self, f: &mut Interp<'_, '_>);
}

/// The closed set of argument kinds.
#[derive(Clone, Copy)]
pub enum FmtValue<'a> {
    None,
    S64(i64),
    U64(u64),
    Bool(bool),
    CodePoint(char),
    F32(f32),
    F64(f64),
    Str(&'a str),
    CString(&'a CStr),
    Pointer(usize),
    Custom(&'a dyn FmtCustom),
}

impl<'a> FmtValue<'a> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            FmtValue::None => "none",
            FmtValue::S64(_) => "signed integer",
            FmtValue::U64(_) => "unsigned integer",
            FmtValue::Bool(_) => "bool",
            FmtValue::CodePoint(_) => "code point",
            FmtValue::F32(_) | FmtValue::F64(_) => "float",
            FmtValue::Str(_) => "string",
            FmtValue::CString(_) => "C string",
            FmtValue::Pointer(_) => "pointer",
            FmtValue::Custom(_) => "custom",
        }
    }
}

/// One captured argument, optionally named.
#[derive(Clone, Copy)]
pub struct FmtArg<'a> {
    pub name: Option<&'a str>,
    pub value: FmtValue<'a>,
}

impl<'a> FmtArg<'a> {
    pub fn positional<T: IntoFmtValue + ?Sized>(value: &'a T) -> Self {
        FmtArg {
            name: None,
            value: value.into_fmt_value(),
        }
    }

    pub fn named<T: IntoFmtValue + ?Sized>(name: &'a str, value: &'a T) -> Self {
        FmtArg {
            name: Some(name),
            value: value.into_fmt_value(),
        }
    }
}

/// Capture a value as a [`FmtValue`]. Custom types implement this by routing
/// through their [`FmtCustom`] impl (see [`crate::impl_fmt_custom!`]).
pub trait IntoFmtValue {
    fn into_fmt_value(&self) -> FmtValue<'_>;
}

// References format as what they point to.
impl<T: IntoFmtValue + ?Sized> IntoFmtValue for &T {
    fn into_fmt_value(&self) -> FmtValue<'_> {
        (**self).into_fmt_value()
    }
}

macro_rules! impl_into_signed {
    ($($t:ty),*) => {$(
        impl IntoFmtValue for $t {
            fn into_fmt_value(&self) -> FmtValue<'_> {
                FmtValue::S64(*self as i64)
            }
        }
    )*};
}
impl_into_signed!(i8, i16, i32, i64, isize);

macro_rules! impl_into_unsigned {
    ($($t:ty),*) => {$(
        impl IntoFmtValue for $t {
            fn into_fmt_value(&self) -> FmtValue<'_> {
                FmtValue::U64(*self as u64)
            }
        }
    )*};
}
impl_into_unsigned!(u8, u16, u32, u64, usize);

impl IntoFmtValue for bool {
    fn into_fmt_value(&self) -> FmtValue<'_> {
        FmtValue::Bool(*self)
    }
}

impl IntoFmtValue for char {
    fn into_fmt_value(&self) -> FmtValue<'_> {
        FmtValue::CodePoint(*self)
    }
}

impl IntoFmtValue for f32 {
    fn into_fmt_value(&self) -> FmtValue<'_> {
        FmtValue::F32(*self)
    }
}

impl IntoFmtValue for f64 {
    fn into_fmt_value(&self) -> FmtValue<'_> {
        FmtValue::F64(*self)
    }
}

impl IntoFmtValue for str {
    fn into_fmt_value(&self) -> FmtValue<'_> {
        FmtValue::Str(self)
    }
}

impl IntoFmtValue for String {
    fn into_fmt_value(&self) -> FmtValue<'_> {
        FmtValue::Str(self)
    }
}

impl IntoFmtValue for Text {
    fn into_fmt_value(&self) -> FmtValue<'_> {
        FmtValue::Str(self.as_str())
    }
}

impl IntoFmtValue for CStr {
    fn into_fmt_value(&self) -> FmtValue<'_> {
        FmtValue::CString(self)
    }
}

impl<T> IntoFmtValue for *const T {
    fn into_fmt_value(&self) -> FmtValue<'_> {
        FmtValue::Pointer(*self as usize)
    }
}

impl<T> IntoFmtValue for *mut T {
    fn into_fmt_value(&self) -> FmtValue<'_> {
        FmtValue::Pointer(*self as usize)
    }
}

/// Route a type's formatting through its [`FmtCustom`] impl.
#[macro_export]
macro_rules! impl_fmt_custom {
    ($($t:ty),+ $(,)?) => {$(
        impl $crate::args::IntoFmtValue for $t {
            fn into_fmt_value(&self) -> $crate::args::FmtValue<'_> {
                $crate::args::FmtValue::Custom(self)
            }
        }
    )+};
}

//
// Formatter adapters for the container and variant layer.
//

impl<T: IntoFmtValue> FmtCustom for Array<T> {
    fn fmt_custom(&self, f: &mut Interp<'_, '_>) {
        let debug = f.specs.map(|s| s.hash).unwrap_or(false);
        if debug {
            f.write_raw_str("array { count: ");
            f.write_fmt_value(FmtValue::S64(self.count()));
            f.write_raw_str(", allocated: ");
            f.write_fmt_value(FmtValue::S64(self.allocated()));
            f.write_raw_str(", data: ");
        }
        let mut list = f.format_list();
        for item in self.iter() {
            list.entry(item);
        }
        list.finish();
        if debug {
            f.write_raw_str(" }");
        }
    }
}

impl<T: IntoFmtValue> IntoFmtValue for Array<T> {
    fn into_fmt_value(&self) -> FmtValue<'_> {
        FmtValue::Custom(self)
    }
}

impl<K: IntoFmtValue + core_collections::Hashable + PartialEq, V: IntoFmtValue> FmtCustom
    for Table<K, V>
{
    fn fmt_custom(&self, f: &mut Interp<'_, '_>) {
        let debug = f.specs.map(|s| s.hash).unwrap_or(false);
        if debug {
            f.write_raw_str("hash_table { count: ");
            f.write_fmt_value(FmtValue::S64(self.count()));
            f.write_raw_str(", entries: ");
        }
        f.write_raw_str("{");
        let mut first = true;
        for (k, v) in self.iter() {
            if !first {
                f.write_raw_str(", ");
            }
            first = false;
            f.write_fmt_value(k.into_fmt_value());
            f.write_raw_str(": ");
            f.write_fmt_value(v.into_fmt_value());
        }
        f.write_raw_str("}");
        if debug {
            f.write_raw_str(" }");
        }
    }
}

impl<K: IntoFmtValue + core_collections::Hashable + PartialEq, V: IntoFmtValue> IntoFmtValue
    for Table<K, V>
{
    fn into_fmt_value(&self) -> FmtValue<'_> {
        FmtValue::Custom(self)
    }
}

impl<T: IntoFmtValue> FmtCustom for Optional<T> {
    fn fmt_custom(&self, f: &mut Interp<'_, '_>) {
        match self.get() {
            Some(v) => f.write_fmt_value(v.into_fmt_value()),
            None => f.write_raw_str("nullopt"),
        }
    }
}

impl<T: IntoFmtValue> IntoFmtValue for Optional<T> {
    fn into_fmt_value(&self) -> FmtValue<'_> {
        FmtValue::Custom(self)
    }
}

impl<T: IntoFmtValue> FmtCustom for SList<T> {
    fn fmt_custom(&self, f: &mut Interp<'_, '_>) {
        let mut list = f.format_list();
        self.for_each(|v| { list.entry(v); });
        list.finish();
    }
}

impl<T: IntoFmtValue> IntoFmtValue for SList<T> {
    fn into_fmt_value(&self) -> FmtValue<'_> {
        FmtValue::Custom(self)
    }
}

impl<T: IntoFmtValue> FmtCustom for DList<T> {
    fn fmt_custom(&self, f: &mut Interp<'_, '_>) {
        let mut list = f.format_list();
        self.for_each(|v| { list.entry(v); });
        list.finish();
    }
}

impl<T: IntoFmtValue> IntoFmtValue for DList<T> {
    fn into_fmt_value(&self) -> FmtValue<'_> {
        FmtValue::Custom(self)
    }
}
