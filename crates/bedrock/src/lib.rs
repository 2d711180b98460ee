//! Bedrock: an explicit-allocator runtime foundation.
//!
//! This crate is the facade over the workspace's layers:
//!
//! - [`core_memory`]: allocator vtables with per-block headers, the default
//!   heap, the per-thread temporary arena and the implicit context.
//! - [`core_unicode`]: UTF-8 primitives, property tables, casing with locale
//!   override, canonical decomposition/composition data.
//! - [`core_collections`]: owned-or-view containers (`Array`, `Text`,
//!   `TextBuilder`, `Table`, intrusive lists) and NFC normalization.
//! - [`core_variant`]: `Optional` and macro-defined closed unions.
//! - [`core_signal`]: erased delegates and collector-driven signals.
//! - [`core_fmt`]: the `{…}` formatting engine, ANSI styles and writers.
//!
//! ```
//! use bedrock::prelude::*;
//!
//! let mut names = Array::new();
//! names.push(Text::owned("world"));
//! let line = bedrock::core_fmt::sprint!("Hello, {}!", names[0]);
//! assert_eq!(line, "Hello, world!");
//! ```

pub use core_collections;
pub use core_fmt;
pub use core_memory;
pub use core_signal;
pub use core_unicode;
pub use core_variant;

pub mod prelude {
    pub use core_collections::{nfc, Array, SearchOptions, Table, Text, TextBuilder};
    pub use core_fmt::{fmt_to_writer, sprint_args, FmtArg, FmtCustom, IntoFmtValue, Writer};
    pub use core_memory::{
        context, push_context, temporary_allocator, with_alloc, with_context_var, AllocFlags,
        Allocator, Context, Locale,
    };
    pub use core_signal::{Delegate, Signal};
    pub use core_unicode::{to_lower, to_upper};
    pub use core_variant::{define_variant, Optional};
}
