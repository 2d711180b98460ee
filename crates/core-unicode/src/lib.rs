//! From-scratch Unicode engine: UTF-8 primitives, property lookup, casing
//! with locale override, combining classes and the canonical
//! decomposition/composition data that backs NFC normalization.
//!
//! The tables are range-compacted static arrays covering the scripts the
//! library is specified against; lookups are binary searches, no heap
//! involved anywhere in this crate.

pub mod props;
pub mod tables;
pub mod utf8;

pub use props::{
    canonical_decomposition, combining_class, compose, has_property, is_alpha, is_lower, is_upper,
    is_whitespace, properties, to_lower, to_lower_locale, to_upper, to_upper_locale, Props,
};
pub use utf8::{
    decode_cp, encode_cp, size_of_cp, size_of_lead_byte, utf8_byte_offset_of, utf8_find_invalid,
    utf8_length, validate_utf8, Utf8Error,
};
