//! Property, combining-class, casing and composition queries over the
//! static tables.

use core_memory::context::{context, Locale};

use crate::tables::{
    CaseMap, CASE_EXCEPTIONS, COMBINING_CLASS_RANGES, COMPOSITION_EXCLUSIONS, DECOMPOSITIONS,
    LOWER_TO_UPPER, PROPERTY_RANGES, TURKIC_LOWER_I_TO_UPPER, TURKIC_UPPER_I_TO_LOWER,
    UPPER_TO_LOWER,
};

pub use crate::tables::Props;

fn range_lookup<T: Copy>(table: &[(u32, u32, T)], cp: u32) -> Option<T> {
    let idx = table.partition_point(|&(first, _, _)| first <= cp);
    if idx == 0 {
        return None;
    }
    let (first, last, value) = table[idx - 1];
    (cp >= first && cp <= last).then_some(value)
}

/// Property bitset of a code point.
pub fn properties(cp: char) -> Props {
    range_lookup(PROPERTY_RANGES, cp as u32)
        .map(Props::from_bits_truncate)
        .unwrap_or_default()
}

pub fn has_property(cp: char, props: Props) -> bool {
    properties(cp).contains(props)
}

pub fn is_whitespace(cp: char) -> bool {
    has_property(cp, Props::WHITE_SPACE)
}

pub fn is_alpha(cp: char) -> bool {
    has_property(cp, Props::ALPHABETIC)
}

fn case_map_hit(table: &[(u32, u32, CaseMap)], cp: u32) -> Option<u32> {
    let (first, _, map) = {
        let idx = table.partition_point(|&(first, _, _)| first <= cp);
        if idx == 0 {
            return None;
        }
        let entry = table[idx - 1];
        if cp < entry.0 || cp > entry.1 {
            return None;
        }
        entry
    };
    match map {
        CaseMap::Delta(d) => Some((cp as i64 + d as i64) as u32),
        // Alternating ranges appear in both direction tables; whether `cp`
        // is actually a hit depends on its parity relative to the range.
        CaseMap::EvenUpper | CaseMap::OddUpper => {
            let upper_parity = match map {
                CaseMap::EvenUpper => 0,
                _ => first & 1,
            };
            if cp & 1 == upper_parity {
                Some(cp + 1)
            } else {
                Some(cp - 1)
            }
        }
    }
}

fn is_alternating_upper(table_entry_first: u32, map: CaseMap, cp: u32) -> bool {
    match map {
        CaseMap::Delta(_) => true,
        CaseMap::EvenUpper => cp & 1 == 0,
        CaseMap::OddUpper => cp & 1 == (table_entry_first & 1),
    }
}

fn in_case_table(table: &[(u32, u32, CaseMap)], cp: u32, want_upper_slot: bool) -> bool {
    let idx = table.partition_point(|&(first, _, _)| first <= cp);
    if idx == 0 {
        return false;
    }
    let (first, last, map) = table[idx - 1];
    if cp < first || cp > last {
        return false;
    }
    match map {
        CaseMap::Delta(_) => true,
        _ => is_alternating_upper(first, map, cp) == want_upper_slot,
    }
}

/// Is the code point an uppercase letter.
pub fn is_upper(cp: char) -> bool {
    let v = cp as u32;
    if has_property(cp, Props::UPPERCASE) {
        return true;
    }
    if let Some(&(_, lower, upper)) = CASE_EXCEPTIONS.iter().find(|&&(c, _, _)| c == v) {
        return lower != v && upper == v;
    }
    in_case_table(UPPER_TO_LOWER, v, true)
}

/// Is the code point a lowercase letter.
pub fn is_lower(cp: char) -> bool {
    let v = cp as u32;
    if has_property(cp, Props::LOWERCASE) {
        return true;
    }
    if let Some(&(_, lower, upper)) = CASE_EXCEPTIONS.iter().find(|&&(c, _, _)| c == v) {
        return upper != v && lower == v;
    }
    in_case_table(LOWER_TO_UPPER, v, false)
}

/// Canonical combining class (0 for starters).
pub fn combining_class(cp: char) -> u8 {
    range_lookup(COMBINING_CLASS_RANGES, cp as u32).unwrap_or(0)
}

/// Simple lowercase mapping under an explicit locale.
pub fn to_lower_locale(cp: char, locale: Locale) -> char {
    let v = cp as u32;
    if locale == Locale::Turkic && v == TURKIC_UPPER_I_TO_LOWER.0 {
        return char::from_u32(TURKIC_UPPER_I_TO_LOWER.1).unwrap();
    }
    if let Ok(idx) = CASE_EXCEPTIONS.binary_search_by_key(&v, |&(c, _, _)| c) {
        return char::from_u32(CASE_EXCEPTIONS[idx].1).unwrap();
    }
    match in_case_table(UPPER_TO_LOWER, v, true).then(|| case_map_hit(UPPER_TO_LOWER, v)) {
        Some(Some(l)) => char::from_u32(l).unwrap_or(cp),
        _ => cp,
    }
}

/// Simple uppercase mapping under an explicit locale.
pub fn to_upper_locale(cp: char, locale: Locale) -> char {
    let v = cp as u32;
    if locale == Locale::Turkic && v == TURKIC_LOWER_I_TO_UPPER.0 {
        return char::from_u32(TURKIC_LOWER_I_TO_UPPER.1).unwrap();
    }
    if let Ok(idx) = CASE_EXCEPTIONS.binary_search_by_key(&v, |&(c, _, _)| c) {
        return char::from_u32(CASE_EXCEPTIONS[idx].2).unwrap();
    }
    match in_case_table(LOWER_TO_UPPER, v, false).then(|| case_map_hit(LOWER_TO_UPPER, v)) {
        Some(Some(u)) => char::from_u32(u).unwrap_or(cp),
        _ => cp,
    }
}

/// Lowercase mapping using the context's locale.
pub fn to_lower(cp: char) -> char {
    to_lower_locale(cp, context().locale)
}

/// Uppercase mapping using the context's locale.
pub fn to_upper(cp: char) -> char {
    to_upper_locale(cp, context().locale)
}

/// Canonical decomposition of a code point, if it has one.
pub fn canonical_decomposition(cp: char) -> Option<[char; 2]> {
    let v = cp as u32;
    DECOMPOSITIONS
        .binary_search_by_key(&v, |&(c, _)| c)
        .ok()
        .map(|idx| {
            let [a, b] = DECOMPOSITIONS[idx].1;
            [char::from_u32(a).unwrap(), char::from_u32(b).unwrap()]
        })
}

/// Primary composition: the code point whose canonical decomposition is
/// exactly `(first, second)`, with exclusions honored.
pub fn compose(first: char, second: char) -> Option<char> {
    let (f, s) = (first as u32, second as u32);
    DECOMPOSITIONS
        .iter()
        .find(|&&(cp, [df, ds])| df == f && ds == s && !COMPOSITION_EXCLUSIONS.contains(&cp))
        .map(|&(cp, _)| char::from_u32(cp).unwrap())
}
