//! Containers with value semantics over the allocator substrate.
//!
//! Everything here is a plain struct whose `allocated` field distinguishes
//! owned buffers from borrowed views (`allocated == 0`). Owned buffers carry
//! an owner tag in their allocation header and are released on drop; views
//! cost nothing and materialize into owned storage on first mutation.
//!
//! - [`Array`]: dynamic array with ordered insert/remove/replace and slices.
//! - [`Text`]: UTF-8 string addressed by code point, plus [`nfc`]
//!   normalization built on the `core-unicode` tables.
//! - [`TextBuilder`]: chunked append buffer for O(n) concatenation.
//! - [`Table`]: open-addressed robin-hood hash table.
//! - intrusive [`SList`]/[`DList`] over caller-owned nodes.

pub mod array;
pub mod builder;
pub mod list;
pub mod nfc;
pub mod table;
pub mod text;

pub use array::{Array, SearchOptions};
pub use builder::{TextBuilder, BUILDER_BUFFER_SIZE};
pub use list::{DList, DListNode, SList, SListNode};
pub use nfc::{nfc, nfc_bytes};
pub use table::{hash_bytes, Hashable, Table, TableIter, TABLE_MINIMUM_CAPACITY};
pub use text::Text;
