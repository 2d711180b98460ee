//! Typed callback plumbing: [`Delegate`] (erased callable with inline
//! storage) and [`Signal`] (a delegate list broadcast with pluggable result
//! collectors).

pub mod delegate;
pub mod signal;

pub use delegate::Delegate;
pub use signal::{
    CollectAll, Collector, Last, Signal, Until, UntilZero, WhileZero,
};
