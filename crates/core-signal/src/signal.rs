//! Broadcast signals with result collectors.
//!
//! A [`Signal`] owns a list of [`Delegate`]s. `emit` invokes them in
//! connection order; a [`Collector`] consumes each result and decides whether
//! the emission keeps going. Collectors are plain per-emit values handed to
//! `emit_collect`, so no allocation sneaks in per emission.

use core_collections::Array;

use crate::delegate::Delegate;

/// Consumes callback results during one emission.
pub trait Collector<R> {
    type Output;
    /// Feed one result; returning false stops the emission.
    fn collect(&mut self, result: R) -> bool;
    fn finish(self) -> Self::Output;
}

/// Keeps only the last result.
#[derive(Default)]
pub struct Last<R> {
    last: Option<R>,
}

impl<R> Collector<R> for Last<R> {
    type Output = Option<R>;
    fn collect(&mut self, result: R) -> bool {
        self.last = Some(result);
        true
    }
    fn finish(self) -> Option<R> {
        self.last
    }
}

/// Keeps going while callbacks return non-zero (stops on "zero").
#[derive(Default)]
pub struct UntilZero<R> {
    last: Option<R>,
}

impl<R: Default + PartialEq> Collector<R> for UntilZero<R> {
    type Output = Option<R>;
    fn collect(&mut self, result: R) -> bool {
        let stop = result == R::default();
        self.last = Some(result);
        !stop
    }
    fn finish(self) -> Option<R> {
        self.last
    }
}

/// Keeps going while callbacks return zero (stops on the first non-zero).
#[derive(Default)]
pub struct WhileZero<R> {
    last: Option<R>,
}

impl<R: Default + PartialEq> Collector<R> for WhileZero<R> {
    type Output = Option<R>;
    fn collect(&mut self, result: R) -> bool {
        let stop = result != R::default();
        self.last = Some(result);
        !stop
    }
    fn finish(self) -> Option<R> {
        self.last
    }
}

/// Stops once a callback returns `target`.
pub struct Until<R> {
    pub target: R,
    last: Option<R>,
}

impl<R> Until<R> {
    pub fn new(target: R) -> Self {
        Until { target, last: None }
    }
}

impl<R: PartialEq> Collector<R> for Until<R> {
    type Output = Option<R>;
    fn collect(&mut self, result: R) -> bool {
        let stop = result == self.target;
        self.last = Some(result);
        !stop
    }
    fn finish(self) -> Option<R> {
        self.last
    }
}

/// Collects every result in connection order.
#[derive(Default)]
pub struct CollectAll<R> {
    results: Array<R>,
}

impl<R> Collector<R> for CollectAll<R> {
    type Output = Array<R>;
    fn collect(&mut self, result: R) -> bool {
        self.results.push(result);
        true
    }
    fn finish(self) -> Array<R> {
        self.results
    }
}

/// A list of delegates invoked in connection order. Connection ids are
/// stable: disconnecting leaves a hole rather than shifting later ids.
pub struct Signal<A, R = ()> {
    callbacks: Array<Option<Delegate<A, R>>>,
}

impl<A, R> Default for Signal<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, R> Signal<A, R> {
    pub const fn new() -> Self {
        Signal {
            callbacks: Array::new(),
        }
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.callbacks.iter().filter(|c| c.is_some()).count()
    }
}

impl<A: Clone, R> Signal<A, R> {

    /// Add a callback; the returned id stays valid until `disconnect`.
    pub fn connect<F>(&mut self, f: F) -> u64
    where
        F: FnMut(A) -> R + 'static,
    {
        self.callbacks.push(Some(Delegate::new(f)));
        (self.callbacks.count() - 1) as u64
    }

    pub fn connect_delegate(&mut self, delegate: Delegate<A, R>) -> u64 {
        self.callbacks.push(Some(delegate));
        (self.callbacks.count() - 1) as u64
    }

    /// Remove a connection by id. Returns false when the id was never
    /// connected or already removed.
    pub fn disconnect(&mut self, id: u64) -> bool {
        if id as i64 >= self.callbacks.count() {
            return false;
        }
        let slot = &mut self.callbacks.as_mut_slice()[id as usize];
        slot.take().is_some()
    }

    /// Invoke every callback, discarding results.
    pub fn emit(&mut self, args: A) {
        for slot in self.callbacks.as_mut_slice() {
            if let Some(cb) = slot {
                cb.call(args.clone());
            }
        }
    }

    /// Invoke callbacks in order, feeding results to `collector` until it
    /// stops the emission, and return what it aggregated.
    pub fn emit_collect<C: Collector<R>>(&mut self, args: A, mut collector: C) -> C::Output {
        for slot in self.callbacks.as_mut_slice() {
            if let Some(cb) = slot {
                if !collector.collect(cb.call(args.clone())) {
                    break;
                }
            }
        }
        collector.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn emit_calls_in_connection_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut sig: Signal<(i32,)> = Signal::new();
        for tag in 0..3 {
            let seen = seen.clone();
            sig.connect(move |(x,)| {
                seen.borrow_mut().push((tag, x));
            });
        }
        sig.emit((7,));
        assert_eq!(&*seen.borrow(), &[(0, 7), (1, 7), (2, 7)]);
    }

    #[test]
    fn disconnect_leaves_stable_ids() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut sig: Signal<()> = Signal::new();
        let ids: Vec<u64> = (0..3)
            .map(|tag| {
                let seen = seen.clone();
                sig.connect(move |()| seen.borrow_mut().push(tag))
            })
            .collect();
        assert_eq!(ids, vec![0, 1, 2]);

        assert!(sig.disconnect(1));
        assert!(!sig.disconnect(1), "second disconnect reports failure");
        assert!(!sig.disconnect(99));

        sig.emit(());
        assert_eq!(&*seen.borrow(), &[0, 2]);
        assert_eq!(sig.connection_count(), 2);
    }

    #[test]
    fn last_collector_returns_final_result() {
        let mut sig: Signal<(), i32> = Signal::new();
        sig.connect(|()| 1);
        sig.connect(|()| 2);
        sig.connect(|()| 3);
        assert_eq!(sig.emit_collect((), Last::default()), Some(3));
    }

    #[test]
    fn until_zero_stops_at_zero() {
        let calls = Rc::new(RefCell::new(0));
        let mut sig: Signal<(), i32> = Signal::new();
        for ret in [5, 0, 9] {
            let calls = calls.clone();
            sig.connect(move |()| {
                *calls.borrow_mut() += 1;
                ret
            });
        }
        let last = sig.emit_collect((), UntilZero::default());
        assert_eq!(last, Some(0));
        assert_eq!(*calls.borrow(), 2, "third callback never ran");
    }

    #[test]
    fn while_zero_stops_at_first_nonzero() {
        let mut sig: Signal<(), i32> = Signal::new();
        sig.connect(|()| 0);
        sig.connect(|()| 0);
        sig.connect(|()| 4);
        sig.connect(|()| 0);
        let last = sig.emit_collect((), WhileZero::default());
        assert_eq!(last, Some(4));
    }

    #[test]
    fn until_target_stops_on_match() {
        let calls = Rc::new(RefCell::new(0));
        let mut sig: Signal<(), i32> = Signal::new();
        for ret in [1, 2, 42, 3] {
            let calls = calls.clone();
            sig.connect(move |()| {
                *calls.borrow_mut() += 1;
                ret
            });
        }
        let last = sig.emit_collect((), Until::new(42));
        assert_eq!(last, Some(42));
        assert_eq!(*calls.borrow(), 3);
    }

    #[test]
    fn collect_all_gathers_in_order() {
        let mut sig: Signal<(i32,), i32> = Signal::new();
        sig.connect(|(x,)| x + 1);
        sig.connect(|(x,)| x + 2);
        sig.connect(|(x,)| x + 3);
        let all = sig.emit_collect((10,), CollectAll::default());
        assert_eq!(all.as_slice(), &[11, 12, 13]);
    }

    #[test]
    fn empty_signal_emits_nothing() {
        let mut sig: Signal<(), i32> = Signal::new();
        assert_eq!(sig.emit_collect((), Last::default()), None);
        sig.emit(());
    }
}
