//! # Source collection
//!
//! [`Source`] is the authoritative, mutable, ordered sequence of entities:
//! the single writable copy of truth. Everything derived (filtered views)
//! observes it through an anonymous subscriber registry: the source keeps a
//! list of callbacks, never references to view objects, so any number of
//! independent views can watch one source without the source knowing they
//! exist.
//!
//! The collection is interior-mutable and meant to be shared as
//! `Rc<Source<T>>`. Entities are held and handed out as `Rc<T>`; identity is
//! the pointer. Every mutating operation takes an [`Options`] value whose
//! `silent` flag rides along with the published event, letting observers
//! apply the state change without announcing it downstream.
//!
//! Dispatch is single-threaded and synchronous: a mutation applies its
//! state change first, then delivers one event to every subscriber, in
//! registration order, before returning. Subscribers must not mutate the
//! source from inside a notification; registering a new subscriber during
//! delivery is tolerated and takes effect from the next event.

use log::trace;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use crate::error::{Result, SiftzError};
use crate::event::{Options, SourceEvent};

/// Callback signature for source subscribers.
///
/// The source passes itself so observers can read its current content
/// while handling the event.
pub type SourceCallback<T> = Box<dyn FnMut(&Source<T>, &SourceEvent<T>, Options)>;

/// An ordered, observable collection of entities.
pub struct Source<T> {
    items: RefCell<Vec<Rc<T>>>,
    subscribers: RefCell<Vec<SourceCallback<T>>>,
}

impl<T> Source<T> {
    pub fn new() -> Self {
        Self {
            items: RefCell::new(Vec::new()),
            subscribers: RefCell::new(Vec::new()),
        }
    }

    /// A source pre-populated in the given order. No events are published;
    /// there is nobody subscribed yet.
    pub fn with_items(items: impl IntoIterator<Item = T>) -> Self {
        let source = Self::new();
        source
            .items
            .borrow_mut()
            .extend(items.into_iter().map(Rc::new));
        source
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Rc<T>> {
        self.items.borrow().get(index).cloned()
    }

    /// Snapshot of the current content, in order.
    pub fn items(&self) -> Vec<Rc<T>> {
        self.items.borrow().clone()
    }

    /// Current position of `entity`, by identity.
    pub fn index_of(&self, entity: &Rc<T>) -> Option<usize> {
        self.items
            .borrow()
            .iter()
            .position(|item| Rc::ptr_eq(item, entity))
    }

    pub fn contains(&self, entity: &Rc<T>) -> bool {
        self.index_of(entity).is_some()
    }

    /// Register an observer. Subscriptions are anonymous and permanent:
    /// there is no unsubscribe; observers that no longer care should make
    /// their callback inert (views do this by holding only a weak handle).
    pub fn subscribe(&self, callback: impl FnMut(&Self, &SourceEvent<T>, Options) + 'static) {
        self.subscribers.borrow_mut().push(Box::new(callback));
    }

    /// Append an entity. Convenience for the common non-silent case.
    pub fn push(&self, entity: T) -> Rc<T> {
        let entity = Rc::new(entity);
        let at = {
            let mut items = self.items.borrow_mut();
            items.push(Rc::clone(&entity));
            items.len() - 1
        };
        self.publish(
            &SourceEvent::Inserted {
                entity: Rc::clone(&entity),
                at,
            },
            Options::notify(),
        );
        entity
    }

    /// Splice an entity in at `index`, shifting later entities up by one.
    pub fn insert_at(&self, index: usize, entity: T, opts: Options) -> Result<Rc<T>> {
        let entity = Rc::new(entity);
        {
            let mut items = self.items.borrow_mut();
            if index > items.len() {
                return Err(SiftzError::IndexOutOfBounds {
                    index,
                    len: items.len(),
                });
            }
            items.insert(index, Rc::clone(&entity));
        }
        self.publish(
            &SourceEvent::Inserted {
                entity: Rc::clone(&entity),
                at: index,
            },
            opts,
        );
        Ok(entity)
    }

    /// Splice an entity out, shifting later entities down by one.
    pub fn remove(&self, entity: &Rc<T>, opts: Options) -> Result<Rc<T>> {
        let at = self.index_of(entity).ok_or(SiftzError::NotMember)?;
        let removed = self.items.borrow_mut().remove(at);
        self.publish(
            &SourceEvent::Removed {
                entity: Rc::clone(&removed),
                at,
            },
            opts,
        );
        Ok(removed)
    }

    /// Replace the whole content.
    pub fn reset(&self, items: impl IntoIterator<Item = T>, opts: Options) {
        let fresh: Vec<Rc<T>> = items.into_iter().map(Rc::new).collect();
        trace!("source reset: {} entities", fresh.len());
        *self.items.borrow_mut() = fresh;
        self.publish(&SourceEvent::Reset, opts);
    }

    /// Re-order the content in place with a comparator. Membership is
    /// unchanged; observers learn only that positions moved.
    pub fn sort_by(&self, mut cmp: impl FnMut(&T, &T) -> Ordering, opts: Options) {
        self.items.borrow_mut().sort_by(|a, b| cmp(a, b));
        self.publish(&SourceEvent::Resorted, opts);
    }

    /// Announce that `entity` changed state in place, so observers can
    /// re-evaluate what they derived from it.
    pub fn touch(&self, entity: &Rc<T>, opts: Options) -> Result<()> {
        if !self.contains(entity) {
            return Err(SiftzError::NotMember);
        }
        self.publish(
            &SourceEvent::Changed {
                entity: Rc::clone(entity),
            },
            opts,
        );
        Ok(())
    }

    /// Deliver one event to every subscriber, in registration order.
    ///
    /// The registry is taken out for the duration of delivery so callbacks
    /// may themselves subscribe; anything registered mid-delivery is merged
    /// back behind the existing subscribers and first hears the next event.
    fn publish(&self, event: &SourceEvent<T>, opts: Options) {
        trace!(
            "source event `{}` -> {} subscribers (silent: {})",
            event.kind(),
            self.subscribers.borrow().len(),
            opts.silent
        );
        let mut active = self.subscribers.take();
        for callback in active.iter_mut() {
            callback(self, event, opts);
        }
        let mut registry = self.subscribers.borrow_mut();
        active.append(&mut registry);
        *registry = active;
    }
}

impl<T> Default for Source<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording_source() -> (Rc<Source<&'static str>>, Rc<RefCell<Vec<String>>>) {
        let source = Rc::new(Source::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        source.subscribe(move |_, event, opts| {
            let mut line = event.kind().to_string();
            if let SourceEvent::Inserted { at, .. } | SourceEvent::Removed { at, .. } = event {
                line.push_str(&format!("@{}", at));
            }
            if opts.silent {
                line.push_str(" (silent)");
            }
            sink.borrow_mut().push(line);
        });
        (source, seen)
    }

    #[test]
    fn test_push_and_insert_preserve_order() {
        let (source, seen) = recording_source();
        source.push("a");
        source.push("c");
        source.insert_at(1, "b", Options::notify()).unwrap();

        let names: Vec<&str> = source.items().iter().map(|e| **e).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(
            *seen.borrow(),
            ["insert@0", "insert@1", "insert@1"],
            "second push lands at 1, splice shifts it"
        );
        assert_eq!(source.len(), 3);
    }

    #[test]
    fn test_insert_past_end_is_an_error() {
        let source: Source<&str> = Source::new();
        let err = source.insert_at(1, "a", Options::notify()).unwrap_err();
        assert!(matches!(
            err,
            SiftzError::IndexOutOfBounds { index: 1, len: 0 }
        ));
        assert!(source.is_empty());
    }

    #[test]
    fn test_remove_reports_old_position() {
        let (source, seen) = recording_source();
        let a = source.push("a");
        let b = source.push("b");
        source.remove(&a, Options::notify()).unwrap();

        assert_eq!(source.index_of(&b), Some(0));
        assert_eq!(seen.borrow().last().unwrap(), "remove@0");
        assert!(matches!(
            source.remove(&a, Options::notify()),
            Err(SiftzError::NotMember)
        ));
    }

    #[test]
    fn test_silent_flag_rides_with_the_event() {
        let (source, seen) = recording_source();
        source.insert_at(0, "a", Options::silent()).unwrap();
        assert_eq!(*seen.borrow(), ["insert@0 (silent)"]);
    }

    #[test]
    fn test_reset_and_sort_events() {
        let (source, seen) = recording_source();
        source.reset(["c", "a", "b"], Options::notify());
        source.sort_by(|x, y| x.cmp(y), Options::notify());

        let names: Vec<&str> = source.items().iter().map(|e| **e).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(*seen.borrow(), ["reset", "resort"]);
    }

    #[test]
    fn test_touch_requires_membership() {
        let (source, seen) = recording_source();
        let a = source.push("a");
        source.touch(&a, Options::notify()).unwrap();
        assert_eq!(seen.borrow().last().unwrap(), "change");

        let stranger = Rc::new("x");
        assert!(matches!(
            source.touch(&stranger, Options::notify()),
            Err(SiftzError::NotMember)
        ));
    }

    #[test]
    fn test_subscribe_during_delivery_takes_effect_next_event() {
        let source = Rc::new(Source::new());
        let late_calls = Rc::new(RefCell::new(0));

        let src = Rc::clone(&source);
        let counter = Rc::clone(&late_calls);
        source.subscribe(move |_, _, _| {
            // Register a second observer from inside the first delivery.
            let counter = Rc::clone(&counter);
            src.subscribe(move |_, _, _| {
                *counter.borrow_mut() += 1;
            });
        });

        source.push("a");
        assert_eq!(*late_calls.borrow(), 0, "not notified for the event that registered it");
        source.push("b");
        assert_eq!(*late_calls.borrow(), 1);
    }

    #[test]
    fn test_identity_not_value() {
        let source = Source::with_items(["a", "a"]);
        let first = source.get(0).unwrap();
        let second = source.get(1).unwrap();
        assert_eq!(source.index_of(&first), Some(0));
        assert_eq!(source.index_of(&second), Some(1));
    }
}
