//! # Filtered view
//!
//! [`FilteredView`] is a live, derived, strictly read-only projection of a
//! [`Source`]: at every settled state it contains exactly the source
//! entities the installed [`Filter`] accepts, in the source's relative
//! order. It subscribes to the source once at construction and keeps itself
//! correct by patching incrementally where it can (single insert, single
//! remove, single entity change) and rebuilding where it must (reset,
//! re-sort, filter replacement).
//!
//! The view speaks the same notification vocabulary as the source, plus a
//! final [`Settled`](ViewEvent::Settled) per batch, so downstream
//! consumers cannot tell it apart from a real ordered collection. What they
//! cannot do is mutate it: the public `insert`/`remove`/`reset` entry
//! points fail with [`SiftzError::ViewReadOnly`], because a change applied
//! to the view behind the source's back would desynchronize the position
//! map with no recovery path.
//!
//! ## The position map
//!
//! Internally the view keeps a [`SourceMap`]: one slot per included entity,
//! holding its current source position, strictly increasing. A single
//! source insert or remove shifts the true position of every later entity,
//! so after each one the view renumbers: it re-derives every included
//! entity's position by identity lookup and rewrites the whole map. That is
//! `O(n·k)` per structural change, an accepted trade-off for small and
//! medium collections. The renumber runs even when the mutated entity was
//! never included: the slots after the mutation point are stale either way.

use log::{debug, trace};
use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Result, SiftzError};
use crate::event::{Options, SourceEvent, ViewEvent};
use crate::filter::Filter;
use crate::mapping::SourceMap;
use crate::source::Source;

type ViewCallback<T> = Box<dyn FnMut(&ViewEvent<T>)>;

struct ViewInner<T> {
    content: Vec<Rc<T>>,
    map: SourceMap,
    filter: Filter<T>,
    subscribers: Vec<ViewCallback<T>>,
}

/// A live filtered projection of one source collection.
///
/// Bound permanently at construction to exactly one source and one initial
/// filter; the binding cannot be replaced, only the filter can. Dropping
/// the view deactivates its subscription (the source holds only a weak
/// handle to the view's state, never the view itself).
pub struct FilteredView<T> {
    source: Rc<Source<T>>,
    inner: Rc<RefCell<ViewInner<T>>>,
}

impl<T: 'static> FilteredView<T> {
    /// Build a view over `source` with the given membership rule and
    /// subscribe it. The initial content is derived immediately, silently.
    pub fn new(source: &Rc<Source<T>>, filter: Filter<T>) -> Self {
        let inner = Rc::new(RefCell::new(ViewInner {
            content: Vec::new(),
            map: SourceMap::new(),
            filter,
            subscribers: Vec::new(),
        }));
        rebuild(&inner, source);

        let weak = Rc::downgrade(&inner);
        source.subscribe(move |src, event, opts| {
            if let Some(inner) = weak.upgrade() {
                handle(&inner, src, event, opts);
            }
        });

        Self {
            source: Rc::clone(source),
            inner,
        }
    }

    /// A view that admits everything: same content as the source, kept in
    /// sync, still read-only.
    pub fn all(source: &Rc<Source<T>>) -> Self {
        Self::new(source, Filter::All)
    }
}

impl<T> FilteredView<T> {
    pub fn len(&self) -> usize {
        self.inner.borrow().content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().content.is_empty()
    }

    pub fn get(&self, view_idx: usize) -> Option<Rc<T>> {
        self.inner.borrow().content.get(view_idx).cloned()
    }

    /// Snapshot of the current content, in view order.
    pub fn items(&self) -> Vec<Rc<T>> {
        self.inner.borrow().content.clone()
    }

    /// View position of `entity`, by identity.
    pub fn index_of(&self, entity: &Rc<T>) -> Option<usize> {
        self.inner
            .borrow()
            .content
            .iter()
            .position(|item| Rc::ptr_eq(item, entity))
    }

    pub fn contains(&self, entity: &Rc<T>) -> bool {
        self.index_of(entity).is_some()
    }

    /// The source this view projects.
    pub fn source(&self) -> &Rc<Source<T>> {
        &self.source
    }

    /// The currently installed membership rule.
    pub fn filter(&self) -> Filter<T> {
        self.inner.borrow().filter.clone()
    }

    /// Subscribe to this view's notifications. Registration only, like the
    /// source's registry: anonymous, permanent.
    pub fn subscribe(&self, callback: impl FnMut(&ViewEvent<T>) + 'static) {
        self.inner.borrow_mut().subscribers.push(Box::new(callback));
    }

    /// Replace the membership rule and re-sync.
    ///
    /// Re-sync walks the source in order, applying the incremental insert
    /// and remove primitives element by element, so consumers get one
    /// coherent run of `insert`/`remove` notifications instead of a blunt
    /// `reset`. An installed rule that changes nothing emits nothing,
    /// not even a `settled`.
    pub fn set_filter(&self, filter: Filter<T>, opts: Options) {
        self.inner.borrow_mut().filter = filter;
        let changes = resync(&self.inner, &self.source, opts);
        if changes > 0 && !opts.silent {
            publish(&self.inner, &ViewEvent::Settled);
        }
        coherence_check(&self.inner, &self.source);
    }

    /// Clear the membership rule back to admit-everything and re-sync.
    pub fn clear_filter(&self, opts: Options) {
        self.set_filter(Filter::All, opts);
    }

    /// Announce a consolidated settle. For callers that applied a silenced
    /// batch of mutations and now want consumers to repaint once.
    pub fn settle(&self) {
        publish(&self.inner, &ViewEvent::Settled);
    }

    /// Guarded entry point. Views are projections; splice entities into the
    /// bound source instead.
    pub fn insert(&self, _entity: T, _at: usize) -> Result<()> {
        Err(SiftzError::ViewReadOnly { op: "insert" })
    }

    /// Guarded entry point. Remove the entity from the bound source instead.
    pub fn remove(&self, _entity: &Rc<T>) -> Result<()> {
        Err(SiftzError::ViewReadOnly { op: "remove" })
    }

    /// Guarded entry point. Reset the bound source instead.
    pub fn reset(&self) -> Result<()> {
        Err(SiftzError::ViewReadOnly { op: "reset" })
    }

    /// Current source position of every included entity, in view order.
    #[cfg(any(test, feature = "test_utils"))]
    pub fn source_positions(&self) -> Vec<usize> {
        self.inner.borrow().map.as_slice().to_vec()
    }
}

/// One exhaustive dispatch per source notification.
fn handle<T>(
    inner: &RefCell<ViewInner<T>>,
    source: &Source<T>,
    event: &SourceEvent<T>,
    opts: Options,
) {
    match event {
        SourceEvent::Inserted { entity, at } => {
            let accepted = inner.borrow().filter.accepts(entity, *at);
            if accepted {
                force_insert(inner, entity, *at, opts);
            }
            // Later entities shifted either way; the map is stale even when
            // the new entity was rejected.
            renumber(inner, source);
            if accepted && !opts.silent {
                publish(inner, &ViewEvent::Settled);
            }
        }
        SourceEvent::Removed { at, .. } => {
            let mapped = inner.borrow().map.view_index_of(*at);
            if let Some(view_idx) = mapped {
                force_remove(inner, view_idx, opts);
            }
            // Removing a non-member still shifts every later entity.
            renumber(inner, source);
            if mapped.is_some() && !opts.silent {
                publish(inner, &ViewEvent::Settled);
            }
        }
        SourceEvent::Reset => {
            rebuild(inner, source);
            if !opts.silent {
                publish(inner, &ViewEvent::Reset);
                publish(inner, &ViewEvent::Settled);
            }
        }
        SourceEvent::Resorted => {
            rebuild(inner, source);
            if !opts.silent {
                publish(inner, &ViewEvent::Resorted);
                publish(inner, &ViewEvent::Settled);
            }
        }
        SourceEvent::Changed { entity } => {
            let changed = reevaluate(inner, source, entity, opts);
            if changed && !opts.silent {
                publish(inner, &ViewEvent::Settled);
            }
        }
    }
    coherence_check(inner, source);
}

/// Splice an accepted entity in at the position that keeps the map
/// increasing: the count of slots below its source position.
fn force_insert<T>(
    inner: &RefCell<ViewInner<T>>,
    entity: &Rc<T>,
    source_pos: usize,
    opts: Options,
) -> usize {
    let view_idx = {
        let mut guard = inner.borrow_mut();
        let view_idx = guard.map.insertion_point(source_pos);
        guard.content.insert(view_idx, Rc::clone(entity));
        guard.map.insert(view_idx, source_pos);
        view_idx
    };
    if !opts.silent {
        publish(
            inner,
            &ViewEvent::Inserted {
                entity: Rc::clone(entity),
                at: view_idx,
            },
        );
    }
    view_idx
}

/// Splice an included entity out of content and map together.
fn force_remove<T>(inner: &RefCell<ViewInner<T>>, view_idx: usize, opts: Options) -> Rc<T> {
    let entity = {
        let mut guard = inner.borrow_mut();
        guard.map.remove(view_idx);
        guard.content.remove(view_idx)
    };
    if !opts.silent {
        publish(
            inner,
            &ViewEvent::Removed {
                entity: Rc::clone(&entity),
                at: view_idx,
            },
        );
    }
    entity
}

/// Re-derive every included entity's current source position and rewrite
/// the map. Entities the source no longer holds drop out of the content in
/// the same pass, keeping content and map the same length.
fn renumber<T>(inner: &RefCell<ViewInner<T>>, source: &Source<T>) {
    let mut guard = inner.borrow_mut();
    let guard = &mut *guard;
    let mut slots = Vec::with_capacity(guard.content.len());
    guard.content.retain(|entity| match source.index_of(entity) {
        Some(pos) => {
            slots.push(pos);
            true
        }
        None => false,
    });
    trace!("renumbered {} slots", slots.len());
    guard.map.replace(slots);
}

/// Full rebuild: one pass over the source, evaluating the filter for every
/// entity; survivors become the content and their positions the map.
fn rebuild<T>(inner: &RefCell<ViewInner<T>>, source: &Source<T>) {
    let items = source.items();
    let total = items.len();
    let mut guard = inner.borrow_mut();
    let guard = &mut *guard;
    guard.content.clear();
    guard.map.clear();
    for (pos, entity) in items.into_iter().enumerate() {
        if guard.filter.accepts(&entity, pos) {
            guard.content.push(entity);
            guard.map.push(pos);
        }
    }
    debug!(
        "rebuilt view: {} of {} entities pass the filter",
        guard.content.len(),
        total
    );
}

/// Walk the source once, inserting newly-qualifying entities and removing
/// ones that stopped qualifying, via the incremental primitives. Source
/// positions do not move during the walk, so the map stays valid throughout.
/// Returns the number of membership changes.
fn resync<T>(inner: &RefCell<ViewInner<T>>, source: &Source<T>, opts: Options) -> usize {
    let items = source.items();
    let total = items.len();
    let mut changes = 0;
    for (pos, entity) in items.into_iter().enumerate() {
        let accepted = inner.borrow().filter.accepts(&entity, pos);
        let mapped = inner.borrow().map.view_index_of(pos);
        match (accepted, mapped) {
            (true, None) => {
                force_insert(inner, &entity, pos, opts);
                changes += 1;
            }
            (false, Some(view_idx)) => {
                force_remove(inner, view_idx, opts);
                changes += 1;
            }
            _ => {}
        }
    }
    debug!(
        "filter re-sync over {} entities: {} membership changes",
        total, changes
    );
    changes
}

/// Single-element re-evaluation for an in-place entity change. Returns
/// whether membership changed.
fn reevaluate<T>(
    inner: &RefCell<ViewInner<T>>,
    source: &Source<T>,
    entity: &Rc<T>,
    opts: Options,
) -> bool {
    // An entity the source does not hold has no position to evaluate at;
    // sources refuse to announce those, so this only guards foreign events.
    let Some(pos) = source.index_of(entity) else {
        return false;
    };
    let accepted = inner.borrow().filter.accepts(entity, pos);
    let existing = inner
        .borrow()
        .content
        .iter()
        .position(|item| Rc::ptr_eq(item, entity));
    match (accepted, existing) {
        (true, None) => {
            force_insert(inner, entity, pos, opts);
            true
        }
        (false, Some(view_idx)) => {
            force_remove(inner, view_idx, opts);
            true
        }
        _ => false,
    }
}

/// Deliver one event to every view subscriber. Same take-and-merge scheme
/// as the source registry, so a consumer may subscribe mid-delivery.
fn publish<T>(inner: &RefCell<ViewInner<T>>, event: &ViewEvent<T>) {
    let mut active = std::mem::take(&mut inner.borrow_mut().subscribers);
    for callback in active.iter_mut() {
        callback(event);
    }
    let mut guard = inner.borrow_mut();
    active.append(&mut guard.subscribers);
    guard.subscribers = active;
}

/// Debug-build check of the full view invariant: map strictly increasing
/// (policed by `SourceMap` itself), lengths equal, and every view element
/// identical to the source element at its mapped position.
fn coherence_check<T>(inner: &RefCell<ViewInner<T>>, source: &Source<T>) {
    if cfg!(debug_assertions) {
        let guard = inner.borrow();
        debug_assert_eq!(guard.content.len(), guard.map.len());
        for (view_idx, entity) in guard.content.iter().enumerate() {
            let mapped = guard
                .map
                .get(view_idx)
                .and_then(|source_pos| source.get(source_pos));
            debug_assert!(
                mapped.is_some_and(|item| Rc::ptr_eq(&item, entity)),
                "view position {} does not alias its mapped source entity",
                view_idx
            );
        }
    }
}
