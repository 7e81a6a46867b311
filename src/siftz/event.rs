//! Notification vocabulary.
//!
//! Both the source and the derived view speak in closed tagged unions, so a
//! handler is a single exhaustive `match` and no other event kind can exist.
//! Entities travel as `Rc<T>`: identity is the pointer, never the value.

use std::rc::Rc;

/// Per-operation emission options.
///
/// Every mutating operation accepts one. `silent` suppresses all outgoing
/// notifications for that operation while still applying the state change,
/// which lets a caller batch several structural changes and announce a
/// single settle itself.
///
/// A fresh value is constructed for every call; options are never shared or
/// mutated across iterations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    pub silent: bool,
}

impl Options {
    /// Default options: every change is announced.
    pub fn notify() -> Self {
        Self { silent: false }
    }

    /// Apply the change but emit nothing.
    pub fn silent() -> Self {
        Self { silent: true }
    }
}

/// A mutation announced by a [`Source`](crate::source::Source).
///
/// Positions are source positions at the moment the event is published,
/// i.e. after the mutation has been applied (for `Removed`, the position
/// the entity held before removal).
#[derive(Debug)]
pub enum SourceEvent<T> {
    /// `entity` was spliced in and now sits at position `at`.
    Inserted { entity: Rc<T>, at: usize },
    /// `entity` was spliced out; it previously sat at position `at`.
    Removed { entity: Rc<T>, at: usize },
    /// The content was replaced wholesale.
    Reset,
    /// The content was re-ordered in place; membership is unchanged.
    Resorted,
    /// `entity` changed state in place; its position is unchanged.
    Changed { entity: Rc<T> },
}

impl<T> SourceEvent<T> {
    /// Short name of the variant, for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Inserted { .. } => "insert",
            Self::Removed { .. } => "remove",
            Self::Reset => "reset",
            Self::Resorted => "resort",
            Self::Changed { .. } => "change",
        }
    }
}

impl<T> Clone for SourceEvent<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Inserted { entity, at } => Self::Inserted { entity: Rc::clone(entity), at: *at },
            Self::Removed { entity, at } => Self::Removed { entity: Rc::clone(entity), at: *at },
            Self::Reset => Self::Reset,
            Self::Resorted => Self::Resorted,
            Self::Changed { entity } => Self::Changed { entity: Rc::clone(entity) },
        }
    }
}

/// A notification published by a [`FilteredView`](crate::view::FilteredView).
///
/// The vocabulary mirrors [`SourceEvent`] (positions are view positions
/// here), so downstream consumers cannot tell a derived view apart from a
/// real ordered collection, plus one extra kind: [`Settled`](Self::Settled).
#[derive(Debug)]
pub enum ViewEvent<T> {
    /// `entity` entered the view at view position `at`.
    Inserted { entity: Rc<T>, at: usize },
    /// `entity` left the view; it held view position `at`.
    Removed { entity: Rc<T>, at: usize },
    /// The view was rebuilt after a source reset.
    Reset,
    /// The view was rebuilt after a source re-sort.
    Resorted,
    /// A batch of mutations has finished; one consolidated repaint is safe.
    Settled,
}

impl<T> ViewEvent<T> {
    /// Short name of the variant, for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Inserted { .. } => "insert",
            Self::Removed { .. } => "remove",
            Self::Reset => "reset",
            Self::Resorted => "resort",
            Self::Settled => "settled",
        }
    }
}

impl<T> Clone for ViewEvent<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Inserted { entity, at } => Self::Inserted { entity: Rc::clone(entity), at: *at },
            Self::Removed { entity, at } => Self::Removed { entity: Rc::clone(entity), at: *at },
            Self::Reset => Self::Reset,
            Self::Resorted => Self::Resorted,
            Self::Settled => Self::Settled,
        }
    }
}
