//! Membership predicates.
//!
//! The predicate installed on a view is a first-class, swappable value, not
//! a fixed method: [`Filter`] holds it and is replaced wholesale on
//! `set_filter`. A predicate must be pure: the view re-evaluates it at
//! arbitrary points and assumes the answer only changes when the entity
//! does. A panicking predicate is a caller bug and propagates unhandled.

use std::rc::Rc;

/// Capability object with a single membership test.
///
/// `position` is the entity's current position in the source collection at
/// evaluation time, for predicates that care about placement as well as
/// state.
///
/// Any `Fn(&T, usize) -> bool` closure is a `Predicate`.
pub trait Predicate<T> {
    fn accepts(&self, entity: &T, position: usize) -> bool;
}

impl<T, F> Predicate<T> for F
where
    F: Fn(&T, usize) -> bool,
{
    fn accepts(&self, entity: &T, position: usize) -> bool {
        self(entity, position)
    }
}

/// The membership rule currently installed on a view.
pub enum Filter<T> {
    /// Admit every entity. This is the default membership and the state a
    /// view returns to when its filter is cleared.
    All,
    /// Admit exactly the entities the predicate accepts.
    Custom(Rc<dyn Predicate<T>>),
}

impl<T> Filter<T> {
    /// Install a closure as the membership rule.
    pub fn custom(predicate: impl Fn(&T, usize) -> bool + 'static) -> Self {
        Self::Custom(Rc::new(predicate))
    }

    /// Install a hand-written [`Predicate`] implementation.
    pub fn with_predicate(predicate: impl Predicate<T> + 'static) -> Self {
        Self::Custom(Rc::new(predicate))
    }

    pub fn accepts(&self, entity: &T, position: usize) -> bool {
        match self {
            Self::All => true,
            Self::Custom(predicate) => predicate.accepts(entity, position),
        }
    }
}

impl<T> Clone for Filter<T> {
    fn clone(&self) -> Self {
        match self {
            Self::All => Self::All,
            Self::Custom(predicate) => Self::Custom(Rc::clone(predicate)),
        }
    }
}

impl<T> std::fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "Filter::All"),
            Self::Custom(_) => write!(f, "Filter::Custom(..)"),
        }
    }
}
