//! # Entity model
//!
//! The view engine is generic over any entity type; it only ever compares
//! entities by identity (`Rc` pointer) and hands them to the installed
//! predicate. [`Record`] is the batteries-included entity for callers that
//! do not bring their own type: a stable-identity bag of named attribute
//! values, the shape the upstream systems this crate serves put on the
//! wire.
//!
//! A `Record` shared as `Rc<Record>` can change state in place; after
//! mutating one, announce it through the owning source's `touch` so
//! dependent views re-evaluate its membership.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: Cell<DateTime<Utc>>,
    attrs: RefCell<Map<String, Value>>,
}

impl Record {
    /// A record with no attributes.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: Cell::new(now),
            attrs: RefCell::new(Map::new()),
        }
    }

    /// A record seeded with the given attributes.
    pub fn with_attrs<K, I>(attrs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let record = Self::new();
        {
            let mut map = record.attrs.borrow_mut();
            for (name, value) in attrs {
                map.insert(name.into(), value);
            }
        }
        record
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at.get()
    }

    /// Current value of an attribute, if set.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.attrs.borrow().get(name).cloned()
    }

    /// Set an attribute, returning the previous value. Bumps `updated_at`.
    pub fn set(&self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.updated_at.set(Utc::now());
        self.attrs.borrow_mut().insert(name.into(), value)
    }

    /// Remove an attribute, returning the value it held.
    pub fn unset(&self, name: &str) -> Option<Value> {
        self.updated_at.set(Utc::now());
        self.attrs.borrow_mut().remove(name)
    }

    /// Truthiness of an attribute, for flag-style predicates.
    ///
    /// Missing and `null` are false; booleans are themselves; numbers are
    /// true when non-zero; strings and arrays are true when non-empty;
    /// objects are always true.
    pub fn flag(&self, name: &str) -> bool {
        match self.attrs.borrow().get(name) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(Value::Object(_)) => true,
        }
    }

    /// String value of an attribute, if it is a string.
    pub fn str_attr(&self, name: &str) -> Option<String> {
        match self.attrs.borrow().get(name) {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        }
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}
