//! # Siftz Architecture
//!
//! Siftz keeps a **live filtered view** over a mutable ordered collection:
//! a derived sequence that always contains exactly the source entities a
//! replaceable predicate accepts, in the source's relative order, patched
//! incrementally as the source is mutated, and strictly read-only from
//! the outside.
//!
//! ## The Two Halves
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Source (source.rs)                                         │
//! │  - The single writable copy of truth                        │
//! │  - Ordered, interior-mutable, shared as Rc<Source<T>>       │
//! │  - Publishes insert/remove/reset/resort/change to an        │
//! │    anonymous subscriber registry                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ events
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  FilteredView (view.rs)                                     │
//! │  - Subscribes once at construction, holds the source;       │
//! │    the source never holds the view                          │
//! │  - Maintains a strictly-increasing position map (mapping.rs)│
//! │  - Re-emits the same vocabulary plus `settled`, so          │
//! │    consumers can't tell it from a real collection           │
//! │  - Direct mutation fails with `ViewReadOnly`                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any number of independent views, each with its own filter, can watch
//! one source. All mutation flows through the source; the views converge
//! on their own.
//!
//! ## Incremental Where Possible, Rebuild Where Not
//!
//! - Single source insert/remove: splice via a sorted lookup in the
//!   position map, then renumber (every later source position shifted).
//! - Single entity change: re-evaluate that entity only, then insert or
//!   remove it.
//! - Source reset/re-sort, filter replacement: membership may change for
//!   every entity at once, so the view walks the source once: as one
//!   rebuild (reset/resort) or as a run of incremental splices with
//!   coherent per-entity notifications (filter replacement).
//!
//! ## Concurrency Model
//!
//! None, deliberately: single-threaded, cooperative, synchronous. Handlers
//! run to completion in source emission order, which is what makes the map
//! invariant re-establishable between notifications. `Rc`/`RefCell`
//! throughout; nothing here is `Send`.
//!
//! ## Module Overview
//!
//! - [`source`]: the observable ordered collection
//! - [`view`]: the derived filtered projection
//! - [`filter`]: replaceable membership predicates
//! - [`mapping`]: the view-to-source position map
//! - [`event`]: the closed notification vocabulary and emission options
//! - [`model`]: [`Record`], a batteries-included attribute-bag entity
//! - [`error`]: error types

pub mod error;
pub mod event;
pub mod filter;
pub mod mapping;
pub mod model;
pub mod source;
pub mod view;

pub use error::{Result, SiftzError};
pub use event::{Options, SourceEvent, ViewEvent};
pub use filter::{Filter, Predicate};
pub use model::Record;
pub use source::Source;
pub use view::FilteredView;
