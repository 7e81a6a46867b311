//! The view-to-source position map.
//!
//! A [`SourceMap`] is the single source of truth for what a filtered view
//! currently includes and in what order: one slot per included entity,
//! holding that entity's position in the source collection. The slots are
//! kept strictly increasing at all times, which is what lets the view
//! preserve the source's relative order and locate splice points with a
//! binary search instead of a full rebuild.

/// Ordered map from view positions to source positions.
///
/// Invariants, policed by debug assertions after every splice:
/// - slots are strictly increasing;
/// - `len()` always equals the owning view's content length;
/// - every slot is a valid position in the current source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    slots: Vec<usize>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Source position of the entity at `view_idx`, if mapped.
    pub fn get(&self, view_idx: usize) -> Option<usize> {
        self.slots.get(view_idx).copied()
    }

    /// View position holding `source_pos`, if that position is mapped.
    pub fn view_index_of(&self, source_pos: usize) -> Option<usize> {
        self.slots.binary_search(&source_pos).ok()
    }

    /// View position at which an entity with source position `source_pos`
    /// must be spliced in: the count of slots strictly below it. Inserting
    /// there keeps the map increasing and the view order-consistent with
    /// the source.
    pub fn insertion_point(&self, source_pos: usize) -> usize {
        self.slots.partition_point(|&slot| slot < source_pos)
    }

    /// Splice `source_pos` in at `view_idx`.
    ///
    /// No ordering check here: during a source-insert handler the map is
    /// computed against slots that are stale until the follow-up renumber,
    /// and may transiently hold a duplicate. The invariant is only required
    /// to hold between notifications, and the renumber re-establishes it
    /// before the handler returns.
    pub fn insert(&mut self, view_idx: usize, source_pos: usize) {
        self.slots.insert(view_idx, source_pos);
    }

    /// Append a slot. Only valid with `source_pos` above every existing
    /// slot; the full-rebuild pass appends in source order, so this holds
    /// by construction.
    pub fn push(&mut self, source_pos: usize) {
        self.slots.push(source_pos);
        self.debug_check();
    }

    /// Splice out the slot at `view_idx`, returning the source position it
    /// held.
    pub fn remove(&mut self, view_idx: usize) -> usize {
        let slot = self.slots.remove(view_idx);
        self.debug_check();
        slot
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Replace every slot at once. Used by the renumber pass and the full
    /// rebuild, both of which re-derive positions from the source in view
    /// order.
    pub fn replace(&mut self, slots: Vec<usize>) {
        self.slots = slots;
        self.debug_check();
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.slots
    }

    fn debug_check(&self) {
        debug_assert!(
            self.slots.windows(2).all(|w| w[0] < w[1]),
            "source map must stay strictly increasing: {:?}",
            self.slots
        );
    }
}
