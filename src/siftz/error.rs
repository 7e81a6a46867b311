use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiftzError {
    /// A consumer invoked a mutating entry point on a filtered view.
    ///
    /// Views are projections: every structural change must go through the
    /// bound source, otherwise the view's position map and the source
    /// diverge with no recovery path. The guarded call fails before
    /// touching any state.
    #[error("filtered views are read-only: `{op}` must go through the bound source")]
    ViewReadOnly { op: &'static str },

    #[error("index {index} is out of bounds for a collection of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("entity is not a member of this source")]
    NotMember,
}

pub type Result<T> = std::result::Result<T, SiftzError>;
