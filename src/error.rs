/// A type alias for handling errors throughout meshletize
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The input mesh has no vertices or no triangles. Detected before
    /// clustering begins; no partial output is produced.
    #[error("empty mesh: {0}")]
    EmptyMesh(&'static str),

    /// The index data is malformed: the index count is not a multiple of
    /// three, or an index refers past the end of the vertex data.
    #[error("invalid mesh: {0}")]
    InvalidMesh(std::borrow::Cow<'static, str>),

    /// The requested meshlet budgets cannot hold even a single triangle.
    #[error("budget too small: {0}")]
    BudgetTooSmall(std::borrow::Cow<'static, str>),

    /// The requested meshlet budgets exceed what the byte-indexed output
    /// encoding can represent.
    #[error("budget too large: {0}")]
    BudgetTooLarge(std::borrow::Cow<'static, str>),
}

impl Error {
    #[inline]
    pub(crate) fn invalid(msg: &'static str) -> Self {
        Self::InvalidMesh(std::borrow::Cow::Borrowed(msg))
    }

    #[inline]
    pub(crate) fn invalid_dynamic(msg: String) -> Self {
        Self::InvalidMesh(std::borrow::Cow::Owned(msg))
    }

    #[inline]
    pub(crate) fn budget_too_small(msg: &'static str) -> Self {
        Self::BudgetTooSmall(std::borrow::Cow::Borrowed(msg))
    }

    #[inline]
    pub(crate) fn budget_too_large(msg: &'static str) -> Self {
        Self::BudgetTooLarge(std::borrow::Cow::Borrowed(msg))
    }
}
