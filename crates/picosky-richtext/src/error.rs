use miette::Diagnostic;
use thiserror::Error;

/// A byte range that cannot be sliced out of the text as given.
///
/// Only raised by [`ByteOffsetIndex::slice`](crate::ByteOffsetIndex::slice), which does no
/// clamping. Resolution itself always repairs ranges first and never fails.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("invalid byte range {start}..{end} for text of {len} bytes")]
#[diagnostic(
    code(richtext::invalid_range),
    help("offsets must be ordered, within the text, and on codepoint boundaries")
)]
pub struct InvalidRangeError {
    pub start: usize,
    pub end: usize,
    pub len: usize,
}
