//! picosky-richtext
//!
//! Text handling for picosky posts:
//! - grapheme-cluster counting for the composer's input limit
//! - byte offset repair so facet boundaries never split a character
//! - facet resolution into a flat, renderable sequence of segments
//!

pub mod error;
pub mod facet;
pub mod grapheme;
pub mod offsets;

pub use error::InvalidRangeError;
pub use facet::{
    ByteRange, Facet, FacetOutput, FacetResolver, Feature, FeatureKind, HtmlFacetOutput,
    MarkdownFacetOutput, Segment, SegmentKind, mentions_identity, render_faceted_html,
    render_faceted_markdown, resolve, write_segments,
};
pub use grapheme::GraphemeCounter;
pub use offsets::{ByteOffsetIndex, SnapDirection};
pub use smol_str::SmolStr;
