mod html_output;
mod markdown_output;
mod processor;
mod types;

pub use html_output::{HtmlFacetOutput, render_faceted_html};
pub use markdown_output::{MarkdownFacetOutput, render_faceted_markdown};
pub use processor::{FacetResolver, Segment, SegmentKind, mentions_identity, resolve};
pub use types::{ByteRange, Facet, Feature, FeatureKind};

/// Sink for resolved segments, e.g. an HTML or markdown writer.
pub trait FacetOutput {
    type Error;

    fn write_text(&mut self, text: &str) -> Result<(), Self::Error>;
    fn start_feature(&mut self, feature: &Feature, mentions_self: bool) -> Result<(), Self::Error>;
    fn end_feature(&mut self, feature: &Feature) -> Result<(), Self::Error>;
}

/// Feed resolved segments through `output` in order.
pub fn write_segments<O: FacetOutput>(
    segments: &[Segment<'_>],
    output: &mut O,
) -> Result<(), O::Error> {
    for segment in segments {
        match &segment.feature {
            Some(feature) => {
                output.start_feature(feature, segment.mentions_self)?;
                output.write_text(segment.text)?;
                output.end_feature(feature)?;
            }
            None => output.write_text(segment.text)?,
        }
    }
    Ok(())
}
