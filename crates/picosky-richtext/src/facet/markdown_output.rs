use super::{Facet, FacetOutput, FacetResolver, Feature};
use std::fmt::Write;

/// Writes segments as markdown links, which also reads fine in a terminal.
///
/// Link text has `\`, `[` and `]` escaped and targets are written in `<...>` form, so producer
/// data cannot close a link early.
pub struct MarkdownFacetOutput<W: Write> {
    writer: W,
    in_link: bool,
}

impl<W: Write> MarkdownFacetOutput<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            in_link: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FacetOutput for MarkdownFacetOutput<W> {
    type Error = std::fmt::Error;

    fn write_text(&mut self, text: &str) -> Result<(), Self::Error> {
        if !self.in_link {
            return self.writer.write_str(text);
        }
        for c in text.chars() {
            match c {
                '\\' | '[' | ']' => {
                    self.writer.write_char('\\')?;
                    self.writer.write_char(c)?;
                }
                _ => self.writer.write_char(c)?,
            }
        }
        Ok(())
    }

    fn start_feature(&mut self, feature: &Feature, _mentions_self: bool) -> Result<(), Self::Error> {
        match feature {
            Feature::Mention { .. } | Feature::Link { .. } | Feature::Tag { .. } => {
                self.in_link = true;
                write!(self.writer, "[")
            }
            Feature::Unknown => Ok(()),
        }
    }

    fn end_feature(&mut self, feature: &Feature) -> Result<(), Self::Error> {
        self.in_link = false;
        match feature {
            Feature::Link { uri } => {
                write!(self.writer, "](<")?;
                self.write_target(uri)?;
                write!(self.writer, ">)")
            }
            Feature::Mention { subject_id } => {
                write!(self.writer, "](<https://bsky.app/profile/")?;
                self.write_target(subject_id)?;
                write!(self.writer, ">)")
            }
            Feature::Tag { value } => {
                write!(self.writer, "](<https://bsky.app/hashtag/")?;
                self.write_target(value)?;
                write!(self.writer, ">)")
            }
            Feature::Unknown => Ok(()),
        }
    }
}

impl<W: Write> MarkdownFacetOutput<W> {
    fn write_target(&mut self, target: &str) -> std::fmt::Result {
        for c in target.chars() {
            match c {
                '<' => self.writer.write_str("%3C")?,
                '>' => self.writer.write_str("%3E")?,
                '\n' | '\r' => self.writer.write_str("%0A")?,
                _ => self.writer.write_char(c)?,
            }
        }
        Ok(())
    }
}

pub fn render_faceted_markdown(
    text: &str,
    facets: &[Facet],
    resolver: &FacetResolver<'_>,
) -> Result<String, std::fmt::Error> {
    let segments = resolver.resolve(text, facets);
    let mut output = MarkdownFacetOutput::new(String::with_capacity(text.len()));
    super::write_segments(&segments, &mut output)?;
    Ok(output.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_links() {
        let text = "ping @bob about #rust at example.com";
        let facets = vec![
            Facet::mention(5, 9, "did:plc:bob"),
            Facet::tag(16, 21, "rust"),
            Facet::link(25, 36, "https://example.com"),
        ];

        let markdown = render_faceted_markdown(text, &facets, &FacetResolver::new()).unwrap();

        insta::assert_snapshot!(markdown, @"ping [@bob](<https://bsky.app/profile/did:plc:bob>) about [#rust](<https://bsky.app/hashtag/rust>) at [example.com](<https://example.com>)");
    }

    #[test]
    fn test_brackets_and_spaces_stay_inside_link() {
        let text = "see [docs] now";
        let facets = vec![Facet::link(4, 10, "https://example.com/a b)<c>")];

        let markdown = render_faceted_markdown(text, &facets, &FacetResolver::new()).unwrap();

        insta::assert_snapshot!(markdown, @r"see [\[docs\]](<https://example.com/a b)%3Cc%3E>) now");
    }
}
