use super::{Facet, FacetOutput, FacetResolver, Feature};
use std::fmt::Write;

pub struct HtmlFacetOutput<W: Write> {
    writer: W,
}

impl<W: Write> HtmlFacetOutput<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_attr(&mut self, value: &str) -> std::fmt::Result {
        for c in value.chars() {
            match c {
                '"' => self.writer.write_str("%22")?,
                '<' => self.writer.write_str("%3C")?,
                '>' => self.writer.write_str("%3E")?,
                '&' => self.writer.write_str("&amp;")?,
                _ => self.writer.write_char(c)?,
            }
        }
        Ok(())
    }
}

impl<W: Write> FacetOutput for HtmlFacetOutput<W> {
    type Error = std::fmt::Error;

    fn write_text(&mut self, text: &str) -> Result<(), Self::Error> {
        for c in text.chars() {
            match c {
                '&' => self.writer.write_str("&amp;")?,
                '<' => self.writer.write_str("&lt;")?,
                '>' => self.writer.write_str("&gt;")?,
                _ => self.writer.write_char(c)?,
            }
        }
        Ok(())
    }

    fn start_feature(&mut self, feature: &Feature, mentions_self: bool) -> Result<(), Self::Error> {
        match feature {
            Feature::Mention { subject_id } => {
                if mentions_self {
                    write!(self.writer, "<a class=\"mention self-mention\" href=\"")?;
                } else {
                    write!(self.writer, "<a class=\"mention\" href=\"")?;
                }
                write!(self.writer, "https://bsky.app/profile/")?;
                self.write_attr(subject_id)?;
                write!(self.writer, "\">")
            }
            Feature::Link { uri } if !is_safe_href(uri) => {
                write!(self.writer, "<span class=\"link\">")
            }
            Feature::Link { uri } => {
                write!(self.writer, "<a href=\"")?;
                self.write_attr(uri)?;
                write!(self.writer, "\" target=\"_blank\" rel=\"noreferrer\">")
            }
            Feature::Tag { value } => {
                write!(self.writer, "<a class=\"hashtag\" href=\"https://bsky.app/hashtag/")?;
                self.write_attr(value)?;
                write!(self.writer, "\">")
            }
            Feature::Unknown => write!(self.writer, "<span>"),
        }
    }

    fn end_feature(&mut self, feature: &Feature) -> Result<(), Self::Error> {
        match feature {
            Feature::Link { uri } if !is_safe_href(uri) => write!(self.writer, "</span>"),
            Feature::Mention { .. } | Feature::Link { .. } | Feature::Tag { .. } => {
                write!(self.writer, "</a>")
            }
            Feature::Unknown => write!(self.writer, "</span>"),
        }
    }
}

/// Only web and mail schemes become anchors.
fn is_safe_href(uri: &str) -> bool {
    uri.split_once(':').is_some_and(|(scheme, _)| {
        ["http", "https", "mailto"]
            .iter()
            .any(|allowed| scheme.eq_ignore_ascii_case(allowed))
    })
}

pub fn render_faceted_html(
    text: &str,
    facets: &[Facet],
    resolver: &FacetResolver<'_>,
) -> Result<String, std::fmt::Error> {
    let segments = resolver.resolve(text, facets);
    let mut output = HtmlFacetOutput::new(String::with_capacity(text.len()));
    super::write_segments(&segments, &mut output)?;
    Ok(output.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_text_and_marks_self_mention() {
        let text = "<hi> @me & #rust";
        let facets = vec![Facet::mention(5, 8, "did:plc:me"), Facet::tag(11, 16, "rust")];
        let resolver = FacetResolver::new().with_self_identity("did:plc:me");

        let html = render_faceted_html(text, &facets, &resolver).unwrap();

        insta::assert_snapshot!(html, @r#"&lt;hi&gt; <a class="mention self-mention" href="https://bsky.app/profile/did:plc:me">@me</a> &amp; <a class="hashtag" href="https://bsky.app/hashtag/rust">#rust</a>"#);
    }

    #[test]
    fn test_script_scheme_renders_as_text() {
        let text = "click <me>";
        let facets = vec![
            Facet::link(0, 5, "javascript:alert(document.cookie)"),
            Facet::link(6, 10, " JavaScript:void(0)"),
        ];

        let html = render_faceted_html(text, &facets, &FacetResolver::new()).unwrap();

        insta::assert_snapshot!(html, @r#"<span class="link">click</span> <span class="link">&lt;me&gt;</span>"#);
    }

    #[test]
    fn test_allowed_schemes() {
        assert!(is_safe_href("https://example.com"));
        assert!(is_safe_href("HTTP://example.com"));
        assert!(is_safe_href("mailto:bob@example.com"));
        assert!(!is_safe_href("javascript:alert(1)"));
        assert!(!is_safe_href("data:text/html,<b>x</b>"));
        assert!(!is_safe_href("java\tscript:alert(1)"));
        assert!(!is_safe_href("/relative/path"));
    }

    #[test]
    fn test_link_attribute_is_quoted_safely() {
        let text = "click here";
        let facets = vec![Facet::link(6, 10, "https://example.com/?q=\"x\"")];

        let html = render_faceted_html(text, &facets, &FacetResolver::new()).unwrap();

        assert_eq!(
            html,
            "click <a href=\"https://example.com/?q=%22x%22\" target=\"_blank\" rel=\"noreferrer\">here</a>"
        );
    }
}
