use std::cmp::Ordering;
use std::ops::Range;

use tracing::{debug, trace};

use super::types::{Facet, Feature, FeatureKind};
use crate::offsets::ByteOffsetIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Plain,
    Mention,
    Link,
    Tag,
}

impl From<FeatureKind> for SegmentKind {
    fn from(kind: FeatureKind) -> Self {
        match kind {
            FeatureKind::Mention => Self::Mention,
            FeatureKind::Link => Self::Link,
            FeatureKind::Tag => Self::Tag,
        }
    }
}

/// One run of text in a resolved post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub kind: SegmentKind,
    /// `None` for plain segments.
    pub feature: Option<Feature>,
    pub byte_range: Range<usize>,
    /// Set when the facet behind this segment mentions the viewer.
    pub mentions_self: bool,
}

impl<'a> Segment<'a> {
    fn plain(text: &'a str, byte_range: Range<usize>) -> Self {
        Self {
            text: &text[byte_range.clone()],
            kind: SegmentKind::Plain,
            feature: None,
            byte_range,
            mentions_self: false,
        }
    }

    pub fn is_plain(&self) -> bool {
        self.kind == SegmentKind::Plain
    }
}

/// A facet that survived repair and classification, waiting for placement.
struct Candidate<'f> {
    range: Range<usize>,
    facet: &'f Facet,
    feature: &'f Feature,
    kind: FeatureKind,
    order: usize,
}

impl Candidate<'_> {
    /// Earlier start first; at the same start the wider facet, then input order.
    fn placement_order(&self, other: &Self) -> Ordering {
        self.range
            .start
            .cmp(&other.range.start)
            .then_with(|| other.range.end.cmp(&self.range.end))
            .then_with(|| self.order.cmp(&other.order))
    }
}

/// Turns text plus byte-range facets into a flat partition of typed segments.
///
/// Resolution is total. Ranges are repaired to grapheme boundaries, facets left empty or with
/// no renderable feature are dropped, and where facets overlap the first one in placement order
/// wins while the rest are skipped. Concatenating the segment texts always reproduces the input.
/// Empty text resolves to no segments at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct FacetResolver<'id> {
    self_identity: Option<&'id str>,
}

impl<'id> FacetResolver<'id> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag mention segments that point at `identity` (the viewer's DID).
    pub fn with_self_identity(mut self, identity: &'id str) -> Self {
        self.self_identity = Some(identity);
        self
    }

    pub fn resolve<'t>(&self, text: &'t str, facets: &[Facet]) -> Vec<Segment<'t>> {
        if text.is_empty() {
            return Vec::new();
        }

        let index = ByteOffsetIndex::new(text);
        let mut candidates: Vec<Candidate<'_>> = facets
            .iter()
            .enumerate()
            .filter_map(|(order, facet)| {
                let range = index.clamp_range(facet.index.start(), facet.index.end());
                if range.is_empty() {
                    debug!(?facet.index, "dropping facet with empty range");
                    return None;
                }
                let Some(feature) = facet.classify() else {
                    trace!(?facet.index, "dropping facet with no renderable feature");
                    return None;
                };
                let kind = feature.kind()?;
                Some(Candidate {
                    range,
                    facet,
                    feature,
                    kind,
                    order,
                })
            })
            .collect();
        candidates.sort_by(Candidate::placement_order);

        let mut segments = Vec::with_capacity(candidates.len() * 2 + 1);
        let mut cursor = 0;
        for candidate in candidates {
            if candidate.range.start < cursor {
                debug!(
                    range = ?candidate.range,
                    cursor,
                    "skipping facet overlapping an earlier one"
                );
                continue;
            }
            if candidate.range.start > cursor {
                segments.push(Segment::plain(text, cursor..candidate.range.start));
            }
            // ranges come out of clamp_range, so they sit on char boundaries
            segments.push(Segment {
                text: &text[candidate.range.clone()],
                kind: candidate.kind.into(),
                feature: Some(candidate.feature.clone()),
                byte_range: candidate.range.clone(),
                mentions_self: self
                    .self_identity
                    .is_some_and(|identity| candidate.facet.mentions(identity)),
            });
            cursor = candidate.range.end;
        }
        if cursor < text.len() {
            segments.push(Segment::plain(text, cursor..text.len()));
        }

        segments
    }
}

/// Resolve without self-mention detection.
pub fn resolve<'t>(text: &'t str, facets: &[Facet]) -> Vec<Segment<'t>> {
    FacetResolver::new().resolve(text, facets)
}

/// True if any facet mentions `identity`, including facets that would lose an overlap.
pub fn mentions_identity(facets: &[Facet], identity: &str) -> bool {
    facets.iter().any(|facet| facet.mentions(identity))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(segments: &[Segment<'a>]) -> Vec<(SegmentKind, &'a str)> {
        segments.iter().map(|s| (s.kind, s.text)).collect()
    }

    fn joined(segments: &[Segment<'_>]) -> String {
        segments.iter().map(|s| s.text).collect()
    }

    #[test]
    fn test_mention() {
        let text = "hello @bob";
        let facets = vec![Facet::mention(6, 10, "bob")];

        let segments = resolve(text, &facets);

        assert_eq!(
            texts(&segments),
            vec![(SegmentKind::Plain, "hello "), (SegmentKind::Mention, "@bob")]
        );
        assert_eq!(segments[1].feature, Some(Feature::mention("bob")));
        assert_eq!(segments[1].byte_range, 6..10);
        assert!(segments[0].feature.is_none());
    }

    #[test]
    fn test_no_facets() {
        let segments = resolve("plain text", &[]);
        assert_eq!(texts(&segments), vec![(SegmentKind::Plain, "plain text")]);
    }

    #[test]
    fn test_empty_text() {
        assert!(resolve("", &[]).is_empty());
        assert!(resolve("", &[Facet::link(0, 4, "https://example.com")]).is_empty());
    }

    #[test]
    fn test_link_and_tag_with_gaps() {
        let text = "see example.com #rust ok";
        let facets = vec![
            Facet::tag(16, 21, "rust"),
            Facet::link(4, 15, "https://example.com"),
        ];

        let segments = resolve(text, &facets);

        assert_eq!(
            texts(&segments),
            vec![
                (SegmentKind::Plain, "see "),
                (SegmentKind::Link, "example.com"),
                (SegmentKind::Plain, " "),
                (SegmentKind::Tag, "#rust"),
                (SegmentKind::Plain, " ok"),
            ]
        );
    }

    #[test]
    fn test_overlap_same_start_keeps_wider() {
        let text = "@bob.example.com";
        let facets = vec![
            Facet::link(0, 4, "https://short"),
            Facet::mention(0, 16, "did:plc:bob"),
        ];

        let segments = resolve(text, &facets);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, SegmentKind::Mention);
        assert_eq!(segments[0].text, text);
    }

    #[test]
    fn test_overlap_identical_range_keeps_input_order() {
        let text = "#tag";
        let facets = vec![Facet::tag(0, 4, "first"), Facet::tag(0, 4, "second")];

        let segments = resolve(text, &facets);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].feature, Some(Feature::tag("first")));
    }

    #[test]
    fn test_overlap_later_start_is_skipped() {
        let text = "abcdefghij";
        let facets = vec![Facet::tag(5, 10, "late"), Facet::tag(0, 7, "early")];

        let segments = resolve(text, &facets);

        assert_eq!(
            texts(&segments),
            vec![(SegmentKind::Tag, "abcdefg"), (SegmentKind::Plain, "hij")]
        );
    }

    #[test]
    fn test_mid_codepoint_offsets_widen() {
        // "café ☕ time": é is bytes 3..5, ☕ is bytes 6..9
        let text = "caf\u{e9} \u{2615} time";
        let facets = vec![Facet::link(4, 7, "https://coffee.example")];

        let segments = resolve(text, &facets);

        assert_eq!(
            texts(&segments),
            vec![
                (SegmentKind::Plain, "caf"),
                (SegmentKind::Link, "\u{e9} \u{2615}"),
                (SegmentKind::Plain, " time"),
            ]
        );
        assert_eq!(joined(&segments), text);
    }

    #[test]
    fn test_garbage_ranges_are_repaired_or_dropped() {
        let text = "hello";
        let facets = vec![
            Facet::tag(50, 60, "past-end"),
            Facet::tag(3, 3, "empty"),
            Facet::link(4, -2, "https://reversed"),
            Facet::new(0, 5, vec![Feature::Unknown]),
        ];

        let segments = resolve(text, &facets);

        assert_eq!(
            texts(&segments),
            vec![(SegmentKind::Link, "hell"), (SegmentKind::Plain, "o")]
        );
    }

    #[test]
    fn test_self_mention_detection() {
        let text = "hi @me and @you";
        let facets = vec![
            Facet::mention(3, 6, "did:plc:me"),
            Facet::mention(11, 15, "did:plc:you"),
        ];

        let segments = FacetResolver::new()
            .with_self_identity("did:plc:me")
            .resolve(text, &facets);

        let flagged: Vec<_> = segments
            .iter()
            .filter(|s| s.mentions_self)
            .map(|s| s.text)
            .collect();
        assert_eq!(flagged, vec!["@me"]);
        assert!(resolve(text, &facets).iter().all(|s| !s.mentions_self));
    }

    #[test]
    fn test_mentions_identity_sees_shadowed_facets() {
        let facets = vec![
            Facet::link(0, 10, "https://example.com"),
            Facet::mention(2, 5, "did:plc:me"),
        ];

        assert!(mentions_identity(&facets, "did:plc:me"));
        assert!(!mentions_identity(&facets, "did:plc:other"));
    }

    #[test]
    fn test_round_trip_over_many_ranges() {
        let text = "a\u{e9}\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467} e\u{301}!";
        let len = text.len() as i64;
        for start in -2..=len + 2 {
            for end in -2..=len + 2 {
                let facets = vec![
                    Facet::tag(start, end, "x"),
                    Facet::mention(end, start + 3, "y"),
                ];
                let segments = resolve(text, &facets);
                assert_eq!(joined(&segments), text, "facets {start}..{end}");
                for segment in &segments {
                    assert!(!segment.text.is_empty());
                    assert_eq!(&text[segment.byte_range.clone()], segment.text);
                }
            }
        }
    }
}
