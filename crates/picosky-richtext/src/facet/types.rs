use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Raw byte range from a facet's `index`.
///
/// Kept signed and unvalidated: facets come from an untrusted producer, and repair happens in
/// [`ByteOffsetIndex::clamp_range`](crate::ByteOffsetIndex::clamp_range) at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByteRange {
    pub byte_start: i64,
    pub byte_end: i64,
}

impl ByteRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self {
            byte_start: start,
            byte_end: end,
        }
    }

    pub fn start(&self) -> i64 {
        self.byte_start
    }

    pub fn end(&self) -> i64 {
        self.byte_end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum Feature {
    #[serde(rename = "app.bsky.richtext.facet#mention")]
    #[serde(alias = "social.psky.richtext.facet#mention")]
    #[serde(alias = "mention")]
    Mention {
        #[serde(rename = "did", alias = "subjectId")]
        subject_id: SmolStr,
    },
    #[serde(rename = "app.bsky.richtext.facet#link")]
    #[serde(alias = "social.psky.richtext.facet#link")]
    #[serde(alias = "link")]
    Link { uri: SmolStr },
    #[serde(rename = "app.bsky.richtext.facet#tag")]
    #[serde(alias = "social.psky.richtext.facet#tag")]
    #[serde(alias = "tag")]
    Tag {
        #[serde(rename = "tag", alias = "value")]
        value: SmolStr,
    },
    /// Any feature type this client does not render.
    #[serde(other)]
    Unknown,
}

/// Recognized feature kinds, in classification priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureKind {
    Mention,
    Link,
    Tag,
}

impl Feature {
    pub fn mention(subject_id: impl Into<SmolStr>) -> Self {
        Self::Mention {
            subject_id: subject_id.into(),
        }
    }

    pub fn link(uri: impl Into<SmolStr>) -> Self {
        Self::Link { uri: uri.into() }
    }

    pub fn tag(value: impl Into<SmolStr>) -> Self {
        Self::Tag {
            value: value.into(),
        }
    }

    pub fn kind(&self) -> Option<FeatureKind> {
        match self {
            Self::Mention { .. } => Some(FeatureKind::Mention),
            Self::Link { .. } => Some(FeatureKind::Link),
            Self::Tag { .. } => Some(FeatureKind::Tag),
            Self::Unknown => None,
        }
    }

    /// True if this is a mention of `identity`.
    pub fn mentions(&self, identity: &str) -> bool {
        matches!(self, Self::Mention { subject_id } if subject_id == identity)
    }
}

/// A byte-range annotation over post text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub index: ByteRange,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl Facet {
    pub fn new(start: i64, end: i64, features: Vec<Feature>) -> Self {
        Self {
            index: ByteRange::new(start, end),
            features,
        }
    }

    pub fn mention(start: i64, end: i64, subject_id: impl Into<SmolStr>) -> Self {
        Self::new(start, end, vec![Feature::mention(subject_id)])
    }

    pub fn link(start: i64, end: i64, uri: impl Into<SmolStr>) -> Self {
        Self::new(start, end, vec![Feature::link(uri)])
    }

    pub fn tag(start: i64, end: i64, value: impl Into<SmolStr>) -> Self {
        Self::new(start, end, vec![Feature::tag(value)])
    }

    /// The feature this facet renders as: the highest priority recognized kind
    /// (mention, then link, then tag), first in list order among equals.
    pub fn classify(&self) -> Option<&Feature> {
        self.features
            .iter()
            .filter_map(|feature| feature.kind().map(|kind| (kind, feature)))
            .min_by_key(|(kind, _)| *kind)
            .map(|(_, feature)| feature)
    }

    pub fn mentions(&self, identity: &str) -> bool {
        self.features.iter().any(|feature| feature.mentions(identity))
    }
}
