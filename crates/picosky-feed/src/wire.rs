//! JSON payloads exchanged with the picosky service.
//!
//! `GET /posts` returns an array of records, each subscription message is a single record, and
//! `POST /post` takes `{"post": "..."}`.

use picosky_richtext::GraphemeCounter;
use serde::{Deserialize, Serialize};

use crate::error::{DraftError, WireError};
use crate::record::Record;

/// Decode one subscription message.
pub fn decode_record(json: &str) -> Result<Record, WireError> {
    serde_json::from_str(json).map_err(|source| WireError::Decode {
        what: "live record",
        source,
    })
}

/// Decode the bulk fetch body.
pub fn decode_snapshot(json: &str) -> Result<Vec<Record>, WireError> {
    serde_json::from_str(json).map_err(|source| WireError::Decode {
        what: "feed snapshot",
        source,
    })
}

/// A validated outgoing post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    post: String,
}

impl PostDraft {
    /// Accepts text that is not blank and fits the composer limit.
    pub fn new(text: impl Into<String>, counter: &GraphemeCounter) -> Result<Self, DraftError> {
        let post = text.into();
        if post.trim().is_empty() {
            return Err(DraftError::Empty);
        }
        let count = counter.count(&post);
        if count > counter.limit() {
            return Err(DraftError::TooLong {
                count,
                limit: counter.limit(),
            });
        }
        Ok(Self { post })
    }

    pub fn text(&self) -> &str {
        &self.post
    }

    pub fn to_json(&self) -> Result<String, WireError> {
        serde_json::to_string(self).map_err(|source| WireError::Encode {
            what: "post draft",
            source,
        })
    }
}
