use picosky_richtext::{Facet, mentions_identity};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// One post in the feed.
///
/// Decoded from the `/posts` fetch or a stream message and never mutated afterwards. Feed order
/// comes from arrival order, not from `indexedAt`, which may tie or arrive out of order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "rkey", alias = "key")]
    key: SmolStr,
    #[serde(rename = "post", alias = "text", alias = "body", alias = "content")]
    body: String,
    #[serde(rename = "indexedAt")]
    inserted_at_millis: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    facets: Vec<Facet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    did: Option<SmolStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    handle: Option<SmolStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nickname: Option<SmolStr>,
    #[serde(
        rename = "updatedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    updated_at_millis: Option<i64>,
}

impl Record {
    pub fn new(key: impl Into<SmolStr>, body: impl Into<String>, inserted_at_millis: i64) -> Self {
        Self {
            key: key.into(),
            body: body.into(),
            inserted_at_millis,
            facets: Vec::new(),
            did: None,
            handle: None,
            nickname: None,
            updated_at_millis: None,
        }
    }

    pub fn with_facets(mut self, facets: Vec<Facet>) -> Self {
        self.facets = facets;
        self
    }

    pub fn with_author(mut self, did: impl Into<SmolStr>, handle: impl Into<SmolStr>) -> Self {
        self.did = Some(did.into());
        self.handle = Some(handle.into());
        self
    }

    pub fn with_nickname(mut self, nickname: impl Into<SmolStr>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    pub fn with_updated_at(mut self, updated_at_millis: i64) -> Self {
        self.updated_at_millis = Some(updated_at_millis);
        self
    }

    /// Stable unique key (the record's rkey).
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn inserted_at_millis(&self) -> i64 {
        self.inserted_at_millis
    }

    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    pub fn did(&self) -> Option<&str> {
        self.did.as_deref()
    }

    pub fn handle(&self) -> Option<&str> {
        self.handle.as_deref()
    }

    pub fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref()
    }

    pub fn updated_at_millis(&self) -> Option<i64> {
        self.updated_at_millis
    }

    pub fn is_edited(&self) -> bool {
        self.updated_at_millis.is_some()
    }

    /// True if any facet mentions `identity`, whether or not it wins placement when rendered.
    pub fn mentions(&self, identity: &str) -> bool {
        mentions_identity(&self.facets, identity)
    }

    /// Both records carry an author and it is the same one. Consecutive posts by one author
    /// are grouped under a single header.
    pub fn same_author(&self, other: &Record) -> bool {
        match (self.did(), other.did()) {
            (Some(a), Some(b)) => a == b,
            _ => match (self.handle(), other.handle()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Link to the post on bsky.app. Uses the record's own author when known, otherwise
    /// `profile_did`.
    pub fn permalink(&self, profile_did: &str) -> String {
        let did = self.did().unwrap_or(profile_did);
        format!("https://bsky.app/profile/{}/post/{}", did, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_original_feed_shape() {
        let json = r#"{"rkey": "3kabc", "post": "hi all", "indexedAt": 1717000000000}"#;

        let record: Record = serde_json::from_str(json).unwrap();

        assert_eq!(record.key(), "3kabc");
        assert_eq!(record.body(), "hi all");
        assert_eq!(record.inserted_at_millis(), 1717000000000);
        assert!(record.facets().is_empty());
        assert!(!record.is_edited());
    }

    #[test]
    fn test_deserialize_aliases_and_facets() {
        let json = r#"{
            "key": "k1",
            "content": "hey @me",
            "indexedAt": 5,
            "updatedAt": 9,
            "did": "did:plc:author",
            "handle": "author.test",
            "facets": [{
                "index": {"byteStart": 4, "byteEnd": 7},
                "features": [{"$type": "social.psky.richtext.facet#mention", "did": "did:plc:me"}]
            }]
        }"#;

        let record: Record = serde_json::from_str(json).unwrap();

        assert_eq!(record.key(), "k1");
        assert_eq!(record.body(), "hey @me");
        assert!(record.is_edited());
        assert!(record.mentions("did:plc:me"));
        assert!(!record.mentions("did:plc:author"));
        assert_eq!(
            record.permalink("did:plc:fallback"),
            "https://bsky.app/profile/did:plc:author/post/k1"
        );
    }

    #[test]
    fn test_permalink_falls_back_to_profile() {
        let record = Record::new("3kxyz", "yo", 0);
        assert_eq!(
            record.permalink("did:plc:bpmiiiabnbf2hf7uuqdbjne6"),
            "https://bsky.app/profile/did:plc:bpmiiiabnbf2hf7uuqdbjne6/post/3kxyz"
        );
    }

    #[test]
    fn test_same_author() {
        let a = Record::new("1", "a", 0).with_author("did:plc:a", "a.test");
        let b = Record::new("2", "b", 1).with_author("did:plc:a", "a.test");
        let c = Record::new("3", "c", 2).with_author("did:plc:c", "c.test");
        let anon = Record::new("4", "d", 3);

        assert!(a.same_author(&b));
        assert!(!a.same_author(&c));
        assert!(!anon.same_author(&anon.clone()));
    }

    #[test]
    fn test_serialize_skips_empty_optionals() {
        let value = serde_json::to_value(Record::new("k", "body", 7)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"rkey": "k", "post": "body", "indexedAt": 7})
        );
    }
}
