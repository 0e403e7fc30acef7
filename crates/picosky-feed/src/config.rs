use smol_str::SmolStr;

use crate::buffer::FeedBuffer;
use crate::error::ConfigError;
use picosky_richtext::GraphemeCounter;

/// Feed and composer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Maximum number of records kept in the feed.
    pub capacity: usize,
    /// Composer limit in grapheme clusters.
    pub char_limit: usize,
    /// The viewer's DID, for highlighting posts that mention them.
    pub self_did: Option<SmolStr>,
    /// Author used for post permalinks when a record carries none.
    pub profile_did: SmolStr,
}

impl FeedConfig {
    pub const DEFAULT_PROFILE_DID: &'static str = "did:plc:bpmiiiabnbf2hf7uuqdbjne6";

    /// Load configuration from environment variables.
    ///
    /// Optional env vars:
    /// - `PICOSKY_FEED_CAPACITY`: records kept in the feed (default: 50)
    /// - `PICOSKY_CHAR_LIMIT`: composer limit in characters (default: 12)
    /// - `PICOSKY_SELF_DID`: viewer DID for self-mention highlighting (default: none)
    /// - `PICOSKY_PROFILE_DID`: fallback author for permalinks
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let capacity = parse_positive(
            "PICOSKY_FEED_CAPACITY",
            lookup("PICOSKY_FEED_CAPACITY"),
            FeedBuffer::DEFAULT_CAPACITY,
        )?;
        let char_limit = parse_positive(
            "PICOSKY_CHAR_LIMIT",
            lookup("PICOSKY_CHAR_LIMIT"),
            GraphemeCounter::DEFAULT_LIMIT,
        )?;
        let self_did = lookup("PICOSKY_SELF_DID")
            .filter(|s| !s.trim().is_empty())
            .map(SmolStr::from);
        let profile_did = lookup("PICOSKY_PROFILE_DID")
            .filter(|s| !s.trim().is_empty())
            .map(SmolStr::from)
            .unwrap_or_else(|| SmolStr::new_static(Self::DEFAULT_PROFILE_DID));

        Ok(Self {
            capacity,
            char_limit,
            self_did,
            profile_did,
        })
    }

    pub fn grapheme_counter(&self) -> GraphemeCounter {
        GraphemeCounter::new(self.char_limit)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            capacity: FeedBuffer::DEFAULT_CAPACITY,
            char_limit: GraphemeCounter::DEFAULT_LIMIT,
            self_did: None,
            profile_did: SmolStr::new_static(Self::DEFAULT_PROFILE_DID),
        }
    }
}

fn parse_positive(
    field: &'static str,
    value: Option<String>,
    default: usize,
) -> Result<usize, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    let parsed: usize = value.trim().parse().map_err(|e| ConfigError::Invalid {
        field,
        message: format!("{value:?} is not a number: {e}"),
    })?;
    if parsed == 0 {
        return Err(ConfigError::Invalid {
            field,
            message: "must be at least 1".to_string(),
        });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = FeedConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, FeedConfig::default());
        assert_eq!(config.capacity, 50);
        assert_eq!(config.char_limit, 12);
    }

    #[test]
    fn test_overrides() {
        let config = FeedConfig::from_lookup(lookup(&[
            ("PICOSKY_FEED_CAPACITY", "5"),
            ("PICOSKY_CHAR_LIMIT", " 280 "),
            ("PICOSKY_SELF_DID", "did:plc:me"),
            ("PICOSKY_PROFILE_DID", ""),
        ]))
        .unwrap();
        assert_eq!(config.capacity, 5);
        assert_eq!(config.char_limit, 280);
        assert_eq!(config.self_did.as_deref(), Some("did:plc:me"));
        assert_eq!(config.profile_did, FeedConfig::DEFAULT_PROFILE_DID);
    }

    #[test]
    fn test_rejects_bad_numbers() {
        let err = FeedConfig::from_lookup(lookup(&[("PICOSKY_FEED_CAPACITY", "0")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "PICOSKY_FEED_CAPACITY",
                ..
            }
        ));

        let err = FeedConfig::from_lookup(lookup(&[("PICOSKY_CHAR_LIMIT", "lots")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "PICOSKY_CHAR_LIMIT",
                ..
            }
        ));
    }
}
