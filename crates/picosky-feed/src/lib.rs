//! picosky-feed
//!
//! The live post feed: a capacity-bounded, newest-first buffer of records seeded once from the
//! bulk `/posts` fetch and then grown one record at a time from the subscription stream.
//!
//! Transport is left to the caller. Decode payloads with [`wire`], hand them to [`FeedSync`] as
//! [`FeedEvent`]s in whatever order they arrive, and read the result back with
//! [`FeedSync::snapshot`].

pub mod buffer;
pub mod config;
pub mod error;
pub mod record;
pub mod sync;
pub mod wire;

pub use buffer::FeedBuffer;
pub use config::FeedConfig;
pub use error::{ConfigError, DraftError, FeedError, WireError};
pub use record::Record;
pub use sync::{FeedEvent, FeedSync};
pub use wire::{PostDraft, decode_record, decode_snapshot};
