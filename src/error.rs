/// Errors raised at the edges of the cache: building records and events from
/// raw responses, decoding typed reads, and sharing the store across threads.
///
/// The transition function and the selectors never fail; request and fetch
/// failures live in the state tree as data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("record has no id field: {0}")]
    MissingRecordId(String),
    #[error("record id must be a string or a number, got {0}")]
    InvalidRecordId(String),
    #[error("query params must be an object, got {0}")]
    InvalidParams(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("failed to decode {model} record: {message}")]
    Decode { model: String, message: String },
    #[error("cache store lock poisoned during {0}")]
    LockPoisoned(&'static str),
}
