//! Core value types shared by the transition function and the selectors.

mod ids;
mod params;
mod record;
mod time;

pub use ids::{RecordId, RequestId};
pub use params::Params;
pub use record::{CollectionPage, FieldErrors, MutationFailure, Record};
pub use time::{FetchTime, Timestamp};
