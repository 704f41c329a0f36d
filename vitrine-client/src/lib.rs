pub mod client;
pub mod error;
pub mod record;

pub use client::{DEFAULT_ENDPOINT, ProfileClient};
pub use error::FetchError;
pub use record::ProfileRecord;
