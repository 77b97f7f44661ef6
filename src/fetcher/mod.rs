pub mod client;
pub mod errors;
pub mod pipeline;
pub mod types;

pub use client::{Fetcher, parse_url};
pub use errors::FetchError;
pub use types::{Charset, PageSource, RawDocument};
