pub mod client;
pub mod error;
pub mod pagination;
pub mod types;

pub use client::UpstreamClient;
pub use error::UpstreamError;
pub use pagination::{fetch_all, PageSource, DEFAULT_MAX_PAGES};
pub use types::{Account, Field, Platform};
