// src/feed/mod.rs
pub mod extract;
pub mod rss;
pub mod types;

pub use extract::{extract_image_url, extract_price, PRICE_NOT_SPECIFIED};
pub use rss::KeepaRssProvider;
pub use types::{Alert, FeedSource};
