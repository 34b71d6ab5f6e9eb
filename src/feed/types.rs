// src/feed/types.rs
use anyhow::Result;

/// One price-drop entry extracted from the feed.
///
/// `id` is the entry's canonical link URL (the feed carries no separate
/// GUID). An empty `id` means the entry had no link; such alerts are
/// non-deduplicable and get re-delivered on every check.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Alert {
    pub id: String,
    pub title: String,
    pub link: String,
    pub description: String,
    /// Raw RFC-2822 `pubDate` text as published.
    pub published_at: String,
    /// Parsed unix seconds; 0 when the pubDate was missing or unparseable.
    pub published_ts: u64,
    /// Derived from the title; `PRICE_NOT_SPECIFIED` when no pattern matched.
    pub price: String,
    pub image_url: Option<String>,
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Alert>>;
    fn name(&self) -> &'static str;
}
