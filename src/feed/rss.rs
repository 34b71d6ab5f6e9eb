// src/feed/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;

use crate::feed::extract::{extract_image_url, extract_price, parse_rfc2822_to_unix};
use crate::feed::types::{Alert, FeedSource};

/// Hard cap on the feed request so a stalled endpoint cannot wedge a check.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    enclosure: Option<Enclosure>,
    #[serde(rename = "media:content")]
    media_content: Option<MediaRef>,
    #[serde(rename = "media:thumbnail")]
    media_thumbnail: Option<MediaRef>,
}
#[derive(Debug, Deserialize)]
struct Enclosure {
    #[serde(rename = "@url")]
    url: Option<String>,
}
#[derive(Debug, Deserialize)]
struct MediaRef {
    #[serde(rename = "@url")]
    url: Option<String>,
}

pub struct KeepaRssProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl KeepaRssProvider {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            mode: Mode::Http {
                url: url.into(),
                client: reqwest::Client::new(),
            },
        }
    }

    /// Parse an embedded XML snapshot instead of fetching (tests, demos).
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    fn parse_items_from_str(s: &str) -> Result<Vec<Alert>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).context("parsing keepa rss xml")?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let title = html_escape::decode_html_entities(it.title.as_deref().unwrap_or_default())
                .trim()
                .to_string();
            let link = it.link.as_deref().unwrap_or_default().trim().to_string();
            let description = it.description.unwrap_or_default();
            let published_at = it.pub_date.unwrap_or_default();

            let image_url = extract_image_url(
                it.enclosure.as_ref().and_then(|e| e.url.as_deref()),
                &description,
                it.media_content.as_ref().and_then(|m| m.url.as_deref()),
                it.media_thumbnail.as_ref().and_then(|m| m.url.as_deref()),
            );

            out.push(Alert {
                // The feed has no GUID; the link doubles as the identifier.
                id: link.clone(),
                price: extract_price(&title),
                published_ts: parse_rfc2822_to_unix(&published_at),
                title,
                link,
                description,
                published_at,
                image_url,
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("feed_parse_ms").record(ms);
        counter!("alerts_found_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl FeedSource for KeepaRssProvider {
    async fn fetch_latest(&self) -> Result<Vec<Alert>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_items_from_str(s),

            Mode::Http { url, client } => {
                let body = match client.get(url).timeout(FETCH_TIMEOUT).send().await {
                    Ok(resp) => resp
                        .error_for_status()
                        .context("keepa feed non-2xx")?
                        .text()
                        .await
                        .context("keepa feed .text()")?,
                    Err(e) => {
                        tracing::warn!(error = ?e, provider = "Keepa", "feed http error");
                        counter!("feed_fetch_errors_total").increment(1);
                        return Err(e).context("keepa feed get()");
                    }
                };
                Self::parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "Keepa"
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
