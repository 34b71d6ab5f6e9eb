//! # Alert Engine
//! The dedup-and-deliver core: fetch the feed, skip already-sent alerts,
//! deliver the rest, and mark an alert seen only after its delivery
//! succeeded. A failed delivery leaves the alert unseen so the next check
//! retries it (at-least-once).

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;

use crate::feed::FeedSource;
use crate::notify::Notifier;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("alerts_found_total", "Alerts parsed from the feed.");
        describe_counter!("alerts_sent_total", "Alerts delivered to the webhook.");
        describe_counter!(
            "alerts_skipped_seen_total",
            "Alerts skipped because they were already delivered."
        );
        describe_counter!("notify_errors_total", "Webhook delivery failures.");
        describe_counter!("feed_fetch_errors_total", "Feed fetch/parse errors.");
        describe_histogram!("feed_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!("check_last_run_ts", "Unix ts when a check last ran.");
        describe_gauge!("seen_set_size", "Identifiers currently marked as sent.");
    });
}

/// Identifiers of alerts already delivered. Process lifetime only; resets
/// on restart. All access goes through the internal mutex.
#[derive(Debug, Default)]
pub struct SeenSet {
    inner: Mutex<HashSet<String>>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.lock().expect("seen-set mutex poisoned").contains(id)
    }

    pub fn insert(&self, id: String) -> bool {
        self.inner.lock().expect("seen-set mutex poisoned").insert(id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("seen-set mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct AlertEngine {
    feed: Arc<dyn FeedSource>,
    notifier: Arc<dyn Notifier>,
    seen: SeenSet,
}

impl AlertEngine {
    pub fn new(feed: Arc<dyn FeedSource>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            feed,
            notifier,
            seen: SeenSet::new(),
        }
    }

    /// Run one fetch-filter-deliver pass. Infallible: fetch and delivery
    /// failures are logged and absorbed, and the call always returns the
    /// number of newly delivered alerts (0 on total failure).
    ///
    /// Safe to invoke concurrently from the scheduler and HTTP triggers.
    /// Membership is not reserved before delivery, so two overlapping
    /// invocations may both deliver the same alert before either marks it
    /// seen; the set itself stays consistent either way.
    pub async fn check_once(&self) -> usize {
        ensure_metrics_described();

        let alerts = match self.feed.fetch_latest().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = ?e, provider = self.feed.name(), "feed fetch failed");
                counter!("feed_fetch_errors_total").increment(1);
                Vec::new()
            }
        };

        let mut new_sent = 0usize;
        for alert in &alerts {
            // Empty ids are non-deduplicable: never marked seen, always
            // re-delivered.
            let dedupable = !alert.id.is_empty();
            if dedupable && self.seen.contains(&alert.id) {
                counter!("alerts_skipped_seen_total").increment(1);
                continue;
            }

            match self.notifier.send(alert).await {
                Ok(()) => {
                    if dedupable {
                        self.seen.insert(alert.id.clone());
                    }
                    new_sent += 1;
                    counter!("alerts_sent_total").increment(1);
                }
                Err(e) => {
                    // Stays unseen; the next check retries it.
                    tracing::warn!(error = ?e, title = %alert.title, "alert delivery failed");
                    counter!("notify_errors_total").increment(1);
                }
            }
        }

        gauge!("check_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);
        gauge!("seen_set_size").set(self.seen.len() as f64);

        if new_sent > 0 {
            tracing::info!(new_sent, total = alerts.len(), "sent new alerts");
        } else {
            tracing::info!("no new alerts found");
        }
        new_sent
    }

    /// Number of distinct alerts delivered so far. No network involved.
    pub fn sent_count(&self) -> usize {
        self.seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seen_set_insert_is_idempotent() {
        let seen = SeenSet::new();
        assert!(seen.insert("a".into()));
        assert!(!seen.insert("a".into()));
        assert_eq!(seen.len(), 1);
        assert!(seen.contains("a"));
        assert!(!seen.contains("b"));
    }
}
