// src/notify/slack.rs
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::{truncate_description, Notifier};
use crate::feed::{Alert, PRICE_NOT_SPECIFIED};

#[derive(Clone)]
pub struct SlackNotifier {
    webhook_url: String,
    client: Client,
    timeout: Duration,
}

impl SlackNotifier {
    pub fn new(webhook_url: String) -> Self {
        Self {
            webhook_url,
            client: Client::new(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Send the fixed sample alert to verify the webhook wiring end to end.
    pub async fn send_test_notification(&self) -> Result<()> {
        self.send(&sample_alert()).await
    }
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, alert: &Alert) -> Result<()> {
        let payload = render_payload(alert);

        self.client
            .post(&self.webhook_url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .context("slack post")?
            .error_for_status()
            .context("slack non-2xx")?;

        tracing::info!(title = %alert.title, "sent slack notification");
        Ok(())
    }
}

/// Build the Block Kit payload for one alert. Pure; unit-tested below.
pub fn render_payload(alert: &Alert) -> Value {
    let mut blocks: Vec<Value> = Vec::new();

    if let Some(image_url) = &alert.image_url {
        blocks.push(json!({
            "type": "image",
            "image_url": image_url,
            "alt_text": format!("Product image for {}", alert.title),
        }));
    }

    blocks.push(json!({
        "type": "section",
        "text": { "type": "mrkdwn", "text": format!("*🛒 {}*", alert.title) },
    }));

    // Price field only when the title actually carried one.
    let link_field = json!({
        "type": "mrkdwn",
        "text": format!("*🔗 Link:*\n<{}|View Product>", alert.link),
    });
    if alert.price != PRICE_NOT_SPECIFIED && !alert.price.is_empty() {
        blocks.push(json!({
            "type": "section",
            "fields": [
                { "type": "mrkdwn", "text": format!("*💰 Price:*\n{}", alert.price) },
                link_field,
            ],
        }));
    } else {
        blocks.push(json!({ "type": "section", "fields": [link_field] }));
    }

    if let Some(details) = truncate_description(&alert.description) {
        blocks.push(json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": format!("*📝 Details:*\n{details}") },
        }));
    }

    blocks.push(json!({
        "type": "actions",
        "elements": [{
            "type": "button",
            "text": { "type": "plain_text", "text": "🛍️ View Product" },
            "url": alert.link,
        }],
    }));

    blocks.push(json!({
        "type": "context",
        "elements": [{
            "type": "mrkdwn",
            "text": format!(
                "🤖 Keepa Alerts • {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M")
            ),
        }],
    }));

    json!({
        "text": format!("🛒 Keepa Alert: {}", alert.title),
        "blocks": blocks,
    })
}

/// Fixed sample used by `/test` and the notify demo binary.
pub fn sample_alert() -> Alert {
    Alert {
        id: String::new(),
        title: "Test Notification - Product with Image".to_string(),
        link: "https://example.com/test-product".to_string(),
        description: "This is a test notification with product image to verify \
                      the webhook integration works correctly."
            .to_string(),
        published_at: String::new(),
        published_ts: 0,
        price: "$19.99".to_string(),
        image_url: Some(
            "https://images-na.ssl-images-amazon.com/images/I/51RkXeTHbbL._SX300_SY300_QL70_FMwebp_.jpg"
                .to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_alert() -> Alert {
        Alert {
            id: "https://example.com/p/1".into(),
            title: "Echo Dot - $19.99".into(),
            link: "https://example.com/p/1".into(),
            description: "Great deal".into(),
            published_at: String::new(),
            published_ts: 0,
            price: "$19.99".into(),
            image_url: None,
        }
    }

    fn fields_of(block: &Value) -> &Vec<Value> {
        block["fields"].as_array().expect("fields array")
    }

    #[test]
    fn payload_includes_price_field_when_present() {
        let payload = render_payload(&base_alert());
        let blocks = payload["blocks"].as_array().unwrap();
        // no image block: title section first, then price+link fields
        let fields = fields_of(&blocks[1]);
        assert_eq!(fields.len(), 2);
        assert!(fields[0]["text"].as_str().unwrap().contains("$19.99"));
    }

    #[test]
    fn payload_omits_price_field_for_sentinel() {
        let mut alert = base_alert();
        alert.price = PRICE_NOT_SPECIFIED.into();
        let payload = render_payload(&alert);
        let blocks = payload["blocks"].as_array().unwrap();
        let fields = fields_of(&blocks[1]);
        assert_eq!(fields.len(), 1);
        assert!(fields[0]["text"].as_str().unwrap().contains("View Product"));
    }

    #[test]
    fn payload_leads_with_image_block_when_available() {
        let mut alert = base_alert();
        alert.image_url = Some("https://img.example.com/a.jpg".into());
        let payload = render_payload(&alert);
        let blocks = payload["blocks"].as_array().unwrap();
        assert_eq!(blocks[0]["type"], "image");
        assert_eq!(blocks[0]["image_url"], "https://img.example.com/a.jpg");
    }

    #[test]
    fn payload_truncates_long_description() {
        let mut alert = base_alert();
        alert.description = "x".repeat(350);
        let payload = render_payload(&alert);
        let blocks = payload["blocks"].as_array().unwrap();
        let details = blocks
            .iter()
            .find_map(|b| {
                let t = b["text"]["text"].as_str()?;
                t.contains("Details").then(|| t.to_string())
            })
            .expect("details block");
        assert!(details.ends_with("..."));
        assert!(!details.contains(&"x".repeat(301)));
    }
}
