//! Sends the fixed sample notification to the configured Slack webhook.
//! Handy for checking the webhook wiring without a running server.

use keepa_alert_relay::notify::slack::SlackNotifier;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let Ok(url) = std::env::var("SLACK_WEBHOOK_URL") else {
        eprintln!("SLACK_WEBHOOK_URL not set");
        std::process::exit(1);
    };

    let notifier = SlackNotifier::new(url);
    match notifier.send_test_notification().await {
        Ok(()) => println!("notify-demo done"),
        Err(e) => {
            eprintln!("test notification failed: {e:#}");
            std::process::exit(1);
        }
    }
}
