// src/notify/mod.rs
pub mod slack;

use anyhow::Result;

use crate::feed::Alert;

/// Delivery target for alerts. Implementations report failure as `Err`;
/// nothing past this boundary panics on transport or remote-rejection
/// errors.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, alert: &Alert) -> Result<()>;
}

/// Rendered descriptions are capped at this many characters.
pub const DESCRIPTION_MAX_CHARS: usize = 300;

/// Trim a description for the outbound message. Returns `None` for
/// whitespace-only input; longer texts are cut at the cap with an ellipsis
/// marker appended.
pub fn truncate_description(desc: &str) -> Option<String> {
    let clean = desc.trim();
    if clean.is_empty() {
        return None;
    }
    if clean.chars().count() > DESCRIPTION_MAX_CHARS {
        let mut cut: String = clean.chars().take(DESCRIPTION_MAX_CHARS).collect();
        cut.push_str("...");
        Some(cut)
    } else {
        Some(clean.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_description_passes_through() {
        let d = "a".repeat(300);
        assert_eq!(truncate_description(&d).unwrap(), d);
    }

    #[test]
    fn long_description_is_cut_with_ellipsis() {
        let d = "b".repeat(350);
        let out = truncate_description(&d).unwrap();
        assert_eq!(out.chars().count(), 303);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn blank_description_is_dropped() {
        assert_eq!(truncate_description("   \n "), None);
    }
}
