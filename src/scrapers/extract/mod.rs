//! Listing extraction tiers.
//!
//! Tiers are fallbacks, not alternatives: heuristics run against whatever
//! markup was acquired, pattern matching runs only when heuristics find
//! nothing, and the synthetic tier runs only when both came up empty. The
//! result is never an empty set.

pub mod heuristic;
pub mod pattern;
pub mod synthetic;

use chrono::{DateTime, Utc};
use scraper::Html;
use tracing::debug;

use super::{RawJob, TierPolicy};

/// Resolve a path to a full URL, handling both absolute and relative paths.
pub fn resolve_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    // Use proper URL joining to handle edge cases
    if let Ok(base) = url::Url::parse(base_url) {
        if let Ok(resolved) = base.join(path) {
            return resolved.to_string();
        }
    }

    // Fallback: manual joining with proper slash handling
    let base = base_url.trim_end_matches('/');
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    format!("{}{}", base, path)
}

/// Visible text of a whole document, one segment per text node.
pub fn page_text(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Run the extraction tiers in fallback order.
///
/// `html` is `None` when both acquisition tiers failed; the synthetic
/// tier then guarantees a non-empty result on its own.
pub fn extract_jobs(
    html: Option<&str>,
    base_url: &str,
    policy: &TierPolicy,
    max_items: usize,
    captured_at: DateTime<Utc>,
) -> Vec<RawJob> {
    let mut raws = Vec::new();

    if policy.heuristic {
        if let Some(html) = html {
            raws = heuristic::extract(html, base_url, max_items, captured_at);
        }
    }

    if raws.is_empty() && policy.pattern {
        if let Some(html) = html {
            debug!("Heuristic extraction found nothing, trying pattern matching");
            raws = pattern::extract(&page_text(html), base_url, max_items, captured_at);
        }
    }

    if raws.is_empty() {
        debug!("No genuine extractions, emitting synthetic fallback records");
        raws = synthetic::generate(base_url, captured_at);
    }

    raws
}
