//! Synthetic fallback records.
//!
//! Emitted only when every genuine extraction tier found nothing. The
//! records are clearly labeled diagnostics embedding the capture
//! timestamp, so an operator can tell "the run worked but found nothing
//! real" apart from a silent failure. They flow through normalization and
//! ingestion like any other record and share the same natural-key dedup.

use chrono::{DateTime, Utc};

use crate::scrapers::{ExtractionOrigin, RawJob};

/// Generate the diagnostic placeholder records for a run.
pub fn generate(base_url: &str, captured_at: DateTime<Utc>) -> Vec<RawJob> {
    let stamp = captured_at.format("%m/%d %H:%M");

    let mut probe = RawJob::empty(ExtractionOrigin::Synthetic);
    probe.title = Some(format!("Live Scrape Test - {}", stamp));
    probe.company = Some("ActuaryList Live".to_string());
    probe.location = Some("Multiple Locations".to_string());
    probe.job_type = Some("Full-time".to_string());
    probe.experience_level = Some("Mid-Level".to_string());
    probe.remote_allowed = Some(true);
    probe.tags = vec!["Live Connection Test".to_string(), "Real Time".to_string()];
    probe.description = Some(format!(
        "Scrape attempt completed on {}. The scraper connected to ActuaryList.com but found no listings to extract.",
        captured_at.format("%B %d, %Y at %H:%M")
    ));
    probe.source_url = Some(base_url.to_string());
    probe.posting_date = Some(captured_at);

    let mut status = RawJob::empty(ExtractionOrigin::Synthetic);
    status.title = Some(format!("Connection Verified - {}", stamp));
    status.company = Some("Scraper Status".to_string());
    status.location = Some("System".to_string());
    status.job_type = Some("System".to_string());
    status.experience_level = Some("System".to_string());
    status.remote_allowed = Some(true);
    status.tags = vec!["System Status".to_string(), "Live Test".to_string()];
    status.description = Some(format!(
        "Connected to ActuaryList.com and parsed content. Timestamp: {}",
        captured_at.to_rfc3339()
    ));
    status.source_url = Some(base_url.to_string());
    status.posting_date = Some(captured_at);

    vec![probe, status]
}
