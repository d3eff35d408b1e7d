//! Acquisition pipeline: tiered markup capture and listing extraction.
//!
//! Markup is captured by the rendering engine when one can be provisioned,
//! falling back to a plain HTTP fetch. Extraction then runs structural
//! heuristics, regex pattern matching, and finally a synthetic fallback so
//! a run always yields at least one record.

pub mod browser;
pub mod extract;
pub mod http_client;
pub mod normalize;

pub use browser::{AcquireError, BrowserFetcher, EngineOptions, RenderedPage};
pub use http_client::{FetchError, HttpClient};

use chrono::{DateTime, Utc};

/// Which extraction tier produced a raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionOrigin {
    /// A structural selector matched listing elements.
    Structural,
    /// Listing anchors on the front page.
    Anchor,
    /// Generic block elements classified by text heuristics.
    TextHeuristic,
    /// Job-title regex over full-page text.
    Pattern,
    /// Diagnostic placeholder records.
    Synthetic,
}

/// A raw extraction produced by any tier.
///
/// Every field may be absent; the normalizer fills gaps and drops
/// records with no usable identity. Raw extractions never persist beyond
/// a single pipeline run.
#[derive(Debug, Clone)]
pub struct RawJob {
    pub origin: ExtractionOrigin,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    /// Date text as found in the markup ("3 days ago", "yesterday", ...).
    pub posted: Option<String>,
    /// Explicit timestamp when the tier already knows one.
    pub posting_date: Option<DateTime<Utc>>,
    pub job_type: Option<String>,
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub salary_range: Option<String>,
    pub experience_level: Option<String>,
    pub remote_allowed: Option<bool>,
    pub source_url: Option<String>,
}

impl RawJob {
    /// An empty raw record for the given tier.
    pub fn empty(origin: ExtractionOrigin) -> Self {
        Self {
            origin,
            title: None,
            company: None,
            location: None,
            posted: None,
            posting_date: None,
            job_type: None,
            tags: Vec::new(),
            description: None,
            salary_range: None,
            experience_level: None,
            remote_allowed: None,
            source_url: None,
        }
    }
}

/// Explicit tier switches threaded through the pipeline.
///
/// Tests force individual tiers by turning the earlier ones off; there is
/// no ambient fallback state.
#[derive(Debug, Clone, Copy)]
pub struct TierPolicy {
    /// Attempt the rendering engine.
    pub browser: bool,
    /// Attempt the plain HTTP fetch when rendering fails.
    pub static_fetch: bool,
    /// Run structural/heuristic extraction.
    pub heuristic: bool,
    /// Run regex pattern extraction when heuristics yield nothing.
    pub pattern: bool,
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self {
            browser: true,
            static_fetch: true,
            heuristic: true,
            pattern: true,
        }
    }
}

impl TierPolicy {
    /// Policy that skips the rendering engine entirely.
    pub fn without_browser() -> Self {
        Self {
            browser: false,
            ..Default::default()
        }
    }
}
