//! Normalization of raw extractions into catalog records.
//!
//! The normalizer never errors: missing fields are defaulted, unparseable
//! dates resolve to the capture time, and oversized strings are truncated
//! to their column widths. A raw record is rejected only when it carries
//! neither a usable title nor a usable company.

use chrono::{DateTime, Duration, Utc};
use regex::Regex;

use super::extract::resolve_url;
use super::RawJob;
use crate::models::{JobType, NewJob};

/// Column widths the catalog schema enforces.
pub const TITLE_MAX: usize = 200;
pub const COMPANY_MAX: usize = 200;
pub const LOCATION_MAX: usize = 200;
pub const SALARY_MAX: usize = 100;
pub const EXPERIENCE_MAX: usize = 50;
pub const SOURCE_URL_MAX: usize = 500;

/// Maximum number of tags kept per record.
pub const TAG_LIMIT: usize = 5;

/// Maximum length of a single tag.
const TAG_MAX: usize = 50;

/// Controlled tag vocabulary, in derivation order.
pub const TAG_VOCABULARY: &[&str] = &[
    "Life",
    "Health",
    "Property",
    "Casualty",
    "Pension",
    "Annuity",
    "Pricing",
    "Reserving",
    "Modeling",
    "Valuation",
    "Risk",
    "Analytics",
    "Python",
    "R",
    "SQL",
    "Excel",
    "SAS",
    "Prophet",
    "AXIS",
    "ASA",
    "FSA",
    "ACAS",
    "FCAS",
    "Actuary",
    "Analyst",
    "Senior",
    "Junior",
];

/// Relative-date units as minutes, in parse order. Months approximate to
/// 30 days.
const UNIT_MINUTES: &[(&str, i64)] = &[
    ("hour", 60),
    ("day", 1_440),
    ("week", 10_080),
    ("month", 43_200),
];

/// Right-truncate a string to at most `max` characters.
pub fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Parse a posting-date phrase, defaulting to the capture time.
///
/// Handles "today", "yesterday", and "N hours/days/weeks/months ago";
/// anything else resolves to `captured_at`.
pub fn parse_posting_date(text: &str, captured_at: DateTime<Utc>) -> DateTime<Utc> {
    parse_relative_date(text, captured_at).unwrap_or(captured_at)
}

fn parse_relative_date(text: &str, captured_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }

    // "yesterday" contains "day", so the named phrases go first
    if text.contains("today") || text.contains("just now") {
        return Some(captured_at);
    }
    if text.contains("yesterday") {
        return Some(captured_at - Duration::days(1));
    }

    for (unit, minutes) in UNIT_MINUTES {
        let Ok(re) = Regex::new(&format!(r"(\d+)\s*{}", unit)) else {
            continue;
        };
        if let Some(captures) = re.captures(&text) {
            if let Ok(n) = captures[1].parse::<i64>() {
                return Some(captured_at - Duration::minutes(n * minutes));
            }
        }
    }

    None
}

/// Derive tags from listing text against the controlled vocabulary.
///
/// Tags come out in vocabulary order, capped at `TAG_LIMIT`, without
/// duplicates. Short vocabulary entries ("R", "SQL") match whole word
/// tokens only.
pub fn derive_tags(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    TAG_VOCABULARY
        .iter()
        .filter(|keyword| {
            let kw = keyword.to_lowercase();
            if kw.len() <= 3 {
                tokens.contains(&kw.as_str())
            } else {
                lower.contains(&kw)
            }
        })
        .take(TAG_LIMIT)
        .map(|keyword| keyword.to_string())
        .collect()
}

/// Clean explicit tags from an extractor: trim, drop empties and
/// duplicates, keep insertion order, cap count and length.
fn sanitize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || tag.chars().count() > TAG_MAX {
            continue;
        }
        if seen.iter().any(|s: &String| s == tag) {
            continue;
        }
        seen.push(tag.to_string());
        if seen.len() >= TAG_LIMIT {
            break;
        }
    }
    seen
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normalize a raw extraction into a catalog record.
///
/// Returns `None` only when both title and company are absent.
pub fn normalize(raw: RawJob, base_url: &str, captured_at: DateTime<Utc>) -> Option<NewJob> {
    let title = non_blank(raw.title);
    let company = non_blank(raw.company);
    if title.is_none() && company.is_none() {
        return None;
    }

    let title = truncate(&title.unwrap_or_else(|| "Unknown Title".to_string()), TITLE_MAX);
    let company = truncate(
        &company.unwrap_or_else(|| "Unknown Company".to_string()),
        COMPANY_MAX,
    );
    let location = truncate(
        &non_blank(raw.location).unwrap_or_else(|| "Remote".to_string()),
        LOCATION_MAX,
    );

    let posting_date = raw.posting_date.unwrap_or_else(|| {
        raw.posted
            .as_deref()
            .map(|text| parse_posting_date(text, captured_at))
            .unwrap_or(captured_at)
    });

    let description = non_blank(raw.description)
        .unwrap_or_else(|| "Job scraped from ActuaryList.com".to_string());

    let job_type = raw
        .job_type
        .as_deref()
        .and_then(JobType::from_str)
        .unwrap_or_else(|| JobType::infer(&format!("{} {}", title, description)));

    let tags = if raw.tags.is_empty() {
        derive_tags(&format!("{} {}", title, company))
    } else {
        sanitize_tags(raw.tags)
    };

    let remote_allowed = raw
        .remote_allowed
        .unwrap_or_else(|| location.to_lowercase().contains("remote"));

    let source_url = truncate(
        &non_blank(raw.source_url)
            .map(|u| resolve_url(base_url, &u))
            .unwrap_or_else(|| base_url.to_string()),
        SOURCE_URL_MAX,
    );

    Some(NewJob {
        title,
        company,
        location,
        posting_date,
        job_type,
        tags,
        description,
        salary_range: truncate(&raw.salary_range.unwrap_or_default(), SALARY_MAX),
        experience_level: non_blank(raw.experience_level)
            .map(|e| truncate(&e, EXPERIENCE_MAX)),
        remote_allowed,
        source_url,
        is_scraped: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::ExtractionOrigin;

    const BASE: &str = "https://www.actuarylist.com/jobs";

    fn raw_with_identity(title: &str, company: &str) -> RawJob {
        let mut raw = RawJob::empty(ExtractionOrigin::Structural);
        raw.title = Some(title.to_string());
        raw.company = Some(company.to_string());
        raw
    }

    #[test]
    fn test_rejects_only_when_both_identity_fields_missing() {
        let empty = RawJob::empty(ExtractionOrigin::TextHeuristic);
        assert!(normalize(empty, BASE, Utc::now()).is_none());

        let mut title_only = RawJob::empty(ExtractionOrigin::TextHeuristic);
        title_only.title = Some("Actuarial Analyst".to_string());
        let job = normalize(title_only, BASE, Utc::now()).unwrap();
        assert_eq!(job.company, "Unknown Company");

        let mut company_only = RawJob::empty(ExtractionOrigin::TextHeuristic);
        company_only.company = Some("Aetna".to_string());
        let job = normalize(company_only, BASE, Utc::now()).unwrap();
        assert_eq!(job.title, "Unknown Title");
    }

    #[test]
    fn test_blank_identity_counts_as_missing() {
        let mut raw = RawJob::empty(ExtractionOrigin::TextHeuristic);
        raw.title = Some("   ".to_string());
        raw.company = Some("".to_string());
        assert!(normalize(raw, BASE, Utc::now()).is_none());
    }

    #[test]
    fn test_title_truncated_to_exactly_200_chars() {
        let long_title = "a".repeat(450);
        let raw = raw_with_identity(&long_title, "Aetna");
        let job = normalize(raw, BASE, Utc::now()).unwrap();
        assert_eq!(job.title.chars().count(), 200);
        assert_eq!(job.title, long_title.chars().take(200).collect::<String>());
    }

    #[test]
    fn test_truncation_respects_multibyte_chars() {
        let long_title = "é".repeat(250);
        let raw = raw_with_identity(&long_title, "Aetna");
        let job = normalize(raw, BASE, Utc::now()).unwrap();
        assert_eq!(job.title.chars().count(), 200);
    }

    #[test]
    fn test_relative_dates() {
        let captured_at = Utc::now();

        assert_eq!(
            parse_posting_date("3 days ago", captured_at),
            captured_at - Duration::days(3)
        );
        assert_eq!(
            parse_posting_date("yesterday", captured_at),
            captured_at - Duration::days(1)
        );
        assert_eq!(
            parse_posting_date("2 weeks ago", captured_at),
            captured_at - Duration::days(14)
        );
        assert_eq!(
            parse_posting_date("5 hours ago", captured_at),
            captured_at - Duration::hours(5)
        );
        assert_eq!(
            parse_posting_date("1 month ago", captured_at),
            captured_at - Duration::days(30)
        );
        assert_eq!(parse_posting_date("today", captured_at), captured_at);
    }

    #[test]
    fn test_unparseable_date_defaults_to_capture_time() {
        let captured_at = Utc::now();
        assert_eq!(
            parse_posting_date("posted recently", captured_at),
            captured_at
        );
        assert_eq!(parse_posting_date("", captured_at), captured_at);
    }

    #[test]
    fn test_posted_text_flows_through_normalization() {
        let captured_at = Utc::now();
        let mut raw = raw_with_identity("Actuarial Analyst", "Aetna");
        raw.posted = Some("2 weeks ago".to_string());
        let job = normalize(raw, BASE, captured_at).unwrap();
        assert_eq!(job.posting_date, captured_at - Duration::days(14));
    }

    #[test]
    fn test_explicit_posting_date_wins_over_text() {
        let captured_at = Utc::now();
        let explicit = captured_at - Duration::days(99);
        let mut raw = raw_with_identity("Actuarial Analyst", "Aetna");
        raw.posting_date = Some(explicit);
        raw.posted = Some("yesterday".to_string());
        let job = normalize(raw, BASE, captured_at).unwrap();
        assert_eq!(job.posting_date, explicit);
    }

    #[test]
    fn test_tags_derived_in_vocabulary_order_capped_at_five() {
        let tags = derive_tags(
            "Senior Pricing Analyst - Life, Health, Property and Casualty modeling with Python",
        );
        assert_eq!(tags.len(), 5);
        assert_eq!(tags, vec!["Life", "Health", "Property", "Casualty", "Pricing"]);
    }

    #[test]
    fn test_short_vocabulary_entries_match_whole_tokens_only() {
        // "R" must not match the letter inside "Actuarial"
        let tags = derive_tags("Actuarial opening");
        assert!(!tags.contains(&"R".to_string()));

        let tags = derive_tags("Experience with R and SQL required");
        assert!(tags.contains(&"R".to_string()));
        assert!(tags.contains(&"SQL".to_string()));
    }

    #[test]
    fn test_explicit_tags_deduped_and_capped() {
        let mut raw = raw_with_identity("Actuarial Analyst", "Aetna");
        raw.tags = vec![
            "Life".to_string(),
            "Life".to_string(),
            " ".to_string(),
            "Pricing".to_string(),
            "Health".to_string(),
            "Pension".to_string(),
            "Annuity".to_string(),
            "Valuation".to_string(),
        ];
        let job = normalize(raw, BASE, Utc::now()).unwrap();
        assert_eq!(
            job.tags,
            vec!["Life", "Pricing", "Health", "Pension", "Annuity"]
        );
    }

    #[test]
    fn test_job_type_inferred_from_text() {
        let raw = raw_with_identity("Actuarial Intern - Summer", "Aetna");
        let job = normalize(raw, BASE, Utc::now()).unwrap();
        assert_eq!(job.job_type, JobType::Internship);

        let raw = raw_with_identity("Senior Pricing Actuary", "Aetna");
        let job = normalize(raw, BASE, Utc::now()).unwrap();
        assert_eq!(job.job_type, JobType::FullTime);
    }

    #[test]
    fn test_explicit_job_type_respected() {
        let mut raw = raw_with_identity("Contractor pool", "Aetna");
        raw.job_type = Some("System".to_string());
        let job = normalize(raw, BASE, Utc::now()).unwrap();
        assert_eq!(job.job_type, JobType::System);
    }

    #[test]
    fn test_relative_source_url_resolved_against_base() {
        let mut raw = raw_with_identity("Actuarial Analyst", "Aetna");
        raw.source_url = Some("/actuarial-jobs/analyst-aetna".to_string());
        let job = normalize(raw, BASE, Utc::now()).unwrap();
        assert_eq!(
            job.source_url,
            "https://www.actuarylist.com/actuarial-jobs/analyst-aetna"
        );
    }

    #[test]
    fn test_missing_source_url_defaults_to_base() {
        let raw = raw_with_identity("Actuarial Analyst", "Aetna");
        let job = normalize(raw, BASE, Utc::now()).unwrap();
        assert_eq!(job.source_url, BASE);
    }

    #[test]
    fn test_remote_inferred_from_location() {
        let mut raw = raw_with_identity("Actuarial Analyst", "Aetna");
        raw.location = Some("Remote".to_string());
        let job = normalize(raw, BASE, Utc::now()).unwrap();
        assert!(job.remote_allowed);

        let mut raw = raw_with_identity("Actuarial Analyst", "Aetna");
        raw.location = Some("Hartford, CT".to_string());
        let job = normalize(raw, BASE, Utc::now()).unwrap();
        assert!(!job.remote_allowed);
    }

    #[test]
    fn test_every_record_is_marked_scraped() {
        let raw = raw_with_identity("Actuarial Analyst", "Aetna");
        let job = normalize(raw, BASE, Utc::now()).unwrap();
        assert!(job.is_scraped);
    }
}
