//! Job posting models.
//!
//! A `NewJob` is the normalized output of the acquisition pipeline; a
//! `Job` is a persisted catalog row. The `(title, company)` pair is the
//! natural key used to detect duplicate listings during ingestion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Employment type of a listing.
///
/// `System` marks diagnostic records emitted by the pipeline itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    FullTime,
    PartTime,
    Internship,
    Contract,
    System,
}

/// Ordered keyword table for job-type inference. First match wins.
const JOB_TYPE_KEYWORDS: &[(&str, JobType)] = &[
    ("intern", JobType::Internship),
    ("contract", JobType::Contract),
    ("consulting", JobType::Contract),
    ("part-time", JobType::PartTime),
    ("part time", JobType::PartTime),
];

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullTime => "Full-time",
            Self::PartTime => "Part-time",
            Self::Internship => "Internship",
            Self::Contract => "Contract",
            Self::System => "System",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Full-time" => Some(Self::FullTime),
            "Part-time" => Some(Self::PartTime),
            "Internship" => Some(Self::Internship),
            "Contract" => Some(Self::Contract),
            "System" => Some(Self::System),
            _ => None,
        }
    }

    /// Infer a job type from listing text. Defaults to full-time.
    pub fn infer(text: &str) -> Self {
        let lower = text.to_lowercase();
        for (keyword, job_type) in JOB_TYPE_KEYWORDS {
            if lower.contains(keyword) {
                return *job_type;
            }
        }
        Self::FullTime
    }
}

/// A normalized job record ready for ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub location: String,
    pub posting_date: DateTime<Utc>,
    pub job_type: JobType,
    /// Short tag strings, at most 5, insertion order preserved.
    pub tags: Vec<String>,
    pub description: String,
    /// Empty when unknown.
    pub salary_range: String,
    pub experience_level: Option<String>,
    pub remote_allowed: bool,
    /// Absolute URL of the listing.
    pub source_url: String,
    /// True for every record produced by the acquisition pipeline.
    pub is_scraped: bool,
}

impl NewJob {
    /// The natural key used for duplicate detection.
    pub fn natural_key(&self) -> (&str, &str) {
        (&self.title, &self.company)
    }

    /// Tags as the comma-separated string stored in the catalog.
    pub fn tags_string(&self) -> String {
        self.tags.join(", ")
    }
}

/// A persisted job posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub company: String,
    pub location: String,
    pub posting_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub job_type: JobType,
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub salary_range: Option<String>,
    pub experience_level: Option<String>,
    pub remote_allowed: bool,
    pub source_url: Option<String>,
    pub is_scraped: bool,
}

impl Job {
    /// Split a stored comma-separated tags column into a list.
    pub fn tags_from_column(tags: &str) -> Vec<String> {
        tags.split(',')
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    }
}
