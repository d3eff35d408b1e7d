//! Diesel-based job repository for SQLite.
//!
//! Duplicate detection during ingestion queries the `(title, company)`
//! natural key here; the batch insert runs inside a single transaction so
//! a failed commit leaves no partial state behind.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl, SimpleAsyncConnection};

use super::models::{JobRecord, NewJobRecord};
use super::parse_datetime;
use super::pool::{AsyncSqlitePool, DieselError};
use crate::models::{Job, JobType, NewJob};
use crate::schema::jobs;

/// SQL used to bootstrap the jobs table and its lookup index.
///
/// The natural key is intentionally a plain index rather than a unique
/// constraint; duplicate detection happens at pre-commit time.
const BOOTSTRAP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS jobs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    company TEXT NOT NULL,
    location TEXT NOT NULL,
    posting_date TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    job_type TEXT NOT NULL DEFAULT 'Full-time',
    tags TEXT NOT NULL DEFAULT '',
    description TEXT,
    salary_range TEXT,
    experience_level TEXT,
    remote_allowed INTEGER NOT NULL DEFAULT 0,
    source_url TEXT,
    is_scraped INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_jobs_title_company ON jobs (title, company);
CREATE INDEX IF NOT EXISTS idx_jobs_posting_date ON jobs (posting_date);
"#;

/// Convert a database record to a domain model.
impl From<JobRecord> for Job {
    fn from(record: JobRecord) -> Self {
        Job {
            id: record.id,
            title: record.title,
            company: record.company,
            location: record.location,
            posting_date: parse_datetime(&record.posting_date),
            created_at: parse_datetime(&record.created_at),
            updated_at: parse_datetime(&record.updated_at),
            job_type: JobType::from_str(&record.job_type).unwrap_or(JobType::FullTime),
            tags: Job::tags_from_column(&record.tags),
            description: record.description,
            salary_range: record.salary_range,
            experience_level: record.experience_level,
            remote_allowed: record.remote_allowed != 0,
            source_url: record.source_url,
            is_scraped: record.is_scraped != 0,
        }
    }
}

impl NewJobRecord {
    /// Build an insertable row from a normalized job.
    fn from_new_job(job: &NewJob, now_rfc3339: &str) -> Self {
        Self {
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            posting_date: job.posting_date.to_rfc3339(),
            created_at: now_rfc3339.to_string(),
            updated_at: now_rfc3339.to_string(),
            job_type: job.job_type.as_str().to_string(),
            tags: job.tags_string(),
            description: Some(job.description.clone()),
            salary_range: if job.salary_range.is_empty() {
                None
            } else {
                Some(job.salary_range.clone())
            },
            experience_level: job.experience_level.clone(),
            remote_allowed: i32::from(job.remote_allowed),
            source_url: Some(job.source_url.clone()),
            is_scraped: i32::from(job.is_scraped),
        }
    }
}

/// Catalog statistics for status displays.
#[derive(Debug, Clone)]
pub struct CatalogStats {
    pub total: i64,
    pub posted_today: i64,
    pub companies: usize,
}

/// Diesel-based job repository with compile-time query checking.
#[derive(Clone)]
pub struct JobRepository {
    pool: AsyncSqlitePool,
}

impl JobRepository {
    /// Create a new job repository with an existing pool.
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Create the jobs table and indexes if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        conn.batch_execute(BOOTSTRAP_SQL).await?;
        Ok(())
    }

    /// Look up a job by its natural key.
    pub async fn find_by_title_and_company(
        &self,
        title: &str,
        company: &str,
    ) -> Result<Option<Job>, DieselError> {
        let mut conn = self.pool.get().await?;

        jobs::table
            .filter(jobs::title.eq(title))
            .filter(jobs::company.eq(company))
            .first::<JobRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Job::from))
    }

    /// Insert a batch of jobs inside one transaction.
    ///
    /// Returns the number of rows inserted. Any failure rolls the whole
    /// batch back.
    pub async fn insert_batch(&self, new_jobs: &[NewJob]) -> Result<usize, DieselError> {
        if new_jobs.is_empty() {
            return Ok(0);
        }

        let mut conn = self.pool.get().await?;
        let now = Utc::now().to_rfc3339();
        let rows: Vec<NewJobRecord> = new_jobs
            .iter()
            .map(|job| NewJobRecord::from_new_job(job, &now))
            .collect();

        conn.transaction(move |conn| {
            Box::pin(async move {
                let mut inserted = 0;
                for row in &rows {
                    inserted += diesel::insert_into(jobs::table)
                        .values(row)
                        .execute(conn)
                        .await?;
                }
                Ok(inserted)
            })
        })
        .await
    }

    /// List jobs ordered by posting date, newest first.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<Job>, DieselError> {
        let mut conn = self.pool.get().await?;

        jobs::table
            .order(jobs::posting_date.desc())
            .limit(limit)
            .load::<JobRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(Job::from).collect())
    }

    /// Total number of catalog rows.
    pub async fn count(&self) -> Result<i64, DieselError> {
        let mut conn = self.pool.get().await?;

        use diesel::dsl::count_star;
        jobs::table.select(count_star()).first(&mut conn).await
    }

    /// Catalog statistics: total rows, rows posted today, distinct companies.
    pub async fn stats(&self) -> Result<CatalogStats, DieselError> {
        let mut conn = self.pool.get().await?;

        use diesel::dsl::count_star;
        let total: i64 = jobs::table.select(count_star()).first(&mut conn).await?;

        let midnight = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().to_rfc3339())
            .unwrap_or_default();
        let posted_today: i64 = jobs::table
            .filter(jobs::posting_date.ge(midnight))
            .select(count_star())
            .first(&mut conn)
            .await?;

        let companies: Vec<String> = jobs::table
            .select(jobs::company)
            .distinct()
            .load(&mut conn)
            .await?;

        Ok(CatalogStats {
            total,
            posted_today,
            companies: companies.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::tempdir;

    async fn setup_test_repo() -> (JobRepository, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let pool = AsyncSqlitePool::from_path(&db_path);
        let repo = JobRepository::new(pool);
        repo.ensure_schema().await.unwrap();
        (repo, dir)
    }

    fn sample_job(title: &str, company: &str) -> NewJob {
        NewJob {
            title: title.to_string(),
            company: company.to_string(),
            location: "Hartford, CT".to_string(),
            posting_date: Utc::now() - Duration::days(1),
            job_type: JobType::FullTime,
            tags: vec!["Pricing".to_string(), "FCAS".to_string()],
            description: "Lead pricing initiatives.".to_string(),
            salary_range: String::new(),
            experience_level: Some("Senior".to_string()),
            remote_allowed: true,
            source_url: "https://www.actuarylist.com/jobs/1".to_string(),
            is_scraped: true,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_by_natural_key() {
        let (repo, _dir) = setup_test_repo().await;

        let job = sample_job("Senior Pricing Actuary", "Travelers Insurance");
        let inserted = repo.insert_batch(&[job]).await.unwrap();
        assert_eq!(inserted, 1);

        let found = repo
            .find_by_title_and_company("Senior Pricing Actuary", "Travelers Insurance")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.company, "Travelers Insurance");
        assert_eq!(found.tags, vec!["Pricing", "FCAS"]);
        assert!(found.is_scraped);
        assert!(found.remote_allowed);

        let missing = repo
            .find_by_title_and_company("Senior Pricing Actuary", "Acme")
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_insert_batch_empty_is_noop() {
        let (repo, _dir) = setup_test_repo().await;
        assert_eq!(repo.insert_batch(&[]).await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_recent_orders_by_posting_date() {
        let (repo, _dir) = setup_test_repo().await;

        let mut older = sample_job("Actuarial Analyst", "Aetna");
        older.posting_date = Utc::now() - Duration::days(10);
        let newer = sample_job("Health Actuary", "Kaiser Permanente");

        repo.insert_batch(&[older, newer]).await.unwrap();

        let listed = repo.list_recent(10).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].title, "Health Actuary");
        assert_eq!(listed[1].title, "Actuarial Analyst");
    }

    #[tokio::test]
    async fn test_stats_counts_distinct_companies() {
        let (repo, _dir) = setup_test_repo().await;

        repo.insert_batch(&[
            sample_job("Actuarial Analyst", "Aetna"),
            sample_job("Senior Actuarial Analyst", "Aetna"),
            sample_job("Health Actuary", "Kaiser Permanente"),
        ])
        .await
        .unwrap();

        let stats = repo.stats().await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.companies, 2);
    }
}
