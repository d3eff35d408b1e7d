//! Duplicate-safe batch ingestion.
//!
//! Each record is checked against storage by its `(title, company)`
//! natural key and against the records already staged in the current
//! batch, then all staged inserts commit in a single transaction. A
//! failed commit rolls back the whole batch and surfaces the error; a
//! re-run of the same batch is therefore always safe.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::models::NewJob;
use crate::repository::{DieselError, JobRepository};

/// Result of one ingestion batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOutcome {
    /// Rows inserted by the batch commit.
    pub saved: usize,
    /// Records skipped as duplicates (stored or within the batch).
    pub skipped: usize,
}

/// Ingestion service over the job repository.
#[derive(Clone)]
pub struct IngestionService {
    repo: JobRepository,
}

impl IngestionService {
    pub fn new(repo: JobRepository) -> Self {
        Self { repo }
    }

    /// Ingest a batch of normalized records.
    ///
    /// Insert-or-skip only: existing rows are never updated. The batch is
    /// staged in full before one atomic commit.
    pub async fn ingest(&self, records: &[NewJob]) -> Result<IngestOutcome, DieselError> {
        let mut staged: Vec<NewJob> = Vec::new();
        let mut staged_keys: HashSet<(String, String)> = HashSet::new();
        let mut skipped = 0;

        for record in records {
            let key = (record.title.clone(), record.company.clone());

            if staged_keys.contains(&key) {
                debug!(
                    "Skipping within-batch duplicate: {} at {}",
                    record.title, record.company
                );
                skipped += 1;
                continue;
            }

            if self
                .repo
                .find_by_title_and_company(&record.title, &record.company)
                .await?
                .is_some()
            {
                debug!(
                    "Skipping stored duplicate: {} at {}",
                    record.title, record.company
                );
                skipped += 1;
                continue;
            }

            staged_keys.insert(key);
            staged.push(record.clone());
        }

        let saved = self.repo.insert_batch(&staged).await?;
        info!("Ingestion commit: {} saved, {} skipped", saved, skipped);

        Ok(IngestOutcome { saved, skipped })
    }
}
