//! Diesel ORM models for the jobs table.

use diesel::prelude::*;

use crate::schema;

/// Job record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::jobs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct JobRecord {
    pub id: i32,
    pub title: String,
    pub company: String,
    pub location: String,
    pub posting_date: String,
    pub created_at: String,
    pub updated_at: String,
    pub job_type: String,
    pub tags: String,
    pub description: Option<String>,
    pub salary_range: Option<String>,
    pub experience_level: Option<String>,
    pub remote_allowed: i32,
    pub source_url: Option<String>,
    pub is_scraped: i32,
}

/// New job row for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::jobs)]
pub struct NewJobRecord {
    pub title: String,
    pub company: String,
    pub location: String,
    pub posting_date: String,
    pub created_at: String,
    pub updated_at: String,
    pub job_type: String,
    pub tags: String,
    pub description: Option<String>,
    pub salary_range: Option<String>,
    pub experience_level: Option<String>,
    pub remote_allowed: i32,
    pub source_url: Option<String>,
    pub is_scraped: i32,
}
