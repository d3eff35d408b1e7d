//! jobacquire - job listing acquisition and catalog system.
//!
//! Acquires listings from actuarylist.com through a tiered extraction
//! pipeline (rendered page, static fetch, structural heuristics, pattern
//! matching, synthetic fallback) and ingests them into a local catalog.

// Model types use `from_str` methods that return Option<Self> (infallible
// parse), not Result<Self, Error> as std::str::FromStr requires.
#![allow(clippy::should_implement_trait)]

pub mod cli;
pub mod config;
pub mod models;
pub mod repository;
pub mod schema;
pub mod scrapers;
pub mod services;
