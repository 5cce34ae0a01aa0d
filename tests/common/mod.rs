//! Shared fixtures for ReportLens integration tests
//!
//! Builders for layout results plus helpers that write
//! layout JSON to a temporary directory for file-based ingestion.

#![allow(dead_code, unused_imports)]

pub mod fixtures;

pub use fixtures::{layout_with_pages, layout_with_table, write_layout, AnnualReport};
