// src/services/mod.rs

pub mod ingest_service;

pub use ingest_service::{IngestOutcome, IngestService};
