//! Persistence Integration Tests
//!
//! End-to-end tests against file-backed databases:
//! - lifecycle: data, ids and settings survive close and reopen
//! - scans: batched scans over larger tables
//! - corruption: damaged files are reported as storage corruption

#[path = "../common/mod.rs"]
mod common;

mod corruption;
mod lifecycle;
mod scans;
