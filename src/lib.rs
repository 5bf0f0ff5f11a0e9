//! Crowd-sourced busyness reports with vote toggling and key-value persistence.
//!
//! # Examples
//!
//! In-memory usage with [`core::ledger::ReportLedger`]:
//! ```
//! use busynow::{
//!     core::ledger::ReportLedger,
//!     report::ReportDraft,
//!     types::{BusynessLevel, VoteDirection, VoteState},
//! };
//!
//! let mut ledger = ReportLedger::new();
//! let (report, _op) = ledger.submit_at(
//!     ReportDraft::new("2", BusynessLevel::Busy).with_wait(15),
//!     1_000,
//! );
//! assert_eq!(report.id, 1);
//!
//! let (voted, _op) = ledger
//!     .toggle_vote("2", report.id, VoteDirection::Up)
//!     .expect("vote");
//! assert_eq!(voted.vote_state, VoteState::Up);
//! assert_eq!(ledger.reports_for_place("2", 2_000).len(), 1);
//! ```
//!
//! Runtime usage with SQLite persistence:
//! ```no_run
//! use busynow::{
//!     config::{LedgerConfig, RuntimeConfig},
//!     core::ledger::ReportLedger,
//!     persist::sqlite::SqliteKv,
//!     report::ReportDraft,
//!     runtime::handle::spawn_ledger,
//!     types::BusynessLevel,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let kv = SqliteKv::open("busynow.db").expect("open sqlite");
//! let ledger = ReportLedger::load(&kv, LedgerConfig::default()).expect("load");
//! let handle = spawn_ledger(ledger, Some(Box::new(kv)), RuntimeConfig::default());
//! let _report = handle
//!     .submit(ReportDraft::new("1", BusynessLevel::Quiet).with_note("Plenty of seats"))
//!     .await
//!     .expect("submit");
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```

/// Layered configuration with defaults.
pub mod config;
/// Core in-memory ledger, favorites and profile.
pub mod core;
/// Badges and human-readable formatting.
pub mod display;
/// Geographic distance helpers.
pub mod geo;
/// Mutation receipts.
pub mod op;
/// Key-value persistence abstraction and implementations.
pub mod persist;
/// Place catalogue and nearby search.
pub mod places;
/// Report records, drafts and vote transitions.
pub mod report;
/// Single-writer runtime handle and events.
pub mod runtime;
/// Shared primitive types and enums.
pub mod types;
