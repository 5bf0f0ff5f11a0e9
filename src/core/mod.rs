//! In-memory authoritative client state.

/// Favorite places set.
pub mod favorites;
/// Report ledger with vote toggling and windowed reads.
pub mod ledger;
/// Local user profile and contribution counters.
pub mod profile;
