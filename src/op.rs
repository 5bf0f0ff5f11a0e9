//! Mutation receipts returned by the ledger.

use serde::{Deserialize, Serialize};

use crate::{
    report::Report,
    types::{PlaceId, ReportId, Revision, VoteDirection, VoteState},
};

/// A single applied ledger mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// A report was created.
    Submit {
        /// Created record.
        report: Report,
    },
    /// A vote press was applied.
    ToggleVote {
        /// Place holding the report.
        place_id: PlaceId,
        /// Mutated report.
        report_id: ReportId,
        /// Pressed direction.
        direction: VoteDirection,
        /// Vote state before the press.
        prev: VoteState,
        /// Vote state after the press.
        next: VoteState,
    },
}

/// Revision metadata plus operation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredOp {
    /// Ledger revision reached by this mutation.
    pub revision: Revision,
    /// Wall-clock time the mutation was applied, in milliseconds.
    pub ts_ms: u64,
    /// Operation body.
    pub op: Op,
}
