//! Runtime event stream payloads.

use crate::types::{PlaceId, ReportId, Revision, VoteState};

/// Events emitted from the single-writer runtime loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    /// A new report was submitted.
    ReportSubmitted {
        /// Place the report belongs to.
        place_id: PlaceId,
        /// New report id.
        report_id: ReportId,
    },
    /// The viewer's vote on a report changed.
    VoteChanged {
        /// Place the report belongs to.
        place_id: PlaceId,
        /// Voted report id.
        report_id: ReportId,
        /// Vote state after the change.
        vote_state: VoteState,
    },
    /// The stored snapshot covers at least this revision.
    DurableUpTo {
        /// Highest revision known durable.
        revision: Revision,
    },
}
