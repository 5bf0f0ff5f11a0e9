use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    config::LedgerConfig,
    op::{Op, StoredOp},
    persist::{KvStore, LEDGER_KEY, PersistResult, load_json, save_json},
    report::{Report, ReportDraft},
    types::{PlaceId, ReportId, Revision, VoteDirection},
};

/// Failures of ledger lookups and snapshot restores.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// No bucket exists for the place.
    #[error("no reports for place {0}")]
    MissingPlace(PlaceId),
    /// The place exists but holds no report with this id.
    #[error("report {report_id} not found for place {place_id}")]
    MissingReport {
        /// Looked-up place.
        place_id: PlaceId,
        /// Looked-up report.
        report_id: ReportId,
    },
    /// A restored snapshot leaves no id to allocate.
    #[error("report id space exhausted (highest stored id {max_id})")]
    IdSpaceExhausted {
        /// Highest id found in the snapshot.
        max_id: ReportId,
    },
}

/// Persisted form of the ledger: place id to newest-first reports.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerSnapshotV1 {
    /// Next id to allocate; derived from stored ids when absent.
    #[serde(default)]
    pub next_report_id: ReportId,
    /// Reports per place, newest first.
    #[serde(default)]
    pub reports: BTreeMap<PlaceId, Vec<Report>>,
}

/// Authoritative report collection grouped by place.
///
/// Reads filter by the configured window at call time; nothing is ever evicted.
#[derive(Debug, Default)]
pub struct ReportLedger {
    buckets: HashMap<PlaceId, Vec<Report>>,
    config: LedgerConfig,
    next_report_id: ReportId,
    revision: Revision,
}

impl ReportLedger {
    /// Empty ledger with default windows.
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    /// Empty ledger with the given windows.
    pub fn with_config(config: LedgerConfig) -> Self {
        Self {
            config,
            next_report_id: 1,
            ..Self::default()
        }
    }

    /// Rebuilds a ledger from a snapshot.
    ///
    /// `u64::MAX` is never allocated, so a snapshot whose next id would reach it
    /// is rejected with [`LedgerError::IdSpaceExhausted`].
    pub fn from_snapshot(
        snapshot: LedgerSnapshotV1,
        config: LedgerConfig,
    ) -> Result<Self, LedgerError> {
        let mut ledger = Self::with_config(config);

        let max_id = snapshot
            .reports
            .values()
            .flatten()
            .map(|r| r.id)
            .max()
            .unwrap_or(0);
        let next_report_id = max_id
            .checked_add(1)
            .map(|derived| derived.max(snapshot.next_report_id))
            .filter(|next| *next < ReportId::MAX)
            .ok_or(LedgerError::IdSpaceExhausted { max_id })?;
        ledger.next_report_id = next_report_id;

        for (place_id, mut reports) in snapshot.reports {
            // Reports filed under the wrong key are re-homed to their own place.
            for report in &mut reports {
                if report.place_id != place_id {
                    report.place_id = place_id.clone();
                }
            }
            ledger.buckets.insert(place_id, reports);
        }

        Ok(ledger)
    }

    /// Captures every stored report, expired ones included.
    pub fn export_snapshot(&self) -> LedgerSnapshotV1 {
        LedgerSnapshotV1 {
            next_report_id: self.next_report_id,
            reports: self
                .buckets
                .iter()
                .map(|(place_id, reports)| (place_id.clone(), reports.clone()))
                .collect(),
        }
    }

    /// Restores the ledger from `kv`, or starts empty when nothing was saved.
    pub fn load(kv: &dyn KvStore, config: LedgerConfig) -> PersistResult<Self> {
        let ledger = match load_json::<LedgerSnapshotV1>(kv, LEDGER_KEY)? {
            Some(snapshot) => Self::from_snapshot(snapshot, config)?,
            None => Self::with_config(config),
        };
        info!(
            places = ledger.buckets.len(),
            reports = ledger.len(),
            "Loaded report ledger"
        );
        Ok(ledger)
    }

    /// Writes the full ledger to `kv`.
    pub fn save(&self, kv: &mut dyn KvStore) -> PersistResult<()> {
        save_json(kv, LEDGER_KEY, &self.export_snapshot())
    }

    /// Active window settings.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Files a report stamped with the current wall-clock time.
    pub fn submit(&mut self, draft: ReportDraft) -> (Report, StoredOp) {
        self.submit_at(draft, now_ms())
    }

    /// Files a report with an explicit creation time.
    ///
    /// The report gets the next id, zero votes and no vote state, and is
    /// prepended so its place stays newest first.
    pub fn submit_at(&mut self, draft: ReportDraft, created_at_ms: u64) -> (Report, StoredOp) {
        let id = self.next_report_id;
        self.next_report_id = id.saturating_add(1);

        let report = Report {
            id,
            place_id: draft.place_id,
            author_id: draft.author.id,
            author_name: draft.author.name,
            busyness: draft.busyness,
            wait_minutes: draft.wait_minutes,
            note: draft.note,
            photo_ref: draft.photo_ref,
            created_at_ms,
            upvotes: 0,
            downvotes: 0,
            vote_state: Default::default(),
        };

        self.buckets
            .entry(report.place_id.clone())
            .or_default()
            .insert(0, report.clone());

        let stored = self.record(Op::Submit {
            report: report.clone(),
        });
        debug!(
            place_id = %report.place_id,
            report_id = report.id,
            revision = stored.revision,
            "Submitted report"
        );
        (report, stored)
    }

    /// Applies one vote press to a stored report.
    ///
    /// Pressing the active direction clears it; pressing the other direction
    /// moves the vote. Counters never go below zero. Fails without touching
    /// the ledger when the place or report is unknown.
    pub fn toggle_vote(
        &mut self,
        place_id: &str,
        report_id: ReportId,
        direction: VoteDirection,
    ) -> Result<(Report, StoredOp), LedgerError> {
        let bucket = self
            .buckets
            .get_mut(place_id)
            .ok_or_else(|| LedgerError::MissingPlace(place_id.to_string()))?;
        let report = bucket
            .iter_mut()
            .find(|r| r.id == report_id)
            .ok_or_else(|| LedgerError::MissingReport {
                place_id: place_id.to_string(),
                report_id,
            })?;

        let prev = report.apply_vote(direction);
        let updated = report.clone();

        let stored = self.record(Op::ToggleVote {
            place_id: place_id.to_string(),
            report_id,
            direction,
            prev,
            next: updated.vote_state,
        });
        debug!(
            place_id,
            report_id,
            revision = stored.revision,
            vote_state = ?updated.vote_state,
            "Toggled vote"
        );
        Ok((updated, stored))
    }

    /// Reports no older than the configured window, newest first.
    pub fn reports_for_place(&self, place_id: &str, now_ms: u64) -> Vec<&Report> {
        let window_ms = self.config.window_ms();
        self.buckets
            .get(place_id)
            .into_iter()
            .flat_map(|reports| reports.iter())
            .filter(|r| r.age_ms(now_ms) <= window_ms)
            .collect()
    }

    /// Owned copy of [`Self::reports_for_place`].
    pub fn reports_for_place_cloned(&self, place_id: &str, now_ms: u64) -> Vec<Report> {
        self.reports_for_place(place_id, now_ms)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Newest report inside the window.
    pub fn latest_for_place(&self, place_id: &str, now_ms: u64) -> Option<&Report> {
        self.reports_for_place(place_id, now_ms).into_iter().next()
    }

    /// Looks a report up regardless of age.
    pub fn get(&self, place_id: &str, report_id: ReportId) -> Option<&Report> {
        self.buckets
            .get(place_id)
            .and_then(|reports| reports.iter().find(|r| r.id == report_id))
    }

    /// Every stored report for `place_id`, expired ones included.
    pub fn all_for_place(&self, place_id: &str) -> &[Report] {
        self.buckets
            .get(place_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Places with at least one stored report, in no particular order.
    pub fn place_ids(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Total stored reports across all places.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count of mutations applied since construction.
    pub fn revision(&self) -> Revision {
        self.revision
    }

    fn record(&mut self, op: Op) -> StoredOp {
        self.revision += 1;
        StoredOp {
            revision: self.revision,
            ts_ms: now_ms(),
            op,
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
