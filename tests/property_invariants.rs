use proptest::prelude::*;

use busynow::{
    core::ledger::{LedgerError, ReportLedger},
    report::{Report, ReportDraft},
    types::{BusynessLevel, ReportId, VoteDirection, VoteState},
};

const T0: u64 = 1_700_000_000_000;

#[derive(Debug, Clone)]
enum Action {
    Submit { place: u8, offset_s: u16 },
    Vote { target: u8, up: bool },
    VoteMissing { place: u8 },
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0u8..4, 0u16..3600).prop_map(|(place, offset_s)| Action::Submit { place, offset_s }),
        (0u8..64, any::<bool>()).prop_map(|(target, up)| Action::Vote { target, up }),
        (0u8..4).prop_map(|place| Action::VoteMissing { place }),
    ]
}

fn all_reports(ledger: &ReportLedger) -> Vec<Report> {
    let mut out: Vec<Report> = ledger
        .place_ids()
        .flat_map(|p| ledger.all_for_place(p).iter().cloned())
        .collect();
    out.sort_by_key(|r| r.id);
    out
}

fn expected_state(prev: VoteState, up: bool) -> VoteState {
    match (prev, up) {
        (VoteState::Up, true) | (VoteState::Down, false) => VoteState::None,
        (_, true) => VoteState::Up,
        (_, false) => VoteState::Down,
    }
}

proptest! {
    #[test]
    fn random_sequences_keep_counters_consistent(actions in prop::collection::vec(action_strategy(), 1..200)) {
        let mut ledger = ReportLedger::new();
        let mut submitted: Vec<(String, ReportId)> = Vec::new();

        for action in actions {
            match action {
                Action::Submit { place, offset_s } => {
                    let place_id = place.to_string();
                    let (r, _) = ledger.submit_at(
                        ReportDraft::new(place_id.clone(), BusynessLevel::Moderate),
                        T0 + u64::from(offset_s) * 1000,
                    );
                    submitted.push((place_id, r.id));
                }
                Action::Vote { target, up } => {
                    if submitted.is_empty() {
                        continue;
                    }
                    let (place_id, id) = submitted[usize::from(target) % submitted.len()].clone();
                    let prev = ledger.get(&place_id, id).map(|r| r.vote_state).unwrap_or_default();
                    let direction = if up { VoteDirection::Up } else { VoteDirection::Down };
                    let (after, _) = ledger.toggle_vote(&place_id, id, direction).unwrap();
                    prop_assert_eq!(after.vote_state, expected_state(prev, up));
                }
                Action::VoteMissing { place } => {
                    let revision = ledger.revision();
                    let err = ledger
                        .toggle_vote(&place.to_string(), ReportId::MAX, VoteDirection::Up)
                        .unwrap_err();
                    prop_assert!(matches!(err, LedgerError::MissingPlace(_) | LedgerError::MissingReport { .. }), "unexpected error: {:?}", err);
                    prop_assert_eq!(ledger.revision(), revision);
                }
            }

            for r in all_reports(&ledger) {
                // Only the local viewer votes, so counters mirror the vote state.
                prop_assert_eq!(r.upvotes, u32::from(r.vote_state == VoteState::Up));
                prop_assert_eq!(r.downvotes, u32::from(r.vote_state == VoteState::Down));
            }
        }

        for place in ledger.place_ids() {
            let ids: Vec<ReportId> = ledger.all_for_place(place).iter().map(|r| r.id).collect();
            let mut sorted = ids.clone();
            sorted.sort_by(|a, b| b.cmp(a));
            prop_assert_eq!(ids, sorted);
        }

        let restored = ReportLedger::from_snapshot(ledger.export_snapshot(), ledger.config().clone())
            .expect("restore");
        prop_assert_eq!(all_reports(&restored), all_reports(&ledger));
    }

    #[test]
    fn toggles_never_underflow_seeded_counters(
        ups in 0u32..5,
        downs in 0u32..5,
        presses in prop::collection::vec(any::<bool>(), 0..40),
    ) {
        let mut ledger = ReportLedger::new();
        let (seed, _) = ledger.submit_at(ReportDraft::new("1", BusynessLevel::Busy), T0);

        let mut snapshot = ledger.export_snapshot();
        if let Some(r) = snapshot.reports.get_mut("1").and_then(|v| v.first_mut()) {
            r.upvotes = ups;
            r.downvotes = downs;
        }
        let mut ledger = ReportLedger::from_snapshot(snapshot, ledger.config().clone())
            .expect("restore");

        for up in presses {
            let direction = if up { VoteDirection::Up } else { VoteDirection::Down };
            let (r, _) = ledger.toggle_vote("1", seed.id, direction).unwrap();
            let own_up = u32::from(r.vote_state == VoteState::Up);
            let own_down = u32::from(r.vote_state == VoteState::Down);
            prop_assert_eq!(r.upvotes, ups + own_up);
            prop_assert_eq!(r.downvotes, downs + own_down);
        }
    }
}
