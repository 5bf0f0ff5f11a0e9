use busynow::{
    core::ledger::{LedgerError, ReportLedger},
    op::Op,
    report::{Author, MAX_NOTE_CHARS, ReportDraft},
    types::{BusynessLevel, VoteDirection, VoteState},
};

const MINUTE_MS: u64 = 60 * 1000;
const T0: u64 = 1_700_000_000_000;

fn draft(place: &str, level: BusynessLevel) -> ReportDraft {
    ReportDraft::new(place, level)
}

#[test]
fn submit_yields_monotonic_ids_and_revisions() {
    let mut ledger = ReportLedger::new();
    let (r1, op1) = ledger.submit_at(draft("1", BusynessLevel::Quiet), T0);
    let (r2, op2) = ledger.submit_at(draft("2", BusynessLevel::Busy), T0);
    let (r3, op3) = ledger.submit_at(draft("1", BusynessLevel::Moderate), T0);

    assert_eq!((r1.id, r2.id, r3.id), (1, 2, 3));
    assert_eq!((op1.revision, op2.revision, op3.revision), (1, 2, 3));
    assert_eq!(ledger.revision(), 3);
    assert_eq!(ledger.len(), 3);
}

#[test]
fn submitted_report_starts_neutral_with_guest_author() {
    let mut ledger = ReportLedger::new();
    let (report, op) = ledger.submit_at(
        draft("4", BusynessLevel::Moderate)
            .with_wait(10)
            .with_note("Short line")
            .with_photo("file:///tmp/a.jpg"),
        T0,
    );

    assert_eq!(report.place_id, "4");
    assert_eq!(report.author_id, "guest");
    assert_eq!(report.author_name, "Guest User");
    assert_eq!(report.wait_minutes, Some(10));
    assert_eq!(report.note.as_deref(), Some("Short line"));
    assert_eq!(report.photo_ref.as_deref(), Some("file:///tmp/a.jpg"));
    assert_eq!(report.created_at_ms, T0);
    assert_eq!((report.upvotes, report.downvotes), (0, 0));
    assert_eq!(report.vote_state, VoteState::None);
    assert_eq!(op.op, Op::Submit { report: report.clone() });
}

#[test]
fn same_place_submissions_come_back_newest_first() {
    let mut ledger = ReportLedger::new();
    let (a, _) = ledger.submit_at(draft("2", BusynessLevel::Busy).with_wait(15), T0);
    let (b, _) = ledger.submit_at(draft("2", BusynessLevel::Quiet).with_wait(0), T0 + 1_000);

    let ids: Vec<_> = ledger
        .reports_for_place("2", T0 + 2_000)
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![b.id, a.id]);
    assert_eq!(ledger.latest_for_place("2", T0 + 2_000).map(|r| r.id), Some(b.id));
}

#[test]
fn window_includes_59_minutes_and_excludes_61() {
    let mut ledger = ReportLedger::new();
    ledger.submit_at(draft("3", BusynessLevel::Quiet), T0);

    assert_eq!(ledger.reports_for_place("3", T0 + 59 * MINUTE_MS).len(), 1);
    assert_eq!(ledger.reports_for_place("3", T0 + 60 * MINUTE_MS).len(), 1);
    assert!(ledger.reports_for_place("3", T0 + 61 * MINUTE_MS).is_empty());

    // Expired reports stay stored and reappear for an earlier `now`.
    assert_eq!(ledger.all_for_place("3").len(), 1);
    assert_eq!(ledger.reports_for_place("3", T0 + MINUTE_MS).len(), 1);
}

#[test]
fn unknown_place_reads_empty() {
    let ledger = ReportLedger::new();
    assert!(ledger.reports_for_place("nope", T0).is_empty());
    assert!(ledger.latest_for_place("nope", T0).is_none());
    assert!(ledger.all_for_place("nope").is_empty());
}

#[test]
fn upvote_twice_restores_neutral() {
    let mut ledger = ReportLedger::new();
    let (r, _) = ledger.submit_at(draft("1", BusynessLevel::Busy), T0);

    let (after_up, _) = ledger.toggle_vote("1", r.id, VoteDirection::Up).unwrap();
    assert_eq!(after_up.vote_state, VoteState::Up);
    assert_eq!(after_up.upvotes, 1);

    let (after_second, _) = ledger.toggle_vote("1", r.id, VoteDirection::Up).unwrap();
    assert_eq!(after_second.vote_state, VoteState::None);
    assert_eq!((after_second.upvotes, after_second.downvotes), (0, 0));
}

#[test]
fn up_then_down_flips_counters() {
    let mut ledger = ReportLedger::new();
    let (r, _) = ledger.submit_at(draft("1", BusynessLevel::Busy), T0);

    ledger.toggle_vote("1", r.id, VoteDirection::Up).unwrap();
    let (flipped, op) = ledger.toggle_vote("1", r.id, VoteDirection::Down).unwrap();

    assert_eq!(flipped.vote_state, VoteState::Down);
    assert_eq!((flipped.upvotes, flipped.downvotes), (0, 1));
    assert_eq!(
        op.op,
        Op::ToggleVote {
            place_id: "1".to_string(),
            report_id: r.id,
            direction: VoteDirection::Down,
            prev: VoteState::Up,
            next: VoteState::Down,
        }
    );
    assert_eq!(ledger.get("1", r.id), Some(&flipped));
}

#[test]
fn down_then_up_and_down_twice() {
    let mut ledger = ReportLedger::new();
    let (r, _) = ledger.submit_at(draft("1", BusynessLevel::Busy), T0);

    ledger.toggle_vote("1", r.id, VoteDirection::Down).unwrap();
    let (up, _) = ledger.toggle_vote("1", r.id, VoteDirection::Up).unwrap();
    assert_eq!(up.vote_state, VoteState::Up);
    assert_eq!((up.upvotes, up.downvotes), (1, 0));

    ledger.toggle_vote("1", r.id, VoteDirection::Down).unwrap();
    let (cleared, _) = ledger.toggle_vote("1", r.id, VoteDirection::Down).unwrap();
    assert_eq!(cleared.vote_state, VoteState::None);
    assert_eq!((cleared.upvotes, cleared.downvotes), (0, 0));
}

#[test]
fn toggle_on_missing_report_is_an_error_and_leaves_state() {
    let mut ledger = ReportLedger::new();
    let (r, _) = ledger.submit_at(draft("1", BusynessLevel::Busy), T0);
    let before = ledger.export_snapshot();
    let revision = ledger.revision();

    assert_eq!(
        ledger.toggle_vote("9", r.id, VoteDirection::Up).unwrap_err(),
        LedgerError::MissingPlace("9".to_string())
    );
    assert_eq!(
        ledger.toggle_vote("1", 42, VoteDirection::Up).unwrap_err(),
        LedgerError::MissingReport {
            place_id: "1".to_string(),
            report_id: 42,
        }
    );
    assert_eq!(ledger.export_snapshot(), before);
    assert_eq!(ledger.revision(), revision);
}

#[test]
fn verified_needs_net_three() {
    let mut ledger = ReportLedger::new();
    let (mut r, _) = ledger.submit_at(draft("1", BusynessLevel::Busy), T0);

    r.upvotes = 5;
    r.downvotes = 2;
    assert!(r.is_verified());

    r.upvotes = 4;
    assert!(!r.is_verified());
    assert_eq!(r.net_votes(), 2);
}

#[test]
fn draft_note_is_bounded_but_not_trimmed() {
    let long = "x".repeat(MAX_NOTE_CHARS + 50);
    let d = draft("1", BusynessLevel::Quiet).with_note(&long);
    assert_eq!(d.note.as_ref().map(|n| n.chars().count()), Some(MAX_NOTE_CHARS));

    let padded = draft("1", BusynessLevel::Quiet).with_note("  line up outside \n");
    assert_eq!(padded.note.as_deref(), Some("  line up outside \n"));

    let spaces = draft("1", BusynessLevel::Quiet).with_note("   ");
    assert_eq!(spaces.note.as_deref(), Some("   "));

    let empty = draft("1", BusynessLevel::Quiet).with_note("");
    assert_eq!(empty.note, None);

    let custom = draft("1", BusynessLevel::Quiet).with_author(Author {
        id: "7".to_string(),
        name: "Sam".to_string(),
    });
    assert_eq!(custom.author.id, "7");
}

#[test]
fn ledger_stores_oversized_notes_verbatim() {
    let mut ledger = ReportLedger::new();
    let mut d = draft("1", BusynessLevel::Quiet);
    d.note = Some("y".repeat(MAX_NOTE_CHARS + 1));

    let (r, _) = ledger.submit_at(d, T0);
    assert_eq!(r.note.map(|n| n.len()), Some(MAX_NOTE_CHARS + 1));
}
