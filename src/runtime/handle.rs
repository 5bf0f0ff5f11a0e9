use std::sync::Arc;

use thiserror::Error;
use tokio::{
    sync::{Mutex, broadcast, mpsc, oneshot, watch},
    time::{Duration, Instant},
};
use tracing::{debug, warn};

use crate::{
    config::RuntimeConfig,
    core::ledger::{LedgerError, LedgerSnapshotV1, ReportLedger},
    op::{Op, StoredOp},
    persist::{KvStore, LEDGER_KEY, PersistError, save_json},
    report::{Report, ReportDraft},
    types::{PlaceId, ReportId, Revision, VoteDirection},
};

use super::events::LedgerEvent;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("ledger runtime is no longer running")]
    ChannelClosed,
}

pub struct LedgerHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<LedgerEvent>,
}

impl Clone for LedgerHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

enum Command {
    Submit {
        draft: ReportDraft,
        resp: oneshot::Sender<Report>,
    },
    ToggleVote {
        place_id: PlaceId,
        report_id: ReportId,
        direction: VoteDirection,
        resp: oneshot::Sender<Result<Report, RuntimeError>>,
    },
    ReportsForPlace {
        place_id: PlaceId,
        now_ms: u64,
        resp: oneshot::Sender<Vec<Report>>,
    },
    LatestForPlace {
        place_id: PlaceId,
        now_ms: u64,
        resp: oneshot::Sender<Option<Report>>,
    },
    Flush {
        resp: oneshot::Sender<Result<Revision, RuntimeError>>,
    },
    Shutdown {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
}

/// Latest ledger state waiting to be written.
#[derive(Debug, Clone, Default)]
struct PendingSnapshot {
    revision: Revision,
    snapshot: Option<Arc<LedgerSnapshotV1>>,
    /// Highest revision that asked for an immediate write.
    urgent_revision: Revision,
}

enum PersistMsg {
    Flush {
        resp: oneshot::Sender<Result<Revision, PersistError>>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

struct PersistLink {
    snapshot_tx: watch::Sender<PendingSnapshot>,
    ctl_tx: mpsc::Sender<PersistMsg>,
}

pub fn spawn_ledger(
    ledger: ReportLedger,
    kv: Option<Box<dyn KvStore>>,
    config: RuntimeConfig,
) -> LedgerHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(256);
    let (events_tx, _) = broadcast::channel::<LedgerEvent>(1024);

    let persist = kv.map(|kv| {
        let (snapshot_tx, snapshot_rx) = watch::channel(PendingSnapshot {
            revision: ledger.revision(),
            snapshot: None,
            urgent_revision: 0,
        });
        let (ctl_tx, ctl_rx) = mpsc::channel::<PersistMsg>(16);
        spawn_persistence_worker(
            kv,
            snapshot_rx,
            ctl_rx,
            events_tx.clone(),
            ledger.revision(),
            config.clone(),
        );
        PersistLink {
            snapshot_tx,
            ctl_tx,
        }
    });

    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        let mut ledger = ledger;

        while let Some(cmd) = cmd_rx.recv().await {
            let done = handle_command(cmd, &mut ledger, &events_tx_loop, persist.as_ref(), &config).await;
            if done {
                break;
            }
        }
    });

    LedgerHandle { cmd_tx, events_tx }
}

impl LedgerHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events_tx.subscribe()
    }

    pub async fn submit(&self, draft: ReportDraft) -> Result<Report, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Submit { draft, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    pub async fn toggle_vote(
        &self,
        place_id: impl Into<PlaceId>,
        report_id: ReportId,
        direction: VoteDirection,
    ) -> Result<Report, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::ToggleVote {
                place_id: place_id.into(),
                report_id,
                direction,
                resp: tx,
            })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    pub async fn reports_for_place(
        &self,
        place_id: impl Into<PlaceId>,
        now_ms: u64,
    ) -> Result<Vec<Report>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::ReportsForPlace {
                place_id: place_id.into(),
                now_ms,
                resp: tx,
            })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    pub async fn latest_for_place(
        &self,
        place_id: impl Into<PlaceId>,
        now_ms: u64,
    ) -> Result<Option<Report>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::LatestForPlace {
                place_id: place_id.into(),
                now_ms,
                resp: tx,
            })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Waits until the latest snapshot is written; returns the durable revision.
    pub async fn flush(&self) -> Result<Revision, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Flush { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Shutdown { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }
}

async fn handle_command(
    cmd: Command,
    ledger: &mut ReportLedger,
    events_tx: &broadcast::Sender<LedgerEvent>,
    persist: Option<&PersistLink>,
    config: &RuntimeConfig,
) -> bool {
    match cmd {
        Command::Submit { draft, resp } => {
            let (report, stored) = ledger.submit(draft);
            publish_snapshot(ledger, persist, config.flush_on_submit, events_tx);
            emit_op_event(events_tx, &stored);
            let _ = resp.send(report);
        }
        Command::ToggleVote {
            place_id,
            report_id,
            direction,
            resp,
        } => {
            let res = ledger
                .toggle_vote(&place_id, report_id, direction)
                .map_err(RuntimeError::from)
                .map(|(report, stored)| {
                    publish_snapshot(ledger, persist, false, events_tx);
                    emit_op_event(events_tx, &stored);
                    report
                });
            let _ = resp.send(res);
        }
        Command::ReportsForPlace {
            place_id,
            now_ms,
            resp,
        } => {
            let _ = resp.send(ledger.reports_for_place_cloned(&place_id, now_ms));
        }
        Command::LatestForPlace {
            place_id,
            now_ms,
            resp,
        } => {
            let _ = resp.send(ledger.latest_for_place(&place_id, now_ms).cloned());
        }
        Command::Flush { resp } => {
            let out = if let Some(link) = persist {
                let (flush_tx, flush_rx) = oneshot::channel();
                if link
                    .ctl_tx
                    .send(PersistMsg::Flush { resp: flush_tx })
                    .await
                    .is_err()
                {
                    Err(RuntimeError::ChannelClosed)
                } else {
                    flush_rx
                        .await
                        .map_err(|_| RuntimeError::ChannelClosed)
                        .and_then(|r| r.map_err(RuntimeError::from))
                }
            } else {
                Ok(ledger.revision())
            };
            let _ = resp.send(out);
        }
        Command::Shutdown { resp } => {
            let out = if let Some(link) = persist {
                let (done_tx, done_rx) = oneshot::channel();
                if link
                    .ctl_tx
                    .send(PersistMsg::Shutdown { resp: done_tx })
                    .await
                    .is_err()
                {
                    Err(RuntimeError::ChannelClosed)
                } else {
                    done_rx.await.map_err(|_| RuntimeError::ChannelClosed)
                }
            } else {
                Ok(())
            };
            let _ = resp.send(out);
            return true;
        }
    }

    false
}

fn publish_snapshot(
    ledger: &ReportLedger,
    persist: Option<&PersistLink>,
    urgent: bool,
    events_tx: &broadcast::Sender<LedgerEvent>,
) {
    let Some(link) = persist else {
        let _ = events_tx.send(LedgerEvent::DurableUpTo {
            revision: ledger.revision(),
        });
        return;
    };

    // Superseded snapshots are overwritten; urgency sticks until written.
    let revision = ledger.revision();
    let snapshot = Arc::new(ledger.export_snapshot());
    link.snapshot_tx.send_modify(|pending| {
        pending.revision = revision;
        pending.snapshot = Some(snapshot);
        if urgent {
            pending.urgent_revision = revision;
        }
    });
}

fn emit_op_event(events_tx: &broadcast::Sender<LedgerEvent>, stored: &StoredOp) {
    let event = match &stored.op {
        Op::Submit { report } => LedgerEvent::ReportSubmitted {
            place_id: report.place_id.clone(),
            report_id: report.id,
        },
        Op::ToggleVote {
            place_id,
            report_id,
            next,
            ..
        } => LedgerEvent::VoteChanged {
            place_id: place_id.clone(),
            report_id: *report_id,
            vote_state: *next,
        },
    };
    let _ = events_tx.send(event);
}

fn spawn_persistence_worker(
    kv: Box<dyn KvStore>,
    mut snapshot_rx: watch::Receiver<PendingSnapshot>,
    mut ctl_rx: mpsc::Receiver<PersistMsg>,
    events_tx: broadcast::Sender<LedgerEvent>,
    initial_revision: Revision,
    config: RuntimeConfig,
) {
    let kv = Arc::new(Mutex::new(kv));
    tokio::spawn(async move {
        let mut last_durable = initial_revision;
        let mut dirty = false;
        let mut deadline = Instant::now();

        loop {
            tokio::select! {
                msg = ctl_rx.recv() => {
                    let Some(msg) = msg else {
                        let _ = write_latest(&kv, &mut snapshot_rx, &mut last_durable, &events_tx).await;
                        break;
                    };

                    match msg {
                        PersistMsg::Flush { resp } => {
                            let result = write_latest(&kv, &mut snapshot_rx, &mut last_durable, &events_tx).await;
                            dirty = false;
                            let _ = resp.send(result.map(|_| last_durable));
                        }
                        PersistMsg::Shutdown { resp } => {
                            let _ = write_latest(&kv, &mut snapshot_rx, &mut last_durable, &events_tx).await;
                            let _ = resp.send(());
                            break;
                        }
                    }
                }
                changed = snapshot_rx.changed() => {
                    if changed.is_err() {
                        let _ = write_latest(&kv, &mut snapshot_rx, &mut last_durable, &events_tx).await;
                        break;
                    }
                    let urgent = snapshot_rx.borrow().urgent_revision > last_durable;
                    if urgent {
                        let _ = write_latest(&kv, &mut snapshot_rx, &mut last_durable, &events_tx).await;
                        dirty = false;
                    } else if !dirty {
                        dirty = true;
                        deadline = Instant::now() + Duration::from_millis(config.batch_max_latency_ms);
                    }
                }
                _ = tokio::time::sleep_until(deadline), if dirty => {
                    let _ = write_latest(&kv, &mut snapshot_rx, &mut last_durable, &events_tx).await;
                    dirty = false;
                }
            }
        }
    });
}

async fn write_latest(
    kv: &Arc<Mutex<Box<dyn KvStore>>>,
    snapshot_rx: &mut watch::Receiver<PendingSnapshot>,
    last_durable: &mut Revision,
    events_tx: &broadcast::Sender<LedgerEvent>,
) -> Result<(), PersistError> {
    let pending = snapshot_rx.borrow_and_update().clone();
    let Some(snapshot) = pending.snapshot else {
        return Ok(());
    };
    if pending.revision <= *last_durable {
        return Ok(());
    }

    let kv_ref = Arc::clone(kv);
    let write_res: Result<(), PersistError> = tokio::task::spawn_blocking(move || {
        let mut kv = kv_ref.blocking_lock();
        save_json(&mut **kv, LEDGER_KEY, &*snapshot)?;
        kv.flush()
    })
    .await
    .map_err(|e| PersistError::Message(format!("join error: {e}")))?;

    match write_res {
        Ok(()) => {
            *last_durable = pending.revision;
            debug!(revision = pending.revision, "Persisted ledger snapshot");
            let _ = events_tx.send(LedgerEvent::DurableUpTo {
                revision: *last_durable,
            });
            Ok(())
        }
        Err(err) => {
            warn!(revision = pending.revision, error = %err, "Failed to persist ledger snapshot");
            Err(err)
        }
    }
}
