//! Event-driven shell around the scaler.
//!
//! Triggers arrive on an mpsc channel. A burst of triggers is coalesced: each one
//! re-arms the debounce window, and when the window elapses quietly the fit runs
//! once with the latest measurements of the burst. `BeforePrint` is never
//! debounced; it drops the pending burst and resets immediately.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::fit::scale::{fit, FitConstraints, FitOutcome, Measurements};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitTrigger {
    ContainerResize,
    OrientationChange,
    Load,
    ViewportResize,
    BeforePrint,
    AfterPrint,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitEvent {
    pub trigger: FitTrigger,
    /// Absent on `BeforePrint`. When absent on other triggers the most recent
    /// measurements are reused.
    #[serde(default)]
    pub measurements: Option<Measurements>,
}

enum BurstEnd {
    Settled,
    Print,
    Closed,
}

/// Runs until the event channel closes or the outcome receiver goes away.
/// A burst still pending when the event channel closes is flushed first.
pub async fn run_fit_loop(
    mut events: mpsc::Receiver<FitEvent>,
    outcomes: mpsc::Sender<FitOutcome>,
    constraints: FitConstraints,
    window: Duration,
) {
    let mut latest: Option<Measurements> = None;

    while let Some(event) = events.recv().await {
        if event.trigger == FitTrigger::BeforePrint {
            if outcomes.send(FitOutcome::Reset).await.is_err() {
                return;
            }
            continue;
        }
        if let Some(m) = event.measurements {
            latest = Some(m);
        }

        let end = settle_burst(&mut events, window, &mut latest).await;
        if matches!(end, BurstEnd::Print) {
            debug!("Print started, pending fit dropped");
            if outcomes.send(FitOutcome::Reset).await.is_err() {
                return;
            }
            continue;
        }

        if let Some(m) = latest.as_ref() {
            let outcome = fit(m, &constraints);
            debug!(trigger = ?event.trigger, ?outcome, "Fit recomputed");
            if outcomes.send(outcome).await.is_err() {
                return;
            }
        }
        if matches!(end, BurstEnd::Closed) {
            return;
        }
    }
}

/// Waits for the debounce window to pass without a new trigger.
async fn settle_burst(
    events: &mut mpsc::Receiver<FitEvent>,
    window: Duration,
    latest: &mut Option<Measurements>,
) -> BurstEnd {
    let deadline = sleep(window);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            () = &mut deadline => return BurstEnd::Settled,
            next = events.recv() => match next {
                Some(event) if event.trigger == FitTrigger::BeforePrint => return BurstEnd::Print,
                Some(event) => {
                    if let Some(m) = event.measurements {
                        *latest = Some(m);
                    }
                    deadline.as_mut().reset(Instant::now() + window);
                }
                None => return BurstEnd::Closed,
            },
        }
    }
}
