use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::fit::controller::{run_fit_loop, FitEvent};
use crate::fit::scale::FitConstraints;
use crate::state::AppState;

/// GET /api/v1/fit/ws
///
/// The page script sends one `FitEvent` JSON message per browser trigger and
/// applies every `FitOutcome` it receives.
pub async fn handle_fit_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let constraints = state.fit_constraints;
    let window = state.config.fit_debounce;
    ws.on_upgrade(move |socket| {
        let session = Uuid::new_v4();
        fit_session(socket, constraints, window).instrument(info_span!("fit_session", %session))
    })
}

async fn fit_session(mut socket: WebSocket, constraints: FitConstraints, window: Duration) {
    info!("Fit session opened");
    let (event_tx, event_rx) = mpsc::channel(32);
    let (outcome_tx, mut outcome_rx) = mpsc::channel(8);
    let fit_loop = tokio::spawn(
        run_fit_loop(event_rx, outcome_tx, constraints, window).in_current_span(),
    );

    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<FitEvent>(&text) {
                    Ok(event) => {
                        if event_tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Ignoring malformed fit event: {e}"),
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("Fit socket error: {e}");
                    break;
                }
            },
            outcome = outcome_rx.recv() => {
                let Some(outcome) = outcome else { break };
                let Ok(text) = serde_json::to_string(&outcome) else { continue };
                if socket.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        }
    }

    fit_loop.abort();
    info!("Fit session closed");
}
