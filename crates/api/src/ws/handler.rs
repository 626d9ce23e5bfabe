use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use imhub_core::types::is_blank;
use imhub_hub::connection::OutboundReceiver;
use imhub_hub::Hub;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Upper bound on waiting for the writer to flush its Close frame.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// GET /imserver/{user_id}
///
/// Upgrades the connection to WebSocket and hands it to the hub under
/// `user_id`. A blank id is rejected before upgrading.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Response> {
    if is_blank(&user_id) {
        return Err(AppError::BadRequest("user_id must not be blank".into()));
    }
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state.hub, user_id)))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Opens a hub session (register, welcome, heartbeat).
///   2. Spawns a writer task that drains the session's outbound queue.
///   3. Feeds inbound text to the session until the client leaves, the
///      socket errors, or the hub closes the connection.
///   4. Ends the session, which de-registers it.
async fn handle_socket(socket: WebSocket, hub: Arc<Hub>, user_id: String) {
    let (mut session, outbound) = match hub.open(&user_id) {
        Ok(opened) => opened,
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "Rejected WebSocket session");
            return;
        }
    };
    let conn_id = session.connection().id();
    let hub_closed = session.connection().close_token().clone();

    let (sink, mut stream) = socket.split();
    let writer = tokio::spawn(writer_task(sink, outbound, hub_closed.clone()));

    loop {
        tokio::select! {
            () = hub_closed.cancelled() => {
                tracing::debug!(conn_id = %conn_id, "Connection closed by hub");
                break;
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    session.on_message(text.as_str());
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {
                    tracing::trace!(conn_id = %conn_id, "Ignoring non-text frame");
                }
                Some(Err(e)) => {
                    session.on_error(&e);
                    break;
                }
            },
        }
    }

    session.on_close();
    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, writer).await.is_err() {
        tracing::debug!(conn_id = %conn_id, "Writer did not finish in time");
    }
}

/// Forward queued text frames to the sink in order, then send a Close
/// frame once the connection is closed.
async fn writer_task(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound: OutboundReceiver,
    closed: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            next = outbound.recv() => match next {
                Some(text) => {
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        tracing::debug!("WebSocket sink closed");
                        break;
                    }
                }
                None => break,
            },
            () = closed.cancelled() => {
                if let Err(e) = sink.send(Message::Close(None)).await {
                    tracing::debug!(error = %e, "Failed to send Close frame");
                }
                break;
            }
        }
    }
}
