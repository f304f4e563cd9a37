use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    response::{IntoResponse, Response},
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::watch;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::domain::SessionSnapshot;
use crate::interface_adapters::net::sessions::{parse_variant, resolve_session_id};
use crate::interface_adapters::protocol::{ClientCommand, ServerMessage, SessionSnapshotDto};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::rng::rand_id;
use crate::use_cases::{RegistryError, SessionHandle, SessionRegistry};

const MAX_INVALID_JSON: u32 = 10;

#[derive(Debug)]
enum NetError {
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    SessionClosed,
    TooManyInvalidMessages,
}

#[derive(Debug, serde::Deserialize)]
pub struct SessionQuery {
    // Existing session to attach to, or the id for a new one.
    #[serde(default)]
    session_id: Option<String>,
    // Variant slug used when a new session is created.
    #[serde(default)]
    variant: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Response {
    let variant = match parse_variant(query.variant.as_deref()) {
        Ok(variant) => variant,
        Err(response) => return response,
    };
    let session_id = match resolve_session_id(query.session_id.as_deref()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    // Attach to an existing session, otherwise create one this socket owns.
    let (handle, owned) = match state.registry.get_session(&session_id).await {
        Some(handle) => (handle, false),
        None => match state
            .registry
            .create_session(session_id.clone(), variant)
            .await
        {
            Ok(handle) => (handle, true),
            // Lost a race with another creator; attach instead.
            Err(RegistryError::AlreadyExists) => {
                match state.registry.get_session(&session_id).await {
                    Some(handle) => (handle, false),
                    None => return RegistryError::NotFound.into_response(),
                }
            }
            Err(e) => return e.into_response(),
        },
    };

    let registry = state.registry.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, handle, owned, registry))
}

async fn handle_socket(
    socket: WebSocket,
    handle: SessionHandle,
    owned: bool,
    registry: Arc<SessionRegistry>,
) {
    // Separate connection id for correlating logs across attach/detach.
    let conn_id = rand_id();
    let span = info_span!("conn", conn_id, session_id = %handle.session_id, owned);

    async move {
        info!("client connected");
        let (mut sink, mut stream) = socket.split();

        if let Err(e) = run_client_loop(&mut sink, &mut stream, &handle).await {
            warn!(error = ?e, "client loop exited with error");
        }
        if let Err(e) = sink.close().await {
            debug!(error = ?e, "socket close error");
        }

        if owned {
            // The session lives only as long as the socket that created it.
            match registry.remove_session(&handle.session_id).await {
                Ok(()) | Err(RegistryError::NotFound) => {}
                Err(e) => warn!(error = %e, "failed to tear down session"),
            }
        }
        info!("client disconnected");
    }
    .instrument(span)
    .await
}

async fn send_message(
    sink: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    sink.send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)
}

async fn send_snapshot(
    sink: &mut SplitSink<WebSocket, Message>,
    snapshot: SessionSnapshot,
) -> Result<(), NetError> {
    send_message(sink, &ServerMessage::Snapshot(SessionSnapshotDto::from(snapshot))).await
}

async fn send_close(sink: &mut SplitSink<WebSocket, Message>, code: u16, reason: &'static str) {
    let frame = CloseFrame {
        code,
        reason: reason.into(),
    };
    let _ = sink.send(Message::Close(Some(frame))).await;
}

async fn run_client_loop(
    sink: &mut SplitSink<WebSocket, Message>,
    stream: &mut SplitStream<WebSocket>,
    handle: &SessionHandle,
) -> Result<(), NetError> {
    // Subscribe before the first send so no update slips between them.
    let mut snapshot_rx: watch::Receiver<SessionSnapshot> = handle.subscribe();

    send_message(
        sink,
        &ServerMessage::Identity {
            session_id: handle.session_id.to_string(),
            variant: handle.variant,
        },
    )
    .await?;
    let initial = snapshot_rx.borrow_and_update().clone();
    send_snapshot(sink, initial).await?;

    let mut invalid_json: u32 = 0;

    loop {
        tokio::select! {
            incoming = stream.next() => {
                let message = match incoming {
                    None => return Ok(()),
                    Some(Err(e)) => return Err(NetError::Ws(e)),
                    Some(Ok(message)) => message,
                };

                match message {
                    Message::Text(text) => match serde_json::from_str::<ClientCommand>(&text) {
                        Ok(command) => {
                            if handle.send(command.into()).await.is_err() {
                                send_close(sink, close_code::AWAY, "session closed").await;
                                return Err(NetError::SessionClosed);
                            }
                        }
                        Err(e) => {
                            invalid_json += 1;
                            debug!(error = %e, invalid_json, "invalid client command");
                            if invalid_json > MAX_INVALID_JSON {
                                send_close(sink, close_code::POLICY, "too many invalid messages").await;
                                return Err(NetError::TooManyInvalidMessages);
                            }
                            send_message(sink, &ServerMessage::Rejected { error: e.to_string() }).await?;
                        }
                    },
                    Message::Binary(_) => {
                        send_close(sink, close_code::UNSUPPORTED, "binary messages not supported").await;
                        return Ok(());
                    }
                    Message::Ping(_) | Message::Pong(_) => {}
                    Message::Close(_) => return Ok(()),
                }
            }

            changed = snapshot_rx.changed() => {
                if changed.is_err() {
                    // Driver stopped (deleted over HTTP or server shutdown).
                    send_close(sink, close_code::AWAY, "session closed").await;
                    return Err(NetError::SessionClosed);
                }
                let snapshot = snapshot_rx.borrow_and_update().clone();
                if let Err(e) = send_snapshot(sink, snapshot).await {
                    error!(error = ?e, "failed to send snapshot");
                    return Err(e);
                }
            }
        }
    }
}
