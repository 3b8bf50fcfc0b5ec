//! Authenticated editor socket.
//!
//! Each connection owns a [`StoreRegistry`], so optimistic values and the
//! unsaved flag are per editor session. Loading a widget subscribes the
//! session to that widget's topic; remote changes (from another tab or the
//! session's own save) are merged into the registry and echoed back.
//!
//! A mutation answers with the optimistic `settings` frame as soon as the
//! merged value is published, then `saved` or `error` once the write
//! settles. Writes finish off the receive loop, so a slow save never holds
//! up remote echoes or the next request.

use std::collections::HashMap;
use std::sync::Arc;
use std::task::Poll;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use overlay_client::{DynSettingsStore, Identity, SettingsError, SettingsWriter, StoreRegistry};
use overlay_core::topics::settings_topic;
use overlay_core::widget::WidgetType;
use overlay_events::{ChannelEvent, RealtimeHub};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::ws::manager::{ConnectionKind, WsSender};
use crate::ws::protocol::{to_message, EditorFrame, EditorRequest};

/// GET /api/v1/widgets/editor/ws
///
/// Requires a token, either as a Bearer header or `?access_token=`.
pub async fn editor_ws_handler(
    ws: WebSocketUpgrade,
    user: AuthUser,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_editor_socket(socket, state, user.identity))
}

async fn handle_editor_socket(socket: WebSocket, state: AppState, identity: Identity) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let user_id = identity.user_id().to_string();
    tracing::info!(conn_id = %conn_id, user_id = %user_id, "Editor WebSocket connected");

    let (tx, mut rx) = state
        .ws_manager
        .add(conn_id.clone(), Some(user_id.clone()), ConnectionKind::Editor)
        .await;
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if ws_sender.send(msg).await.is_err() || closing {
                break;
            }
        }
    });

    let writer: Arc<dyn SettingsWriter> = state.gateway.clone();
    let registry = StoreRegistry::new(state.gateway.clone(), writer, state.config.client_config());
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut forwarders: HashMap<WidgetType, JoinHandle<()>> = HashMap::new();

    loop {
        tokio::select! {
            msg = ws_receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<EditorRequest>(text.as_str()) {
                        Ok(EditorRequest::Load { widget }) => {
                            forwarders.entry(widget).or_insert_with(|| {
                                spawn_forwarder(&state.hub, widget, &user_id, event_tx.clone())
                            });
                            send_frame(&tx, &load(&registry, &identity, widget).await);
                        }
                        Ok(EditorRequest::Mutate { widget, partial }) => {
                            start_mutation(registry.get(widget), &identity, widget, partial, &tx).await;
                        }
                        Err(e) => {
                            send_frame(&tx, &EditorFrame::bad_request(format!("Invalid request: {e}")));
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(Message::Pong(_))) => {
                    tracing::trace!(conn_id = %conn_id, "Pong received");
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                    break;
                }
            },
            Some(event) = event_rx.recv() => match event {
                ChannelEvent::SettingsChanged(change) => {
                    let widget = change.widget_type;
                    if registry.apply_remote(&change) {
                        let store = registry.get(widget);
                        send_frame(&tx, &EditorFrame::Settings {
                            widget,
                            settings: store.settings_json(),
                            version: store.version(),
                        });
                    }
                }
                ChannelEvent::Status(status) => {
                    send_frame(&tx, &EditorFrame::Status { status });
                }
            },
        }
    }

    for (_, forwarder) in forwarders {
        forwarder.abort();
    }
    state.ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "Editor WebSocket disconnected");
}

async fn load(registry: &StoreRegistry, identity: &Identity, widget: WidgetType) -> EditorFrame {
    let store = registry.get(widget);
    match store.load_for_json(identity).await {
        Ok(settings) => EditorFrame::Settings {
            widget,
            settings,
            version: store.version(),
        },
        Err(e) => EditorFrame::from_error(
            widget,
            &e,
            store.settings_json(),
            store.has_unsaved_changes(),
        ),
    }
}

/// Publish the merged value and report it, then settle the save.
///
/// The first poll runs inline so mutations from one socket are applied in
/// arrival order. Whatever is left of the save runs on its own task.
async fn start_mutation(
    store: Arc<dyn DynSettingsStore>,
    identity: &Identity,
    widget: WidgetType,
    partial: Value,
    tx: &WsSender,
) {
    let before = store.settings_json();
    let mut save = Box::pin({
        let store = Arc::clone(&store);
        let identity = identity.clone();
        async move { store.mutate_json(&identity, &partial).await }
    });
    let first = futures::poll!(save.as_mut());

    let current = store.settings_json();
    if current != before {
        send_frame(
            tx,
            &EditorFrame::Settings {
                widget,
                settings: current,
                version: store.version(),
            },
        );
    }

    match first {
        Poll::Ready(outcome) => {
            send_frame(tx, &mutation_frame(store.as_ref(), identity, widget, outcome));
        }
        Poll::Pending => {
            let tx = tx.clone();
            let identity = identity.clone();
            tokio::spawn(async move {
                let outcome = save.await;
                send_frame(&tx, &mutation_frame(store.as_ref(), &identity, widget, outcome));
            });
        }
    }
}

fn mutation_frame(
    store: &dyn DynSettingsStore,
    identity: &Identity,
    widget: WidgetType,
    outcome: Result<Value, SettingsError>,
) -> EditorFrame {
    match outcome {
        Ok(settings) => EditorFrame::Saved {
            widget,
            settings,
            version: store.version(),
        },
        Err(e) => {
            tracing::warn!(
                user_id = identity.user_id(),
                widget = %widget,
                error = %e,
                "Editor mutation not saved",
            );
            EditorFrame::from_error(
                widget,
                &e,
                store.settings_json(),
                store.has_unsaved_changes(),
            )
        }
    }
}

/// Relay one topic's events into the session's event channel.
///
/// Aborting the task drops the subscription, which releases the topic.
fn spawn_forwarder(
    hub: &RealtimeHub,
    widget: WidgetType,
    user_id: &str,
    events: mpsc::UnboundedSender<ChannelEvent>,
) -> JoinHandle<()> {
    let mut subscription = hub.subscribe(settings_topic(widget, user_id));
    tokio::spawn(async move {
        while let Some(event) = subscription.recv().await {
            if events.send(event).is_err() {
                break;
            }
        }
    })
}

fn send_frame(tx: &WsSender, frame: &EditorFrame) {
    if let Some(msg) = to_message(frame) {
        let _ = tx.send(msg);
    }
}
