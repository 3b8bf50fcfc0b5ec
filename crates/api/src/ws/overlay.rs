//! Public overlay socket: streams one widget's settings for one user.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use overlay_client::PublicOverlay;
use overlay_core::schema::{
    AlertsSettings, ChatSettings, GamepadSettings, LyricsSettings, StatsSettings,
    VisualizerSettings, WidgetSchema,
};
use overlay_core::widget::WidgetType;

use crate::error::AppResult;
use crate::handlers::parse_widget;
use crate::state::AppState;
use crate::ws::manager::{ConnectionKind, WsSender};
use crate::ws::protocol::{to_message, OverlayFrame, OverlayStatus};

/// GET /api/v1/public/{username}/{widget}/ws
///
/// Unauthenticated. Unknown widget kinds are rejected before the upgrade;
/// unknown usernames get a `not_found` frame followed by Close.
pub async fn overlay_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path((username, widget)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let widget = parse_widget(&widget)?;
    Ok(ws.on_upgrade(move |socket| handle_overlay_socket(socket, state, username, widget)))
}

async fn handle_overlay_socket(
    socket: WebSocket,
    state: AppState,
    username: String,
    widget: WidgetType,
) {
    match widget {
        WidgetType::Visualizer => run_overlay::<VisualizerSettings>(socket, state, username).await,
        WidgetType::Lyrics => run_overlay::<LyricsSettings>(socket, state, username).await,
        WidgetType::Gamepad => run_overlay::<GamepadSettings>(socket, state, username).await,
        WidgetType::Chat => run_overlay::<ChatSettings>(socket, state, username).await,
        WidgetType::Alerts => run_overlay::<AlertsSettings>(socket, state, username).await,
        WidgetType::Stats => run_overlay::<StatsSettings>(socket, state, username).await,
    }
}

async fn run_overlay<T: WidgetSchema>(socket: WebSocket, state: AppState, username: String) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(
        conn_id = %conn_id,
        username = %username,
        widget = %T::WIDGET,
        "Overlay WebSocket connected",
    );

    let (tx, mut rx) = state
        .ws_manager
        .add(conn_id.clone(), None, ConnectionKind::Overlay)
        .await;
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let mut overlay = PublicOverlay::<T>::mount(
        &username,
        state.gateway.clone(),
        &state.hub,
        state.config.client_config(),
    )
    .await;

    let initial = OverlayFrame::from(&overlay.state());
    send_frame(&tx, &initial);
    if initial.status == OverlayStatus::NotFound {
        let _ = tx.send(Message::Close(None));
    }

    // Forward queued frames (state, pings, shutdown Close) to the socket.
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if ws_sender.send(msg).await.is_err() || closing {
                break;
            }
        }
    });

    // Apply channel events and queue a frame for every visible change.
    let overlay_task = tokio::spawn(async move {
        let mut last = initial;
        while let Some(next) = overlay.next_event().await {
            let frame = OverlayFrame::from(&next);
            if frame != last {
                if !send_frame(&tx, &frame) {
                    break;
                }
                last = frame;
            }
        }
        overlay.unmount();
    });

    // Overlays only listen; inbound traffic is pongs and the final Close.
    loop {
        tokio::select! {
            _ = &mut send_task => break,
            msg = ws_receiver.next() => match msg {
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
        }
    }

    state.ws_manager.remove(&conn_id).await;
    overlay_task.abort();
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "Overlay WebSocket disconnected");
}

/// Queue `frame` on the connection. False once the socket is gone.
fn send_frame(tx: &WsSender, frame: &OverlayFrame) -> bool {
    match to_message(frame) {
        Some(msg) => tx.send(msg).is_ok(),
        None => true,
    }
}
