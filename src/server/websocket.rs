/// WebSocket push of the metrics record

use axum::{
    extract::ws::{Message, WebSocket},
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::time::interval;
use tracing::{debug, warn};

use super::AppState;
use crate::utils::WS_PUSH_INTERVAL;

pub async fn ws_metrics_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_metrics_websocket(socket, state))
}

async fn handle_metrics_websocket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut interval = interval(WS_PUSH_INTERVAL);
    debug!("WebSocket client connected");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let metrics = {
                    let mut collector = state.collector.lock().await;
                    collector.collect().await
                };

                let metrics = match metrics {
                    Ok(metrics) => metrics,
                    Err(e) => {
                        warn!("Metrics collection failed: {:#}", e);
                        continue;
                    }
                };

                if let Ok(json) = serde_json::to_string(&metrics) {
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    debug!("WebSocket client disconnected");
}
