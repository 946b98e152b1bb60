pub mod protocol;
pub mod state_stream;

use crate::brain::Brain;
use crate::cancel::CancelToken;
use crate::config::Config;
use crate::simulation::{sensor, Simulation};
use axum::{
    extract::{ws::Message, ws::WebSocket, State as AxumState, WebSocketUpgrade},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use futures_util::{SinkExt, StreamExt};
use protocol::{ClientMessage, ServerMessage};
use state_stream::StateStream;
use tokio::time::interval;
use tower_http::services::ServeDir;

#[derive(Clone)]
pub struct AppState {
    pub stream: StateStream,
    pub config: Config,
    pub cancel: CancelToken,
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        // WebSocket endpoint
        .route("/ws", get(websocket_handler))
        .route("/api/stats", get(stats_handler))
        // Cooperative quit: the trainer stops at the next check point
        .route("/api/stop", post(stop_handler))
        // Serve a renderer from the "static" directory
        .fallback_service(ServeDir::new("static"))
        .with_state(app_state)
}

pub async fn run_server(
    config: Config,
    stream: StateStream,
    cancel: CancelToken,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = format!("{}:{}", config.server.address, config.server.port);
    let app = router(AppState {
        stream,
        config,
        cancel,
    });

    log::info!("HTTP server with WebSocket listening on: {}", addr);
    log::info!("WebSocket endpoint: ws://{}/ws", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    AxumState(state): AxumState<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_websocket(socket, state))
}

async fn stats_handler(AxumState(state): AxumState<AppState>) -> impl IntoResponse {
    Json(state.stream.history().await)
}

async fn stop_handler(AxumState(state): AxumState<AppState>) -> impl IntoResponse {
    log::warn!("Stop requested via API");
    state.cancel.cancel();
    (StatusCode::ACCEPTED, "Training will stop after the current tick")
}

/// Champion episode re-played tick by tick for a watching client.
struct Replay {
    generation: u64,
    brain: Brain,
    sim: Simulation,
    inputs: Vec<f64>,
}

impl Replay {
    /// Advances one tick. Returns the frame to send, or the final score when
    /// the episode has ended.
    fn advance(&mut self, config: &Config) -> Result<ServerMessage, i64> {
        let (_, running) = self.sim.step_with(&self.brain, config, &mut self.inputs);
        if running {
            Ok(ServerMessage::Frame {
                generation: self.generation,
                snapshot: self.sim.world.snapshot(),
            })
        } else {
            Err(self.sim.world.score)
        }
    }
}

async fn handle_websocket(socket: WebSocket, app_state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let config = &app_state.config;
    let mut update_interval = interval(config.server.update_period());
    let mut replay_interval = interval(config.server.replay_period());
    let mut replay: Option<Replay> = None;

    loop {
        let outgoing = tokio::select! {
            _ = update_interval.tick() => {
                let status = app_state.stream.get_state().await;
                Some(ServerMessage::update(&status))
            }

            _ = replay_interval.tick(), if replay.is_some() => {
                match replay.as_mut().map(|r| (r.generation, r.advance(config))) {
                    Some((_, Ok(frame))) => Some(frame),
                    Some((generation, Err(score))) => {
                        replay = None;
                        Some(ServerMessage::ReplayFinished { generation, score })
                    }
                    None => None,
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(client_msg) => handle_client_message(client_msg, &app_state, &mut replay).await,
                        Err(e) => Some(ServerMessage::error(format!("Unrecognised message: {}", e))),
                    },
                    Some(Ok(Message::Close(_))) | None => {
                        log::info!("Client requested close");
                        break;
                    }
                    Some(Err(e)) => {
                        log::error!("WebSocket error: {}", e);
                        break;
                    }
                    Some(Ok(_)) => None,
                }
            }
        };

        if let Some(message) = outgoing {
            if let Ok(json) = serde_json::to_string(&message) {
                if sender.send(Message::Text(json)).await.is_err() {
                    log::info!("Client disconnected");
                    break;
                }
            }
        }
    }

    log::info!("WebSocket connection closed");
}

async fn handle_client_message(
    message: ClientMessage,
    app_state: &AppState,
    replay: &mut Option<Replay>,
) -> Option<ServerMessage> {
    let config = &app_state.config;
    match message {
        ClientMessage::GetState => Some(ServerMessage::FullState {
            status: app_state.stream.get_state().await,
        }),
        ClientMessage::GetHistory => Some(ServerMessage::History {
            stats: app_state.stream.history().await,
        }),
        ClientMessage::TraceBest => {
            let status = app_state.stream.get_state().await;
            let Some(champion) = status.champion else {
                return Some(ServerMessage::error("No generation has completed yet"));
            };
            let sim = Simulation::new(config, champion.episode_seed);
            let inputs = sensor::encode(&sim.world, &config.sensor);
            Some(ServerMessage::Trace {
                generation: status.generations_completed,
                champion_index: champion.index,
                trace: champion.brain.trace(&inputs),
            })
        }
        ClientMessage::WatchBest => {
            let status = app_state.stream.get_state().await;
            let Some(champion) = status.champion else {
                return Some(ServerMessage::error("No generation has completed yet"));
            };
            log::info!(
                "Replaying champion #{} of generation {}",
                champion.index + 1,
                status.generations_completed
            );
            *replay = Some(Replay {
                generation: status.generations_completed,
                brain: champion.brain,
                sim: Simulation::new(config, champion.episode_seed),
                inputs: vec![0.0; config.input_size()],
            });
            None
        }
        ClientMessage::StopWatching => {
            *replay = None;
            None
        }
    }
}
