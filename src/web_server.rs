use anyhow::{Context, Result};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router, serve, // Use axum::serve instead of axum::Server
};
use futures::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use std::{
    net::SocketAddr,
    path::{Path as FsPath, PathBuf},
    sync::Arc,
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::horoscope::{HoroscopeController, RequestState};
use crate::zodiac::{self, ZodiacSign, ZODIAC_SIGNS};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    templates: Arc<AutoReloader>,
    controller: Arc<HoroscopeController>,
}

impl AppState {
    pub fn new(templates_dir: impl Into<PathBuf>, controller: Arc<HoroscopeController>) -> Self {
        Self {
            templates: Arc::new(create_minijinja_env(templates_dir.into())),
            controller,
        }
    }
}

// Minijinja Environment setup
fn create_minijinja_env(templates_dir: PathBuf) -> AutoReloader {
    AutoReloader::new(move |notifier| {
        let mut env = Environment::new();
        env.set_loader(path_loader(&templates_dir));
        notifier.watch_path(&templates_dir, true);
        Ok(env)
    })
}

async fn index_handler(
    State(state): State<AppState>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let current = state.controller.state();
    let phase = current.phase();
    state
        .templates
        .acquire_env()
        .and_then(|env| {
            env.get_template("index.html").and_then(|tmpl| {
                tmpl.render(minijinja::context! {
                    title => "Astroloji Rehberi",
                    signs => &ZODIAC_SIGNS[..],
                    phase => phase,
                    state => current,
                })
            })
        })
        .map(Html)
        .map_err(|e| {
            error!("Failed to get or render template: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("Internal Server Error: {}", e)),
            )
        })
}

async fn signs_handler() -> Json<&'static [ZodiacSign]> {
    Json(&ZODIAC_SIGNS[..])
}

async fn state_handler(State(state): State<AppState>) -> Json<RequestState> {
    Json(state.controller.state())
}

async fn reading_handler(State(state): State<AppState>, Path(sign): Path<String>) -> Response {
    let Some(sign) = zodiac::find(&sign) else {
        warn!(%sign, "Reading requested for unknown sign");
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": format!("unknown sign: {}", sign) })),
        )
            .into_response();
    };

    // Detached so a dropped HTTP connection cannot abandon the request mid-flight.
    match spawn_reading(&state.controller, sign).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            error!("Reading task failed: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Reading task failed").into_response()
        }
    }
}

fn spawn_reading(
    controller: &Arc<HoroscopeController>,
    sign: &'static ZodiacSign,
) -> tokio::task::JoinHandle<RequestState> {
    let controller = controller.clone();
    tokio::spawn(async move { controller.request_reading(sign).await })
}

// WebSocket upgrade handler
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    info!("WebSocket connection upgrade requested");
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

type WsSender = SplitSink<WebSocket, Message>;

async fn send_state(sender: &mut WsSender, current: &RequestState) -> bool {
    match serde_json::to_string(current) {
        Ok(json_msg) => sender.send(Message::Text(json_msg)).await.is_ok(),
        Err(e) => {
            error!("Failed to serialize request state: {}", e);
            true
        }
    }
}

#[derive(Debug, PartialEq)]
enum ClientFrame {
    Select(&'static ZodiacSign),
    Ignore,
    Close,
}

// A closed or failed stream ends the connection.
fn client_frame(incoming: Option<Result<Message, axum::Error>>) -> ClientFrame {
    let msg = match incoming {
        Some(Ok(msg)) => msg,
        Some(Err(e)) => {
            warn!("WebSocket receive error: {}", e);
            return ClientFrame::Close;
        }
        None => {
            info!("WebSocket client disconnected");
            return ClientFrame::Close;
        }
    };
    match msg {
        Message::Text(text) => match zodiac::find(&text) {
            Some(sign) => ClientFrame::Select(sign),
            None => {
                warn!(%text, "Ignoring WebSocket message for unknown sign");
                ClientFrame::Ignore
            }
        },
        Message::Binary(_) => {
            warn!("Received unexpected binary message from client");
            ClientFrame::Ignore
        }
        Message::Ping(_) | Message::Pong(_) => ClientFrame::Ignore,
        Message::Close(_) => {
            info!("Client requested WebSocket close");
            ClientFrame::Close
        }
    }
}

// Pushes every state change to the client. A text frame carrying a sign name
// or slug starts a reading, same as the POST endpoint.
async fn handle_socket(socket: WebSocket, state: AppState) {
    info!("New WebSocket connection established");
    let (mut sender, mut receiver) = socket.split();
    let mut updates = state.controller.subscribe();

    if !send_state(&mut sender, &state.controller.state()).await {
        warn!("Failed to send initial state to new WebSocket client");
        return;
    }

    loop {
        tokio::select! {
            Ok(current) = updates.recv() => {
                if !send_state(&mut sender, &current).await {
                    warn!("WebSocket client disconnected or send error. Closing connection.");
                    break;
                }
            }

            incoming = receiver.next() => match client_frame(incoming) {
                ClientFrame::Select(sign) => {
                    info!(sign = sign.name, "Reading requested over WebSocket");
                    // Result arrives through the update channel
                    drop(spawn_reading(&state.controller, sign));
                }
                ClientFrame::Ignore => {}
                ClientFrame::Close => break,
            },
        }
    }
    info!("WebSocket connection closed");
}

/// Builds the application router.
pub fn router(state: AppState, static_dir: impl AsRef<FsPath>) -> Router {
    let static_files_service = ServeDir::new(static_dir.as_ref()).not_found_service(
        tower::service_fn(|_req: axum::extract::Request| async {
            Ok::<_, std::convert::Infallible>(
                (StatusCode::NOT_FOUND, "Not Found").into_response(),
            )
        }),
    );

    Router::new()
        .route("/", get(index_handler))
        .route("/api/signs", get(signs_handler))
        .route("/api/state", get(state_handler))
        .route("/api/readings/:sign", post(reading_handler))
        .route("/ws", get(ws_handler))
        .nest_service("/static", static_files_service)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn start_web_server(
    port: u16,
    templates_dir: PathBuf,
    static_dir: PathBuf,
    controller: Arc<HoroscopeController>,
) -> Result<()> {
    let app = router(AppState::new(templates_dir, controller), static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_stream_ends_connection() {
        assert_eq!(client_frame(None), ClientFrame::Close);
        let err = axum::Error::new(std::io::Error::other("reset"));
        assert_eq!(client_frame(Some(Err(err))), ClientFrame::Close);
        assert_eq!(client_frame(Some(Ok(Message::Close(None)))), ClientFrame::Close);
    }

    #[test]
    fn test_text_frame_selects_sign() {
        let frame = client_frame(Some(Ok(Message::Text("koc".to_string()))));
        assert_eq!(frame, ClientFrame::Select(zodiac::find("Koç").unwrap()));
    }

    #[test]
    fn test_other_frames_are_ignored() {
        assert_eq!(
            client_frame(Some(Ok(Message::Text("ophiuchus".to_string())))),
            ClientFrame::Ignore
        );
        assert_eq!(client_frame(Some(Ok(Message::Binary(vec![1])))), ClientFrame::Ignore);
        assert_eq!(client_frame(Some(Ok(Message::Ping(vec![])))), ClientFrame::Ignore);
    }
}
