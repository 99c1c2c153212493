use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::control::Control;
use crate::error::SessionError;
use crate::game::{BOARD_COLS, BOARD_ROWS, Coord, Side};
use crate::session::Session;

#[derive(Clone)]
pub struct AppState {
    session: Arc<Mutex<Session>>,
}

impl AppState {
    /// Host `session`, first letting any automated side make its moves. Those
    /// moves show up as messages in the first response.
    pub fn new(mut session: Session) -> Self {
        if let Err(e) = session.run_automated_turns() {
            warn!(error = %e, "automated play stopped before serving");
        }
        AppState {
            session: Arc::new(Mutex::new(session)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        // a poisoned lock still holds a usable session
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Serialize, Deserialize, Default)]
pub struct NewGameRequest {
    #[serde(default)]
    setup: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct MoveRequest {
    mv: String,
}

#[derive(Serialize, Deserialize)]
pub struct ControlRequest {
    control: Control,
}

#[derive(Serialize, Deserialize)]
pub struct StrengthRequest {
    sente: f64,
    gote: Option<f64>,
}

#[derive(Serialize, Deserialize)]
pub struct StrengthsResponse {
    sente: f64,
    gote: f64,
}

#[derive(Serialize, Deserialize)]
pub struct GameResponse {
    /// Rows from 1 to 4, each cell a piece letter or "."
    board: Vec<Vec<String>>,
    setup: String,
    side_to_move: Side,
    move_number: u32,
    legal_moves: Vec<String>,
    control: Control,
    strengths: StrengthsResponse,
    /// Events since the previous request
    messages: Vec<String>,
}

fn game_response(session: &mut Session) -> GameResponse {
    let position = *session.position();

    let board = (0..BOARD_ROWS as u8)
        .map(|row| {
            (0..BOARD_COLS as u8)
                .map(|col| match position.get(Coord::new(row, col)) {
                    Some(cell) if cell.owner == Side::Sente => cell.piece.letter().to_string(),
                    Some(cell) => cell.piece.letter().to_ascii_lowercase().to_string(),
                    None => ".".to_string(),
                })
                .collect()
        })
        .collect();

    GameResponse {
        board,
        setup: position.to_setup_string(),
        side_to_move: position.side_to_move(),
        move_number: session.move_number(),
        legal_moves: position
            .legal_moves()
            .into_iter()
            .map(|mv| position.move_string(mv))
            .collect(),
        control: session.control(),
        strengths: StrengthsResponse {
            sente: session.strength(Side::Sente),
            gote: session.strength(Side::Gote),
        },
        messages: session
            .drain_events()
            .iter()
            .map(|event| event.to_string())
            .collect(),
    }
}

/// Run `action` against the session and answer with the resulting state, or
/// with a 400 carrying the error
fn respond<F>(app_state: &AppState, action: F) -> Response
where
    F: FnOnce(&mut Session) -> Result<(), SessionError>,
{
    let mut session = app_state.lock();
    match action(&mut session) {
        Ok(()) => Json(game_response(&mut session)).into_response(),
        Err(e) => {
            let messages: Vec<String> = session
                .drain_events()
                .iter()
                .map(|event| event.to_string())
                .collect();
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": e.to_string(),
                    "messages": messages,
                })),
            )
                .into_response()
        }
    }
}

async fn get_game_state(State(app_state): State<AppState>) -> Json<GameResponse> {
    let mut session = app_state.lock();
    Json(game_response(&mut session))
}

#[axum::debug_handler]
async fn new_game(State(app_state): State<AppState>, Json(req): Json<NewGameRequest>) -> Response {
    respond(&app_state, |session| match req.setup.as_deref() {
        Some(setup) => session.setup(setup),
        None => {
            session.new_game();
            Ok(())
        }
    })
}

#[axum::debug_handler]
async fn make_move(State(app_state): State<AppState>, Json(req): Json<MoveRequest>) -> Response {
    respond(&app_state, |session| session.play_notation(&req.mv))
}

async fn undo(State(app_state): State<AppState>) -> Response {
    respond(&app_state, |session| session.undo())
}

#[axum::debug_handler]
async fn set_control(State(app_state): State<AppState>, Json(req): Json<ControlRequest>) -> Response {
    respond(&app_state, |session| {
        session.set_control(req.control);
        session.run_automated_turns()
    })
}

#[axum::debug_handler]
async fn set_strength(State(app_state): State<AppState>, Json(req): Json<StrengthRequest>) -> Response {
    respond(&app_state, |session| {
        session.set_strengths(req.sente, req.gote.unwrap_or(req.sente))
    })
}

pub fn router(app_state: AppState, static_dir: Option<PathBuf>) -> Router {
    let app = Router::new()
        .route("/api/game-state", get(get_game_state))
        .route("/api/new-game", post(new_game))
        .route("/api/move", post(make_move))
        .route("/api/undo", post(undo))
        .route("/api/control", post(set_control))
        .route("/api/strength", post(set_strength));

    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    };

    app.layer(TraceLayer::new_for_http()).with_state(app_state)
}

pub async fn run_server(
    session: Session,
    addr: SocketAddr,
    static_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(AppState::new(session), static_dir);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "web server listening");
    println!("Web server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
