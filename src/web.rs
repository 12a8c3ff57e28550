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
use std::sync::{Arc, Mutex};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::board::Board;
use crate::bot::{Bot, GreedyBot, RandomBot};
use crate::controller::GameController;
use crate::game::{
    Action, BoardStore, Direction, Field, GameError, GameStatus, PawnColor, Step, Variant,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BotType {
    Greedy,
    Random,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            static_dir: PathBuf::from("static"),
        }
    }
}

/// One game per server, every request goes through the mutex.
#[derive(Clone)]
pub struct AppState {
    game: Arc<Mutex<WebGame>>,
}

struct WebGame {
    controller: GameController<Board>,
    player_color: PawnColor,
    bot_type: BotType,
}

#[derive(Serialize, Deserialize)]
pub struct NewGameRequest {
    variant: String,
    player_color: String,
    bot_type: String,
}

#[derive(Serialize, Deserialize)]
pub struct DeployRequest {
    col: char,
    row: usize,
}

#[derive(Serialize, Deserialize)]
pub struct MoveRequest {
    col: char,
    row: usize,
    direction: Direction,
}

#[derive(Serialize, Deserialize)]
pub struct GameResponse {
    board: Vec<Vec<String>>,
    current_player: String,
    player_color: String,
    status: GameStatus,
    winner: Option<String>,
    moves_without_taking: u32,
    legal_actions: Vec<Action>,
    variant: String,
    message: String,
}

impl AppState {
    pub fn new() -> Self {
        let game = WebGame {
            controller: GameController::new(Board::new(Variant::Small)),
            player_color: PawnColor::White,
            bot_type: BotType::Greedy,
        };
        AppState {
            game: Arc::new(Mutex::new(game)),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

fn create_bot(bot_type: &str) -> BotType {
    match bot_type.to_lowercase().as_str() {
        "greedy" => BotType::Greedy,
        "random" => BotType::Random,
        _ => BotType::Greedy,
    }
}

fn get_bot_instance(bot_type: BotType) -> Box<dyn Bot> {
    match bot_type {
        BotType::Greedy => Box::new(GreedyBot::new("Greedy Bot".to_string())),
        BotType::Random => Box::new(RandomBot::new("Random Bot".to_string())),
    }
}

fn error_response(error: &GameError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "error": error.to_string()
        })),
    )
        .into_response()
}

impl WebGame {
    /// Let the bot play until it is the human's turn again or the game is over.
    /// Turns the human cannot play are passed.
    fn run_bot(&mut self) -> String {
        let mut bot = get_bot_instance(self.bot_type);
        let mut played = Vec::new();
        let mut passes = 0;

        // Two passes in a row means neither side can move
        while !self.controller.status().is_finished() && passes < 2 {
            if self.controller.legal_actions().is_empty() {
                self.controller.pass();
                passes += 1;
                continue;
            }
            if self.controller.current_player_color() == self.player_color {
                break;
            }

            let Some(action) =
                bot.choose_action(&self.controller, std::time::Duration::from_secs(5))
            else {
                self.controller.pass();
                passes += 1;
                continue;
            };
            if let Err(e) = self.controller.play(action) {
                debug!(%action, error = %e, "bot action rejected");
                self.controller.pass();
                passes += 1;
                continue;
            }
            debug!(%action, "bot played");
            played.push(action.to_string());
            passes = 0;
        }

        if played.is_empty() {
            "Your turn!".to_string()
        } else {
            format!("Bot played: {}", played.join(", "))
        }
    }

    fn apply(&mut self, action: Action) -> Result<String, GameError> {
        if self.controller.status().is_finished() {
            return Err(GameError::GameOver);
        }
        if self.controller.current_player_color() != self.player_color {
            return Err(GameError::PlayerMismatch);
        }
        self.controller.play(action)?;
        Ok(self.run_bot())
    }

    fn response(&self, message: String) -> GameResponse {
        let board = self.controller.board();
        let size = board.size();

        let rows = (1..=size)
            .rev()
            .map(|row| {
                (0..size)
                    .filter_map(|col| Field::from_index(col, row))
                    .map(|field| board.field_color(field).symbol().to_string())
                    .collect()
            })
            .collect();

        let status = self.controller.status();
        let legal_actions = if self.controller.current_player_color() == self.player_color {
            self.controller.legal_actions()
        } else {
            Vec::new()
        };

        GameResponse {
            board: rows,
            current_player: self.controller.current_player_color().to_string(),
            player_color: self.player_color.to_string(),
            status,
            winner: match status {
                GameStatus::Won(color) => Some(color.to_string()),
                _ => None,
            },
            moves_without_taking: self.controller.moves_without_taking(),
            legal_actions,
            variant: board.variant().name().to_string(),
            message,
        }
    }
}

#[axum::debug_handler]
async fn new_game(State(app_state): State<AppState>, Json(req): Json<NewGameRequest>) -> Response {
    let variant = req.variant.parse().unwrap_or(Variant::Small);
    let player_color = req.player_color.parse().unwrap_or(PawnColor::White);
    let bot_type = create_bot(&req.bot_type);

    let mut game = app_state.game.lock().expect("game lock poisoned");
    game.controller = GameController::new(Board::new(variant));
    game.player_color = player_color;
    game.bot_type = bot_type;
    info!(variant = variant.name(), %player_color, ?bot_type, "new game");

    // If bot goes first, make its move
    let message = game.run_bot();
    Json(game.response(message)).into_response()
}

#[axum::debug_handler]
async fn deploy(State(app_state): State<AppState>, Json(req): Json<DeployRequest>) -> Response {
    let mut game = app_state.game.lock().expect("game lock poisoned");

    match game.apply(Action::Deploy(Field::new(req.col, req.row))) {
        Ok(message) => Json(game.response(message)).into_response(),
        Err(e) => error_response(&e),
    }
}

#[axum::debug_handler]
async fn make_move(State(app_state): State<AppState>, Json(req): Json<MoveRequest>) -> Response {
    let mut game = app_state.game.lock().expect("game lock poisoned");

    let step = Step::new(Field::new(req.col, req.row), req.direction);
    match game.apply(Action::Move(step)) {
        Ok(message) => Json(game.response(message)).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn get_game_state(State(app_state): State<AppState>) -> Json<GameResponse> {
    let game = app_state.game.lock().expect("game lock poisoned");
    Json(game.response(String::new()))
}

pub fn router(app_state: AppState, static_dir: PathBuf) -> Router {
    Router::new()
        .route("/api/new-game", post(new_game))
        .route("/api/deploy", post(deploy))
        .route("/api/move", post(make_move))
        .route("/api/game-state", get(get_game_state))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(AppState::new(), config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "web server running");

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_router() -> Router {
        router(AppState::new(), PathBuf::from("static"))
    }

    async fn post_json(
        app: Router,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_initial_game_state() {
        let response = test_router()
            .oneshot(Request::builder().uri("/api/game-state").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let state: GameResponse = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(state.board.len(), 5);
        assert_eq!(state.current_player, "White");
        assert_eq!(state.status, GameStatus::Placement);
        assert_eq!(state.legal_actions.len(), 25);
    }

    #[tokio::test]
    async fn test_deploy_lets_bot_answer() {
        let app = test_router();

        let (status, body) = post_json(
            app.clone(),
            "/api/deploy",
            serde_json::json!({ "col": "a", "row": 1 }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_player"], "White");
        assert_eq!(body["board"][4][0], "W");
        assert!(body["message"].as_str().unwrap().starts_with("Bot played: deploy"));
    }

    #[tokio::test]
    async fn test_deploy_onto_occupied_field_is_rejected() {
        let app = test_router();

        post_json(
            app.clone(),
            "/api/deploy",
            serde_json::json!({ "col": "b", "row": 2 }),
        )
        .await;
        let (status, body) = post_json(
            app,
            "/api/deploy",
            serde_json::json!({ "col": "b", "row": 2 }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Field is not empty.");
    }

    #[tokio::test]
    async fn test_move_during_placement_is_rejected() {
        let (status, body) = post_json(
            test_router(),
            "/api/move",
            serde_json::json!({ "col": "a", "row": 1, "direction": "Up" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Action not allowed in the current phase.");
    }

    #[tokio::test]
    async fn test_new_game_as_black_starts_with_bot_deploy() {
        let (status, body) = post_json(
            test_router(),
            "/api/new-game",
            serde_json::json!({ "variant": "medium", "player_color": "black", "bot_type": "random" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["board"].as_array().unwrap().len(), 7);
        assert_eq!(body["current_player"], "Black");
        assert_eq!(body["player_color"], "Black");
        assert_eq!(body["legal_actions"].as_array().unwrap().len(), 48);
    }

    #[test]
    fn test_bot_keeps_playing_while_human_is_boxed_in() {
        // White a1 cannot move and sits in a corner, so it can never be taken
        let mut board = Board::new(Variant::Small);
        board.place_pawn(Field::new('a', 1), PawnColor::White);
        board.place_pawn(Field::new('b', 1), PawnColor::Black);
        board.place_pawn(Field::new('a', 2), PawnColor::Black);
        board.place_pawn(Field::new('e', 5), PawnColor::Black);
        let mut controller = GameController::new(board);
        controller.proceed_to_next_phase();
        let mut game = WebGame {
            controller,
            player_color: PawnColor::White,
            bot_type: BotType::Random,
        };

        let message = game.run_bot();

        assert!(message.starts_with("Bot played: move"));
        assert_eq!(game.controller.board().white_pawns(), 1);
        let human_can_act = game.controller.current_player_color() == PawnColor::White
            && !game.controller.legal_actions().is_empty();
        assert!(human_can_act || game.controller.status() == GameStatus::Drawn);
    }
}
