use crate::board::Board;
use crate::bot::Bot;
use crate::controller::GameController;
use crate::game::{Action, GameStatus, PawnColor, Variant};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub time_per_move: Duration,
    /// Upper bound on deploys, moves and passes; reaching it is a draw.
    pub max_actions: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            time_per_move: Duration::from_secs(5),
            max_actions: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    Win {
        color: PawnColor,
        winner_name: String,
        actions: usize,
    },
    Draw {
        actions: usize,
    },
    Timeout {
        violator: String,
        winner: String,
    },
    IllegalMove {
        violator: String,
        winner: String,
    },
}

impl MatchResult {
    pub fn winner(&self) -> Option<&str> {
        match self {
            MatchResult::Win { winner_name, .. } => Some(winner_name),
            MatchResult::Timeout { winner, .. } => Some(winner),
            MatchResult::IllegalMove { winner, .. } => Some(winner),
            MatchResult::Draw { .. } => None,
        }
    }
}

/// One game between two bots, white moving first.
pub struct Match {
    config: MatchConfig,
    game: GameController<Board>,
    white_bot: Box<dyn Bot>,
    black_bot: Box<dyn Bot>,
    actions: usize,
}

impl Match {
    pub fn new(white_bot: Box<dyn Bot>, black_bot: Box<dyn Bot>, config: MatchConfig) -> Self {
        Self::with_variant(white_bot, black_bot, config, Variant::Small)
    }

    pub fn with_variant(
        white_bot: Box<dyn Bot>,
        black_bot: Box<dyn Bot>,
        config: MatchConfig,
        variant: Variant,
    ) -> Self {
        Match {
            config,
            game: GameController::new(Board::new(variant)),
            white_bot,
            black_bot,
            actions: 0,
        }
    }

    pub fn game(&self) -> &GameController<Board> {
        &self.game
    }

    pub fn play(&mut self) -> MatchResult {
        // Notify bots that game is starting
        self.white_bot.game_start(PawnColor::White);
        self.black_bot.game_start(PawnColor::Black);

        info!(
            variant = self.game.board().variant().name(),
            white = self.white_bot.name(),
            black = self.black_bot.name(),
            "match starting"
        );

        while !self.game.status().is_finished() && self.actions < self.config.max_actions {
            if let Some(result) = self.play_turn() {
                self.white_bot.game_end();
                self.black_bot.game_end();
                return result;
            }
        }

        // Game ended normally
        self.white_bot.game_end();
        self.black_bot.game_end();

        let actions = self.actions;
        match self.game.status() {
            GameStatus::Won(color) => {
                let winner_name = self.bot_name(color).to_string();
                info!(%color, winner = %winner_name, actions, "match won");
                MatchResult::Win {
                    color,
                    winner_name,
                    actions,
                }
            }
            GameStatus::Drawn => {
                info!(actions, "match drawn by inactivity");
                MatchResult::Draw { actions }
            }
            GameStatus::Placement | GameStatus::Movement => {
                info!(max_actions = self.config.max_actions, "action limit reached, draw");
                MatchResult::Draw { actions }
            }
        }
    }

    fn bot_name(&self, color: PawnColor) -> &str {
        match color {
            PawnColor::Black => self.black_bot.name(),
            _ => self.white_bot.name(),
        }
    }

    fn play_turn(&mut self) -> Option<MatchResult> {
        let current = self.game.current_player_color();

        // A side boxed in during movement has to let the other one play
        if self.game.legal_actions().is_empty() {
            debug!(color = %current, "no legal action, passing");
            self.game.pass();
            self.actions += 1;
            return None;
        }

        let bot = match current {
            PawnColor::Black => &mut self.black_bot,
            _ => &mut self.white_bot,
        };

        // Get action from bot with time limit
        let start = Instant::now();
        let action = bot.choose_action(&self.game, self.config.time_per_move);
        let elapsed = start.elapsed();

        self.handle_action(action, elapsed, current)
    }

    fn handle_action(
        &mut self,
        action: Option<Action>,
        elapsed: Duration,
        current: PawnColor,
    ) -> Option<MatchResult> {
        let bot_name = self.bot_name(current).to_string();
        let opponent_name = self.bot_name(current.opposite()).to_string();

        // Check timeout
        if elapsed > self.config.time_per_move {
            warn!(
                bot = %bot_name,
                ?elapsed,
                limit = ?self.config.time_per_move,
                "timeout"
            );
            return Some(MatchResult::Timeout {
                violator: bot_name,
                winner: opponent_name,
            });
        }

        // A bot that gives up while it still has legal actions forfeits
        let Some(action) = action else {
            warn!(bot = %bot_name, "returned no action");
            return Some(MatchResult::IllegalMove {
                violator: bot_name,
                winner: opponent_name,
            });
        };

        debug!(bot = %bot_name, %action, ?elapsed, "bot played");

        if let Err(e) = self.game.play(action) {
            warn!(bot = %bot_name, %action, error = %e, "illegal action");
            return Some(MatchResult::IllegalMove {
                violator: bot_name,
                winner: opponent_name,
            });
        }
        self.actions += 1;

        // Notify both bots of the action
        self.white_bot.notify_action(action);
        self.black_bot.notify_action(action);

        debug!("\n{}", self.game.board().display_board());

        None
    }
}
