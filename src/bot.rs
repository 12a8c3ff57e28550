use crate::board::Board;
use crate::controller::GameController;
use crate::game::{Action, BoardStore, Direction, PawnColor};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::time::Duration;

/// Trait that all bots must implement
pub trait Bot: Send {
    /// Get the name of the bot
    fn name(&self) -> &str;

    /// Choose the next action for the player whose turn it is.
    /// Returning `None` means the bot has nothing to play.
    fn choose_action(
        &mut self,
        game: &GameController<Board>,
        time_limit: Duration,
    ) -> Option<Action>;

    /// Notified when the game starts
    fn game_start(&mut self, _color: PawnColor) {}

    /// Notified when an action is played (by either player)
    fn notify_action(&mut self, _action: Action) {}

    /// Notified when the game ends
    fn game_end(&mut self) {}
}

/// Plays a uniformly random legal action
pub struct RandomBot {
    name: String,
    rng: StdRng,
}

impl RandomBot {
    pub fn new(name: String) -> Self {
        RandomBot {
            name,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(name: String, seed: u64) -> Self {
        RandomBot {
            name,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Bot for RandomBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_action(
        &mut self,
        game: &GameController<Board>,
        _time_limit: Duration,
    ) -> Option<Action> {
        game.legal_actions().choose(&mut self.rng).copied()
    }
}

/// A simple greedy bot that tries to capture pawns
pub struct GreedyBot {
    name: String,
}

impl GreedyBot {
    pub fn new(name: String) -> Self {
        GreedyBot { name }
    }

    fn evaluate_action(&self, game: &GameController<Board>, action: Action) -> i32 {
        let me = game.current_player_color();
        let board = game.board();

        match action {
            // Deploy next to opponent pawns, away from the center
            Action::Deploy(field) => {
                if Some(field) == board.center() {
                    return -10;
                }
                Direction::ALL
                    .iter()
                    .filter_map(|&direction| field.offset(direction))
                    .filter(|&neighbour| board.is_field_in_bounds(neighbour))
                    .map(|neighbour| match board.field_color(neighbour) {
                        color if color == me.opposite() => 2,
                        color if color == me => 1,
                        _ => 0,
                    })
                    .sum()
            }
            Action::Move(step) => {
                let mut temp_game = game.clone();
                if temp_game.execute_move(step.from, step.direction).is_err() {
                    return i32::MIN;
                }

                let temp_board = temp_game.board();
                let (mine, theirs) = match me {
                    PawnColor::White => (temp_board.white_pawns(), temp_board.black_pawns()),
                    _ => (temp_board.black_pawns(), temp_board.white_pawns()),
                };

                if theirs == 0 {
                    return 1000; // Wiping out the opponent is winning
                }
                mine as i32 - 2 * theirs as i32
            }
        }
    }
}

impl Bot for GreedyBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_action(
        &mut self,
        game: &GameController<Board>,
        _time_limit: Duration,
    ) -> Option<Action> {
        // Find the action with the best evaluation
        game.legal_actions()
            .into_iter()
            .max_by_key(|&action| self.evaluate_action(game, action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Field, GameStatus, Step, Variant};

    fn f(s: &str) -> Field {
        s.parse().unwrap()
    }

    /// Helper to build a 5x5 movement-phase game from `(field, color)` pairs
    fn movement_game(pawns: &[(&str, PawnColor)]) -> GameController<Board> {
        let mut board = Board::new(Variant::Small);
        for &(field, color) in pawns {
            board.place_pawn(f(field), color);
        }
        let mut game = GameController::new(board);
        game.proceed_to_next_phase();
        game
    }

    #[test]
    fn test_random_bot_plays_legal_deploys() {
        let mut bot = RandomBot::with_seed("Random".to_string(), 7);
        let game = GameController::new(Board::new(Variant::Small));

        for _ in 0..20 {
            let action = bot.choose_action(&game, Duration::from_secs(1)).unwrap();
            assert!(game.legal_actions().contains(&action));
            assert!(matches!(action, Action::Deploy(_)));
        }
    }

    #[test]
    fn test_random_bot_is_reproducible_with_seed() {
        let game = GameController::new(Board::new(Variant::Medium));
        let mut first = RandomBot::with_seed("A".to_string(), 42);
        let mut second = RandomBot::with_seed("B".to_string(), 42);

        for _ in 0..10 {
            assert_eq!(
                first.choose_action(&game, Duration::from_secs(1)),
                second.choose_action(&game, Duration::from_secs(1))
            );
        }
    }

    #[test]
    fn test_bots_return_none_when_finished() {
        let game = movement_game(&[("a1", PawnColor::White)]);
        assert!(game.status().is_finished());

        let mut random = RandomBot::with_seed("Random".to_string(), 1);
        let mut greedy = GreedyBot::new("Greedy".to_string());
        assert_eq!(random.choose_action(&game, Duration::from_secs(1)), None);
        assert_eq!(greedy.choose_action(&game, Duration::from_secs(1)), None);
    }

    #[test]
    fn test_greedy_bot_takes_capture() {
        // W B . on row 1, white can capture by sliding c2 -> c1
        let game = movement_game(&[
            ("a1", PawnColor::White),
            ("b1", PawnColor::Black),
            ("c2", PawnColor::White),
            ("e5", PawnColor::Black),
        ]);
        assert_eq!(game.status(), GameStatus::Movement);

        let mut bot = GreedyBot::new("Greedy".to_string());
        let action = bot.choose_action(&game, Duration::from_secs(1));

        assert_eq!(action, Some(Action::Move(Step::new(f("c2"), Direction::Down))));
    }

    #[test]
    fn test_greedy_bot_deploys_next_to_opponent() {
        let mut board = Board::new(Variant::Small);
        board.place_pawn(f("a1"), PawnColor::White);
        board.place_pawn(f("e5"), PawnColor::Black);
        let game = GameController::new(board);

        let mut bot = GreedyBot::new("Greedy".to_string());
        let Some(Action::Deploy(field)) = bot.choose_action(&game, Duration::from_secs(1)) else {
            panic!("expected a deploy");
        };

        assert!(field == f("d5") || field == f("e4"));
    }
}
