use crate::game::{
    Action, BoardStore, DRAW_THRESHOLD, Direction, Field, GameError, GameStatus, PawnColor, Step,
    Target, fields_of,
};
use tracing::{debug, info};

/// Turn flow and rule enforcement for one game of Seega.
///
/// The controller only keeps whose turn it is and how many moves went by
/// without a capture. Everything else is read from the board it was given,
/// so the phase and the result are derived from it. The one exception is
/// the end of placement: once the center has been cleared the game never
/// returns to placement, even when captures thin the board out again. Pass
/// `&mut board` to lend a board the caller keeps owning.
#[derive(Debug, Clone)]
pub struct GameController<B: BoardStore> {
    board: B,
    current_player_color: PawnColor,
    moves_without_taking: u32,
    placement_finished: bool,
}

impl<B: BoardStore> GameController<B> {
    pub fn new(board: B) -> Self {
        GameController {
            board,
            current_player_color: PawnColor::White,
            moves_without_taking: 0,
            placement_finished: false,
        }
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn into_board(self) -> B {
        self.board
    }

    pub fn current_player_color(&self) -> PawnColor {
        self.current_player_color
    }

    pub fn moves_without_taking(&self) -> u32 {
        self.moves_without_taking
    }

    /// Place a pawn of the current color on an empty field.
    pub fn execute_deploy(&mut self, field: Field) -> Result<(), GameError> {
        if !self.board.is_field_in_bounds(field) {
            return Err(GameError::OutOfBounds(Target::Field));
        }
        if !self.board.is_field_empty(field) {
            return Err(GameError::NotEmpty(Target::Field));
        }

        self.board.place_pawn(field, self.current_player_color);
        debug!(color = %self.current_player_color, %field, "deployed pawn");
        Ok(())
    }

    /// Slide the pawn on `field` one cell in `direction` and resolve captures
    /// around its new field. Returns whether anything was captured.
    pub fn execute_move(&mut self, field: Field, direction: Direction) -> Result<bool, GameError> {
        if !self.board.is_field_in_bounds(field) {
            return Err(GameError::OutOfBounds(Target::Field));
        }
        let desired = field
            .offset(direction)
            .filter(|&desired| self.board.is_field_in_bounds(desired))
            .ok_or(GameError::OutOfBounds(Target::DesiredField))?;
        if self.board.is_field_empty(field) {
            return Err(GameError::Empty(Target::Field));
        }
        if !self.board.is_field_empty(desired) {
            return Err(GameError::NotEmpty(Target::DesiredField));
        }
        if self.board.field_color(field) != self.current_player_color {
            return Err(GameError::PlayerMismatch);
        }

        let new_field = self.board.move_pawn_and_get_new_field(field, direction);
        let pawns_taken = self.board.take_opponent_pawns_and_get_result(new_field);
        if pawns_taken {
            self.moves_without_taking = 0;
        } else {
            self.moves_without_taking += 1;
        }

        debug!(
            color = %self.current_player_color,
            from = %field,
            to = %new_field,
            pawns_taken,
            moves_without_taking = self.moves_without_taking,
            "moved pawn"
        );
        Ok(pawns_taken)
    }

    /// Empty the center field; called once when placement is over.
    pub fn proceed_to_next_phase(&mut self) {
        if let Some(center) = Field::center_of(self.board.size()) {
            self.board.remove_pawn(center);
            info!(%center, "placement finished, center cleared");
        }
        self.placement_finished = true;
    }

    /// Placement continues until every field but one is occupied.
    pub fn is_phase_one(&self) -> bool {
        let size = self.board.size();
        !self.placement_finished
            && self.board.white_pawns() + self.board.black_pawns() + 1 < size * size
    }

    /// Movement continues while both sides have pawns and the game has not
    /// stalled for `DRAW_THRESHOLD` moves.
    pub fn is_phase_two(&self) -> bool {
        self.board.white_pawns() > 0
            && self.board.black_pawns() > 0
            && self.moves_without_taking < DRAW_THRESHOLD
    }

    /// `Empty` both while the game is running and after a draw; check
    /// `is_phase_two` to tell them apart.
    pub fn who_won(&self) -> PawnColor {
        if self.board.white_pawns() == 0 {
            PawnColor::Black
        } else if self.board.black_pawns() == 0 {
            PawnColor::White
        } else {
            PawnColor::Empty
        }
    }

    pub fn change_color(&mut self) {
        self.current_player_color = self.current_player_color.opposite();
    }

    pub fn status(&self) -> GameStatus {
        if self.is_phase_one() {
            GameStatus::Placement
        } else if self.is_phase_two() {
            GameStatus::Movement
        } else {
            match self.who_won() {
                PawnColor::Empty => GameStatus::Drawn,
                winner => GameStatus::Won(winner),
            }
        }
    }

    /// Every field `execute_deploy` would accept.
    pub fn legal_deploys(&self) -> Vec<Field> {
        fields_of(self.board.size())
            .filter(|&field| self.board.is_field_empty(field))
            .collect()
    }

    /// Every step `execute_move` would accept for the current player.
    pub fn legal_moves(&self) -> Vec<Step> {
        let mut steps = Vec::new();

        for from in fields_of(self.board.size()) {
            if self.board.field_color(from) != self.current_player_color {
                continue;
            }
            for direction in Direction::ALL {
                let open = from
                    .offset(direction)
                    .filter(|&to| self.board.is_field_in_bounds(to))
                    .is_some_and(|to| self.board.is_field_empty(to));
                if open {
                    steps.push(Step::new(from, direction));
                }
            }
        }

        steps
    }

    /// Legal actions for the current player in the current phase.
    pub fn legal_actions(&self) -> Vec<Action> {
        match self.status() {
            GameStatus::Placement => self
                .legal_deploys()
                .into_iter()
                .map(Action::Deploy)
                .collect(),
            GameStatus::Movement => self.legal_moves().into_iter().map(Action::Move).collect(),
            GameStatus::Won(_) | GameStatus::Drawn => Vec::new(),
        }
    }

    /// Execute one action and hand the turn to the other player.
    ///
    /// Deploys are only accepted during placement and moves only during
    /// movement. The center is cleared exactly once, right after the deploy
    /// that fills the board. Returns whether the action captured anything.
    pub fn play(&mut self, action: Action) -> Result<bool, GameError> {
        let status = self.status();
        if status.is_finished() {
            return Err(GameError::GameOver);
        }

        let pawns_taken = match (status, action) {
            (GameStatus::Placement, Action::Deploy(field)) => {
                self.execute_deploy(field)?;
                if !self.is_phase_one() {
                    self.proceed_to_next_phase();
                }
                false
            }
            (GameStatus::Movement, Action::Move(step)) => {
                self.execute_move(step.from, step.direction)?
            }
            _ => return Err(GameError::WrongPhase),
        };

        match self.status() {
            GameStatus::Won(winner) => info!(%winner, "game won"),
            GameStatus::Drawn => info!(
                moves_without_taking = self.moves_without_taking,
                "game drawn"
            ),
            GameStatus::Placement | GameStatus::Movement => {}
        }

        self.change_color();
        Ok(pawns_taken)
    }

    /// Pass the turn without acting, for a player with no legal move.
    pub fn pass(&mut self) {
        debug!(color = %self.current_player_color, "passed");
        self.change_color();
    }
}
