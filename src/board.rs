use crate::game::{BoardStore, Direction, Field, MAX_BOARD_SIZE, PawnColor, Variant, fields_of};
use serde::{Deserialize, Serialize};

/// Seega board of odd size with running pawn counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [[PawnColor; MAX_BOARD_SIZE]; MAX_BOARD_SIZE],
    variant: Variant,
    size: usize,
    white_pawns: usize,
    black_pawns: usize,
}

impl Board {
    /// Create an empty board for the given variant
    pub fn new(variant: Variant) -> Self {
        Board {
            cells: [[PawnColor::Empty; MAX_BOARD_SIZE]; MAX_BOARD_SIZE],
            variant,
            size: variant.board_size(),
            white_pawns: 0,
            black_pawns: 0,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// The single middle cell, which starts the movement phase empty.
    pub fn center(&self) -> Option<Field> {
        Field::center_of(self.size)
    }

    /// All fields row by row, from `a1` upwards.
    pub fn fields(&self) -> impl Iterator<Item = Field> + use<> {
        fields_of(self.size)
    }

    /// Array indices of an in-bounds field.
    fn index(&self, field: Field) -> Option<(usize, usize)> {
        let col = field.col_index()?;
        if col < self.size && field.row >= 1 && field.row <= self.size {
            Some((field.row - 1, col))
        } else {
            None
        }
    }

    fn get(&self, field: Field) -> PawnColor {
        match self.index(field) {
            Some((row, col)) => self.cells[row][col],
            None => PawnColor::Empty,
        }
    }

    fn set(&mut self, field: Field, color: PawnColor) {
        let Some((row, col)) = self.index(field) else {
            return;
        };

        match self.cells[row][col] {
            PawnColor::White => self.white_pawns -= 1,
            PawnColor::Black => self.black_pawns -= 1,
            PawnColor::Empty => {}
        }
        match color {
            PawnColor::White => self.white_pawns += 1,
            PawnColor::Black => self.black_pawns += 1,
            PawnColor::Empty => {}
        }
        self.cells[row][col] = color;
    }

    /// Check whether the pawn on `mover` flanks the neighbour in `direction`
    fn can_capture(&self, mover: Field, direction: Direction) -> Option<Field> {
        let color = self.get(mover);
        if color == PawnColor::Empty {
            return None;
        }

        let target = mover.offset(direction)?;
        let opposite = target.offset(direction)?;

        if self.get(target) == color.opposite() && self.get(opposite) == color {
            Some(target)
        } else {
            None
        }
    }

    /// Get a string representation of the board
    pub fn display_board(&self) -> String {
        let mut result = String::new();
        result.push_str(&format!("[{}]\n", self.variant.name()));

        for row in (1..=self.size).rev() {
            result.push_str(&format!("{:2} ", row));
            for field in (0..self.size).filter_map(|col| Field::from_index(col, row)) {
                result.push_str(&format!(" {} ", self.get(field).symbol()));
            }
            result.push('\n');
        }

        result.push_str("   ");
        for field in (0..self.size).filter_map(|col| Field::from_index(col, 1)) {
            result.push_str(&format!(" {} ", field.col));
        }
        result.push('\n');

        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(Variant::Small)
    }
}

impl BoardStore for Board {
    fn size(&self) -> usize {
        self.size
    }

    fn white_pawns(&self) -> usize {
        self.white_pawns
    }

    fn black_pawns(&self) -> usize {
        self.black_pawns
    }

    fn is_field_in_bounds(&self, field: Field) -> bool {
        self.index(field).is_some()
    }

    fn is_field_empty(&self, field: Field) -> bool {
        self.get(field) == PawnColor::Empty
    }

    fn field_color(&self, field: Field) -> PawnColor {
        self.get(field)
    }

    fn place_pawn(&mut self, field: Field, color: PawnColor) {
        self.set(field, color);
    }

    fn move_pawn_and_get_new_field(&mut self, field: Field, direction: Direction) -> Field {
        let Some(destination) = field
            .offset(direction)
            .filter(|&to| self.is_field_in_bounds(to))
        else {
            return field;
        };

        let color = self.get(field);
        self.set(field, PawnColor::Empty);
        self.set(destination, color);
        destination
    }

    fn take_opponent_pawns_and_get_result(&mut self, field: Field) -> bool {
        let captured: Vec<Field> = Direction::ALL
            .iter()
            .filter_map(|&direction| self.can_capture(field, direction))
            .collect();

        for &target in &captured {
            self.set(target, PawnColor::Empty);
        }

        !captured.is_empty()
    }

    fn remove_pawn(&mut self, field: Field) {
        self.set(field, PawnColor::Empty);
    }
}
