use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Board size constants
pub const SMALL_SIZE: usize = 5;
pub const MEDIUM_SIZE: usize = 7;
pub const LARGE_SIZE: usize = 9;
pub const MAX_BOARD_SIZE: usize = 9;

/// Number of consecutive moves without a capture that ends the game in a draw.
pub const DRAW_THRESHOLD: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    Small,  // 5x5, the common village board
    Medium, // 7x7
    Large,  // 9x9
}

impl Variant {
    pub fn board_size(&self) -> usize {
        match self {
            Variant::Small => SMALL_SIZE,
            Variant::Medium => MEDIUM_SIZE,
            Variant::Large => LARGE_SIZE,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Variant::Small => "Seega 5x5",
            Variant::Medium => "Seega 7x7",
            Variant::Large => "Seega 9x9",
        }
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "small" | "5" => Ok(Variant::Small),
            "medium" | "7" => Ok(Variant::Medium),
            "large" | "9" => Ok(Variant::Large),
            other => Err(format!("unknown variant '{}'", other)),
        }
    }
}

/// Content of a single cell, also used to name the players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PawnColor {
    Empty,
    White,
    Black,
}

impl PawnColor {
    /// White and Black swap; `Empty` has no opponent and maps to itself.
    pub fn opposite(self) -> PawnColor {
        match self {
            PawnColor::White => PawnColor::Black,
            PawnColor::Black => PawnColor::White,
            PawnColor::Empty => PawnColor::Empty,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            PawnColor::Empty => '.',
            PawnColor::White => 'W',
            PawnColor::Black => 'B',
        }
    }
}

impl fmt::Display for PawnColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PawnColor::Empty => f.write_str("Empty"),
            PawnColor::White => f.write_str("White"),
            PawnColor::Black => f.write_str("Black"),
        }
    }
}

impl FromStr for PawnColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "white" | "w" => Ok(PawnColor::White),
            "black" | "b" => Ok(PawnColor::Black),
            other => Err(format!("unknown color '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// `(col_offset, row_offset)`; rows grow upwards.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

/// A board coordinate: column letter starting at `'a'`, row starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub col: char,
    pub row: usize,
}

impl Field {
    pub fn new(col: char, row: usize) -> Self {
        Field { col, row }
    }

    /// Zero-based column index, `None` for anything before `'a'`.
    pub fn col_index(&self) -> Option<usize> {
        (self.col as u32)
            .checked_sub('a' as u32)
            .map(|index| index as usize)
    }

    /// Field at zero-based column `col` and one-based `row`, `None` when no
    /// character lies that far past `'a'`.
    pub fn from_index(col: usize, row: usize) -> Option<Field> {
        let col = u32::try_from(col)
            .ok()
            .and_then(|col| col.checked_add('a' as u32))
            .and_then(char::from_u32)?;
        Some(Field { col, row })
    }

    /// The middle field of a board with `size` rows.
    pub fn center_of(size: usize) -> Option<Field> {
        let half = size / 2;
        Field::from_index(half, half + 1)
    }

    /// The neighbouring field in `direction`, or `None` when it cannot be
    /// represented at all (it is then out of bounds on any board).
    pub fn offset(self, direction: Direction) -> Option<Field> {
        let (dc, dr) = direction.offset();
        let col = (self.col as u32)
            .checked_add_signed(dc)
            .and_then(char::from_u32)?;
        let row = self.row.checked_add_signed(dr as isize)?;
        Some(Field { col, row })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.col, self.row)
    }
}

/// All fields of a `size` x `size` board row by row, from `a1` upwards.
pub fn fields_of(size: usize) -> impl Iterator<Item = Field> {
    (1..=size).flat_map(move |row| (0..size).filter_map(move |col| Field::from_index(col, row)))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFieldError {
    #[error("field is missing a column letter")]
    MissingColumn,
    #[error("invalid column '{0}'")]
    InvalidColumn(char),
    #[error("invalid row '{0}'")]
    InvalidRow(String),
}

impl FromStr for Field {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let col = chars.next().ok_or(ParseFieldError::MissingColumn)?;
        if !col.is_ascii_lowercase() {
            return Err(ParseFieldError::InvalidColumn(col));
        }
        let rest = chars.as_str();
        let row = rest
            .parse::<usize>()
            .map_err(|_| ParseFieldError::InvalidRow(rest.to_string()))?;
        Ok(Field { col, row })
    }
}

/// A slide of the pawn on `from` by one cell in `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub from: Field,
    pub direction: Direction,
}

impl Step {
    pub fn new(from: Field, direction: Direction) -> Self {
        Step { from, direction }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.from, self.direction)
    }
}

/// A player intent, as submitted by a bot or a remote player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Deploy(Field),
    Move(Step),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Deploy(field) => write!(f, "deploy {}", field),
            Action::Move(step) => write!(f, "move {}", step),
        }
    }
}

/// Which field of an action a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Field,
    DesiredField,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Field => f.write_str("Field"),
            Target::DesiredField => f.write_str("Desired field"),
        }
    }
}

/// Rejected actions. A failing call never mutates the board or the controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("{0} is out of bounds.")]
    OutOfBounds(Target),
    #[error("{0} is empty.")]
    Empty(Target),
    #[error("{0} is not empty.")]
    NotEmpty(Target),
    #[error("Field is not yours.")]
    PlayerMismatch,
    #[error("Action not allowed in the current phase.")]
    WrongPhase,
    #[error("Game already over.")]
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Placement,
    Movement,
    Won(PawnColor),
    Drawn,
}

impl GameStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, GameStatus::Won(_) | GameStatus::Drawn)
    }
}

/// Board storage, geometry and capture resolution consumed by the controller.
///
/// Methods documented with an "in-bounds" or "empty" requirement may assume
/// the caller has already checked it.
pub trait BoardStore {
    fn size(&self) -> usize;

    fn white_pawns(&self) -> usize;

    fn black_pawns(&self) -> usize;

    fn is_field_in_bounds(&self, field: Field) -> bool;

    /// Requires an in-bounds field.
    fn is_field_empty(&self, field: Field) -> bool;

    /// Occupant of an in-bounds field, `Empty` if none.
    fn field_color(&self, field: Field) -> PawnColor;

    /// Requires an empty in-bounds field.
    fn place_pawn(&mut self, field: Field, color: PawnColor);

    /// Relocates the pawn on `field` one cell in `direction` and returns the
    /// destination.
    fn move_pawn_and_get_new_field(&mut self, field: Field, direction: Direction) -> Field;

    /// Removes every opponent pawn flanked by the pawn on `field` and reports
    /// whether anything was taken.
    fn take_opponent_pawns_and_get_result(&mut self, field: Field) -> bool;

    /// No-op when the field is already empty.
    fn remove_pawn(&mut self, field: Field);
}

impl<B: BoardStore + ?Sized> BoardStore for &mut B {
    fn size(&self) -> usize {
        (**self).size()
    }

    fn white_pawns(&self) -> usize {
        (**self).white_pawns()
    }

    fn black_pawns(&self) -> usize {
        (**self).black_pawns()
    }

    fn is_field_in_bounds(&self, field: Field) -> bool {
        (**self).is_field_in_bounds(field)
    }

    fn is_field_empty(&self, field: Field) -> bool {
        (**self).is_field_empty(field)
    }

    fn field_color(&self, field: Field) -> PawnColor {
        (**self).field_color(field)
    }

    fn place_pawn(&mut self, field: Field, color: PawnColor) {
        (**self).place_pawn(field, color)
    }

    fn move_pawn_and_get_new_field(&mut self, field: Field, direction: Direction) -> Field {
        (**self).move_pawn_and_get_new_field(field, direction)
    }

    fn take_opponent_pawns_and_get_result(&mut self, field: Field) -> bool {
        (**self).take_opponent_pawns_and_get_result(field)
    }

    fn remove_pawn(&mut self, field: Field) {
        (**self).remove_pawn(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_color() {
        assert_eq!(PawnColor::White.opposite(), PawnColor::Black);
        assert_eq!(PawnColor::Black.opposite(), PawnColor::White);
        assert_eq!(PawnColor::Empty.opposite(), PawnColor::Empty);
    }

    #[test]
    fn test_field_from_index() {
        assert_eq!(Field::from_index(0, 1), Some(Field::new('a', 1)));
        assert_eq!(Field::from_index(8, 9), Some(Field::new('i', 9)));
        assert_eq!(Field::from_index(usize::MAX, 1), None);
        assert_eq!(Field::center_of(7), Some(Field::new('d', 4)));
    }

    #[test]
    fn test_fields_of_wide_board() {
        // Columns past 'z' still get distinct characters
        let fields: Vec<Field> = fields_of(200).collect();
        assert_eq!(fields.len(), 200 * 200);
        assert_eq!(fields[199].col_index(), Some(199));
        assert_eq!(fields.last(), Some(&Field::from_index(199, 200).unwrap()));
    }

    #[test]
    fn test_field_parsing() {
        assert_eq!("c3".parse::<Field>(), Ok(Field::new('c', 3)));
        assert_eq!(" a12 ".parse::<Field>(), Ok(Field::new('a', 12)));
        assert_eq!("".parse::<Field>(), Err(ParseFieldError::MissingColumn));
        assert_eq!("3c".parse::<Field>(), Err(ParseFieldError::InvalidColumn('3')));
        assert!(matches!(
            "cx".parse::<Field>(),
            Err(ParseFieldError::InvalidRow(_))
        ));
    }

    #[test]
    fn test_field_offset() {
        let field = Field::new('b', 2);
        assert_eq!(field.offset(Direction::Up), Some(Field::new('b', 3)));
        assert_eq!(field.offset(Direction::Down), Some(Field::new('b', 1)));
        assert_eq!(field.offset(Direction::Left), Some(Field::new('a', 2)));
        assert_eq!(field.offset(Direction::Right), Some(Field::new('c', 2)));

        // Row 0 is representable (and out of bounds); below that it is not.
        assert_eq!(Field::new('a', 0).offset(Direction::Down), None);
    }

    #[test]
    fn test_error_messages_name_the_field() {
        assert_eq!(
            GameError::OutOfBounds(Target::Field).to_string(),
            "Field is out of bounds."
        );
        assert_eq!(
            GameError::OutOfBounds(Target::DesiredField).to_string(),
            "Desired field is out of bounds."
        );
        assert_eq!(
            GameError::NotEmpty(Target::DesiredField).to_string(),
            "Desired field is not empty."
        );
        assert_eq!(GameError::PlayerMismatch.to_string(), "Field is not yours.");
    }

    #[test]
    fn test_variant_sizes_are_odd() {
        for variant in [Variant::Small, Variant::Medium, Variant::Large] {
            assert_eq!(variant.board_size() % 2, 1);
            assert!(variant.board_size() <= MAX_BOARD_SIZE);
        }
        assert_eq!("medium".parse::<Variant>(), Ok(Variant::Medium));
    }
}
