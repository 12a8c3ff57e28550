pub mod arena;
pub mod board;
pub mod bot;
pub mod controller;
pub mod game;
pub mod web;

pub use arena::*;
pub use board::*;
pub use bot::*;
pub use controller::*;
pub use game::*;
