//! A terminal snake whose body is stored as the points where it turned,
//! steered through per-key edge detection over polled keyboard state.

pub mod config;
pub mod game;
pub mod input;
pub mod menu;
pub mod snake;
pub mod term;
