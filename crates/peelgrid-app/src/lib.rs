//! peelgrid terminal client
//!
//! A line-oriented front end over the core session: commands come from
//! stdin, board and bench are printed as text.

mod app;
mod commands;
mod render;

pub use app::{App, AppError, AppOptions};
pub use commands::{Command, CommandHelp, ParseError, TileRef, parse};
pub use render::{bench_view, board_view, full_view, status_line};
