//! Terminal front end.

pub mod tui;
