//! Presentation utilities for CLI output.

pub mod status;
pub mod tables;

pub use status::StatusRenderer;
pub use tables::{CardRow, card_rows, print_card_table, truncate_string};
