#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;

// Used by the binary's entry point
use dotenvy as _;
use tracing_subscriber as _;

pub mod commands;
pub mod handlers;
pub mod keys;
pub mod parser;
pub mod presentation;

pub use commands::Commands;
pub use keys::{KeyCommand, parse_key_line};
pub use parser::Cli;
