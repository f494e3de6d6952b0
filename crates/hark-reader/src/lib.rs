#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod content;
pub mod controller;
pub mod input;
pub mod runtime;

pub use content::JsonContentSource;
pub use controller::ReaderController;
pub use input::UiInput;
pub use runtime::run_reader;

// Used only by the integration tests under tests/
#[cfg(test)]
use mockall as _;
