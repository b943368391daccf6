//! Command handlers for CLI subcommands
//!
//! Each subcommand lives in its own module; shared loading and rendering
//! helpers are in [`utils`].

mod completions;
mod config;
mod convert;
mod plugins;
pub mod utils;
pub mod validate;

pub use completions::handle_completions;
pub use config::handle_config;
pub use convert::handle_convert;
pub use plugins::handle_plugins;
pub use validate::{handle_validate, ValidationReport};
