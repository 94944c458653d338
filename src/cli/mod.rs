pub mod commands;
pub mod plan;
pub mod run;
pub mod settings;
pub mod validate;

pub use commands::{Cli, Commands};
