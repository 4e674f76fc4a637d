//! Command-line shell around the harvest core.
mod app;
mod cli;
mod effects;
mod render;
mod settings;

pub use app::run;
pub use cli::Cli;
