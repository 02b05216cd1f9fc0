pub mod cli;
pub mod config;
pub mod logging;
pub mod ui;

pub use cli::Args;
pub use config::Config;
