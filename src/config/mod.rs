#[cfg(feature = "cli")]
pub mod cli;
pub mod settings;

#[cfg(feature = "cli")]
pub use cli::CliArgs;
pub use settings::{ReleaseConfig, SearchConfig, SetOperationConfig, Settings};
