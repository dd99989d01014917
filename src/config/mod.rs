#[cfg(feature = "cli")]
pub mod cli;
pub mod csv_store;
pub mod defaults;
pub mod region_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
