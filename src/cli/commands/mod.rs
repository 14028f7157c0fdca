//! CLI command implementations

pub mod config;
pub mod get;
pub mod record;
pub mod show;

pub use config::execute as config;
pub use get::execute as get;
pub use record::execute as record;
pub use show::execute as show;
