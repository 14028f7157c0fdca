//! Terminal output for syncstate commands
//!
//! Uses `cliclack` styling in an interactive terminal and falls back to
//! plain, prefix-tagged lines in CI and when output is piped.

mod context;
mod output;

pub use context::UiContext;
pub use output::{intro, key_value, outro_success, step_info, step_ok_detail, step_warn_hint};
