//! CLI prompts using cliclack (Charm-style inline prompts)
//!
//! This module is optional and only available when the `tui` feature is enabled.

mod prompts;
mod spinner;

pub use prompts::{run, CreateArgs};
pub use spinner::SpinnerReporter;
