//! Mission orchestration
//!
//! This module provides:
//! - The build request (flags, YAML file, prompts all fill the same struct)
//! - External command execution behind the [`CommandRunner`] trait
//! - Prerequisite checks, the Django bootstrap and the virtual environment
//! - The [`Controller`] state machine tying them to the bundler and generator

pub mod command;
pub mod controller;
pub mod django;
pub mod prereq;
pub mod reporter;
pub mod request;
pub mod venv;

pub use command::{CommandOutput, CommandRunner, ExternalCommand, SystemRunner};
pub use controller::{Controller, MissionOutcome, MissionReport, MissionState};
pub use reporter::{PlainReporter, Reporter, SilentReporter};
pub use request::{BuildRequest, VenvSignal};
