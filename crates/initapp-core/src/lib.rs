//! init-app core - manifest resolution and rendering for Python backend scaffolds
//!
//! Given a framework, a structural strategy and optional add-ons (database,
//! infrastructure suites, virtual environment), this library decides which
//! folders and files to create and renders them from a template pack.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Leaf data and operations** - rule tables ([`rules`]), the dependency
//!   resolver ([`deps`]) and template rendering ([`templates`])
//! - **Planning and execution** - the [`bundler`] merges rules, dependencies
//!   and defaults into a plan; the [`generator`] writes it to disk
//! - **Orchestration** - the [`mission`] controller runs prerequisite checks,
//!   framework bootstrap, generation and environment setup as a state machine
//! - **CLI/TUI interface** - optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based prompts and spinners
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use initapp_core::mission::{BuildRequest, Controller, PlainReporter, SystemRunner};
//! use initapp_core::templates::{TemplatePack, TemplateSource};
//!
//! let pack = TemplatePack::load(&TemplateSource::from_env()?, "init-app").await?;
//! let request = BuildRequest::from_yaml_file("request.yaml".as_ref())?;
//! let mut controller = Controller::new(&pack, SystemRunner::default(), PlainReporter);
//! let outcome = controller.run_mission(request).await;
//! ```

pub mod bundler;
pub mod context;
pub mod deps;
pub mod error;
pub mod framework;
pub mod generator;
pub mod mission;
pub mod rules;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use bundler::{BuildPlan, Bundler};
pub use context::{BuildContext, ContextValue, InitStrategy};
pub use deps::{resolve, DependencyList, DependencyQuery};
pub use error::{BuildError, RenderError};
pub use framework::{Database, Domain, Framework, InfraSuite, Strategy};
pub use generator::{Generator, ManifestResult};
pub use mission::{BuildRequest, Controller, MissionOutcome};
pub use templates::{Blueprint, ManifestRule, TemplatePack, TemplateSource};

#[cfg(feature = "tui")]
pub use tui::run;

/// CLI version - used for template compatibility checking
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");
