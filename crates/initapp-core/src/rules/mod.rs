//! Declarative rule tables
//!
//! One authoritative copy of the blueprint families, root-level file
//! mappings, infrastructure suites and global constants. Every lookup has a
//! fallback, so callers never see an undefined blueprint.

pub mod blueprints;
pub mod constants;
pub mod django;
pub mod global;
pub mod infra;

pub use blueprints::BlueprintRule;
pub use django::{DjangoPatches, DjangoRule};
pub use global::global_manifest;
pub use infra::{infra_rule, suite_files};
