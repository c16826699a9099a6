//! helmdeck Core - Release-target resolution for Helm deployments
//!
//! This crate turns one logical release declaration into a concrete set of
//! `helm` parameters for each deployment target:
//! - `TagExpression`: which releases apply to which target
//! - Options groups: the mergeable configuration layers
//! - `Release`: the declaration, its target overrides and the resolution cache
//! - `Project`: build file loading, selection and install ordering
//! - `HelmCommand`: `helm` argument vectors built from resolved properties

pub mod chart;
pub mod command;
pub mod error;
pub mod options;
pub mod plan;
pub mod project;
pub mod release;
pub mod resolved;
pub mod tags;
pub mod target;
pub mod values;

pub use chart::ChartReference;
pub use command::{HelmCommand, go_duration};
pub use error::{CoreError, Result};
pub use options::{
    InstallFromRepositoryOptions, InstallationOptions, Layered, SECRET_MASK,
    ServerOperationOptions, TestOptions, ValueOptions,
};
pub use plan::{Operation, Plan, PlanEntry, Selection};
pub use project::{
    BUILD_FILE_NAME, BuildFile, DEFAULT_TARGET, OverrideSpec, Project, UnknownKey,
};
pub use release::{Release, TargetAction, TargetSelector};
pub use resolved::ResolvedReleaseProperties;
pub use tags::TagExpression;
pub use target::ReleaseTarget;
pub use values::{Values, effective_values, parse_set_values};
