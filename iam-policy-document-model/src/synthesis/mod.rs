//! Policy composition from structured configuration

pub(crate) mod composer;
pub(crate) mod config;
pub(crate) mod interpolation;

pub use composer::{ComposedPolicy, PolicyComposer};
pub use config::{ConditionConfig, PolicyDocumentConfig, PrincipalConfig, StatementConfig};
pub use interpolation::{interpolate, replace_vars};
