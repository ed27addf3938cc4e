//! Helpers shared by the unit and integration tests of the workspace.
pub mod configuration;
pub mod logging;
