//! Setup for the main daemon application.
//!
//! The [`setup`](app::setup) function loads the configuration, initializes
//! logging and builds the application container.
pub mod app;
pub mod config;
pub mod logging;
