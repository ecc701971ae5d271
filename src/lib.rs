//! cardwizard - company card assignment wizard
//!
//! The `wizard` module holds the step controller and its stores; `ui` and
//! `app` host it in a terminal.

pub mod app;
pub mod config;
pub mod logging;
pub mod ui;
pub mod wizard;
pub mod workspace;
