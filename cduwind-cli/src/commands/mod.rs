//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`compute`] - Print the CDU wind table for a briefing
//! - [`config`] - Configuration management (get, set, list, path)
//! - [`enter`] - Enter one briefing on the CDU
//! - [`run`] - Main command (listen for briefings, enter on request)

pub mod common;
pub mod compute;
pub mod config;
pub mod enter;
pub mod run;
