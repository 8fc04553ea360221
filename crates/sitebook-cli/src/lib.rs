//! SiteBook CLI library.
//!
//! Argument parsing, configuration and command handlers for the `sitebook`
//! binary. Every command runs against a [`sitebook_models::RecordStore`]:
//! the REST backend when one is configured, the local JSON store otherwise.

pub mod cli;
pub mod commands;
pub mod config;
pub mod parse;
pub mod render;
