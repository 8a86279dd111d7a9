//! CLI module
//!
//! Command-line interface for the gallery and the RSS proxy.
//!
//! # Commands
//!
//! - `profile` - Print the profile summary
//! - `feed` - Print accepted media posts as JSON lines
//! - `render` - Write a static HTML gallery
//! - `serve` - Start the gallery web server
//! - `proxy` - Start the standalone RSS edge proxy

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands};
pub use runner::{build_source, render_page, Runner};
pub use server::{gallery_router, serve, AppState, HAS_MORE_HEADER};
