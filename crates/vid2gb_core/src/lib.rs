//! vid2gb core - conversion of videos into playable Game Boy ROMs.
//!
//! This crate holds every stage of the conversion with no terminal
//! dependencies; the command-line front end lives in `vid2gb_cli`.

pub mod build;
pub mod config;
pub mod extraction;
pub mod io;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod patcher;
pub mod toolchain;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
