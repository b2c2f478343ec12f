//! External process execution.

mod runner;

pub use runner::{find_in_path, CommandOutput, CommandRunner, CommandSpec, SystemRunner};
