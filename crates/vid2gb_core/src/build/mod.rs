//! ROM build through the player repository's build rules.

mod invoker;

pub use invoker::{BuildError, BuildInvoker, BuildRequest, BuildResult, BuiltRom, DeliveredRom};
