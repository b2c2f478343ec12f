//! Toolchain dependency probing.
//!
//! Verifies that every external executable and encoder library the
//! pipeline relies on is available before any work starts.

mod probe;

pub use probe::{
    probe_dependencies, DependencyKind, DependencyProbe, MissingDependency, ProbeReport,
    Requirement,
};
