//! Assembler syntax compatibility patching.
//!
//! Newer RGBDS releases require constant declarations to be introduced by
//! `DEF`:
//!
//! ```text
//! SCREEN_ROWS EQU 9        ; legacy
//! DEF SCREEN_ROWS EQU 9    ; current
//! ```
//!
//! The two dialects differ by exactly that one keyword, so the patch is a
//! line-oriented text rewrite ([`rules`]) with no assembly parsing. The file
//! level entry point ([`patch_file`]) snapshots the source once before the
//! first modification and is idempotent.

mod file;
pub mod rules;

pub use file::{backup_path, patch_file, PatchError, PatchOutcome, PatchResult};
pub use rules::{is_patched, patch_line, patch_source, PatchedSource};
