//! Runtime tool path resolution
//!
//! For each external tool (e.g., `cf`), we:
//! 1. Check for an environment variable `{TOOL}_BIN` (e.g., `CF_BIN`)
//! 2. Fall back to a PATH lookup if the envvar is not set
//!
//! This lets Nix (or CI images) pin an exact cf binary while plain PATH
//! installs keep working.

use std::env;
use std::path::PathBuf;

/// Common tool names
pub mod tools {
    pub const CF: &str = "cf";
}

/// Name of the override variable for a tool (`cf` -> `CF_BIN`)
pub fn tool_env_var(tool: &str) -> String {
    format!("{}_BIN", tool.to_uppercase().replace('-', "_"))
}

/// Get the configured path or name of an external tool
///
/// Returns the value of `{TOOL}_BIN` if set and non-empty, otherwise the tool
/// name itself.
pub fn get_tool_path(tool: &str) -> String {
    env::var(tool_env_var(tool))
        .ok()
        .filter(|path| !path.is_empty())
        .unwrap_or_else(|| tool.to_string())
}

/// Resolve a tool to an executable location
///
/// Explicit `{TOOL}_BIN` paths are checked with `which` as well, so a stale
/// override is reported the same way as a missing binary.
pub fn resolve_tool(tool: &str) -> Option<PathBuf> {
    which::which(get_tool_path(tool)).ok()
}
