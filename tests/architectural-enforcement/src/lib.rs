//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No sleep() calls in production code; time comes from the engine clock
//! - The practice engine stays headless (no terminal crates)
//! - Surfaces send commands and never drive the state machine themselves
//!
//! These tests are designed to catch violations early in the development cycle.

use std::path::{Path, PathBuf};

/// Workspace root, independent of the directory the tests run from
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// All `.rs` files under `dir` (relative to the workspace root)
pub fn rust_files(dir: &str) -> Vec<PathBuf> {
    let path = workspace_root().join(dir);
    if !path.exists() {
        return Vec::new();
    }

    walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.path().to_path_buf())
        .collect()
}

/// The code part of a line, without `//` comments
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}
