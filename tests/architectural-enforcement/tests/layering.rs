//! Integration Test: Layering
//!
//! **Policy**: `practice-core` is headless. It MUST NOT depend on terminal
//! crates, and surfaces MUST NOT drive the playback state machine directly;
//! they send `PlaybackCommand`s and render `PlaybackMessage`s.

use std::fs;

use architectural_enforcement::{code_part, rust_files, workspace_root};

/// Crates that belong to a surface, never to the engine
const SURFACE_CRATES: &[&str] = &["ratatui", "crossterm"];

/// Engine internals a surface has no business touching
const ENGINE_INTERNALS: &[&str] = &["PlaybackState", "PlaybackEvent", "transition(", "Phase::"];

#[test]
fn test_core_manifest_has_no_surface_crates() {
    let manifest = fs::read_to_string(workspace_root().join("practice/core/Cargo.toml"))
        .expect("practice/core/Cargo.toml should exist");

    for krate in SURFACE_CRATES {
        let declared = manifest
            .lines()
            .map(|line| line.split('#').next().unwrap_or(line).trim())
            .any(|line| line.starts_with(&format!("{krate} ")) || line.starts_with(&format!("{krate}=")));
        assert!(!declared, "practice-core must not depend on {krate}");
    }
}

#[test]
fn test_core_source_has_no_surface_imports() {
    let mut violations = Vec::new();

    for path in rust_files("practice/core/src") {
        let content = fs::read_to_string(&path).unwrap_or_default();
        for (idx, line) in content.lines().enumerate() {
            let code = code_part(line);
            if SURFACE_CRATES
                .iter()
                .any(|krate| code.contains(&format!("{krate}::")))
            {
                violations.push(format!("{}:{} - {}", path.display(), idx + 1, line.trim()));
            }
        }
    }

    assert!(violations.is_empty(), "Surface imports in the engine:\n{}", violations.join("\n"));
}

#[test]
fn test_tui_does_not_drive_state_machine() {
    let mut violations = Vec::new();

    for path in rust_files("tui/src") {
        let content = fs::read_to_string(&path).unwrap_or_default();
        for (idx, line) in content.lines().enumerate() {
            let code = code_part(line);
            if ENGINE_INTERNALS.iter().any(|name| code.contains(name)) {
                violations.push(format!("{}:{} - {}", path.display(), idx + 1, line.trim()));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "The TUI must go through PracticeHandle:\n{}",
        violations.join("\n")
    );
}
