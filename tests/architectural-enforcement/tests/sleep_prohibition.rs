//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code in the engine and the TUI MUST NOT call sleep
//! methods. The countdown is driven by the engine's interval clock and pausing
//! freezes state, not a thread.
//! **Exceptions**: Frame rate limiting (TUI only), test code under `tests/`

use std::fs;
use std::path::Path;

use architectural_enforcement::{code_part, rust_files};

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let violations = find_sleep_violations();

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Sleep calls found in production code!\n");

        for violation in &violations {
            eprintln!("  ❌ {}", violation);
        }

        eprintln!("\n✅ ACCEPTABLE sleep uses:");
        eprintln!("  - Frame rate limiting in the TUI app loop");
        eprintln!("  - Integration tests under tests/ (paused tokio time)");
        eprintln!("  - Periodic tasks using tokio::time::interval()");
        eprintln!("\n❌ FORBIDDEN:");
        eprintln!("  - Sleeping between countdown ticks");
        eprintln!("  - Sleep as a pause mechanism");
        eprintln!("  - Sleep to 'wait' for the engine (use the message channel!)");

        panic!(
            "\nFound {} sleep violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

/// Find all sleep() calls in production code
fn find_sleep_violations() -> Vec<String> {
    let mut violations = Vec::new();

    for path in rust_files("practice/core/src") {
        check_file(&path, &mut violations, false);
    }
    for path in rust_files("tui/src") {
        check_file(&path, &mut violations, true);
    }

    violations
}

fn check_file(path: &Path, violations: &mut Vec<String>, allow_frame_limiting: bool) {
    let Ok(content) = fs::read_to_string(path) else {
        return;
    };

    let lines: Vec<&str> = content.lines().collect();

    for (idx, line) in lines.iter().enumerate() {
        let code = code_part(line);
        if !(code.contains("::sleep(") || code.contains(".sleep(") || code.contains("sleep_until(")) {
            continue;
        }

        // Frame limiting (only in TUI app.rs)
        if allow_frame_limiting
            && path.ends_with("tui/src/app.rs")
            && is_frame_limiting_context(&lines, idx)
        {
            continue;
        }

        violations.push(format!("{}:{} - {}", path.display(), idx + 1, line.trim()));
    }
}

/// Check if sleep is used for frame rate limiting (acceptable in TUI)
fn is_frame_limiting_context(lines: &[&str], current_idx: usize) -> bool {
    let context_range = current_idx.saturating_sub(10)..std::cmp::min(current_idx + 5, lines.len());

    lines[context_range].iter().any(|line| {
        let line = line.to_lowercase();
        line.contains("frame") || line.contains("fps") || line.contains("rate limit")
    })
}

#[test]
fn test_sleep_detection() {
    let dir = tempfile::tempdir().expect("temp dir");
    let file = dir.path().join("engine.rs");
    fs::write(
        &file,
        "fn tick() {\n    // std::thread::sleep(d) in a comment is fine\n    tokio::time::sleep(Duration::from_secs(1)).await;\n}\n",
    )
    .expect("write sample");

    let mut violations = Vec::new();
    check_file(&file, &mut violations, false);

    assert_eq!(violations.len(), 1, "{violations:?}");
    assert!(violations[0].contains(":3 - "));
}

#[test]
fn test_frame_limiting_detection() {
    let test_code = vec![
        "fn render_loop() {",
        "    let frame_duration = Duration::from_millis(100); // 10 FPS",
        "    loop {",
        "        render();",
        "        tokio::time::sleep(frame_duration).await;",
        "    }",
        "}",
    ];

    assert!(
        is_frame_limiting_context(&test_code, 4),
        "Should detect frame rate limiting"
    );
}
