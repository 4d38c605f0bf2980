//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: Async functions MUST NOT use blocking I/O.
//! **Required**: Use `tokio::fs`, `tokio::net`, `tokio::io`, not `std::fs`,
//! `std::net` or blocking stdin.
//! **Acceptable**: Non-async functions (config loading before the runtime
//! does real work), test code.

use architectural_enforcement::{report, scan, SourceLine};

fn blocking_io(line: &SourceLine<'_>) -> Option<&'static str> {
    let code = line.code;

    if code.contains("reqwest::blocking") {
        return Some("Blocking HTTP client");
    }
    if !line.in_async_fn {
        return None;
    }

    if code.contains("std::fs::") {
        Some("Blocking file I/O")
    } else if code.contains("std::net::") {
        Some("Blocking network I/O")
    } else if code.contains("std::process::Command") {
        Some("Blocking process I/O")
    } else if code.contains("std::io::stdin()") || code.contains("io::stdin().read_line") {
        Some("Blocking stdin in async")
    } else {
        None
    }
}

#[test]
fn test_no_blocking_io_in_production_code() {
    let violations = scan(&["chat/core/src", "terminal/src"], blocking_io);

    report(
        "Blocking I/O calls found in async code!",
        &violations,
        &[
            "\n✅ REQUIRED async I/O:",
            "  - tokio::fs::read().await",
            "  - tokio::net::TcpStream::connect().await",
            "  - tokio::io::stdin() with AsyncBufReadExt",
            "  - reqwest::Client (async)",
        ],
    );
}

#[test]
fn test_blocking_io_rule() {
    let flagged = SourceLine {
        number: 1,
        code: "    let data = std::fs::read(path)?;",
        in_async_fn: true,
    };
    let allowed = SourceLine {
        in_async_fn: false,
        ..flagged.clone()
    };

    assert_eq!(blocking_io(&flagged), Some("Blocking file I/O"));
    assert_eq!(blocking_io(&allowed), None);
}
