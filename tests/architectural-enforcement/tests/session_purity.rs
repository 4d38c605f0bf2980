//! Integration Test: Session Purity
//!
//! **Policy**: The session state machine and the wire types are pure. They
//! take events in and hand envelopes back; they never touch a runtime, the
//! network, the filesystem or the clock. That keeps every ordering rule
//! testable without a backend.
//! **Exceptions**: test code

use architectural_enforcement::{report, scan};

const PURE: [&str; 5] = [
    "chat/core/src/session",
    "chat/core/src/decoder.rs",
    "chat/core/src/events.rs",
    "chat/core/src/messages.rs",
    "chat/core/src/profile.rs",
];

const FORBIDDEN: [(&str, &str); 8] = [
    ("tokio", "Async runtime"),
    ("tungstenite", "WebSocket"),
    ("reqwest", "HTTP client"),
    ("std::fs", "Filesystem"),
    ("std::net", "Network"),
    ("std::thread", "Threads"),
    ("Instant::now", "Clock"),
    ("SystemTime", "Clock"),
];

#[test]
fn test_session_has_no_io() {
    let violations = scan(&PURE, |line| {
        FORBIDDEN
            .iter()
            .find(|(needle, _)| line.code.contains(needle))
            .map(|(_, what)| *what)
    });

    report(
        "I/O found in the session state machine!",
        &violations,
        &[
            "\nThe session returns envelopes; ChatClient sends them.",
            "Move networking, timers and file access to client.rs or transport/.",
        ],
    );
}
