//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT call sleep methods. The client waits
//! on I/O (socket frames, stdin, channel receives) and bounds waits with
//! `tokio::time::timeout`, never by sleeping.
//! **Exceptions**: test code

use architectural_enforcement::{report, scan};

#[test]
fn test_no_sleep_in_production_code() {
    let violations = scan(&["chat/core/src", "terminal/src"], |line| {
        (line.code.contains("::sleep(") || line.code.contains(".sleep(")).then_some("Sleep call")
    });

    report(
        "Sleep calls found in production code!",
        &violations,
        &[
            "\n✅ ACCEPTABLE:",
            "  - tokio::time::timeout() around a real wait",
            "  - Test code (#[test] or #[tokio::test] functions)",
            "\n❌ FORBIDDEN:",
            "  - Sleep in polling loops",
            "  - Sleep as poor man's synchronization",
            "  - Sleep to 'wait' for frames (await the transport instead)",
        ],
    );
}
