// tests/integration/broadcast_test.rs

//! End-to-end tests for console-output broadcast.

use super::test_helpers::{TEST_PASSWORD, TestContext};

#[tokio::test]
async fn test_broadcast_reaches_every_open_session() {
    let ctx = TestContext::new().await;

    let mut a = ctx.connect().await;
    let mut b = ctx.connect().await;
    let mut c = ctx.connect().await;

    // The auth round-trip guarantees each session is registered before the
    // publish below.
    a.auth(TEST_PASSWORD).await;
    b.auth("wrong").await;
    c.auth(TEST_PASSWORD).await;

    // A 4th session that disconnected beforehand receives nothing and causes
    // no error for the others.
    let mut d = ctx.connect().await;
    d.auth(TEST_PASSWORD).await;
    drop(d);
    ctx.wait_for_session_count(3).await;

    let queued = ctx.handle.state().publish_console_output("hello");
    assert_eq!(queued, 1, "exactly the broadcaster listens on the channel");

    // Broadcast is independent of authentication state.
    assert_eq!(a.read_line().await, "hello");
    assert_eq!(b.read_line().await, "hello");
    assert_eq!(c.read_line().await, "hello");
}

#[tokio::test]
async fn test_broadcast_lines_arrive_in_publish_order() {
    let ctx = TestContext::new().await;
    let mut client = ctx.connect().await;
    client.auth(TEST_PASSWORD).await;

    let state = ctx.handle.state();
    state.publish_console_output("one");
    state.publish_console_output("two");
    state.publish_console_output("three");

    assert_eq!(client.read_line().await, "one");
    assert_eq!(client.read_line().await, "two");
    assert_eq!(client.read_line().await, "three");
}

#[tokio::test]
async fn test_broadcast_with_no_sessions_is_a_no_op() {
    let ctx = TestContext::new().await;
    ctx.handle.state().publish_console_output("into the void");

    // The server stays healthy: a later connection works normally.
    let mut client = ctx.connect().await;
    let reply = client.auth(TEST_PASSWORD).await;
    assert_eq!(reply, rcond::core::builtins::AUTH_OK_LINE);
}
