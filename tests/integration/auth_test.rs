// tests/integration/auth_test.rs

//! End-to-end tests for the built-in `/auth` command.

use super::test_helpers::{TEST_PASSWORD, TestContext};
use rcond::core::builtins::{AUTH_FAIL_LINE, AUTH_OK_LINE};

#[tokio::test]
async fn test_auth_with_correct_password() {
    let ctx = TestContext::new().await;
    let mut client = ctx.connect().await;

    let reply = client.auth(TEST_PASSWORD).await;
    assert_eq!(reply, AUTH_OK_LINE);
}

#[tokio::test]
async fn test_auth_with_wrong_password() {
    let ctx = TestContext::new().await;
    let mut client = ctx.connect().await;

    let reply = client.auth("not-the-password").await;
    assert_eq!(reply, AUTH_FAIL_LINE);
}

#[tokio::test]
async fn test_failed_auth_revokes_prior_authentication() {
    let mut ctx = TestContext::new().await;
    let mut client = ctx.connect().await;

    assert_eq!(client.auth(TEST_PASSWORD).await, AUTH_OK_LINE);

    // A later mismatch explicitly resets the authenticated flag.
    assert_eq!(client.auth("wrong-again").await, AUTH_FAIL_LINE);

    // The session is no longer authenticated: a free-form line must not be
    // forwarded to the host console.
    client.send_line("say hello").await;
    ctx.expect_no_console_line().await;
}

#[tokio::test]
async fn test_auth_token_is_whitespace_delimited() {
    let mut ctx = TestContext::new().await;
    let mut client = ctx.connect().await;

    // Only the first token is compared; the extra word makes it a mismatch
    // of the token itself, not a parse error.
    client
        .send_line(&format!("/auth {TEST_PASSWORD} trailing"))
        .await;
    assert_eq!(client.read_line().await, AUTH_OK_LINE);

    // The session authenticated via the prefix match.
    client.send_line("verbatim line").await;
    assert_eq!(ctx.expect_console_line().await, "verbatim line");
}

#[tokio::test]
async fn test_help_requires_authentication() {
    let mut ctx = TestContext::new().await;
    let mut client = ctx.connect().await;

    // Unauthenticated /help matches an auth-required command, falls through
    // the rest of the registry, and is silently dropped, never forwarded.
    client.send_line("/help").await;
    client.expect_silence().await;
    ctx.expect_no_console_line().await;

    assert_eq!(client.auth(TEST_PASSWORD).await, AUTH_OK_LINE);
    client.send_line("/help").await;
    let first = client.read_line().await;
    assert!(first.starts_with("auth - "), "unexpected listing: {first:?}");
    let second = client.read_line().await;
    assert!(second.starts_with("help - "), "unexpected listing: {second:?}");
}
