//! Integration tests for login, bootstrap and logout.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use nongsan_client::session::NO_REFRESH_TOKEN;
use nongsan_client::stores::User;
use nongsan_core::Role;
use nongsan_core::validation::{self, ValidationError};
use nongsan_integration_tests::{PASSWORD, TestContext};
use secrecy::ExposeSecret;

/// A context whose refresh timer fires every 900 ms.
async fn fast_timer() -> TestContext {
    TestContext::with_config(|config| config.interval_refresh_token = 1).await
}

fn refresh_calls(ctx: &TestContext) -> u32 {
    ctx.backend.state().refresh_calls
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_refreshes_then_loads_profile() {
    let ctx = TestContext::new().await;
    ctx.login().await;

    assert!(ctx.app.auth.is_logged_in().await);
    let state = ctx.app.auth.snapshot().await;
    assert_eq!(state.access_token.unwrap().expose_secret(), "access-2");
    assert_eq!(state.refresh_token.unwrap().expose_secret(), "refresh-1");

    let user = ctx.app.user.user().await;
    assert_eq!(user.email.as_deref(), Some("lan@nongsan.vn"));
    assert!(user.has_role(Role::Consumer));

    // Profile is fetched with the refreshed token, not the login one.
    let info = ctx.backend.requests_to("/auth/info");
    assert_eq!(info.len(), 1);
    assert_eq!(info[0].authorization.as_deref(), Some("Bearer access-2"));

    assert!(ctx.app.bootstrap.is_refreshing().await);
    ctx.app.bootstrap.stop().await;
    assert!(!ctx.app.bootstrap.is_refreshing().await);
}

#[tokio::test]
async fn test_wrong_password_is_localized() {
    let ctx = TestContext::new().await;
    let request = validation::login("lan@nongsan.vn", "sai-mat-khau", Role::Consumer).unwrap();

    let err = ctx.app.bootstrap.login(&request).await.unwrap_err();
    assert_eq!(err.status, 400);
    assert_eq!(err.code.as_deref(), Some("auth-e-04"));
    assert_eq!(err.localized(), "Sai mật khẩu");
    assert!(!ctx.app.auth.is_logged_in().await);
    assert!(ctx.backend.requests_to("/auth/info").is_empty());
}

// =============================================================================
// Bootstrap
// =============================================================================

#[tokio::test]
async fn test_bootstrap_runs_once() {
    let ctx = TestContext::new().await;

    assert!(ctx.app.bootstrap.start().await);
    assert!(!ctx.app.bootstrap.start().await);

    // No refresh token stored, so nothing is sent.
    assert_eq!(refresh_calls(&ctx), 0);
    assert_eq!(ctx.backend.requests_to("/auth/info").len(), 1);
    // Logged out: nothing to keep fresh.
    assert!(!ctx.app.bootstrap.is_refreshing().await);
    assert_eq!(ctx.app.user.user().await, User::default());
}

#[tokio::test]
async fn test_bootstrap_resumes_persisted_session() {
    let ctx = TestContext::new().await;
    ctx.login().await;
    ctx.app.bootstrap.stop().await;

    let restarted = ctx.reopen();
    assert!(restarted.auth.is_logged_in().await);
    assert!(restarted.bootstrap.start().await);

    let access = restarted.auth.access_token().await.unwrap();
    assert_eq!(access.expose_secret(), "access-3");
    assert!(restarted.bootstrap.is_refreshing().await);
    assert_eq!(
        restarted.user.user().await.display_name.as_deref(),
        Some("Lan")
    );
    restarted.bootstrap.stop().await;
}

#[tokio::test]
async fn test_refresh_without_refresh_token_sends_nothing() {
    let ctx = TestContext::new().await;
    ctx.app.auth.set_tokens("access-1", "").await;

    let err = ctx.app.bootstrap.refresh().await.unwrap_err();
    assert_eq!(err.message, NO_REFRESH_TOKEN);
    assert_eq!(refresh_calls(&ctx), 0);
    assert_eq!(
        ctx.app.auth.access_token().await.unwrap().expose_secret(),
        "access-1"
    );
}

#[tokio::test]
async fn test_rejected_token_clears_session() {
    let ctx = TestContext::new().await;
    ctx.app.auth.set_tokens("stale", "refresh-1").await;

    let err = ctx.app.user.fetch_user().await.unwrap_err();
    assert!(err.is_auth_failure());
    assert!(!ctx.app.auth.is_logged_in().await);
    assert!(ctx.app.auth.refresh_token().await.is_none());
    assert_eq!(ctx.app.user.user().await, User::default());
}

// =============================================================================
// Refresh timer
// =============================================================================

#[tokio::test]
async fn test_timer_refreshes_until_stopped() {
    let ctx = fast_timer().await;
    ctx.login().await;
    assert_eq!(refresh_calls(&ctx), 1);

    tokio::time::sleep(Duration::from_millis(2_200)).await;
    let running = refresh_calls(&ctx);
    assert!(running >= 3, "timer fired {} times", running - 1);
    let latest = format!("access-{}", running + 1);
    assert_eq!(
        ctx.app.auth.access_token().await.unwrap().expose_secret(),
        latest
    );

    ctx.app.bootstrap.stop().await;
    tokio::time::sleep(Duration::from_millis(2_000)).await;
    assert_eq!(refresh_calls(&ctx), running);
}

#[tokio::test]
async fn test_concurrent_restarts_leave_one_stoppable_timer() {
    let ctx = fast_timer().await;
    ctx.login().await;

    tokio::join!(ctx.app.bootstrap.restart(), ctx.app.bootstrap.restart());
    assert!(ctx.app.bootstrap.is_refreshing().await);

    ctx.app.bootstrap.stop().await;
    assert!(!ctx.app.bootstrap.is_refreshing().await);
    let stopped = refresh_calls(&ctx);
    tokio::time::sleep(Duration::from_millis(3_000)).await;
    assert_eq!(refresh_calls(&ctx), stopped);
}

#[tokio::test]
async fn test_timer_ends_with_the_session() {
    let ctx = fast_timer().await;
    ctx.login().await;

    // Tokens cleared elsewhere, e.g. by a rejected request.
    ctx.app.auth.clear_tokens().await;
    tokio::time::sleep(Duration::from_millis(1_500)).await;

    assert!(!ctx.app.bootstrap.is_refreshing().await);
    assert_eq!(refresh_calls(&ctx), 1);
}

#[tokio::test]
async fn test_logout_stops_timer() {
    let ctx = fast_timer().await;
    ctx.login().await;

    ctx.app.bootstrap.logout().await;
    let after_logout = refresh_calls(&ctx);
    tokio::time::sleep(Duration::from_millis(2_000)).await;

    assert_eq!(refresh_calls(&ctx), after_logout);
    assert!(!ctx.app.bootstrap.is_refreshing().await);
}

// =============================================================================
// Logout
// =============================================================================

#[tokio::test]
async fn test_logout_forgets_everything() {
    let ctx = TestContext::new().await;
    ctx.backend.seed_cart_item("p1", "f1", 25_000, 2);
    ctx.login().await;
    ctx.app.cart.fetch_cart_items().await;
    assert_eq!(ctx.app.cart.total_items().await, 2);

    ctx.app.bootstrap.logout().await;

    assert_eq!(ctx.backend.state().logout_calls, 1);
    assert!(!ctx.app.auth.is_logged_in().await);
    assert_eq!(ctx.app.user.user().await, User::default());
    assert!(ctx.app.cart.items().await.is_empty());
    assert!(!ctx.app.bootstrap.is_refreshing().await);

    // Logged out again, so the next start runs the sequence anew.
    assert!(ctx.app.bootstrap.start().await);
}

#[tokio::test]
async fn test_register_rejects_mismatched_passwords_locally() {
    let err = validation::register("lan@nongsan.vn", PASSWORD, "khac-mat-khau").unwrap_err();
    assert_eq!(err, ValidationError::ConfirmPasswordMismatch);
    assert!(validation::register("lan@nongsan.vn", PASSWORD, PASSWORD).is_ok());
}
