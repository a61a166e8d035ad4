//! Session commands: login, logout, profile and the refresh loop.

use nongsan_client::Nongsan;
use nongsan_core::{Role, validation};

use super::{CommandError, out};

pub async fn login(
    app: &Nongsan,
    email: &str,
    password: &str,
    role: Role,
) -> Result<(), CommandError> {
    let request = validation::login(email, password, role)?;
    let user = app.bootstrap.login(&request).await?;
    out(format!(
        "Đăng nhập thành công: {}",
        user.display_name
            .or(user.email)
            .unwrap_or_else(|| email.to_string())
    ));
    Ok(())
}

pub async fn logout(app: &Nongsan) {
    app.bootstrap.logout().await;
    out("Đã đăng xuất");
}

pub async fn whoami(app: &Nongsan) -> Result<(), CommandError> {
    if !app.auth.is_logged_in().await {
        return Err(CommandError::NotLoggedIn);
    }
    let user = app.user.fetch_user().await?;
    out(format!(
        "{} <{}>",
        user.display_name.as_deref().unwrap_or("-"),
        user.email.as_deref().unwrap_or("-")
    ));
    if let Some(id) = &user.id {
        out(format!("  id:    {id}"));
    }
    if let Some(roles) = &user.roles {
        out(format!("  roles: {}", roles.join(", ")));
    }
    Ok(())
}

pub async fn refresh(app: &Nongsan) -> Result<(), CommandError> {
    app.bootstrap.refresh().await?;
    out("Access token refreshed");
    Ok(())
}

pub async fn register(
    app: &Nongsan,
    email: &str,
    password: &str,
    confirm: &str,
) -> Result<(), CommandError> {
    let request = validation::register(email, password, confirm)?;
    let ack = app.api.auth().register(&request).await?;
    out(ack
        .message
        .unwrap_or_else(|| "Kiểm tra email để xác thực tài khoản".to_string()));
    Ok(())
}

/// Bootstrap, then keep the refresh timer alive until Ctrl+C.
pub async fn run(app: &Nongsan) -> Result<(), CommandError> {
    app.bootstrap.start().await;
    if !app.bootstrap.is_refreshing().await {
        return Err(CommandError::NotLoggedIn);
    }
    tracing::info!("Session running, press Ctrl+C to stop");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
    }
    app.bootstrap.stop().await;
    Ok(())
}
