//! 认证模块
//!
//! 登录 / 注册 / 注销流程。会话写入 `SessionStore`，
//! 之后立即刷新导航可见性；页面跳转通过设置 hash 交给路由器。

use snapmap_shared::{TokenResponse, UserRead};

use crate::context::AppContext;
use crate::error::{ClientError, ClientResult};
use crate::session::{SessionStore, TokenStorage};
use crate::visibility::{AffordanceSink, NavVisibility, VisibilityController};
use crate::web::route::AppRoute;
use crate::web::router::navigate_to;

const MIN_PASSWORD_LEN: usize = 8;

// =========================================================
// 会话状态转换
// =========================================================

/// 保存登录响应中的 token 并刷新可见性
pub fn establish_session<S: TokenStorage, K: AffordanceSink>(
    session: &SessionStore<S>,
    visibility: &VisibilityController<S, K>,
    response: &TokenResponse,
) -> ClientResult<NavVisibility> {
    let token = response
        .token()
        .ok_or_else(|| ClientError::Validation("Access token not received.".to_string()))?;
    session.set_token(token);
    log_info!("[Auth] Login successful, token stored.");
    Ok(visibility.refresh())
}

pub fn end_session<S: TokenStorage, K: AffordanceSink>(
    session: &SessionStore<S>,
    visibility: &VisibilityController<S, K>,
) -> NavVisibility {
    session.clear_token();
    log_info!("[Auth] Logged out.");
    visibility.refresh()
}

/// 注册表单的客户端校验
pub fn validate_registration(email: &str, password: &str, confirm: &str) -> ClientResult<()> {
    if email.trim().is_empty() {
        return Err(ClientError::Validation("Email is required.".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ClientError::Validation(format!(
            "Password must be at least {} characters.",
            MIN_PASSWORD_LEN
        )));
    }
    if password != confirm {
        return Err(ClientError::Validation("Passwords do not match.".to_string()));
    }
    Ok(())
}

/// 登录失败时展示的文本：优先使用后端的 detail
pub fn login_error_message(error: &ClientError) -> String {
    match error {
        ClientError::Unauthenticated(detail) | ClientError::BackendRequestFailed { detail, .. } => {
            detail.clone()
        }
        ClientError::Validation(msg) => msg.clone(),
        _ => "Login failed. Please check your credentials.".to_string(),
    }
}

// =========================================================
// 浏览器流程
// =========================================================

/// 登录成功后跳转到地图
pub async fn login(ctx: &AppContext, email: &str, password: &str) -> ClientResult<()> {
    let response = ctx.api.login(email.trim(), password).await?;
    establish_session(&ctx.session, &ctx.visibility, &response)?;
    navigate_to(AppRoute::Map);
    Ok(())
}

/// 注册不会改变会话状态
pub async fn register(
    ctx: &AppContext,
    email: &str,
    password: &str,
    confirm: &str,
) -> ClientResult<UserRead> {
    validate_registration(email, password, confirm)?;
    let user = ctx.api.register(email.trim(), password).await?;
    log_info!("[Auth] Registered {}", user.email);
    Ok(user)
}

pub fn logout(ctx: &AppContext) {
    end_session(&ctx.session, &ctx.visibility);
    navigate_to(AppRoute::Login);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::memory_session;
    use crate::visibility::tests::RecordingSink;

    fn token_response(token: &str) -> TokenResponse {
        TokenResponse {
            access_token: token.to_string(),
            token_type: "bearer".to_string(),
        }
    }

    #[test]
    fn login_then_logout_toggles_affordances() {
        let session = memory_session();
        let sink = RecordingSink::default();
        let visibility = VisibilityController::new(session.clone(), sink.clone());

        let v = establish_session(&session, &visibility, &token_response("jwt")).unwrap();
        assert!(v.logout && v.profile && v.submit);
        assert_eq!(session.token().as_deref(), Some("jwt"));

        let v = end_session(&session, &visibility);
        assert!(!v.logout && !v.profile && !v.submit);
        assert!(v.login && v.register);
        assert_eq!(session.token(), None);
        assert_eq!(sink.applied.borrow().len(), 2);
    }

    #[test]
    fn missing_token_leaves_session_untouched() {
        let session = memory_session();
        let sink = RecordingSink::default();
        let visibility = VisibilityController::new(session.clone(), sink.clone());

        let err = establish_session(&session, &visibility, &token_response("  ")).unwrap_err();
        assert_eq!(err, ClientError::Validation("Access token not received.".into()));
        assert!(!session.is_authenticated());
        assert!(sink.applied.borrow().is_empty());
    }

    #[test]
    fn registration_checks() {
        assert!(validate_registration("a@b.c", "password1", "password1").is_ok());
        assert_eq!(
            validate_registration(" ", "password1", "password1").unwrap_err(),
            ClientError::Validation("Email is required.".into())
        );
        assert_eq!(
            validate_registration("a@b.c", "short", "short").unwrap_err(),
            ClientError::Validation("Password must be at least 8 characters.".into())
        );
        assert_eq!(
            validate_registration("a@b.c", "password1", "password2").unwrap_err(),
            ClientError::Validation("Passwords do not match.".into())
        );
    }

    #[test]
    fn login_errors_prefer_backend_detail() {
        let err = ClientError::Unauthenticated("Incorrect email or password".into());
        assert_eq!(login_error_message(&err), "Incorrect email or password");
        let err = ClientError::Network("offline".into());
        assert_eq!(
            login_error_message(&err),
            "Login failed. Please check your credentials."
        );
    }
}
