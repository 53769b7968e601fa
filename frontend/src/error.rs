//! 前端错误类型
//!
//! 路由级错误（`RouteNotFound` / `ContentFetchFailed`）只在内容区域原地展示；
//! 视图内的后端错误由各视图就地转成提示消息，二者都不会跨越导航边界传播。

use core::fmt;

use snapmap_shared::ErrorBody;
use wasm_bindgen::JsValue;

/// 客户端错误
#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    /// 路由表中没有这个 token
    RouteNotFound(String),
    /// 视图模板获取失败（网络错误或非 2xx）
    ContentFetchFailed(String),
    /// 后端返回了非成功状态
    BackendRequestFailed { status: u16, detail: String },
    /// 401：需要重新登录
    Unauthenticated(String),
    /// 请求没有到达后端
    Network(String),
    /// 响应体无法解析
    Decode(String),
    /// 客户端表单校验失败
    Validation(String),
    /// DOM / JS API 调用失败
    Browser(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// 面向用户的提示文本
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Unauthenticated(_) => {
                "Authentication failed. Please log in again.".to_string()
            }
            ClientError::BackendRequestFailed { detail, .. } => format!("Error: {}", detail),
            ClientError::Validation(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ClientError::Unauthenticated(_))
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::RouteNotFound(token) => write!(f, "View '{}' not found", token),
            ClientError::ContentFetchFailed(reason) => f.write_str(reason),
            ClientError::BackendRequestFailed { status, detail } => {
                write!(f, "Request failed ({}): {}", status, detail)
            }
            ClientError::Unauthenticated(detail) => write!(f, "Unauthenticated: {}", detail),
            ClientError::Network(msg) => write!(f, "Network error: {}", msg),
            ClientError::Decode(msg) => write!(f, "Unexpected response: {}", msg),
            ClientError::Validation(msg) => f.write_str(msg),
            ClientError::Browser(msg) => write!(f, "Browser error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

/// 把非成功响应转换为错误
///
/// 优先使用响应体里的 `detail`（字符串或校验错误列表），否则退回到状态码描述。
pub fn error_from_response(status: u16, body: &str) -> ClientError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .map(|d| d.flatten())
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| format!("request failed with status {}", status));

    if status == 401 {
        ClientError::Unauthenticated(detail)
    } else {
        ClientError::BackendRequestFailed { status, detail }
    }
}

impl From<gloo_net::Error> for ClientError {
    fn from(e: gloo_net::Error) -> Self {
        match e {
            gloo_net::Error::SerdeError(e) => ClientError::Decode(e.to_string()),
            other => ClientError::Network(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}

impl From<JsValue> for ClientError {
    fn from(e: JsValue) -> Self {
        let msg = e.as_string().unwrap_or_else(|| format!("{:?}", e));
        ClientError::Browser(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_unauthenticated() {
        let err = error_from_response(401, r#"{"detail":"Could not validate credentials"}"#);
        assert_eq!(
            err,
            ClientError::Unauthenticated("Could not validate credentials".into())
        );
        assert!(err.is_unauthenticated());
        assert_eq!(
            err.user_message(),
            "Authentication failed. Please log in again."
        );
    }

    #[test]
    fn validation_lists_are_flattened() {
        let body = r#"{"detail":[{"loc":["body","latitude"],"msg":"field required"},
                                  {"loc":["body","image"],"msg":"field required"}]}"#;
        match error_from_response(422, body) {
            ClientError::BackendRequestFailed { status, detail } => {
                assert_eq!(status, 422);
                assert_eq!(detail, "latitude: field required, image: field required");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unparseable_bodies_fall_back_to_status() {
        let err = error_from_response(500, "<html>oops</html>");
        assert_eq!(
            err.user_message(),
            "Error: request failed with status 500"
        );
    }
}
