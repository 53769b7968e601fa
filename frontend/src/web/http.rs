//! 视图模板获取
//!
//! 直接使用 `web_sys::fetch`；后端 REST 调用走 `api` 模块的 gloo-net 客户端。

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestCache, RequestInit, Response};

use crate::error::{ClientError, ClientResult};

/// HTTP 响应封装
pub struct HttpResponse {
    inner: Response,
}

impl HttpResponse {
    pub fn status(&self) -> u16 {
        self.inner.status()
    }

    /// 状态行，例如 `404 Not Found`
    pub fn status_line(&self) -> String {
        let text = self.inner.status_text();
        if text.is_empty() {
            self.status().to_string()
        } else {
            format!("{} {}", self.status(), text)
        }
    }

    /// 检查响应是否成功 (2xx)
    pub fn ok(&self) -> bool {
        self.inner.ok()
    }

    /// 获取响应体文本
    pub async fn text(self) -> ClientResult<String> {
        let promise = self.inner.text()?;
        let text = JsFuture::from(promise).await?;
        text.as_string()
            .ok_or_else(|| ClientError::Decode("response body is not text".to_string()))
    }
}

/// 不经过 HTTP 缓存的 GET 请求
pub async fn get_uncached(url: &str) -> ClientResult<HttpResponse> {
    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_cache(RequestCache::NoStore);

    let request = Request::new_with_str_and_init(url, &opts)?;

    let window = web_sys::window()
        .ok_or_else(|| ClientError::Browser("window is not available".to_string()))?;

    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| ClientError::Network(format!("{:?}", e)))?;

    let response: Response = resp_value
        .dyn_into()
        .map_err(|_| ClientError::Decode("fetch did not return a Response".to_string()))?;

    Ok(HttpResponse { inner: response })
}
