//! 路由服务模块 - 浏览器绑定
//!
//! 所有对 `window.location.hash` 与 `hashchange` 的操作都集中在此模块，
//! 核心状态机见 `crate::router`。

use std::rc::Rc;

use async_trait::async_trait;
use leptos::task::spawn_local;
use wasm_bindgen::prelude::*;

use super::http;
use super::route::AppRoute;
use crate::error::{ClientError, ClientResult};
use crate::router::{ContentHost, ContentSource, Router};

/// 视图内容区域的元素 id
pub const CONTENT_ID: &str = "app-content";

/// 浏览器中的路由器
pub type BrowserRouter = Router<HttpContentSource, DomContentHost>;

/// 获取当前 hash 片段（包含 `#`）
pub fn current_fragment() -> String {
    web_sys::window()
        .and_then(|w| w.location().hash().ok())
        .unwrap_or_default()
}

/// 编程式导航
///
/// 设置 hash；目标与当前 hash 相同时浏览器不会触发 `hashchange`，
/// 这里手动派发一个，保证视图重新加载。
pub fn navigate_to(route: AppRoute) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let target = route.fragment();
    if current_fragment() == target {
        match web_sys::Event::new("hashchange") {
            Ok(event) => {
                let _ = window.dispatch_event(&event);
            }
            Err(e) => log_error!("[Router] Failed to create hashchange event: {:?}", e),
        }
    } else if let Err(e) = window.location().set_hash(&target) {
        log_error!("[Router] Failed to set hash {}: {:?}", target, e);
    }
}

// ============================================================================
// 内容来源与内容区域
// ============================================================================

/// 通过 fetch 获取视图模板
pub struct HttpContentSource;

#[async_trait(?Send)]
impl ContentSource for HttpContentSource {
    async fn fetch(&self, locator: &str) -> ClientResult<String> {
        let response = http::get_uncached(locator)
            .await
            .map_err(|e| ClientError::ContentFetchFailed(e.to_string()))?;
        if !response.ok() {
            return Err(ClientError::ContentFetchFailed(response.status_line()));
        }
        response
            .text()
            .await
            .map_err(|e| ClientError::ContentFetchFailed(e.to_string()))
    }
}

/// `<main id="app-content">`
pub struct DomContentHost {
    container_id: &'static str,
}

impl DomContentHost {
    pub fn new(container_id: &'static str) -> Self {
        Self { container_id }
    }

    fn container(&self) -> Option<web_sys::Element> {
        web_sys::window()?
            .document()?
            .get_element_by_id(self.container_id)
    }
}

impl Default for DomContentHost {
    fn default() -> Self {
        Self::new(CONTENT_ID)
    }
}

impl ContentHost for DomContentHost {
    fn show_content(&self, html: &str) {
        match self.container() {
            Some(container) => container.set_inner_html(html),
            None => log_error!("[Router] Content container #{} missing", self.container_id),
        }
    }

    fn show_error(&self, message: &str) {
        let Some(container) = self.container() else {
            log_error!("[Router] Content container #{} missing", self.container_id);
            return;
        };
        container.set_inner_html(r#"<p class="text-danger"></p>"#);
        // 错误文本按纯文本写入
        if let Ok(Some(p)) = container.query_selector("p") {
            p.set_text_content(Some(message));
        }
    }
}

// ============================================================================
// 启动
// ============================================================================

/// 注册 `hashchange` 监听并加载初始视图
pub fn start(router: Rc<BrowserRouter>) {
    let listener = router.clone();
    let closure = Closure::<dyn Fn()>::new(move || {
        let router = listener.clone();
        spawn_local(async move {
            router.navigate(&current_fragment()).await;
        });
    });

    if let Some(window) = web_sys::window() {
        let _ = window
            .add_event_listener_with_callback("hashchange", closure.as_ref().unchecked_ref());
    }

    // 泄漏闭包以保持监听器存活
    closure.forget();

    spawn_local(async move {
        router.navigate(&current_fragment()).await;
    });
}
