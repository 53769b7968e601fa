//! SnapMap 前端应用
//!
//! 基于 hash 的单页应用：
//! - `registry` / `router`: 视图注册表与导航状态机（不依赖 DOM）
//! - `session` / `visibility`: 会话 token 与导航栏可见性
//! - `web`: 浏览器绑定（fetch、localStorage、hashchange、定位）
//! - `views`: 路由到组件的初始化器
//! - `components`: UI 组件层

// =========================================================
// 跨平台日志宏
// =========================================================

#[cfg(target_arch = "wasm32")]
macro_rules! log_info {
    ($($t:tt)*) => (web_sys::console::log_1(&format!($($t)*).into()))
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_info {
    ($($t:tt)*) => (println!($($t)*))
}

#[cfg(target_arch = "wasm32")]
macro_rules! log_warn {
    ($($t:tt)*) => (web_sys::console::warn_1(&format!($($t)*).into()))
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_warn {
    ($($t:tt)*) => (eprintln!($($t)*))
}

#[cfg(target_arch = "wasm32")]
macro_rules! log_error {
    ($($t:tt)*) => (web_sys::console::error_1(&format!($($t)*).into()))
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_error {
    ($($t:tt)*) => (eprintln!($($t)*))
}

mod api;
mod auth;
mod config;
mod context;
mod error;
mod registry;
mod router;
mod session;
mod views;
mod visibility;

mod components {
    pub mod login;
    pub mod map;
    pub mod navbar;
    pub mod notice;
    pub mod profile;
    pub mod register;
    pub mod submit;
}

// 浏览器 API 绑定
pub(crate) mod web {
    pub mod geolocation;
    mod http;
    pub mod route;
    pub mod router;
    mod storage;

    pub use storage::BrowserStorage;
}

use std::rc::Rc;

use leptos::prelude::*;

use crate::components::navbar::Navbar;
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::web::router::{CONTENT_ID, DomContentHost, HttpContentSource};

/// 应用外壳：导航栏 + 视图内容区域
///
/// 内容区域由路由器直接写入模板，Leptos 不管理其子节点。
#[component]
fn App(ctx: AppContext) -> impl IntoView {
    view! {
        <Navbar ctx=ctx />
        <main id=CONTENT_ID class="container mx-auto p-4"></main>
    }
}

/// 启动应用
pub fn start() {
    let config = AppConfig::from_document();
    log_info!("[App] API base URL: {}", config.api_base_url);

    let ctx = AppContext::new(config);
    {
        let ctx = ctx.clone();
        // 外壳常驻整个页面生命周期
        mount_to_body(move || view! { <App ctx=ctx /> });
    }
    ctx.visibility.refresh();

    let registry = match views::build_registry(&ctx) {
        Ok(registry) => registry,
        Err(e) => {
            log_error!("[App] Failed to build view registry: {}", e);
            return;
        }
    };

    let router = Rc::new(router::Router::new(
        registry,
        HttpContentSource,
        DomContentHost::default(),
    ));
    web::router::start(router);
}
