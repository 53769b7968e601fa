//! 应用上下文
//!
//! 启动时构建一次。视图组件挂载在各自的模板里，彼此不在同一个 Leptos
//! owner 树下，所以上下文以组件参数的形式传入，而不是 `provide_context`。

use leptos::prelude::*;

use crate::api::SnapApi;
use crate::config::AppConfig;
use crate::session::SessionStore;
use crate::visibility::{AffordanceSink, NavVisibility, VisibilityController};
use crate::web::BrowserStorage;

/// 导航栏可见性信号作为输出端
impl AffordanceSink for RwSignal<NavVisibility> {
    fn apply(&self, visibility: NavVisibility) {
        self.set(visibility);
    }
}

pub type BrowserSession = SessionStore<BrowserStorage>;
pub type BrowserVisibility = VisibilityController<BrowserStorage, RwSignal<NavVisibility>>;

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub api: SnapApi,
    pub session: BrowserSession,
    pub visibility: BrowserVisibility,
    pub nav: RwSignal<NavVisibility>,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        let session = SessionStore::new(BrowserStorage, config.token_key.clone());
        let nav = RwSignal::new(NavVisibility::default());
        let visibility = VisibilityController::new(session.clone(), nav);
        Self {
            api: SnapApi::new(config.api_base_url.clone()),
            config,
            session,
            visibility,
            nav,
        }
    }
}
