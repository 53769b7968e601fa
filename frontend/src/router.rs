//! 视图路由器 - 核心状态机
//!
//! 流程：解析 token -> 获取视图内容 -> 换入内容区域 -> 调用初始化器。
//!
//! 每次导航领取一个单调递增的票号，只有最后发起的导航可以修改内容与状态；
//! 完成时已经过期的加载直接丢弃（`NavigationOutcome::Superseded`）。
//! 内容获取与 DOM 写入分别通过 [`ContentSource`] / [`ContentHost`] 注入，
//! 浏览器实现位于 `web::router`。

use std::cell::{Cell, RefCell};

use async_trait::async_trait;

use crate::error::{ClientError, ClientResult};
use crate::registry::{ViewGuard, ViewRegistry, route_token};

#[cfg(test)]
mod tests;

/// 未注册路由时内容区域显示的固定文本
pub const NOT_FOUND_MESSAGE: &str = "Error: View not found.";

/// 视图内容来源
#[async_trait(?Send)]
pub trait ContentSource {
    /// 获取视图标记；网络错误或非 2xx 返回 `ContentFetchFailed`
    async fn fetch(&self, locator: &str) -> ClientResult<String>;
}

/// 内容区域
pub trait ContentHost {
    fn show_content(&self, html: &str);
    fn show_error(&self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RouterState {
    #[default]
    Idle,
    Loading(String),
    Displayed(String),
    Failed { route: String, error: ClientError },
}

/// 单次导航的结果
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationOutcome {
    Displayed(String),
    Failed(ClientError),
    /// 完成前已有更新的导航发起，结果被丢弃
    Superseded,
}

pub struct Router<C, H> {
    registry: ViewRegistry,
    source: C,
    host: H,
    state: RefCell<RouterState>,
    ticket: Cell<u64>,
    // 当前视图的资源，下一次改写内容区域前释放
    guard: RefCell<Option<ViewGuard>>,
}

impl<C: ContentSource, H: ContentHost> Router<C, H> {
    pub fn new(registry: ViewRegistry, source: C, host: H) -> Self {
        Self {
            registry,
            source,
            host,
            state: RefCell::new(RouterState::Idle),
            ticket: Cell::new(0),
            guard: RefCell::new(None),
        }
    }

    pub fn state(&self) -> RouterState {
        self.state.borrow().clone()
    }

    /// 导航到片段对应的视图
    ///
    /// 路由级错误在内容区域原地展示，不会返回到调用方之外。
    pub async fn navigate(&self, fragment: &str) -> NavigationOutcome {
        let ticket = self.ticket.get() + 1;
        self.ticket.set(ticket);

        let descriptor = match self.registry.resolve(fragment) {
            Ok(descriptor) => descriptor,
            Err(error) => {
                log_warn!("[Router] No view registered for '{}'", fragment);
                self.release_view();
                self.host.show_error(NOT_FOUND_MESSAGE);
                self.set_state(RouterState::Failed {
                    route: route_token(fragment).to_string(),
                    error: error.clone(),
                });
                return NavigationOutcome::Failed(error);
            }
        };

        let route = descriptor.token().to_string();
        self.set_state(RouterState::Loading(route.clone()));
        log_info!("[Router] Loading '{}' from {}", route, descriptor.locator());

        let fetched = self.source.fetch(descriptor.locator()).await;

        if ticket != self.ticket.get() {
            log_info!("[Router] Discarding stale load of '{}'", route);
            return NavigationOutcome::Superseded;
        }

        let html = match fetched {
            Ok(html) => html,
            Err(error) => {
                let reason = match error {
                    ClientError::ContentFetchFailed(reason) => reason,
                    other => other.to_string(),
                };
                log_error!("[Router] Failed to load '{}': {}", route, reason);
                self.release_view();
                self.host
                    .show_error(&format!("Error loading view: {}", reason));
                let error = ClientError::ContentFetchFailed(reason);
                self.set_state(RouterState::Failed {
                    route,
                    error: error.clone(),
                });
                return NavigationOutcome::Failed(error);
            }
        };

        self.release_view();
        self.host.show_content(&html);
        self.set_state(RouterState::Displayed(route.clone()));

        if let Some(initializer) = descriptor.initializer() {
            match initializer.initialize() {
                Ok(guard) => *self.guard.borrow_mut() = Some(guard),
                Err(e) => log_error!("[Router] Initializer for '{}' failed: {}", route, e),
            }
        }

        NavigationOutcome::Displayed(route)
    }

    fn set_state(&self, state: RouterState) {
        *self.state.borrow_mut() = state;
    }

    fn release_view(&self) {
        // 先取出再 drop，释放动作运行时不持有借用
        let previous = self.guard.borrow_mut().take();
        drop(previous);
    }
}
