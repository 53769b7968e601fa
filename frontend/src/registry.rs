//! 视图注册表
//!
//! 路由 token → (视图模板位置, 可选初始化器) 的静态映射。
//! 通过消费式的 builder 在启动时一次性构建，构建完成后不再提供任何修改接口。

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{ClientError, ClientResult};

// =========================================================
// 视图资源守卫
// =========================================================

/// 视图持有的资源（摄像头流、地图实例、已挂载的组件……）
///
/// 视图被拆除时由路由器 drop，依次执行登记的释放动作。
#[derive(Default)]
pub struct ViewGuard {
    releases: Vec<Box<dyn FnOnce()>>,
}

impl ViewGuard {
    pub fn empty() -> Self {
        Self::default()
    }

    /// 持有一个值，守卫释放时一并 drop
    pub fn hold<T: 'static>(self, resource: T) -> Self {
        self.on_release(move || drop(resource))
    }

    /// 登记释放动作，按登记顺序执行
    pub fn on_release(mut self, release: impl FnOnce() + 'static) -> Self {
        self.releases.push(Box::new(release));
        self
    }
}

impl Drop for ViewGuard {
    fn drop(&mut self) {
        for release in self.releases.drain(..) {
            release();
        }
    }
}

impl fmt::Debug for ViewGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewGuard")
            .field("releases", &self.releases.len())
            .finish()
    }
}

// =========================================================
// 初始化器
// =========================================================

/// 视图初始化器
///
/// 在视图内容换入文档后同步调用一次，负责把控件接到后端调用上。
pub trait ViewInitializer {
    fn initialize(&self) -> ClientResult<ViewGuard>;
}

impl<F> ViewInitializer for F
where
    F: Fn() -> ClientResult<ViewGuard>,
{
    fn initialize(&self) -> ClientResult<ViewGuard> {
        self()
    }
}

// =========================================================
// 路由描述与注册表
// =========================================================

pub struct RouteDescriptor {
    token: String,
    locator: String,
    initializer: Option<Rc<dyn ViewInitializer>>,
}

impl RouteDescriptor {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn initializer(&self) -> Option<Rc<dyn ViewInitializer>> {
        self.initializer.clone()
    }
}

impl fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("token", &self.token)
            .field("locator", &self.locator)
            .field("initializer", &self.initializer.is_some())
            .finish()
    }
}

/// 去掉片段前导的 `#`
pub fn route_token(fragment: &str) -> &str {
    let fragment = fragment.trim();
    fragment.strip_prefix('#').unwrap_or(fragment)
}

#[derive(Debug)]
pub struct ViewRegistry {
    routes: HashMap<String, RouteDescriptor>,
    default_token: String,
}

impl ViewRegistry {
    pub fn builder(default_token: impl Into<String>) -> ViewRegistryBuilder {
        ViewRegistryBuilder {
            routes: HashMap::new(),
            default_token: default_token.into(),
        }
    }

    /// 解析路由
    ///
    /// 接受 `login` 或 `#login`；空片段（`""` / `"#"`）落到默认路由。
    pub fn resolve(&self, fragment: &str) -> ClientResult<&RouteDescriptor> {
        let token = match route_token(fragment) {
            "" => self.default_token.as_str(),
            token => token,
        };
        self.routes
            .get(token)
            .ok_or_else(|| ClientError::RouteNotFound(token.to_string()))
    }
}

pub struct ViewRegistryBuilder {
    routes: HashMap<String, RouteDescriptor>,
    default_token: String,
}

impl ViewRegistryBuilder {
    /// 注册没有初始化器的静态视图
    pub fn route(self, token: impl Into<String>, locator: impl Into<String>) -> Self {
        self.insert(token.into(), locator.into(), None)
    }

    /// 注册带初始化器的视图
    pub fn route_with(
        self,
        token: impl Into<String>,
        locator: impl Into<String>,
        initializer: impl ViewInitializer + 'static,
    ) -> Self {
        self.insert(token.into(), locator.into(), Some(Rc::new(initializer)))
    }

    fn insert(
        mut self,
        token: String,
        locator: String,
        initializer: Option<Rc<dyn ViewInitializer>>,
    ) -> Self {
        let descriptor = RouteDescriptor {
            token: token.clone(),
            locator,
            initializer,
        };
        if self.routes.insert(token.clone(), descriptor).is_some() {
            log_warn!("[Registry] Route '{}' registered twice, keeping the last one", token);
        }
        self
    }

    /// 完成构建；默认路由必须已注册
    pub fn build(self) -> ClientResult<ViewRegistry> {
        if !self.routes.contains_key(&self.default_token) {
            return Err(ClientError::RouteNotFound(self.default_token));
        }
        Ok(ViewRegistry {
            routes: self.routes,
            default_token: self.default_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn registry() -> ViewRegistry {
        ViewRegistry::builder("map")
            .route("login", "views/login.html")
            .route_with("map", "views/map.html", || -> ClientResult<ViewGuard> {
                Ok(ViewGuard::empty())
            })
            .build()
            .unwrap()
    }

    #[test]
    fn resolve_is_stable_for_registered_tokens() {
        let registry = registry();
        for token in ["login", "map", "#login", "#map"] {
            let first = registry.resolve(token).unwrap() as *const RouteDescriptor;
            let second = registry.resolve(token).unwrap() as *const RouteDescriptor;
            assert_eq!(first, second, "{token}");
        }
        assert_eq!(registry.resolve("#login").unwrap().locator(), "views/login.html");
    }

    #[test]
    fn empty_fragments_map_to_default() {
        let registry = registry();
        for fragment in ["", "#", "  "] {
            assert_eq!(registry.resolve(fragment).unwrap().token(), "map");
        }
    }

    #[test]
    fn unknown_tokens_are_not_found() {
        let registry = registry();
        assert_eq!(
            registry.resolve("#unknown").unwrap_err(),
            ClientError::RouteNotFound("unknown".into())
        );
        // 只去掉一个 `#`
        assert!(registry.resolve("##map").is_err());
    }

    #[test]
    fn build_requires_default_route() {
        let err = ViewRegistry::builder("map")
            .route("login", "views/login.html")
            .build()
            .unwrap_err();
        assert_eq!(err, ClientError::RouteNotFound("map".into()));
    }

    #[test]
    fn guard_runs_releases_in_order_once() {
        let log = Rc::new(std::cell::RefCell::new(Vec::new()));
        let count = Rc::new(Cell::new(0));
        {
            let (a, b) = (log.clone(), log.clone());
            let c = count.clone();
            let _guard = ViewGuard::empty()
                .on_release(move || a.borrow_mut().push("camera"))
                .on_release(move || b.borrow_mut().push("map"))
                .on_release(move || c.set(c.get() + 1));
        }
        assert_eq!(*log.borrow(), vec!["camera", "map"]);
        assert_eq!(count.get(), 1);
    }
}
